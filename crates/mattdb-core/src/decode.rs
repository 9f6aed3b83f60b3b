//! Decoding of flat import rows into structured product commands.
//!
//! Child-domain fields arrive as delimited micro-formats (`|` between
//! entries, `~` or `:` between parts, `key=value;...` for variants).
//! Decoding never fails: malformed entries degrade to defaults, and the
//! only hard stop for a row is a blank `name`, which decodes to a skip.
//! See [`crate::products`] for the decoded types.

use crate::products::{
    BadgeSet, DescriptionParagraph, DimensionsImport, Faq, ImageImport, NewProduct, ProductImport,
    ReasonToLove, TitledSection, VariantImport,
};
use crate::rows::ImportRow;

/// Default category slug when the row leaves `category` blank.
const DEFAULT_CATEGORY_SLUG: &str = "mattresses";

/// Icon used when a reasons-to-love entry omits the fourth part.
const DEFAULT_REASON_ICON: &str = "check";

/// Decodes one row into a [`ProductImport`] command.
///
/// Returns `None` when the row has a blank or missing `name`; such rows are
/// skipped entirely and never reported as errors.
#[must_use]
pub fn decode_row(row: &ImportRow) -> Option<ProductImport> {
    let name = non_empty(row.name.as_deref())?;

    let category_slug = non_empty(row.category.as_deref())
        .map_or_else(|| DEFAULT_CATEGORY_SLUG.to_string(), |c| c.to_lowercase());

    let product = NewProduct {
        name,
        category_slug,
        rating: parse_number(row.rating.as_deref()),
        headline: non_empty(row.headline.as_deref()),
        long_description: non_empty(row.long_description.as_deref()),
        care_instructions: non_empty(row.care_instructions.as_deref()),
        trial_information: non_empty(row.trial_information.as_deref()),
        warranty_delivery_line: non_empty(row.warranty_delivery_line.as_deref()),
        firmness_scale: non_empty(row.firmness_scale.as_deref()),
        support_level: non_empty(row.support_level.as_deref()),
        pressure_relief_level: non_empty(row.pressure_relief_level.as_deref()),
        air_circulation_level: non_empty(row.air_circulation_level.as_deref()),
        durability_level: non_empty(row.durability_level.as_deref()),
    };

    let mut reasons_to_buy = split_list(row.custom_reasons_to_buy.as_deref());
    if reasons_to_buy.is_empty() {
        reasons_to_buy = split_list(row.reasons_to_buy.as_deref());
    }

    let mut variants = decode_variants(row.variants.as_deref());
    if variants.is_empty() {
        if let Some(fallback) = flat_price_variant(row) {
            variants.push(fallback);
        }
    }

    Some(ProductImport {
        images: decode_images(row.images.as_deref(), row.main_image_index.as_deref()),
        reasons_to_buy,
        features: split_list(row.features.as_deref()),
        reasons_to_love: decode_reasons_to_love(row.reasons_to_love.as_deref()),
        variants,
        descriptions: decode_descriptions(row.descriptions.as_deref()),
        faqs: decode_faqs(row.faqs.as_deref()),
        warranty_sections: decode_sections(row.warranty_sections.as_deref()),
        notices: decode_sections(row.notices.as_deref()),
        badges: decode_badges(row.badges.as_deref()),
        dimensions: decode_dimensions(row),
        popular_categories: split_list(row.popular_categories.as_deref()),
        product,
    })
}

// ---------------------------------------------------------------------------
// List and structured-list fields
// ---------------------------------------------------------------------------

/// Splits a pipe-separated list field: trim each entry, drop empties.
fn split_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Splits one tilde-encoded entry into exactly `count` parts. Missing
/// trailing parts default to the empty string; extras are ignored.
fn tilde_parts(entry: &str, count: usize) -> Vec<String> {
    let mut parts: Vec<String> = entry
        .split('~')
        .take(count)
        .map(|p| p.trim().to_owned())
        .collect();
    parts.resize(count, String::new());
    parts
}

fn decode_images(raw: Option<&str>, main_index: Option<&str>) -> Vec<ImageImport> {
    let main_index = main_index
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(0);

    split_list(raw)
        .into_iter()
        .enumerate()
        .map(|(idx, image_url)| ImageImport {
            image_url,
            is_main_image: idx == main_index,
        })
        .collect()
}

fn decode_descriptions(raw: Option<&str>) -> Vec<DescriptionParagraph> {
    split_list(raw)
        .iter()
        .map(|entry| {
            let mut parts = tilde_parts(entry, 3);
            let image_url = parts.pop().unwrap_or_default();
            let content = parts.pop().unwrap_or_default();
            let heading = parts.pop().unwrap_or_default();
            DescriptionParagraph {
                heading,
                content,
                image_url,
            }
        })
        .collect()
}

fn decode_faqs(raw: Option<&str>) -> Vec<Faq> {
    split_list(raw)
        .iter()
        .map(|entry| {
            let mut parts = tilde_parts(entry, 2);
            let answer = parts.pop().unwrap_or_default();
            let question = parts.pop().unwrap_or_default();
            Faq { question, answer }
        })
        .collect()
}

/// Shared by `warrantySections` and `notices`; both encode `title~content`.
fn decode_sections(raw: Option<&str>) -> Vec<TitledSection> {
    split_list(raw)
        .iter()
        .map(|entry| {
            let mut parts = tilde_parts(entry, 2);
            let content = parts.pop().unwrap_or_default();
            let title = parts.pop().unwrap_or_default();
            TitledSection { title, content }
        })
        .collect()
}

fn decode_reasons_to_love(raw: Option<&str>) -> Vec<ReasonToLove> {
    split_list(raw)
        .iter()
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let icon = match parts.get(3) {
                Some(icon) if !icon.is_empty() => (*icon).to_owned(),
                _ => DEFAULT_REASON_ICON.to_owned(),
            };
            ReasonToLove {
                reason_text: (*parts.first().unwrap_or(&"")).to_owned(),
                description: (*parts.get(1).unwrap_or(&"")).to_owned(),
                smalltext: (*parts.get(2).unwrap_or(&"")).to_owned(),
                icon,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

fn decode_variants(raw: Option<&str>) -> Vec<VariantImport> {
    split_list(raw)
        .iter()
        .map(|entry| decode_variant_entry(entry))
        .collect()
}

/// Decodes one `key=value;key=value` variant entry.
///
/// Keys are lowercased and matched against the recognized set; unrecognized
/// keys and pairs without `=` are silently skipped. The value is taken from
/// the first `=` onward, so values may themselves contain `=`.
fn decode_variant_entry(entry: &str) -> VariantImport {
    let mut sku = None;
    let mut sdi_number = None;
    let mut original: Option<f64> = None;
    let mut current: Option<f64> = None;
    let mut color = None;
    let mut depth = None;
    let mut firmness = None;
    let mut size = None;
    let mut length = None;
    let mut width = None;
    let mut height = None;
    let mut availability: Option<bool> = None;
    let mut image_url = None;

    for pair in entry.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        match key.as_str() {
            "sku" => sku = Some(value.to_owned()),
            "sdi" | "sdi_number" => sdi_number = Some(value.to_owned()),
            "original" | "original_price" => original = value.parse().ok(),
            "current" | "current_price" => current = value.parse().ok(),
            "color" => color = Some(value.to_owned()),
            "depth" => depth = Some(value.to_owned()),
            "firmness" => firmness = Some(value.to_owned()),
            "size" => size = Some(value.to_owned()),
            "length" => length = Some(value.to_owned()),
            "width" => width = Some(value.to_owned()),
            "height" => height = Some(value.to_owned()),
            "availability" => availability = Some(value.eq_ignore_ascii_case("true")),
            "variantimage" => image_url = Some(value.to_owned()),
            _ => {}
        }
    }

    VariantImport {
        sku,
        sdi_number,
        // Either price field backfills the other; total absence yields zero.
        original_price: original.or(current).unwrap_or(0.0),
        current_price: current.or(original).unwrap_or(0.0),
        color,
        depth,
        firmness,
        size,
        length,
        width,
        height,
        availability: availability.unwrap_or(true),
        image_url,
    }
}

/// Synthesizes a single default variant from the flat `price`/`salePrice`
/// fields for rows that carry prices but no `variants` field.
fn flat_price_variant(row: &ImportRow) -> Option<VariantImport> {
    let price = parse_number(row.price.as_deref());
    let sale_price = parse_number(row.sale_price.as_deref());
    if price.is_none() && sale_price.is_none() {
        return None;
    }
    Some(VariantImport {
        sku: None,
        sdi_number: None,
        original_price: price.or(sale_price).unwrap_or(0.0),
        current_price: sale_price.or(price).unwrap_or(0.0),
        color: None,
        depth: None,
        firmness: None,
        size: None,
        length: None,
        width: None,
        height: None,
        availability: true,
        image_url: None,
    })
}

// ---------------------------------------------------------------------------
// Badges and dimensions
// ---------------------------------------------------------------------------

/// Membership check over the pipe-separated badge tokens. Order and
/// duplicates in the input are irrelevant; the output set is always the
/// same fixed three flags.
fn decode_badges(raw: Option<&str>) -> BadgeSet {
    let tokens = split_list(raw);
    let has = |name: &str| tokens.iter().any(|t| t == name);
    BadgeSet {
        sale: has("sale"),
        new_in: has("new_in"),
        free_gift: has("free_gift"),
    }
}

fn decode_dimensions(row: &ImportRow) -> Option<DimensionsImport> {
    let dimensions = DimensionsImport {
        height: non_empty(row.height.as_deref()),
        length: non_empty(row.length.as_deref()),
        width: non_empty(row.width.as_deref()),
        mattress_size: non_empty(row.mattress_size.as_deref()),
        max_height: non_empty(row.max_height.as_deref()),
        weight_capacity: non_empty(row.weight_capacity.as_deref()),
        pocket_springs: non_empty(row.pocket_springs.as_deref()),
        comfort_layer: non_empty(row.comfort_layer.as_deref()),
        support_layer: non_empty(row.support_layer.as_deref()),
        dimension_disclaimer: non_empty(row.dimension_disclaimer.as_deref()),
        show_basic_dimensions: parse_flag(row.show_basic_dimensions.as_deref()),
        show_mattress_specs: parse_flag(row.show_mattress_specs.as_deref()),
        show_technical_specs: parse_flag(row.show_technical_specs.as_deref()),
    };
    if dimensions.is_empty() {
        None
    } else {
        Some(dimensions)
    }
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Trims and returns the value, or `None` when absent or blank.
fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Parses a numeric field; unparseable values are treated as absent.
fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// Display-flag parsing: `"true"` (case-insensitive) → true, any other
/// non-empty value → false, absent/blank → unset.
fn parse_flag(raw: Option<&str>) -> Option<bool> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.eq_ignore_ascii_case("true"))
}
