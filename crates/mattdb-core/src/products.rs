use serde::{Deserialize, Serialize};

/// A fully decoded import row: the product record plus every child list,
/// ready for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImport {
    pub product: NewProduct,
    pub images: Vec<ImageImport>,
    /// "Reasons to buy" bullet lines, in source order.
    pub reasons_to_buy: Vec<String>,
    pub features: Vec<String>,
    pub reasons_to_love: Vec<ReasonToLove>,
    pub variants: Vec<VariantImport>,
    pub descriptions: Vec<DescriptionParagraph>,
    pub faqs: Vec<Faq>,
    pub warranty_sections: Vec<TitledSection>,
    pub notices: Vec<TitledSection>,
    pub badges: BadgeSet,
    pub dimensions: Option<DimensionsImport>,
    /// Display names, not category foreign keys.
    pub popular_categories: Vec<String>,
}

impl ProductImport {
    /// Returns the total number of variants decoded for this row.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Returns the image flagged as the main product image, if any.
    #[must_use]
    pub fn main_image(&self) -> Option<&ImageImport> {
        self.images.iter().find(|i| i.is_main_image)
    }
}

/// Product attributes as decoded from a row. `category_slug` is resolved to
/// a category id at persistence time; the row is skipped when no category
/// matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category_slug: String,
    /// Star rating as entered on the sheet, e.g. `"4.5"` → `4.5`.
    ///
    /// Boundary note: a scrape-sheet `f64` convenience type; persistence
    /// casts to `NUMERIC(3,2)`, rounding at write time.
    pub rating: Option<f64>,
    pub headline: Option<String>,
    pub long_description: Option<String>,
    // Extended attributes; only present in the wide insert shape.
    pub care_instructions: Option<String>,
    pub trial_information: Option<String>,
    pub warranty_delivery_line: Option<String>,
    pub firmness_scale: Option<String>,
    pub support_level: Option<String>,
    pub pressure_relief_level: Option<String>,
    pub air_circulation_level: Option<String>,
    pub durability_level: Option<String>,
}

/// One image URL for a product. Exactly one entry per row carries
/// `is_main_image = true` (the declared main-image index, default 0),
/// provided the index is in range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageImport {
    pub image_url: String,
    pub is_main_image: bool,
}

/// One `reason:description:smalltext:icon` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonToLove {
    pub reason_text: String,
    pub description: String,
    pub smalltext: String,
    /// Defaults to `"check"` when the entry omits it.
    pub icon: String,
}

/// A purchasable variant decoded from one `key=value;...` entry.
///
/// Price fields backfill each other: a missing `current` takes `original`
/// and vice versa; both absent yields zero, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantImport {
    pub sku: Option<String>,
    pub sdi_number: Option<String>,
    /// Boundary note: bound as `f64` and cast to `NUMERIC(10,2)` on insert.
    pub original_price: f64,
    pub current_price: f64,
    pub color: Option<String>,
    pub depth: Option<String>,
    pub firmness: Option<String>,
    pub size: Option<String>,
    pub length: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    /// Defaults to `true` when the entry omits the key.
    pub availability: bool,
    /// Attached to the freshly inserted variant in a best-effort second step.
    pub image_url: Option<String>,
}

/// One `heading~content~image` description paragraph; missing trailing parts
/// decode to empty strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionParagraph {
    pub heading: String,
    pub content: String,
    pub image_url: String,
}

/// One `question~answer` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// One `title~content` entry, shared by warranty sections and notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitledSection {
    pub title: String,
    pub content: String,
}

/// The fixed three-badge set. Reconstructed in full on every import,
/// regardless of which tokens (if any) the row carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeSet {
    pub sale: bool,
    pub new_in: bool,
    pub free_gift: bool,
}

impl BadgeSet {
    /// Renders the badge set as the fixed 3-entry JSON array stored on the
    /// product row: `[{type, enabled}; 3]` in `sale, new_in, free_gift`
    /// order.
    #[must_use]
    pub fn to_json(self) -> serde_json::Value {
        serde_json::json!([
            { "type": "sale", "enabled": self.sale },
            { "type": "new_in", "enabled": self.new_in },
            { "type": "free_gift", "enabled": self.free_gift },
        ])
    }

    #[must_use]
    pub fn any_enabled(self) -> bool {
        self.sale || self.new_in || self.free_gift
    }
}

/// Dimension fields for the single per-product dimensions record.
///
/// `None` fields are omitted from the insert column list entirely rather
/// than written as explicit NULLs, so the insert still succeeds against
/// schema versions lacking those columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionsImport {
    pub height: Option<String>,
    pub length: Option<String>,
    pub width: Option<String>,
    pub mattress_size: Option<String>,
    pub max_height: Option<String>,
    pub weight_capacity: Option<String>,
    pub pocket_springs: Option<String>,
    pub comfort_layer: Option<String>,
    pub support_layer: Option<String>,
    pub dimension_disclaimer: Option<String>,
    pub show_basic_dimensions: Option<bool>,
    pub show_mattress_specs: Option<bool>,
    pub show_technical_specs: Option<bool>,
}

impl DimensionsImport {
    /// `true` when no dimension-related field was present on the row, in
    /// which case no dimensions record is written at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.height.is_none()
            && self.length.is_none()
            && self.width.is_none()
            && self.mattress_size.is_none()
            && self.max_height.is_none()
            && self.weight_capacity.is_none()
            && self.pocket_springs.is_none()
            && self.comfort_layer.is_none()
            && self.support_layer.is_none()
            && self.dimension_disclaimer.is_none()
            && self.show_basic_dimensions.is_none()
            && self.show_mattress_specs.is_none()
            && self.show_technical_specs.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_image(url: &str, is_main: bool) -> ImageImport {
        ImageImport {
            image_url: url.to_string(),
            is_main_image: is_main,
        }
    }

    fn make_import(images: Vec<ImageImport>, variants: Vec<VariantImport>) -> ProductImport {
        ProductImport {
            product: NewProduct {
                name: "Cloud Nine Hybrid".to_string(),
                category_slug: "mattresses".to_string(),
                rating: Some(4.5),
                headline: Some("Award-winning comfort".to_string()),
                long_description: None,
                care_instructions: None,
                trial_information: None,
                warranty_delivery_line: None,
                firmness_scale: None,
                support_level: None,
                pressure_relief_level: None,
                air_circulation_level: None,
                durability_level: None,
            },
            images,
            reasons_to_buy: vec![],
            features: vec![],
            reasons_to_love: vec![],
            variants,
            descriptions: vec![],
            faqs: vec![],
            warranty_sections: vec![],
            notices: vec![],
            badges: BadgeSet::default(),
            dimensions: None,
            popular_categories: vec![],
        }
    }

    fn make_variant(sku: &str) -> VariantImport {
        VariantImport {
            sku: Some(sku.to_string()),
            sdi_number: None,
            original_price: 399.0,
            current_price: 299.0,
            color: None,
            depth: None,
            firmness: None,
            size: Some("Double".to_string()),
            length: None,
            width: None,
            height: None,
            availability: true,
            image_url: None,
        }
    }

    #[test]
    fn variant_count_matches_variants_len() {
        let import = make_import(vec![], vec![make_variant("A"), make_variant("B")]);
        assert_eq!(import.variant_count(), 2);
    }

    #[test]
    fn main_image_returns_the_flagged_entry() {
        let import = make_import(
            vec![make_image("/a.jpg", false), make_image("/b.jpg", true)],
            vec![],
        );
        assert_eq!(
            import.main_image().map(|i| i.image_url.as_str()),
            Some("/b.jpg")
        );
    }

    #[test]
    fn main_image_none_when_nothing_flagged() {
        let import = make_import(vec![make_image("/a.jpg", false)], vec![]);
        assert!(import.main_image().is_none());
    }

    #[test]
    fn badge_set_json_has_fixed_order_and_cardinality() {
        let badges = BadgeSet {
            sale: true,
            new_in: false,
            free_gift: true,
        };
        let json = badges.to_json();
        let entries = json.as_array().expect("badge array");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["type"], "sale");
        assert_eq!(entries[0]["enabled"], true);
        assert_eq!(entries[1]["type"], "new_in");
        assert_eq!(entries[1]["enabled"], false);
        assert_eq!(entries[2]["type"], "free_gift");
        assert_eq!(entries[2]["enabled"], true);
    }

    #[test]
    fn badge_set_default_is_all_disabled() {
        let badges = BadgeSet::default();
        assert!(!badges.any_enabled());
        let json = badges.to_json();
        for entry in json.as_array().expect("badge array") {
            assert_eq!(entry["enabled"], false);
        }
    }

    #[test]
    fn dimensions_is_empty_only_when_all_fields_absent() {
        assert!(DimensionsImport::default().is_empty());

        let with_height = DimensionsImport {
            height: Some("30cm".to_string()),
            ..DimensionsImport::default()
        };
        assert!(!with_height.is_empty());

        let with_flag = DimensionsImport {
            show_technical_specs: Some(false),
            ..DimensionsImport::default()
        };
        assert!(!with_flag.is_empty());
    }

    #[test]
    fn serde_roundtrip_product_import() {
        let import = make_import(vec![make_image("/a.jpg", true)], vec![make_variant("SKU1")]);
        let json = serde_json::to_string(&import).expect("serialization failed");
        let decoded: ProductImport = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded.product.name, import.product.name);
        assert_eq!(decoded.variants.len(), 1);
        assert_eq!(decoded.variants[0].sku.as_deref(), Some("SKU1"));
    }
}
