use serde::{Deserialize, Serialize};

/// One flat import row as submitted to the bulk endpoint or read from an
/// import file: a single intended product plus its delimited child fields.
///
/// Every field is optional except `name` (enforced during decoding, not
/// deserialization, so that a malformed row degrades to a skip rather than
/// rejecting the whole batch). Field names mirror the import sheet headers,
/// hence the camelCase renames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportRow {
    pub name: Option<String>,
    /// Category slug; defaults to `"mattresses"` when absent.
    pub category: Option<String>,
    pub rating: Option<String>,
    pub headline: Option<String>,
    pub long_description: Option<String>,

    // Extended product attributes, absent on older import sheets.
    pub care_instructions: Option<String>,
    pub trial_information: Option<String>,
    pub warranty_delivery_line: Option<String>,
    pub firmness_scale: Option<String>,
    pub support_level: Option<String>,
    pub pressure_relief_level: Option<String>,
    pub air_circulation_level: Option<String>,
    pub durability_level: Option<String>,

    /// Pipe-separated image URLs.
    pub images: Option<String>,
    /// Index into `images` flagged as the main image; defaults to 0.
    pub main_image_index: Option<String>,

    /// Pipe-separated list; `customReasonsToBuy` wins when both are present.
    pub reasons_to_buy: Option<String>,
    pub custom_reasons_to_buy: Option<String>,
    /// Pipe-separated feature names.
    pub features: Option<String>,
    /// `reason:description:smalltext:icon` entries, pipe-separated.
    pub reasons_to_love: Option<String>,
    /// `key=value;key=value` entries, pipe-separated.
    pub variants: Option<String>,
    /// `heading~content~image` entries, pipe-separated.
    pub descriptions: Option<String>,
    /// `question~answer` entries, pipe-separated.
    pub faqs: Option<String>,
    /// `title~content` entries, pipe-separated.
    pub warranty_sections: Option<String>,
    /// `title~content` entries, pipe-separated.
    pub notices: Option<String>,
    /// Pipe-separated badge tokens out of `sale`, `new_in`, `free_gift`.
    pub badges: Option<String>,

    // Dimension fields, mapped 1:1 to product_dimensions columns.
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
    pub show_basic_dimensions: Option<String>,
    pub show_mattress_specs: Option<String>,
    pub show_technical_specs: Option<String>,

    /// Pipe-separated display names of popular categories.
    pub popular_categories: Option<String>,

    /// Flat price fields used to synthesize a default variant when the
    /// `variants` field yields no entries.
    pub price: Option<String>,
    pub sale_price: Option<String>,
}
