use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod decode;
pub mod products;
pub mod rows;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use decode::decode_row;
pub use products::{
    BadgeSet, DescriptionParagraph, DimensionsImport, Faq, ImageImport, NewProduct, ProductImport,
    ReasonToLove, TitledSection, VariantImport,
};
pub use rows::ImportRow;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
