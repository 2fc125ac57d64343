pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::headless::HeadlessPage;
pub use crate::config::toml_config::SiteConfig;
pub use crate::core::{
    binder::{BinderSettings, QuoteFormBinder, SubmitOutcome},
    catalog::Catalog,
    selection::SelectionStore,
};
pub use crate::domain::model::{CatalogItem, DerivedSummary, FormValues, ItemGroup, SelectionKey};
pub use crate::utils::error::{QuoteError, Result};
