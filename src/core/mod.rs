pub mod binder;
pub mod catalog;
pub mod handoff;
pub mod pricing;
pub mod selection;
pub mod validation;

pub use crate::domain::model::{CatalogItem, DerivedSummary, FormValues, ItemGroup, SelectionKey};
pub use crate::domain::ports::{Navigator, QuoteView, SubmissionHandoff};
pub use crate::utils::error::Result;
