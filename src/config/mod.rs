pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::cli::{FrequencyArg, SelectArg};
#[cfg(feature = "cli")]
use crate::domain::model::FormValues;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "quote-builder")]
#[command(about = "Replays quote selections against a site catalog and hands off the quote form")]
pub struct CliConfig {
    #[arg(long, help = "Site TOML file with the catalog and form settings")]
    pub site: PathBuf,

    #[arg(long = "select", value_name = "GROUP:ID", help = "Click a catalog control (repeatable)")]
    pub selects: Vec<SelectArg>,

    #[arg(long = "frequency", value_name = "ID=FREQUENCY", help = "Switch a program package's visit frequency")]
    pub frequencies: Vec<FrequencyArg>,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, default_value = "")]
    pub service: String,

    #[arg(long, default_value = "")]
    pub details: String,

    #[arg(long, help = "Behave as if the browser blocked the popup")]
    pub block_popups: bool,

    #[arg(long, help = "Print the rendered page as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs to stderr as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Typed form inputs. `email` stays `None` when the site form has no email field.
    pub fn form_values(&self, collects_email: bool) -> FormValues {
        FormValues {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: if collects_email {
                Some(self.email.clone().unwrap_or_default())
            } else {
                None
            },
            address: self.address.clone(),
            service: self.service.clone(),
            details: self.details.clone(),
            ..FormValues::default()
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("site", &self.site.to_string_lossy())
    }
}
