use crate::core::binder::{BinderSettings, ControlLabels};
use crate::core::catalog::Catalog;
use crate::core::handoff::{HostedFormHandoff, MailtoHandoff, NativePostHandoff, QueryParamNames};
use crate::core::pricing::{Money, PriceSchedule, PricingBoard};
use crate::core::selection::SelectionStore;
use crate::core::validation::{FormValidator, ValidationMessages};
use crate::domain::model::{CatalogItem, Frequency, ItemGroup, Separator, SummaryFormat};
use crate::domain::ports::SubmissionHandoff;
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{
    validate_email_address, validate_non_empty_string, validate_range, validate_unique, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HOSTED_FORM_URL: &str = "https://tally.so/r/w2xMe1";

/// Upper bound for a program price, in dollars.
pub const MAX_PRICE_DOLLARS: f64 = 1_000_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteInfo,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub labels: ControlLabels,
    #[serde(default)]
    pub messages: ValidationMessages,
    #[serde(default)]
    pub packages: Vec<ItemConfig>,
    #[serde(default)]
    pub options: Vec<ItemConfig>,
    #[serde(default)]
    pub programs: Vec<ProgramConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    pub default_service: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffKind {
    #[default]
    Hosted,
    Mailto,
    Native,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub handoff: HandoffKind,
    pub hosted_form_url: String,
    pub mailto_address: Option<String>,
    pub mailto_subject: Option<String>,
    pub require_service: bool,
    pub collects_email: bool,
    pub sending_message: Option<String>,
    pub handoff_message: Option<String>,
    pub params: QueryParamNames,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            handoff: HandoffKind::Hosted,
            hosted_form_url: DEFAULT_HOSTED_FORM_URL.to_string(),
            mailto_address: None,
            mailto_subject: None,
            require_service: false,
            collects_email: true,
            sending_message: None,
            handoff_message: None,
            params: QueryParamNames::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub separator: Separator,
    pub decorate_service: bool,
    pub scope_packages_by_service: bool,
    pub empty_text: Option<String>,
    /// Pre-filled summary value the store starts from.
    pub initial: Option<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            separator: Separator::Comma,
            decorate_service: true,
            scope_packages_by_service: false,
            empty_text: None,
            initial: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    pub id: String,
    pub label: Option<String>,
    pub service: Option<String>,
    pub price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub id: String,
    pub label: String,
    pub service: Option<String>,
    #[serde(default)]
    pub weekly_discount: u32,
    pub default_frequency: Option<Frequency>,
    #[serde(default)]
    pub packages: Vec<ProgramPackageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramPackageConfig {
    pub id: String,
    pub label: Option<String>,
    #[serde(default)]
    pub prices: PriceTable,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    pub weekly: Option<f64>,
    pub biweekly: Option<f64>,
    #[serde(rename = "every-10-days")]
    pub every_ten_days: Option<f64>,
}

impl PriceTable {
    fn entries(&self) -> Vec<(Frequency, f64)> {
        [
            (Frequency::Weekly, self.weekly),
            (Frequency::Biweekly, self.biweekly),
            (Frequency::EveryTenDays, self.every_ten_days),
        ]
        .into_iter()
        .filter_map(|(freq, price)| price.map(|p| (freq, p)))
        .collect()
    }
}

impl ProgramConfig {
    fn schedule(&self, package: &ProgramPackageConfig) -> PriceSchedule {
        package
            .prices
            .entries()
            .into_iter()
            .fold(PriceSchedule::new(self.weekly_discount), |schedule, (freq, price)| {
                schedule.with_base(freq, Money::from_dollars(price))
            })
    }

    fn starting_frequency(&self, schedule: &PriceSchedule) -> Option<Frequency> {
        self.default_frequency
            .filter(|freq| schedule.base_price(*freq).is_some())
            .or_else(|| schedule.frequencies().next())
    }

    fn item_for(&self, package: &ProgramPackageConfig) -> CatalogItem {
        let schedule = self.schedule(package);
        let frequency = self.starting_frequency(&schedule);
        let package_label = package.label.as_deref().unwrap_or(&package.id);
        CatalogItem {
            id: format!("{}-{}", self.id, package.id),
            group: ItemGroup::ProgramPackage,
            label: format!("{}: {}", self.label, package_label),
            // No service means no service tag; the id prefix keeps keys unique.
            service_tag: self.service.clone(),
            price: frequency
                .and_then(|freq| schedule.displayed_price(freq))
                .map(|price| price.to_string()),
            frequency,
        }
    }
}

impl ItemConfig {
    fn item(&self, group: ItemGroup) -> CatalogItem {
        CatalogItem {
            id: self.id.trim().to_string(),
            group,
            label: self.label.clone().unwrap_or_default(),
            service_tag: self.service.clone(),
            price: self.price.clone(),
            frequency: None,
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入站點設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析站點設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TALLY_FORM_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuoteError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("site.name", &self.site.name)?;

        match self.form.handoff {
            HandoffKind::Hosted => validate_url("form.hosted_form_url", &self.form.hosted_form_url)?,
            HandoffKind::Mailto => {
                let address = self.form.mailto_address.as_deref().ok_or_else(|| {
                    QuoteError::ConfigValidationError {
                        field: "form.mailto_address".to_string(),
                        message: "required when handoff = \"mailto\"".to_string(),
                    }
                })?;
                validate_email_address("form.mailto_address", address)?;
            }
            HandoffKind::Native => {}
        }

        for item in &self.packages {
            validate_non_empty_string("packages.id", &item.id)?;
        }
        for item in &self.options {
            validate_non_empty_string("options.id", &item.id)?;
        }

        validate_unique("programs.id", self.programs.iter().map(|p| p.id.as_str()))?;
        for program in &self.programs {
            let field = format!("programs.{}", program.id);
            validate_non_empty_string("programs.id", &program.id)?;
            validate_range(&format!("{}.weekly_discount", field), program.weekly_discount, 0, 100)?;
            if program.packages.is_empty() {
                return Err(QuoteError::ConfigValidationError {
                    field,
                    message: "a program needs at least one package".to_string(),
                });
            }
            for package in &program.packages {
                let entries = package.prices.entries();
                if entries.is_empty() {
                    return Err(QuoteError::ConfigValidationError {
                        field: format!("{}.{}.prices", field, package.id),
                        message: "at least one frequency needs a price".to_string(),
                    });
                }
                for (freq, price) in entries {
                    let price_field = format!("{}.{}.prices.{}", field, package.id, freq);
                    if !price.is_finite() {
                        return Err(QuoteError::InvalidConfigValueError {
                            field: price_field,
                            value: price.to_string(),
                            reason: "Price must be a non-negative number".to_string(),
                        });
                    }
                    validate_range(&price_field, price, 0.0, MAX_PRICE_DOLLARS)?;
                }
            }
        }

        // Duplicate keys surface here.
        let catalog = self.build_catalog()?;

        // Every chip label must survive a split of the hidden selections field.
        let separator = self.selection.separator.as_str();
        for item in catalog.items() {
            let label = item.display_label(self.selection.decorate_service);
            if label.contains(separator) || label.trim() != label {
                return Err(QuoteError::InvalidConfigValueError {
                    field: format!("{}.{}.label", item.group, item.id),
                    value: label,
                    reason: format!(
                        "Labels cannot contain the selection separator {:?} or surrounding spaces",
                        separator
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn summary_format(&self) -> SummaryFormat {
        SummaryFormat {
            separator: self.selection.separator,
            decorate_service: self.selection.decorate_service,
        }
    }

    /// Packages, then options, then every program's packages.
    pub fn build_catalog(&self) -> Result<Catalog> {
        let packages = self.packages.iter().map(|p| p.item(ItemGroup::Package));
        let options = self.options.iter().map(|o| o.item(ItemGroup::AddOn));
        let programs = self
            .programs
            .iter()
            .flat_map(|program| program.packages.iter().map(move |p| program.item_for(p)));

        Catalog::from_items(packages.chain(options).chain(programs))
    }

    pub fn build_pricing(&self) -> PricingBoard {
        let mut board = PricingBoard::new();
        for program in &self.programs {
            for package in &program.packages {
                let item = program.item_for(package);
                let schedule = program.schedule(package);
                if let Some(frequency) = item.frequency {
                    board.register(item.key(), schedule, frequency);
                }
            }
        }
        board
    }

    /// A fresh store, seeded from `selection.initial` when it is set.
    pub fn build_store(&self, catalog: &Catalog) -> SelectionStore {
        let mut store = SelectionStore::new(self.summary_format())
            .with_scoped_packages(self.selection.scope_packages_by_service);
        if let Some(initial) = self.selection.initial.as_deref() {
            let seeded = store.seed_from_summary(initial, catalog.items());
            tracing::debug!("Seeded {} selections from the pre-filled value", seeded);
        }
        store
    }

    pub fn binder_settings(&self) -> BinderSettings {
        let defaults = BinderSettings::default();
        BinderSettings {
            labels: self.labels.clone(),
            empty_text: self.selection.empty_text.clone().unwrap_or(defaults.empty_text),
            default_service: self.site.default_service.clone(),
            sending_message: self.form.sending_message.clone().unwrap_or(defaults.sending_message),
            handoff_message: self.form.handoff_message.clone().unwrap_or(defaults.handoff_message),
        }
    }

    pub fn validator(&self) -> FormValidator {
        FormValidator::new(self.form.require_service).with_messages(self.messages.clone())
    }

    pub fn handoff(&self) -> Result<Box<dyn SubmissionHandoff>> {
        let handoff: Box<dyn SubmissionHandoff> = match self.form.handoff {
            HandoffKind::Hosted => Box::new(
                HostedFormHandoff::new(&self.form.hosted_form_url)?
                    .with_params(self.form.params.clone()),
            ),
            HandoffKind::Mailto => {
                let address = self.form.mailto_address.as_deref().unwrap_or_default();
                let mut mailto = MailtoHandoff::new(address);
                if let Some(subject) = self.form.mailto_subject.as_deref() {
                    mailto = mailto.with_subject(subject);
                }
                Box::new(mailto)
            }
            HandoffKind::Native => Box::new(NativePostHandoff),
        };
        Ok(handoff)
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_SITE: &str = r#"
[site]
name = "Prairie Lawn Co."
default_service = "Lawn Mowing"

[[packages]]
id = "basic"
label = "Basic Cut"
service = "Lawn Mowing"
price = "$45/visit"

[[options]]
id = "edging"
label = "Edging & trimming"

[[programs]]
id = "season"
label = "Season Program"
service = "Lawn Care Program"
weekly_discount = 10
default_frequency = "biweekly"

[[programs.packages]]
id = "standard"
label = "Standard"
[programs.packages.prices]
weekly = 119
biweekly = 139
"#;

    #[test]
    fn test_parse_basic_site_config() {
        let config = SiteConfig::from_toml_str(BASIC_SITE).unwrap();

        assert_eq!(config.site.name, "Prairie Lawn Co.");
        assert_eq!(config.form.handoff, HandoffKind::Hosted);
        assert_eq!(config.form.hosted_form_url, DEFAULT_HOSTED_FORM_URL);
        assert!(config.selection.decorate_service);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_program_packages_are_flattened() {
        let config = SiteConfig::from_toml_str(BASIC_SITE).unwrap();
        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.len(), 3);

        let item = catalog
            .find(ItemGroup::ProgramPackage, None, "season-standard")
            .unwrap();
        assert_eq!(item.label, "Season Program: Standard");
        assert_eq!(item.service_tag.as_deref(), Some("Lawn Care Program"));
        assert_eq!(item.frequency, Some(Frequency::Biweekly));
        assert_eq!(item.price.as_deref(), Some("$139"));

        let board = config.build_pricing();
        assert_eq!(board.displayed_price(&item.key()).map(|m| m.to_string()), Some("$139".into()));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("QUOTE_TEST_FORM_URL", "https://forms.example.com/q");

        let toml_content = r#"
[site]
name = "test"

[form]
hosted_form_url = "${QUOTE_TEST_FORM_URL}"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.form.hosted_form_url, "https://forms.example.com/q");

        std::env::remove_var("QUOTE_TEST_FORM_URL");
    }

    #[test]
    fn test_mailto_requires_address() {
        let toml_content = r#"
[site]
name = "test"

[form]
handoff = "mailto"
"#;
        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(QuoteError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_discount_out_of_range() {
        let toml_content = r#"
[site]
name = "test"

[[programs]]
id = "season"
label = "Season"
weekly_discount = 150

[[programs.packages]]
id = "standard"
[programs.packages.prices]
weekly = 100
"#;
        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(QuoteError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_price_ceiling() {
        let toml_content = r#"
[site]
name = "test"

[[programs]]
id = "season"
label = "Season"
weekly_discount = 10
default_frequency = "weekly"

[[programs.packages]]
id = "standard"
[programs.packages.prices]
weekly = 1e17
"#;
        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(QuoteError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_label_containing_separator_rejected() {
        let site = |separator: &str| {
            format!(
                "[site]\nname = \"test\"\n[selection]\nseparator = \"{}\"\n[[options]]\nid = \"edging\"\nlabel = \"Edging, trimming\"\n",
                separator
            )
        };

        let comma = SiteConfig::from_toml_str(&site("comma")).unwrap();
        match comma.validate() {
            Err(QuoteError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "option.edging.label")
            }
            other => panic!("expected a label error, got {:?}", other),
        }

        let semicolon = SiteConfig::from_toml_str(&site("semicolon")).unwrap();
        assert!(semicolon.validate().is_ok());
    }

    #[test]
    fn test_service_decoration_counts_toward_label() {
        let toml_content = r#"
[site]
name = "test"

[[packages]]
id = "basic"
label = "Basic"
service = "Lawn, Garden"
"#;
        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let undecorated = format!("{}\n[selection]\ndecorate_service = false\n", toml_content);
        let config = SiteConfig::from_toml_str(&undecorated).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_options_rejected() {
        let toml_content = r#"
[site]
name = "test"

[[options]]
id = "edging"

[[options]]
id = "edging"
"#;
        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(QuoteError::DuplicateCatalogItem { .. })
        ));
    }

    #[test]
    fn test_initial_selection_seeds_store() {
        let toml_content = format!(
            "{}\n[selection]\ninitial = \"Basic Cut (Lawn Mowing), Edging & trimming\"\n",
            BASIC_SITE
        );
        let config = SiteConfig::from_toml_str(&toml_content).unwrap();
        let catalog = config.build_catalog().unwrap();
        let store = config.build_store(&catalog);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_SITE.as_bytes()).unwrap();

        let config = SiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.packages.len(), 1);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = SiteConfig::from_toml_str("[site\nname = ");
        assert!(matches!(result, Err(QuoteError::ConfigValidationError { .. })));
    }
}
