use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a selectable catalog entry. Decides the cardinality rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemGroup {
    #[serde(rename = "package")]
    Package,
    #[serde(rename = "option")]
    AddOn,
    #[serde(rename = "program-package")]
    ProgramPackage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one entry of the group.
    Single,
    /// At most one entry of the group per service tag.
    ScopedSingle,
    Multi,
}

impl ItemGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemGroup::Package => "package",
            ItemGroup::AddOn => "option",
            ItemGroup::ProgramPackage => "program-package",
        }
    }

    pub fn is_single_select(&self) -> bool {
        !matches!(self, ItemGroup::AddOn)
    }
}

impl fmt::Display for ItemGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemGroup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "package" => Ok(ItemGroup::Package),
            "option" => Ok(ItemGroup::AddOn),
            "program-package" | "program" => Ok(ItemGroup::ProgramPackage),
            other => Err(format!("unknown item group: {}", other)),
        }
    }
}

/// Composite identity of a selection: `{group, scope, id}`.
///
/// The scope is the item's service tag, so the same package id offered under
/// two services stays two distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionKey {
    pub group: ItemGroup,
    pub scope: Option<String>,
    pub id: String,
}

impl SelectionKey {
    pub fn new(group: ItemGroup, scope: Option<&str>, id: &str) -> Self {
        Self {
            group,
            scope: scope.map(str::to_string),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}:{}::{}", self.group, scope, self.id),
            None => write!(f, "{}:{}", self.group, self.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "biweekly")]
    Biweekly,
    #[serde(rename = "every-10-days")]
    EveryTenDays,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::EveryTenDays => "every-10-days",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" | "bi-weekly" => Ok(Frequency::Biweekly),
            "every-10-days" | "every10days" => Ok(Frequency::EveryTenDays),
            other => Err(format!("unknown frequency: {}", other)),
        }
    }
}

/// An entry a visitor can select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub group: ItemGroup,
    pub label: String,
    pub service_tag: Option<String>,
    /// Display metadata, passed through untouched.
    pub price: Option<String>,
    pub frequency: Option<Frequency>,
}

impl CatalogItem {
    pub fn new(group: ItemGroup, id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            group,
            label: label.to_string(),
            service_tag: None,
            price: None,
            frequency: None,
        }
    }

    pub fn with_service(mut self, service: &str) -> Self {
        self.service_tag = Some(service.to_string());
        self
    }

    pub fn key(&self) -> SelectionKey {
        SelectionKey::new(self.group, self.service_tag.as_deref(), &self.id)
    }

    /// Label to show; falls back to the id when the label is blank.
    pub fn label_or_id(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    pub fn display_label(&self, decorate_service: bool) -> String {
        match (&self.service_tag, decorate_service) {
            (Some(service), true) => format!("{} ({})", self.label_or_id(), service),
            _ => self.label_or_id().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    #[default]
    Comma,
    Semicolon,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Comma => ", ",
            Separator::Semicolon => "; ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFormat {
    pub separator: Separator,
    pub decorate_service: bool,
}

impl Default for SummaryFormat {
    fn default() -> Self {
        Self {
            separator: Separator::Comma,
            decorate_service: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub key: SelectionKey,
    pub label: String,
    pub service_tag: Option<String>,
}

/// Derived view of a selection, in chip order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DerivedSummary {
    pub entries: Vec<SummaryEntry>,
    pub joined: String,
}

impl DerivedSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Distinct service tags in first-seen order.
    pub fn distinct_services(&self) -> Vec<&str> {
        let mut services: Vec<&str> = Vec::new();
        for service in self.entries.iter().filter_map(|e| e.service_tag.as_deref()) {
            if !services.contains(&service) {
                services.push(service);
            }
        }
        services
    }

    /// Splits a hidden-field value back into labels.
    pub fn parse_joined(value: &str, separator: Separator) -> Vec<String> {
        value
            .split(separator.as_str())
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Returned by `SelectionStore::toggle` so a view can update only the affected controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionChangeEvent {
    pub removed: Vec<SelectionKey>,
    pub added: Vec<SelectionKey>,
}

impl SelectionChangeEvent {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Phone,
    Email,
    Address,
    Service,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Phone => "phone",
            FormField::Email => "email",
            FormField::Address => "address",
            FormField::Service => "service",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field values read from the quote form at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormValues {
    pub name: String,
    pub phone: String,
    /// `None` when the form has no email input at all.
    pub email: Option<String>,
    pub address: String,
    pub service: String,
    pub details: String,
    pub selections: String,
    pub package: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Info,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Button,
    Card,
    Radio,
}

/// What a catalog control should look like after a re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub selected: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub key: SelectionKey,
    pub label: String,
    pub aria_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HiddenField {
    Selections,
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HandoffOutcome {
    /// The browser's own form POST proceeds.
    NativePost,
    OpenedNewContext { url: String },
    /// Popup was blocked, or the target is a `mailto:` link.
    NavigatedSameTab { url: String },
}

impl HandoffOutcome {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, HandoffOutcome::NativePost)
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            HandoffOutcome::NativePost => None,
            HandoffOutcome::OpenedNewContext { url } | HandoffOutcome::NavigatedSameTab { url } => {
                Some(url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_label_falls_back_to_id() {
        let item = CatalogItem::new(ItemGroup::AddOn, "edging", "  ");
        assert_eq!(item.label_or_id(), "edging");
        assert_eq!(item.display_label(true), "edging");
    }

    #[test]
    fn test_display_label_decorates_service() {
        let item = CatalogItem::new(ItemGroup::Package, "basic", "Basic").with_service("Lawn Mowing");
        assert_eq!(item.display_label(true), "Basic (Lawn Mowing)");
        assert_eq!(item.display_label(false), "Basic");
    }

    #[test]
    fn test_key_display() {
        let scoped = SelectionKey::new(ItemGroup::Package, Some("Snow Removal"), "basic");
        assert_eq!(scoped.to_string(), "package:Snow Removal::basic");
        let plain = SelectionKey::new(ItemGroup::AddOn, None, "edging");
        assert_eq!(plain.to_string(), "option:edging");
    }

    #[test]
    fn test_parse_joined_skips_blanks() {
        let labels = DerivedSummary::parse_joined("Basic, Edging, ", Separator::Comma);
        assert_eq!(labels, vec!["Basic".to_string(), "Edging".to_string()]);
        assert!(DerivedSummary::parse_joined("", Separator::Semicolon).is_empty());
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Weekly".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert_eq!("every-10-days".parse::<Frequency>(), Ok(Frequency::EveryTenDays));
        assert!("monthly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_handoff_outcome_prevents_default() {
        assert!(!HandoffOutcome::NativePost.prevents_default());
        let opened = HandoffOutcome::OpenedNewContext {
            url: "https://tally.so/r/x".to_string(),
        };
        assert!(opened.prevents_default());
        assert_eq!(opened.url(), Some("https://tally.so/r/x"));
    }
}
