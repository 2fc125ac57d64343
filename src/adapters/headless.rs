use crate::domain::model::{
    Chip, ControlKind, ControlState, FormValues, HiddenField, SelectionKey, StatusKind,
};
use crate::domain::ports::{Navigator, QuoteView};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedControl {
    pub kind: ControlKind,
    pub selected: bool,
    pub label: String,
    /// `aria-pressed` for buttons and cards, `checked` for radios.
    pub pressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
}

/// In-memory page: records what a DOM would show. Used by the CLI and tests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HeadlessPage {
    controls: BTreeMap<String, Vec<RenderedControl>>,
    chips: Vec<Chip>,
    empty_text: Option<String>,
    selections: String,
    package: String,
    service: String,
    prices: BTreeMap<String, String>,
    status: Option<Status>,
    form_resets: usize,
    opened: Vec<String>,
    navigated: Vec<String>,
    #[serde(skip)]
    block_popups: bool,
}

impl HeadlessPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `open_new_context` fail, as a popup blocker would.
    pub fn blocking_popups(mut self) -> Self {
        self.block_popups = true;
        self
    }

    pub fn control(&self, key: &SelectionKey) -> Option<&RenderedControl> {
        self.controls.get(&key.to_string()).and_then(|c| c.first())
    }

    pub fn control_of_kind(&self, key: &SelectionKey, kind: ControlKind) -> Option<&RenderedControl> {
        self.controls
            .get(&key.to_string())
            .and_then(|controls| controls.iter().find(|c| c.kind == kind))
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn chip_labels(&self) -> Vec<&str> {
        self.chips.iter().map(|c| c.label.as_str()).collect()
    }

    /// Placeholder shown in place of an empty chip list.
    pub fn empty_text(&self) -> Option<&str> {
        self.empty_text.as_deref()
    }

    pub fn hidden_field(&self, field: HiddenField) -> &str {
        match field {
            HiddenField::Selections => &self.selections,
            HiddenField::Package => &self.package,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn price(&self, key: &SelectionKey) -> Option<&str> {
        self.prices.get(&key.to_string()).map(String::as_str)
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn form_resets(&self) -> usize {
        self.form_resets
    }

    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    pub fn navigated(&self) -> &[String] {
        &self.navigated
    }

    /// What `FormData` would read: the typed inputs plus the page's hidden fields
    /// and service selector. A blank typed service falls back to the selector.
    pub fn form_values(&self, typed: &FormValues) -> FormValues {
        let mut values = typed.clone();
        values.selections = self.selections.clone();
        values.package = self.package.clone();
        if values.service.trim().is_empty() {
            values.service = self.service.clone();
        }
        values
    }
}

impl QuoteView for HeadlessPage {
    fn set_control_state(&mut self, key: &SelectionKey, kind: ControlKind, state: &ControlState) {
        let rendered = RenderedControl {
            kind,
            selected: state.selected,
            label: state.label.clone(),
            pressed: state.selected,
        };
        let controls = self.controls.entry(key.to_string()).or_default();
        match controls.iter_mut().find(|c| c.kind == kind) {
            Some(existing) => *existing = rendered,
            None => controls.push(rendered),
        }
    }

    fn render_chips(&mut self, chips: &[Chip], empty_text: &str) {
        self.chips = chips.to_vec();
        self.empty_text = if chips.is_empty() {
            Some(empty_text.to_string())
        } else {
            None
        };
    }

    fn set_hidden_field(&mut self, field: HiddenField, value: &str) {
        match field {
            HiddenField::Selections => self.selections = value.to_string(),
            HiddenField::Package => self.package = value.to_string(),
        }
    }

    fn set_service(&mut self, value: &str) {
        self.service = value.to_string();
    }

    fn set_price(&mut self, key: &SelectionKey, text: &str) {
        self.prices.insert(key.to_string(), text.to_string());
    }

    fn set_status(&mut self, message: &str, kind: StatusKind) {
        self.status = Some(Status {
            message: message.to_string(),
            kind,
        });
    }

    fn reset_form(&mut self) {
        self.form_resets += 1;
    }
}

impl Navigator for HeadlessPage {
    fn open_new_context(&mut self, url: &str) -> bool {
        if self.block_popups {
            return false;
        }
        self.opened.push(url.to_string());
        true
    }

    fn navigate(&mut self, url: &str) {
        self.navigated.push(url.to_string());
    }
}
