use crate::core::catalog::{item_from_attributes, Catalog};
use crate::core::pricing::{Money, PricingBoard};
use crate::core::selection::SelectionStore;
use crate::core::validation::FormValidator;
use crate::domain::model::{
    Chip, ControlKind, ControlState, DerivedSummary, FormField, FormValues, Frequency,
    HandoffOutcome, HiddenField, ItemGroup, SelectionChangeEvent, SelectionKey, StatusKind,
};
use crate::domain::ports::{Navigator, QuoteView, SubmissionHandoff};
use crate::utils::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlLabels {
    pub package_idle: String,
    pub package_selected: String,
    pub option_idle: String,
    pub option_selected: String,
    pub program_idle: String,
    pub program_selected: String,
}

impl Default for ControlLabels {
    fn default() -> Self {
        Self {
            package_idle: "Select package".to_string(),
            package_selected: "Selected".to_string(),
            option_idle: "Select".to_string(),
            option_selected: "Selected".to_string(),
            program_idle: "Choose this package".to_string(),
            program_selected: "Selected".to_string(),
        }
    }
}

impl ControlLabels {
    pub fn for_state(&self, group: ItemGroup, selected: bool) -> &str {
        match (group, selected) {
            (ItemGroup::Package, false) => &self.package_idle,
            (ItemGroup::Package, true) => &self.package_selected,
            (ItemGroup::AddOn, false) => &self.option_idle,
            (ItemGroup::AddOn, true) => &self.option_selected,
            (ItemGroup::ProgramPackage, false) => &self.program_idle,
            (ItemGroup::ProgramPackage, true) => &self.program_selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderSettings {
    pub labels: ControlLabels,
    pub empty_text: String,
    /// Service selector value on load and after clearing.
    pub default_service: Option<String>,
    pub sending_message: String,
    pub handoff_message: String,
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            labels: ControlLabels::default(),
            empty_text: "Tap select above to add items to your quote.".to_string(),
            default_service: None,
            sending_message: "Sending your request…".to_string(),
            handoff_message: "Opening the quote form to finish your request…".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the default submit action must be cancelled.
    Rejected { field: FormField, message: String },
    HandedOff(HandoffOutcome),
    HandoffFailed { message: String },
}

impl SubmitOutcome {
    pub fn prevents_default(&self) -> bool {
        match self {
            SubmitOutcome::HandedOff(outcome) => outcome.prevents_default(),
            SubmitOutcome::Rejected { .. } | SubmitOutcome::HandoffFailed { .. } => true,
        }
    }
}

/// Bridges control events to the [`SelectionStore`] and renders the result back
/// onto a [`QuoteView`]. Every handler finishes its re-render before returning.
pub struct QuoteFormBinder<V: QuoteView> {
    store: SelectionStore,
    catalog: Catalog,
    controls: Vec<(SelectionKey, ControlKind)>,
    pricing: PricingBoard,
    validator: FormValidator,
    settings: BinderSettings,
    view: V,
}

impl<V: QuoteView> QuoteFormBinder<V> {
    pub fn new(mut store: SelectionStore, catalog: Catalog, view: V, settings: BinderSettings) -> Self {
        store.prune(|key| catalog.contains(key));

        let mut binder = Self {
            store,
            catalog,
            controls: Vec::new(),
            pricing: PricingBoard::new(),
            validator: FormValidator::default(),
            settings,
            view,
        };
        if let Some(service) = binder.settings.default_service.clone() {
            binder.view.set_service(&service);
        }
        binder.render_summary();
        binder
    }

    pub fn with_validator(mut self, validator: FormValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingBoard) -> Self {
        self.pricing = pricing;
        let keys: Vec<SelectionKey> = self.controls.iter().map(|(key, _)| key.clone()).collect();
        for key in keys {
            self.render_price(&key);
        }
        self
    }

    /// Registers a control for an item. Returns `false` (and binds nothing) when the
    /// item is not in the catalog.
    pub fn bind_control(&mut self, key: SelectionKey, kind: ControlKind) -> bool {
        if !self.catalog.contains(&key) {
            tracing::warn!("Control for {} has no catalog entry; not bound", key);
            return false;
        }
        if !self.controls.iter().any(|(k, c)| *k == key && *c == kind) {
            self.controls.push((key.clone(), kind));
        }
        self.render_control(&key);
        self.render_price(&key);
        true
    }

    /// Binds a control from its data attributes, registering the item first when the
    /// catalog does not have it yet. `None` when the attributes name no item.
    pub fn bind_from_attributes(
        &mut self,
        attrs: &HashMap<String, String>,
        default_group: ItemGroup,
        kind: ControlKind,
    ) -> Option<SelectionKey> {
        let item = item_from_attributes(attrs, default_group)?;
        let key = item.key();
        if !self.catalog.contains(&key) {
            if let Err(err) = self.catalog.register(item) {
                tracing::warn!("Could not register control item: {}", err);
                return None;
            }
            tracing::debug!("Registered {} from control attributes", key);
        }
        self.bind_control(key.clone(), kind);
        Some(key)
    }

    /// Binds a control for every catalog item.
    pub fn bind_all(&mut self, kind: ControlKind) {
        let keys: Vec<SelectionKey> = self.catalog.items().iter().map(|item| item.key()).collect();
        for key in keys {
            self.bind_control(key, kind);
        }
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pricing(&self) -> &PricingBoard {
        &self.pricing
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn snapshot(&self) -> DerivedSummary {
        self.store.snapshot()
    }

    /// Click on a button or card. Radio controls keep their slot filled.
    pub fn on_click(&mut self, key: &SelectionKey) -> Option<SelectionChangeEvent> {
        let item = match self.catalog.get(key) {
            Some(item) => item.clone(),
            None => {
                tracing::debug!("Ignoring click on stale control {}", key);
                return None;
            }
        };

        let is_radio = self
            .controls
            .iter()
            .any(|(k, kind)| k == key && *kind == ControlKind::Radio);
        let event = if is_radio {
            self.store.set_single_select_slot(item.group, &item)
        } else {
            self.store.toggle(&item)
        };
        self.render_change(&event);
        Some(event)
    }

    /// `change` on a radio input.
    pub fn on_change(&mut self, key: &SelectionKey) -> Option<SelectionChangeEvent> {
        let item = match self.catalog.get(key) {
            Some(item) => item.clone(),
            None => {
                tracing::debug!("Ignoring change on stale control {}", key);
                return None;
            }
        };
        let event = self.store.set_single_select_slot(item.group, &item);
        self.render_change(&event);
        Some(event)
    }

    /// The "×" on a chip.
    pub fn on_chip_removed(&mut self, key: &SelectionKey) -> bool {
        if !self.store.remove(key) {
            return false;
        }
        tracing::debug!("Removed {} from its chip", key);
        self.render_control(key);
        self.render_summary();
        true
    }

    pub fn on_clear_selections(&mut self) {
        self.reset_selections();
    }

    /// Changes the visit frequency of a priced item and re-renders its price.
    /// The selection is left as it is.
    pub fn on_frequency_change(&mut self, key: &SelectionKey, frequency: Frequency) -> Option<Money> {
        let price = self.pricing.set_frequency(key, frequency)?;
        tracing::debug!("{} now priced at {} ({})", key, price, frequency);
        self.view.set_price(key, &price.to_string());
        Some(price)
    }

    /// Swaps in a re-rendered catalog, pruning selections and bindings that no
    /// longer have an item.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        let catalog = &self.catalog;
        let dropped = self.store.prune(|key| catalog.contains(key));
        self.controls.retain(|(key, _)| catalog.contains(key));
        self.pricing.retain(|key| catalog.contains(key));
        if !dropped.is_empty() {
            tracing::info!("Catalog changed; dropped {} stale selections", dropped.len());
        }
        self.render_all_controls();
        self.render_summary();
    }

    /// Validates the form and, when it passes, hands it to `handoff`.
    ///
    /// The `selections` and `package` values are taken from the store, not from
    /// `values`, so the handoff always sees what the chips show.
    pub fn on_submit(
        &mut self,
        values: &FormValues,
        handoff: &dyn SubmissionHandoff,
        navigator: &mut dyn Navigator,
    ) -> SubmitOutcome {
        let mut values = values.clone();
        values.selections = self.store.snapshot().joined;
        values.package = self.package_value();

        if let Err(err) = self.validator.validate(&values) {
            self.view.set_status(&err.to_string(), StatusKind::Error);
            return match err {
                QuoteError::MissingRequiredField { field, message }
                | QuoteError::InvalidFormat { field, message } => {
                    tracing::info!("Quote form rejected at {}", field);
                    SubmitOutcome::Rejected { field, message }
                }
                other => SubmitOutcome::HandoffFailed {
                    message: other.to_string(),
                },
            };
        }

        let sending = self.settings.sending_message.clone();
        self.view.set_status(&sending, StatusKind::Info);

        match handoff.hand_off(&values, navigator) {
            Ok(outcome) => {
                if outcome.prevents_default() {
                    self.view.reset_form();
                    self.reset_selections();
                    let done = self.settings.handoff_message.clone();
                    self.view.set_status(&done, StatusKind::Success);
                }
                SubmitOutcome::HandedOff(outcome)
            }
            Err(err) => {
                tracing::error!("Quote handoff failed: {}", err);
                let message = err.user_friendly_message();
                self.view.set_status(&message, StatusKind::Error);
                SubmitOutcome::HandoffFailed { message }
            }
        }
    }

    fn reset_selections(&mut self) {
        self.store.clear();
        self.render_all_controls();
        let service = self.settings.default_service.clone().unwrap_or_default();
        self.view.set_service(&service);
        self.render_summary();
    }

    fn package_value(&self) -> String {
        self.store
            .items()
            .find(|item| matches!(item.group, ItemGroup::Package | ItemGroup::ProgramPackage))
            .map(|item| item.label_or_id().to_string())
            .unwrap_or_default()
    }

    fn render_change(&mut self, event: &SelectionChangeEvent) {
        for key in event.removed.iter().chain(event.added.iter()) {
            self.render_control(key);
        }
        self.render_summary();
    }

    fn render_all_controls(&mut self) {
        let keys: Vec<SelectionKey> = self.controls.iter().map(|(key, _)| key.clone()).collect();
        for key in keys {
            self.render_control(&key);
        }
    }

    fn render_control(&mut self, key: &SelectionKey) {
        let selected = self.store.contains(key);
        let state = ControlState {
            selected,
            label: self.settings.labels.for_state(key.group, selected).to_string(),
        };
        for (bound, kind) in self.controls.iter().filter(|(k, _)| k == key) {
            self.view.set_control_state(bound, *kind, &state);
        }
    }

    fn render_price(&mut self, key: &SelectionKey) {
        if let Some(price) = self.pricing.displayed_price(key) {
            self.view.set_price(key, &price.to_string());
        }
    }

    fn render_summary(&mut self) {
        let summary = self.store.snapshot();
        let chips: Vec<Chip> = summary
            .entries
            .iter()
            .map(|entry| Chip {
                key: entry.key.clone(),
                label: entry.label.clone(),
                aria_label: format!("Remove {} from quote", entry.label),
            })
            .collect();

        self.view.render_chips(&chips, &self.settings.empty_text);
        self.view.set_hidden_field(HiddenField::Selections, &summary.joined);
        let package = self.package_value();
        self.view.set_hidden_field(HiddenField::Package, &package);

        // Several services: leave the selector alone.
        if let [service] = summary.distinct_services().as_slice() {
            self.view.set_service(service);
        }
    }
}
