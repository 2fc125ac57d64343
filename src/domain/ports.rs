use crate::domain::model::{
    Chip, ControlKind, ControlState, FormValues, HandoffOutcome, HiddenField, SelectionKey,
    StatusKind,
};
use crate::utils::error::Result;

/// Rendering target the binder writes to. A browser DOM is one implementation;
/// `adapters::headless::HeadlessPage` is another.
pub trait QuoteView {
    fn set_control_state(&mut self, key: &SelectionKey, kind: ControlKind, state: &ControlState);
    /// Replaces the whole chip list. An empty slice shows `empty_text` instead.
    fn render_chips(&mut self, chips: &[Chip], empty_text: &str);
    fn set_hidden_field(&mut self, field: HiddenField, value: &str);
    fn set_service(&mut self, value: &str);
    fn set_price(&mut self, key: &SelectionKey, text: &str);
    /// Last message wins.
    fn set_status(&mut self, message: &str, kind: StatusKind);
    /// Clears the visible inputs the way `form.reset()` does.
    fn reset_form(&mut self);
}

pub trait Navigator {
    /// Returns `false` when the new context could not be created (popup blocked).
    fn open_new_context(&mut self, url: &str) -> bool;
    fn navigate(&mut self, url: &str);
}

/// External collaborator that takes over once the form validates.
pub trait SubmissionHandoff {
    fn hand_off(&self, values: &FormValues, navigator: &mut dyn Navigator)
        -> Result<HandoffOutcome>;
}
