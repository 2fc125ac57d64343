use crate::domain::model::{FormField, FormValues};
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{is_email_shaped, is_phone_shaped};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationMessages {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub service: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            name: "Please include your name.".to_string(),
            phone: "Add a reachable phone number (digits only is fine).".to_string(),
            email: "Double-check your email address so we can reply.".to_string(),
            address: "Let us know your neighborhood so we can quote quickly.".to_string(),
            service: "Choose the service you need.".to_string(),
        }
    }
}

/// Submit-time checks, run in the order name, phone, email, address, service.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    require_service: bool,
    messages: ValidationMessages,
}

impl FormValidator {
    pub fn new(require_service: bool) -> Self {
        Self {
            require_service,
            messages: ValidationMessages::default(),
        }
    }

    pub fn with_messages(mut self, messages: ValidationMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn messages(&self) -> &ValidationMessages {
        &self.messages
    }

    /// Stops at the first failing rule.
    pub fn validate(&self, values: &FormValues) -> Result<()> {
        match self.check_all(values).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every failing rule, in check order.
    pub fn check_all(&self, values: &FormValues) -> Vec<QuoteError> {
        let mut failures = Vec::new();

        if values.name.trim().is_empty() {
            failures.push(self.missing(FormField::Name, &self.messages.name));
        }

        if !is_phone_shaped(values.phone.trim()) {
            let err = if values.phone.trim().is_empty() {
                self.missing(FormField::Phone, &self.messages.phone)
            } else {
                self.invalid(FormField::Phone, &self.messages.phone)
            };
            failures.push(err);
        }

        if let Some(email) = values.email.as_deref().map(str::trim) {
            if !email.is_empty() && !is_email_shaped(email) {
                failures.push(self.invalid(FormField::Email, &self.messages.email));
            }
        }

        if values.address.trim().is_empty() {
            failures.push(self.missing(FormField::Address, &self.messages.address));
        }

        if self.require_service && values.service.trim().is_empty() {
            failures.push(self.missing(FormField::Service, &self.messages.service));
        }

        failures
    }

    fn missing(&self, field: FormField, message: &str) -> QuoteError {
        QuoteError::MissingRequiredField {
            field,
            message: message.to_string(),
        }
    }

    fn invalid(&self, field: FormField, message: &str) -> QuoteError {
        QuoteError::InvalidFormat {
            field,
            message: message.to_string(),
        }
    }
}
