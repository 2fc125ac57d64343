use crate::domain::model::{FormValues, HandoffOutcome};
use crate::domain::ports::{Navigator, SubmissionHandoff};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

/// Query parameter names the hosted form expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParamNames {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub service: String,
    pub selections: String,
    pub package: String,
    pub details: String,
    /// Only sent when the form collected an email.
    pub email: String,
}

impl Default for QueryParamNames {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            phone: "Phone".to_string(),
            address: "Address / Area".to_string(),
            service: "Service needed".to_string(),
            selections: "Selected items".to_string(),
            package: "Package choice".to_string(),
            details: "Details".to_string(),
            email: "Email".to_string(),
        }
    }
}

impl QueryParamNames {
    fn pairs<'a>(&'a self, values: &'a FormValues) -> Vec<(&'a str, &'a str)> {
        let mut pairs = vec![
            (self.name.as_str(), values.name.trim()),
            (self.phone.as_str(), values.phone.trim()),
            (self.address.as_str(), values.address.trim()),
            (self.service.as_str(), values.service.as_str()),
            (self.selections.as_str(), values.selections.as_str()),
            (self.package.as_str(), values.package.as_str()),
            (self.details.as_str(), values.details.as_str()),
        ];
        if let Some(email) = values.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            pairs.push((self.email.as_str(), email));
        }
        pairs
    }
}

/// Pre-fills a third-party hosted form through its query string and opens it.
#[derive(Debug, Clone)]
pub struct HostedFormHandoff {
    base_url: Url,
    params: QueryParamNames,
}

impl HostedFormHandoff {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            params: QueryParamNames::default(),
        })
    }

    pub fn with_params(mut self, params: QueryParamNames) -> Self {
        self.params = params;
        self
    }

    /// Our parameters replace any of the same name already on the base URL.
    pub fn build_url(&self, values: &FormValues) -> Url {
        let pairs = self.params.pairs(values);
        let kept: Vec<(String, String)> = self
            .base_url
            .query_pairs()
            .filter(|(k, _)| !pairs.iter().any(|(name, _)| *name == &**k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = self.base_url.clone();
        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in &kept {
                query.append_pair(k, v);
            }
            for (k, v) in pairs {
                query.append_pair(k, v);
            }
        }
        url
    }
}

impl SubmissionHandoff for HostedFormHandoff {
    fn hand_off(
        &self,
        values: &FormValues,
        navigator: &mut dyn Navigator,
    ) -> Result<HandoffOutcome> {
        let url = self.build_url(values).to_string();
        if navigator.open_new_context(&url) {
            tracing::info!("Opened hosted quote form in a new context");
            Ok(HandoffOutcome::OpenedNewContext { url })
        } else {
            tracing::info!("Popup blocked; navigating to hosted quote form");
            navigator.navigate(&url);
            Ok(HandoffOutcome::NavigatedSameTab { url })
        }
    }
}

/// Composes a `mailto:` link carrying the form values.
#[derive(Debug, Clone)]
pub struct MailtoHandoff {
    address: String,
    subject: String,
}

impl MailtoHandoff {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.trim().to_string(),
            subject: "Quote request".to_string(),
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn build_link(&self, values: &FormValues) -> String {
        let mut body = vec![
            format!("Name: {}", values.name.trim()),
            format!("Phone: {}", values.phone.trim()),
        ];
        if let Some(email) = values.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            body.push(format!("Email: {}", email));
        }
        body.push(format!("Address / Area: {}", values.address.trim()));
        body.push(format!("Service: {}", values.service));
        body.push(format!("Selected items: {}", values.selections));
        body.push(format!("Package: {}", values.package));
        body.push(format!("Details: {}", values.details));

        format!(
            "mailto:{}?subject={}&body={}",
            self.address,
            encode_component(&self.subject),
            encode_component(&body.join("\n"))
        )
    }
}

/// Percent-encodes for a mailto header; spaces become `%20`, not `+`.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl SubmissionHandoff for MailtoHandoff {
    fn hand_off(
        &self,
        values: &FormValues,
        navigator: &mut dyn Navigator,
    ) -> Result<HandoffOutcome> {
        let url = self.build_link(values);
        navigator.navigate(&url);
        tracing::info!("Handed quote request to the mail client");
        Ok(HandoffOutcome::NavigatedSameTab { url })
    }
}

/// Lets the browser's own form POST carry the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePostHandoff;

impl SubmissionHandoff for NativePostHandoff {
    fn hand_off(
        &self,
        _values: &FormValues,
        _navigator: &mut dyn Navigator,
    ) -> Result<HandoffOutcome> {
        Ok(HandoffOutcome::NativePost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        block_popups: bool,
        opened: Vec<String>,
        navigated: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
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

    fn sample() -> FormValues {
        FormValues {
            name: " Jane ".to_string(),
            phone: "(306) 555-0100".to_string(),
            address: "123 Main St".to_string(),
            service: "Lawn Mowing".to_string(),
            selections: "Basic (Lawn Mowing), Edging".to_string(),
            package: "Basic".to_string(),
            details: "Back gate is locked".to_string(),
            email: None,
        }
    }

    #[test]
    fn test_hosted_url_carries_all_fields() {
        let handoff = HostedFormHandoff::new("https://tally.so/r/w2xMe1").unwrap();
        let url = handoff.build_url(&sample());
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(pairs[0], ("Name".to_string(), "Jane".to_string()));
        assert!(pairs.contains(&("Address / Area".to_string(), "123 Main St".to_string())));
        assert!(pairs.contains(&(
            "Selected items".to_string(),
            "Basic (Lawn Mowing), Edging".to_string()
        )));
        assert!(!pairs.iter().any(|(k, _)| k == "Email"));
        assert_eq!(url.host_str(), Some("tally.so"));
    }

    #[test]
    fn test_hosted_url_replaces_existing_params() {
        let handoff = HostedFormHandoff::new("https://forms.example.com/q?Name=old&ref=site").unwrap();
        let url = handoff.build_url(&sample());
        let names: Vec<String> = url.query_pairs().map(|(k, v)| format!("{}={}", k, v)).collect();
        assert!(names.contains(&"ref=site".to_string()));
        assert!(names.contains(&"Name=Jane".to_string()));
        assert!(!names.contains(&"Name=old".to_string()));
    }

    #[test]
    fn test_popup_blocked_falls_back_to_navigation() {
        let handoff = HostedFormHandoff::new("https://tally.so/r/w2xMe1").unwrap();
        let mut navigator = RecordingNavigator {
            block_popups: true,
            ..Default::default()
        };
        let outcome = handoff.hand_off(&sample(), &mut navigator).unwrap();
        assert!(matches!(outcome, HandoffOutcome::NavigatedSameTab { .. }));
        assert!(navigator.opened.is_empty());
        assert_eq!(navigator.navigated.len(), 1);
    }

    #[test]
    fn test_mailto_link_encodes_spaces_as_percent20() {
        let link = MailtoHandoff::new("quotes@example.com").build_link(&sample());
        assert!(link.starts_with("mailto:quotes@example.com?subject=Quote%20request&body="));
        assert!(link.contains("Name%3A%20Jane%0APhone"));
        assert!(!link.contains('+'));
    }

    #[test]
    fn test_native_post_does_not_navigate() {
        let mut navigator = RecordingNavigator::default();
        let outcome = NativePostHandoff.hand_off(&sample(), &mut navigator).unwrap();
        assert_eq!(outcome, HandoffOutcome::NativePost);
        assert!(navigator.navigated.is_empty());
    }
}
