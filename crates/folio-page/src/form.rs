#![forbid(unsafe_code)]

//! Contact form validation and mail composition.
//!
//! The form never transmits anything. A valid submission is turned into a
//! `mailto:` link for the visitor's mail client, with a plain-text copy put on
//! the clipboard in case no mail client is configured.

use std::collections::BTreeMap;

use folio_core::{HostCommand, MessageKind, PageHost};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::config::{FormFieldNames, PageConfig};

/// Characters `encodeURIComponent` leaves alone, removed from the
/// escape-everything set.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const SUCCESS_TEXT: &str =
    "Thanks! Your mail app should open with the message ready to send.";

/// `local@domain.tld`: exactly one `@`, no whitespace, and a dot in the
/// domain with text on both sides of the last one.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Trimmed contact form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub budget: String,
    pub details: String,
}

impl ContactFields {
    /// Read the named fields out of a submitted form. Absent fields are empty.
    #[must_use]
    pub fn from_submission(fields: &BTreeMap<String, String>, names: &FormFieldNames) -> Self {
        let get = |key: &str| {
            fields
                .get(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        Self {
            name: get(&names.name),
            email: get(&names.email),
            budget: get(&names.budget),
            details: get(&names.details),
        }
    }

    /// First rule the fields break, checked in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.details.is_empty() {
            return Err(ValidationError::MissingDetails);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    MissingName,
    MissingEmail,
    InvalidEmail,
    MissingDetails,
}

impl ValidationError {
    /// Text shown to the visitor.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingName => "Please enter your name.",
            Self::MissingEmail => "Please enter your email address.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::MissingDetails => "Please tell me a little about your project.",
        }
    }
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

/// A composed message, ready to hand to the mail client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    /// Compose from already-validated fields.
    #[must_use]
    pub fn compose(fields: &ContactFields, config: &PageConfig) -> Self {
        let budget = if fields.budget.is_empty() {
            config.budget_fallback.as_str()
        } else {
            fields.budget.as_str()
        };
        Self {
            to: config.contact_email.clone(),
            subject: format!("{} {}", config.subject_prefix, fields.name),
            body: format!(
                "Name: {}\nEmail: {}\nBudget: {}\n\nProject details:\n{}",
                fields.name, fields.email, budget, fields.details
            ),
        }
    }

    /// The `mailto:` link with subject and body percent-encoded.
    #[must_use]
    pub fn href(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.to,
            utf8_percent_encode(&self.subject, URI_COMPONENT),
            utf8_percent_encode(&self.body, URI_COMPONENT),
        )
    }

    /// Plain-text rendering for the clipboard.
    #[must_use]
    pub fn clipboard_text(&self) -> String {
        format!(
            "To: {}\nSubject: {}\n\n{}",
            self.to, self.subject, self.body
        )
    }
}

/// What a submission led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(ValidationError),
    Sent(MailDraft),
}

/// Validate a submission and either show the error or hand the draft to the
/// host: clipboard copy first, then the mail link, then the confirmation.
pub fn submit<H: PageHost + ?Sized>(
    fields: &BTreeMap<String, String>,
    config: &PageConfig,
    host: &mut H,
) -> SubmitOutcome {
    host.dispatch(HostCommand::ClearFormMessage);

    let contact = ContactFields::from_submission(fields, &config.fields);
    if let Err(err) = contact.validate() {
        tracing::debug!(error = ?err, "contact form rejected");
        host.dispatch(HostCommand::ShowFormMessage {
            kind: MessageKind::Error,
            text: err.message().to_string(),
        });
        return SubmitOutcome::Rejected(err);
    }

    let draft = MailDraft::compose(&contact, config);
    if let Err(err) = host.apply(HostCommand::CopyToClipboard {
        text: draft.clipboard_text(),
    }) {
        tracing::debug!(error = %err, "clipboard copy failed; continuing with mail link");
    }
    host.dispatch(HostCommand::OpenMail { href: draft.href() });
    host.dispatch(HostCommand::ShowFormMessage {
        kind: MessageKind::Success,
        text: SUCCESS_TEXT.to_string(),
    });
    host.dispatch(HostCommand::ResetForm);
    tracing::info!(to = %draft.to, "contact mail composed");
    SubmitOutcome::Sent(draft)
}
