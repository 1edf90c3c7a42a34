#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every field has a default, so an empty JSON object (or no configuration at
//! all) yields a working page. Environment variables override individual
//! fields for the native harness:
//!
//! | Variable | Field |
//! |---|---|
//! | `FOLIO_CONTACT_EMAIL` | [`PageConfig::contact_email`] |
//! | `FOLIO_LAZY_MARGIN_PX` | [`PageConfig::lazy_margin_px`] |

use std::env;

use folio_viewer::EmbedConfig;
use serde::{Deserialize, Serialize};

use crate::form::is_valid_email;

pub const ENV_CONTACT_EMAIL: &str = "FOLIO_CONTACT_EMAIL";
pub const ENV_LAZY_MARGIN_PX: &str = "FOLIO_LAZY_MARGIN_PX";

/// Names of the contact form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFieldNames {
    pub name: String,
    pub email: String,
    pub budget: String,
    pub details: String,
}

impl Default for FormFieldNames {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            email: "email".to_string(),
            budget: "budget".to_string(),
            details: "details".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Recipient of the composed mail.
    pub contact_email: String,
    /// Mail subject is `"{subject_prefix} {name}"`.
    pub subject_prefix: String,
    pub fields: FormFieldNames,
    /// Shown in the mail body when the budget field is blank.
    pub budget_fallback: String,
    /// Distance from the viewport edge at which deferred images load.
    pub lazy_margin_px: u32,
    pub embeds: EmbedConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            contact_email: "hello@example.com".to_string(),
            subject_prefix: "Project inquiry from".to_string(),
            fields: FormFieldNames::default(),
            budget_fallback: "Not specified".to_string(),
            lazy_margin_px: 200,
            embeds: EmbedConfig::default(),
        }
    }
}

impl PageConfig {
    /// Parse and validate a JSON configuration object.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(email) = lookup(ENV_CONTACT_EMAIL) {
            let email = email.trim();
            if !email.is_empty() {
                self.contact_email = email.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_LAZY_MARGIN_PX) {
            self.lazy_margin_px = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_LAZY_MARGIN_PX,
                value: raw.clone(),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_email(&self.contact_email) {
            return Err(ConfigError::Invalid {
                field: "contact_email",
                reason: format!("not an email address: {:?}", self.contact_email),
            });
        }
        let f = &self.fields;
        for (field, value) in [
            ("fields.name", &f.name),
            ("fields.email", &f.email),
            ("fields.budget", &f.budget),
            ("fields.details", &f.details),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "field name is empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Malformed JSON or a field of the wrong type.
    Parse(String),
    /// An environment override could not be parsed.
    InvalidEnv { var: &'static str, value: String },
    Invalid { field: &'static str, reason: String },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::InvalidEnv { var, value } => write!(f, "invalid value for {var}: {value:?}"),
            Self::Invalid { field, reason } => write!(f, "invalid config field {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
