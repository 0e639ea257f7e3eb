//! Relay types: submissions, safe text and the JSON response body.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use super::error::InputError;
use super::sanitize::sanitize_value;

/// Discriminator selecting the notification template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormType {
    /// Order form with selected modules and a total.
    Lead,
    /// Footer consultation booking form.
    Consultation,
}

impl FormType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Consultation => "consultation",
        }
    }
}

impl FromStr for FormType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(Self::Lead),
            "consultation" => Ok(Self::Consultation),
            other => Err(InputError::UnknownType(other.to_string())),
        }
    }
}

/// Text that went through sanitization: trimmed, HTML-escaped, bounded.
///
/// Only values that went through `relay::sanitize` become `SafeText`, so
/// anything of this type can be interpolated into an HTML notification as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeText(String);

impl SafeText {
    pub(crate) const fn from_sanitized(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SafeText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub form_type: FormType,
    pub contact: Option<SafeText>,
    pub email: Option<SafeText>,
    pub message: Option<SafeText>,
    pub name: Option<SafeText>,
    pub modules: Vec<SafeText>,
    pub total: Option<SafeText>,
}

impl Submission {
    /// Sanitize a raw request body and build a submission from it.
    pub fn from_json(raw: Value) -> Result<Self, InputError> {
        Self::from_sanitized(&sanitize_value(raw))
    }

    /// Build a submission from an already sanitized JSON value.
    ///
    /// Blank strings count as absent. Non-string module entries are skipped;
    /// a numeric `total` is rendered in decimal form.
    pub(crate) fn from_sanitized(value: &Value) -> Result<Self, InputError> {
        let object = value.as_object().ok_or(InputError::MalformedBody)?;

        let form_type = match object.get("type") {
            None | Some(Value::Null) => return Err(InputError::MissingType),
            Some(Value::String(s)) if s.is_empty() => return Err(InputError::MissingType),
            Some(Value::String(s)) => s.parse()?,
            Some(other) => return Err(InputError::UnknownType(other.to_string())),
        };

        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(|s| SafeText::from_sanitized(s.to_string()))
        };

        let modules = object
            .get("modules")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(|s| SafeText::from_sanitized(s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let total = match object.get("total") {
            Some(Value::Number(n)) => Some(SafeText::from_sanitized(n.to_string())),
            _ => text("total"),
        };

        Ok(Self {
            form_type,
            contact: text("contact"),
            email: text("email"),
            message: text("message"),
            name: text("name"),
            modules,
            total,
        })
    }
}

/// JSON body returned by the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
