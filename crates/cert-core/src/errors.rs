//! Structured error types shared across cert crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload carried by every [`CertError`]: a stable code, a message, the
/// parameters in force when the failure happened and an optional hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case code, stable across releases.
    pub code: String,
    /// Diagnostic message.
    pub message: String,
    /// Rendered values of the relevant parameters, keyed by name.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// What the caller can change to make the call succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `value` (rendered with `Display`) under `key`.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets the remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the cert engine.
///
/// No variant is ever used to report an approximate answer: every failure
/// means the requested guarantee could not be certified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CertError {
    /// A parameter search exhausted its limit without meeting the tolerance.
    #[error("search error: {0}")]
    Search(ErrorInfo),
    /// An estimator, callback or intermediate produced a non-finite value.
    #[error("non-finite error: {0}")]
    NonFinite(ErrorInfo),
    /// Internal counters overflowed; the result could not be trusted.
    #[error("internal error: {0}")]
    Internal(ErrorInfo),
    /// The user supplied evaluation callback reported failure.
    #[error("callback error: {0}")]
    Callback(ErrorInfo),
    /// Invalid options or inputs.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CertError {
    /// Payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CertError::Search(info)
            | CertError::NonFinite(info)
            | CertError::Internal(info)
            | CertError::Callback(info)
            | CertError::Config(info)
            | CertError::Serde(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            CertError::Search(info)
            | CertError::NonFinite(info)
            | CertError::Internal(info)
            | CertError::Callback(info)
            | CertError::Config(info)
            | CertError::Serde(info) => info,
        }
    }

    /// Adds context to an error on its way up, keeping family and code.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.info_mut()
            .context
            .insert(key.into(), value.to_string());
        self
    }

    /// Stable code of the error.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Returns true when retrying at a higher working precision may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CertError::Search(_) | CertError::NonFinite(_))
    }
}
