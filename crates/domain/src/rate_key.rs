//! Namespaced counter keys.

use std::fmt::{Display, Formatter};

use pawguard_core::{AppError, AppResult, NonEmptyString};

use crate::{ClientIdentity, EmailAddress};

/// Namespace reserved for password-reset counters.
const PASSWORD_RESET_NAMESPACE: &str = "reset";

/// Constant prefix that keeps one limiter's keys apart from every other
/// counter living in the same store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyNamespace(String);

impl KeyNamespace {
    /// Creates a namespace for general-traffic counters.
    ///
    /// The namespace must not contain `:` or whitespace, and must not collide
    /// with the reserved password-reset namespace.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        let raw = value.as_str();

        if raw.contains(':') || raw.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "rate limit key namespace '{raw}' must not contain ':' or whitespace"
            )));
        }

        if raw == PASSWORD_RESET_NAMESPACE {
            return Err(AppError::Validation(format!(
                "rate limit key namespace '{PASSWORD_RESET_NAMESPACE}' is reserved"
            )));
        }

        Ok(Self(value.into()))
    }

    /// Namespace used by the password-reset limiter.
    #[must_use]
    pub fn password_reset() -> Self {
        Self(PASSWORD_RESET_NAMESPACE.to_owned())
    }

    /// Returns the namespace string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Key identifying one throttled entity: `namespace:subject`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey(String);

impl RateKey {
    /// Key for general traffic from one client identity.
    #[must_use]
    pub fn for_client(namespace: &KeyNamespace, identity: &ClientIdentity) -> Self {
        Self(format!("{}:{identity}", namespace.as_str()))
    }

    /// Key for password-reset requests targeting one email address.
    #[must_use]
    pub fn for_password_reset(email: &EmailAddress) -> Self {
        Self(format!("{PASSWORD_RESET_NAMESPACE}:{}", email.as_str()))
    }

    /// Derives the key of one fixed-size bucket of this key's window.
    #[must_use]
    pub fn bucket(&self, bucket_index: u64) -> Self {
        Self(format!("{}:{bucket_index}", self.0))
    }

    /// Returns the full key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RateKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}
