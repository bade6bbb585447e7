//! Email addresses used as password-reset rate limit subjects.

use pawguard_core::{AppError, AppResult};

/// Maximum accepted address length (RFC 5321 path limit).
const EMAIL_MAX_LENGTH: usize = 254;

/// Validated, canonical (trimmed and lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Only the minimal `local@domain.tld` shape is enforced: one `@`, a
    /// non-empty local part, and a domain with a dot that is neither its
    /// first nor its last character. Whitespace is rejected anywhere.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let canonical = value.as_ref().trim().to_lowercase();

        if canonical.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if canonical.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "email address must not exceed {EMAIL_MAX_LENGTH} characters"
            )));
        }

        if canonical.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "email address must not contain whitespace".to_owned(),
            ));
        }

        let Some((local, domain)) = canonical.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain an '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must have the form local@domain.tld".to_owned(),
            ));
        }

        let last_index = domain.len().saturating_sub(1);
        let has_inner_dot = domain
            .char_indices()
            .any(|(index, character)| character == '.' && index > 0 && index < last_index);
        if !has_inner_dot {
            return Err(AppError::Validation(
                "email domain must contain a '.' between labels".to_owned(),
            ));
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::EmailAddress;

    #[test]
    fn valid_email_is_canonicalised() {
        let email = EmailAddress::new("  USER@Example.COM ");
        assert!(email.is_ok());
        assert_eq!(
            email.unwrap_or_else(|_| panic!("test")).as_str(),
            "user@example.com"
        );
    }

    #[test]
    fn mixed_case_addresses_collapse() {
        let upper = EmailAddress::new("A@X.com");
        let lower = EmailAddress::new("a@x.com");
        assert!(upper.is_ok() && lower.is_ok());
        assert_eq!(
            upper.unwrap_or_else(|_| unreachable!()),
            lower.unwrap_or_else(|_| unreachable!())
        );
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(EmailAddress::new("noatsign.example.com").is_err());
    }

    #[test]
    fn email_with_two_ats_is_rejected() {
        assert!(EmailAddress::new("a@b@example.com").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@localhost").is_err());
        assert!(EmailAddress::new("user@example.").is_err());
        assert!(EmailAddress::new("user@.com").is_err());
    }

    #[test]
    fn email_with_inner_whitespace_is_rejected() {
        assert!(EmailAddress::new("first last@example.com").is_err());
    }

    #[test]
    fn empty_email_is_rejected() {
        assert!(EmailAddress::new("   ").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
    }
}
