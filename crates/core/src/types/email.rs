//! Email addresses typed into storefront forms.

use core::fmt;

/// Why a typed address was refused. Messages read as form errors.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    #[error("enter an email address")]
    Empty,
    #[error("must be at most {} characters", Email::MAX_LENGTH)]
    TooLong,
    #[error("must look like name@example.com")]
    Malformed,
}

/// A shopper's email address, trimmed and with the domain lowercased.
///
/// The domain must contain a dot between labels; the local part is kept as
/// typed since some mail servers treat it case-sensitively.
///
/// ```
/// use shopfront_core::Email;
///
/// let email = Email::parse("  Ada.Lovelace@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "Ada.Lovelace@example.com");
/// assert!(Email::parse("ada@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize a typed address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the input is blank, too long, or not of the
    /// form `local@domain.tld`.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EmailError::Empty);
        }
        if input.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        let (local, domain) = input.split_once('@').ok_or(EmailError::Malformed)?;
        let well_formed = !local.is_empty()
            && !domain.contains('@')
            && !input.chars().any(char::is_whitespace)
            && domain.contains('.')
            && domain.split('.').all(|label| !label.is_empty());
        if !well_formed {
            return Err(EmailError::Malformed);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    /// The normalized address when `input` parses, otherwise the trimmed
    /// input, so a rejected form shows what the shopper typed.
    #[must_use]
    pub fn normalize_or_trim(input: &str) -> String {
        Self::parse(input).map_or_else(|_| input.trim().to_string(), String::from)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_lowercased_and_input_trimmed() {
        let email = Email::parse("\tShopper+gift@Mail.Example.ORG \n").unwrap();
        assert_eq!(email.as_str(), "Shopper+gift@mail.example.org");
        assert_eq!(email.to_string(), email.as_str());
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_overlong_input() {
        let local = "a".repeat(250);
        assert_eq!(
            Email::parse(&format!("{local}@example.com")),
            Err(EmailError::TooLong)
        );
    }

    #[test]
    fn test_malformed_inputs() {
        for input in [
            "not-an-email",
            "@example.com",
            "ada@",
            "ada@localhost",
            "ada@@example.com",
            "ada@example..com",
            "ada@.example.com",
            "ada@example.com.",
            "ada lovelace@example.com",
        ] {
            assert_eq!(Email::parse(input), Err(EmailError::Malformed), "{input}");
        }
    }

    #[test]
    fn test_normalize_or_trim() {
        assert_eq!(Email::normalize_or_trim(" ada@EXAMPLE.com"), "ada@example.com");
        assert_eq!(Email::normalize_or_trim(" not-an-email "), "not-an-email");
    }
}
