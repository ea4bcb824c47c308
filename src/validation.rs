//! Client-side form validation.
//!
//! Failing checks block submission and are rendered inline next to the
//! offending field. Nothing here talks to the backend.

use thiserror::Error;

/// Minimum username length in characters.
pub const USERNAME_MIN: usize = 3;

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 10;

/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 8;

/// Maximum password length in characters.
pub const PASSWORD_MAX: usize = 20;

/// A single failed client-side check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Username outside the allowed length.
    #[error("Username must be between 3 and 10 characters")]
    UsernameLength,
    /// Password too short.
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    /// Password too long.
    #[error("Password must be at most 20 characters long")]
    PasswordTooLong,
    /// No upper-case letter.
    #[error("Password must contain at least one uppercase letter")]
    PasswordNoUppercase,
    /// No lower-case letter.
    #[error("Password must contain at least one lowercase letter")]
    PasswordNoLowercase,
    /// No ASCII digit.
    #[error("Password must contain at least one number")]
    PasswordNoDigit,
    /// No character outside `[a-zA-Z0-9]`.
    #[error("Password must contain at least one special character")]
    PasswordNoSpecial,
    /// Empty (or whitespace-only) title.
    #[error("Please enter a title")]
    TitleRequired,
    /// Empty (or whitespace-only) body.
    #[error("Please enter content")]
    ContentRequired,
    /// No tags selected.
    #[error("Please select at least one tag")]
    TagsRequired,
}

/// Per-field errors for the login and signup forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialErrors {
    /// Error shown under the username field.
    pub username: Option<ValidationError>,
    /// Every failing password rule, in rule order.
    pub password: Vec<ValidationError>,
}

impl CredentialErrors {
    /// Whether no check failed.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_empty()
    }
}

/// Per-field errors for the add-content form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentErrors {
    /// Title error.
    pub title: Option<ValidationError>,
    /// Body error.
    pub content: Option<ValidationError>,
    /// Tag error.
    pub tags: Option<ValidationError>,
}

impl ContentErrors {
    /// Whether no check failed.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Check a username's length (in characters, not bytes).
pub fn validate_username(username: &str) -> Option<ValidationError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        Some(ValidationError::UsernameLength)
    } else {
        None
    }
}

/// Check a password against every composition rule.
///
/// Returns all failing rules, not just the first.
pub fn validate_password(password: &str) -> Vec<ValidationError> {
    let len = password.chars().count();
    let mut errors = Vec::new();

    if len < PASSWORD_MIN {
        errors.push(ValidationError::PasswordTooShort);
    }
    if len > PASSWORD_MAX {
        errors.push(ValidationError::PasswordTooLong);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(ValidationError::PasswordNoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(ValidationError::PasswordNoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(ValidationError::PasswordNoDigit);
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        errors.push(ValidationError::PasswordNoSpecial);
    }

    errors
}

/// Validate a login or signup form.
pub fn validate_credentials(username: &str, password: &str) -> CredentialErrors {
    CredentialErrors {
        username: validate_username(username),
        password: validate_password(password),
    }
}

/// Validate an add-content form.
pub fn validate_content(title: &str, content: &str, tags: &[String]) -> ContentErrors {
    ContentErrors {
        title: title.trim().is_empty().then_some(ValidationError::TitleRequired),
        content: content
            .trim()
            .is_empty()
            .then_some(ValidationError::ContentRequired),
        tags: tags.is_empty().then_some(ValidationError::TagsRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_length_bounds() {
        assert_eq!(validate_username("ab"), Some(ValidationError::UsernameLength));
        assert_eq!(validate_username("abc"), None);
        assert_eq!(validate_username("abcdefghij"), None);
        assert_eq!(
            validate_username("abcdefghijk"),
            Some(ValidationError::UsernameLength)
        );
    }

    #[test]
    fn test_username_counts_chars_not_bytes() {
        assert_eq!(validate_username("äöü"), None);
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Secret#123").is_empty());
    }

    #[test]
    fn test_password_reports_every_failing_rule() {
        let errors = validate_password("abc");
        assert_eq!(
            errors,
            vec![
                ValidationError::PasswordTooShort,
                ValidationError::PasswordNoUppercase,
                ValidationError::PasswordNoDigit,
                ValidationError::PasswordNoSpecial,
            ]
        );
    }

    #[test]
    fn test_password_too_long() {
        let errors = validate_password("Aa1!Aa1!Aa1!Aa1!Aa1!X");
        assert_eq!(errors, vec![ValidationError::PasswordTooLong]);
    }

    #[test]
    fn test_password_space_counts_as_special() {
        assert!(validate_password("Secret 123").is_empty());
    }

    #[test]
    fn test_credentials() {
        let errors = validate_credentials("al", "Secret#123");
        assert_eq!(errors.username, Some(ValidationError::UsernameLength));
        assert!(errors.password.is_empty());
        assert!(!errors.is_empty());

        assert!(validate_credentials("alice", "Secret#123").is_empty());
    }

    #[test]
    fn test_content_validation() {
        let errors = validate_content("   ", "", &[]);
        assert_eq!(errors.title, Some(ValidationError::TitleRequired));
        assert_eq!(errors.content, Some(ValidationError::ContentRequired));
        assert_eq!(errors.tags, Some(ValidationError::TagsRequired));

        let errors = validate_content("Title", "body", &["rust".to_string()]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::TagsRequired.to_string(),
            "Please select at least one tag"
        );
        assert_eq!(
            ValidationError::PasswordNoSpecial.to_string(),
            "Password must contain at least one special character"
        );
    }
}
