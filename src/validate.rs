//! Field validation for registration and login input.
//!
//! Pure, synchronous syntax checks — no I/O, no state. Each check returns a
//! specific [`ValidationError`] so the UI layer can show a targeted message.

use thiserror::Error;

/// Special characters a password must contain at least one of.
const PASSWORD_SPECIAL_CHARS: &str = "-_.:;!@#$%^&*?<>";

/// Characters allowed in the local part of an email address.
const EMAIL_LOCAL_CHARS: &str = "._%+-";

/// Minimum username length (exclusive).
const MIN_USERNAME_LENGTH: usize = 3;

/// Minimum password length (exclusive).
const MIN_PASSWORD_LENGTH: usize = 5;

/// TLD length bounds, inclusive.
const TLD_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 2..=4;

/// The input field a validation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    Email,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Password => "password",
            Field::Email => "email",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecialChar,
    InvalidFormat,
    ConfirmationMismatch,
}

impl Reason {
    pub fn message(&self) -> &'static str {
        match self {
            Reason::TooShort => "is too short",
            Reason::MissingUppercase => "must contain an uppercase letter",
            Reason::MissingLowercase => "must contain a lowercase letter",
            Reason::MissingDigit => "must contain a digit",
            Reason::MissingSpecialChar => "must contain a special character",
            Reason::InvalidFormat => "is not in a valid format",
            Reason::ConfirmationMismatch => "does not match its confirmation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} {}", .reason.message())]
pub struct ValidationError {
    pub field: Field,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

/// Validate a single field against its policy rule.
pub fn check(field: Field, value: &str) -> Result<(), ValidationError> {
    match field {
        Field::Username => check_username(value),
        Field::Password => check_password(value),
        Field::Email => check_email(value),
    }
}

/// Usernames must be longer than 3 characters and contain at least one
/// uppercase letter, one lowercase letter, and one digit.
pub fn check_username(username: &str) -> Result<(), ValidationError> {
    let fail = |reason| Err(ValidationError::new(Field::Username, reason));

    if username.chars().count() <= MIN_USERNAME_LENGTH {
        return fail(Reason::TooShort);
    }
    if !username.chars().any(|c| c.is_ascii_uppercase()) {
        return fail(Reason::MissingUppercase);
    }
    if !username.chars().any(|c| c.is_ascii_lowercase()) {
        return fail(Reason::MissingLowercase);
    }
    if !username.chars().any(|c| c.is_ascii_digit()) {
        return fail(Reason::MissingDigit);
    }
    Ok(())
}

/// Passwords must be longer than 5 characters and contain at least one
/// uppercase letter, one lowercase letter, one digit, and one character
/// from [`PASSWORD_SPECIAL_CHARS`].
pub fn check_password(password: &str) -> Result<(), ValidationError> {
    let fail = |reason| Err(ValidationError::new(Field::Password, reason));

    if password.chars().count() <= MIN_PASSWORD_LENGTH {
        return fail(Reason::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return fail(Reason::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return fail(Reason::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return fail(Reason::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return fail(Reason::MissingSpecialChar);
    }
    Ok(())
}

/// Emails must have a `local@domain.tld` shape: a non-empty local part of
/// letters, digits, or `._%+-`, a non-empty domain of letters, digits, dots
/// or hyphens, and a trailing TLD of 2-4 letters.
pub fn check_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new(Field::Email, Reason::InvalidFormat))
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || EMAIL_LOCAL_CHARS.contains(c))
    {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }

    TLD_LENGTH_RANGE.contains(&tld.chars().count()) && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_policy() {
        assert!(check_username("Ab1x").is_ok());
        assert!(check_username("User12").is_ok());

        // Too short, even with the right character classes
        assert_eq!(
            check_username("Ab1").unwrap_err().reason,
            Reason::TooShort
        );
        // No uppercase or digit
        assert_eq!(
            check_username("abcx").unwrap_err().reason,
            Reason::MissingUppercase
        );
        // No lowercase
        assert_eq!(
            check_username("AB12").unwrap_err().reason,
            Reason::MissingLowercase
        );
        // No digit
        assert_eq!(
            check_username("Abcd").unwrap_err().reason,
            Reason::MissingDigit
        );
        assert!(check_username("").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(check_password("Passw0rd!").is_ok());
        assert!(check_password("Secr3t!").is_ok());
        assert!(check_password("aB3-cd").is_ok());

        // No uppercase, no special char - uppercase is reported first
        assert_eq!(
            check_password("password1").unwrap_err().reason,
            Reason::MissingUppercase
        );
        assert_eq!(
            check_password("Pa1!x").unwrap_err().reason,
            Reason::TooShort
        );
        assert_eq!(
            check_password("Password1").unwrap_err().reason,
            Reason::MissingSpecialChar
        );
        assert_eq!(
            check_password("Password!").unwrap_err().reason,
            Reason::MissingDigit
        );
        // Space is not in the accepted special set
        assert_eq!(
            check_password("Pass w0rd").unwrap_err().reason,
            Reason::MissingSpecialChar
        );
    }

    #[test]
    fn test_email_policy() {
        assert!(check_email("u@x.com").is_ok());
        assert!(check_email("first.last+tag@sub.example.org").is_ok());
        assert!(check_email("a_b%c@host-1.io").is_ok());

        assert!(check_email("").is_err());
        assert!(check_email("no-at-sign.com").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("user@").is_err());
        assert!(check_email("user@nodot").is_err());
        assert!(check_email("user@host.c").is_err()); // TLD too short
        assert!(check_email("user@host.museum").is_err()); // TLD too long
        assert!(check_email("user@host.c0m").is_err()); // TLD not alphabetic
        assert!(check_email("us er@host.com").is_err());
        assert!(check_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_check_dispatch() {
        assert!(check(Field::Username, "User12").is_ok());
        assert!(check(Field::Password, "Secr3t!").is_ok());
        assert!(check(Field::Email, "u@x.com").is_ok());

        let err = check(Field::Email, "nope").unwrap_err();
        assert_eq!(err.field, Field::Email);
        assert_eq!(err.reason, Reason::InvalidFormat);
        assert_eq!(err.to_string(), "email is not in a valid format");
    }
}
