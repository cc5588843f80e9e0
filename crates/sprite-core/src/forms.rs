//! Form Schemas
//!
//! Field constraints for the login and signup forms. Shared by the server
//! (authoritative check) and the web front-end (inline messages).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
pub const FULL_NAME_MESSAGE: &str = "Full name must be at least 2 characters";

const MIN_PASSWORD_CHARS: usize = 6;
const MIN_FULL_NAME_CHARS: usize = 2;

/// Per-field validation messages, keyed by field name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message; the first message for a field is kept
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Login form values
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        errors.into_result()
    }
}

/// Signup form values
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        if self.full_name.chars().count() < MIN_FULL_NAME_CHARS {
            errors.add("fullName", FULL_NAME_MESSAGE);
        }
        errors.into_result()
    }
}

fn check_email(email: &str, errors: &mut FormErrors) {
    if !is_valid_email(email) {
        errors.add("email", EMAIL_MESSAGE);
    }
}

fn check_password(password: &str, errors: &mut FormErrors) {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.add("password", PASSWORD_MESSAGE);
    }
}

/// `local@domain.tld`: no whitespace, one `@`, dotted domain without empty
/// labels, alphabetic TLD of two or more characters
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || local.starts_with('.') || local.ends_with('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty() || l.starts_with('-') || l.ends_with('-')) {
        return false;
    }

    labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("you@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.io"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("you"));
        assert!(!is_valid_email("you@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("you@example"));
        assert!(!is_valid_email("you@example.c"));
        assert!(!is_valid_email("you@@example.com"));
        assert!(!is_valid_email("you @example.com"));
        assert!(!is_valid_email("you@example..com"));
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "you@example.com".into(),
            password: "hunter22".into(),
        };
        assert!(form.validate().is_ok());

        let errors = LoginForm {
            email: "nope".into(),
            password: "12345".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some(EMAIL_MESSAGE));
        assert_eq!(errors.get("password"), Some(PASSWORD_MESSAGE));
    }

    #[test]
    fn test_signup_form() {
        let mut form = SignupForm {
            email: "you@example.com".into(),
            password: "secret".into(),
            full_name: "Jo".into(),
        };
        assert!(form.validate().is_ok());

        form.full_name = "J".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("fullName"), Some(FULL_NAME_MESSAGE));
    }

    #[test]
    fn test_password_length_counts_characters() {
        let form = LoginForm {
            email: "you@example.com".into(),
            password: "ééééé".into(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_signup_form_field_names() {
        let form: SignupForm = serde_json::from_str(
            r#"{"email":"a@b.co","password":"secret","fullName":"Ada"}"#,
        )
        .unwrap();
        assert_eq!(form.full_name, "Ada");
    }
}
