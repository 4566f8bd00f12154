use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::ApiError;

/// One rejected request field, rendered inside `{"errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    pub param: &'static str,
    pub location: &'static str,
}

/// Collects every violation of a request before failing, so the client sees
/// all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, param: &'static str, msg: impl Into<String>) {
        self.errors.push(FieldError {
            msg: msg.into(),
            param,
            location: "body",
        });
    }

    pub fn required(&mut self, param: &'static str, value: Option<&str>, msg: &str) {
        if !is_present(value) {
            self.push(param, msg);
        }
    }

    pub fn email(&mut self, param: &'static str, value: Option<&str>, msg: &str) {
        if !value.is_some_and(is_valid_email) {
            self.push(param, msg);
        }
    }

    pub fn min_len(&mut self, param: &'static str, value: Option<&str>, min: usize, msg: &str) {
        if value.map_or(0, |v| v.chars().count()) < min {
            self.push(param, msg);
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

/// A field counts as supplied only when it carries a non-blank value.
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
