//! Request field validation
//!
//! Each check returns the value only when it is valid and records a
//! `FieldError` otherwise, so a handler can collect every problem in one
//! pass and bail with `into_error`.

use serde::Serialize;
use std::ops::RangeInclusive;
use validator::ValidateEmail;

use crate::error::ApiError;

/// Maximum length of free-text listing fields
pub const MAX_TEXT_LENGTH: usize = 128;

/// One rejected request field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
    pub location: &'static str,
}

impl FieldError {
    fn new(msg: impl Into<String>, param: impl Into<String>, location: &'static str) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
            location,
        }
    }

    /// Error for a body that could not be parsed at all
    pub fn body(msg: impl Into<String>) -> Self {
        Self::new(msg, "", "body")
    }
}

/// Collects field errors for one request
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, param: &str, msg: impl Into<String>) {
        self.errors.push(FieldError::new(msg, param, "body"));
    }

    /// Required string whose length in characters lies in `len`
    pub fn text(
        &mut self,
        param: &str,
        value: Option<String>,
        len: RangeInclusive<usize>,
    ) -> Option<String> {
        let Some(value) = value else {
            self.reject(param, "Missing value");
            return None;
        };
        self.check_len(param, value, len)
    }

    /// Optional string; validated only when present
    pub fn optional_text(
        &mut self,
        param: &str,
        value: Option<String>,
        len: RangeInclusive<usize>,
    ) -> Option<Option<String>> {
        match value {
            Some(value) => self.check_len(param, value, len).map(Some),
            None => Some(None),
        }
    }

    /// Required, plausibly well-formed email address
    pub fn email(&mut self, param: &str, value: Option<String>) -> Option<String> {
        let value = self.text(param, value, 3..=254)?;
        if value.validate_email() {
            Some(value)
        } else {
            self.reject(param, "Invalid email");
            None
        }
    }

    /// Required value of any type
    pub fn present<T>(&mut self, param: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.reject(param, "Missing value");
        }
        value
    }

    /// Required non-negative finite number
    pub fn number(&mut self, param: &str, value: Option<f64>) -> Option<f64> {
        match value {
            Some(n) if n.is_finite() && n >= 0.0 => Some(n),
            Some(_) => {
                self.reject(param, "Invalid value");
                None
            }
            None => {
                self.reject(param, "Missing value");
                None
            }
        }
    }

    /// Optional non-negative finite number
    pub fn optional_number(&mut self, param: &str, value: Option<f64>) -> Option<Option<f64>> {
        match value {
            Some(_) => self.number(param, value).map(Some),
            None => Some(None),
        }
    }

    /// Required list of strings, each within `len`
    pub fn text_list(
        &mut self,
        param: &str,
        values: Option<Vec<String>>,
        len: RangeInclusive<usize>,
    ) -> Option<Vec<String>> {
        let Some(values) = values else {
            self.reject(param, "Missing value");
            return None;
        };

        let before = self.errors.len();
        let checked: Vec<_> = values
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| self.check_len(&format!("{}[{}]", param, i), v, len.clone()))
            .collect();

        (self.errors.len() == before).then_some(checked)
    }

    fn check_len(
        &mut self,
        param: &str,
        value: String,
        len: RangeInclusive<usize>,
    ) -> Option<String> {
        if len.contains(&value.chars().count()) {
            Some(value)
        } else {
            self.reject(
                param,
                format!("Length must be between {} and {}", len.start(), len.end()),
            );
            None
        }
    }

    /// Convert the collected errors into a 400 response
    pub fn into_error(self) -> ApiError {
        ApiError::Validation(self.errors)
    }
}

/// Validation error for the `sorting` query parameter
pub fn invalid_sorting() -> ApiError {
    ApiError::Validation(vec![FieldError::new("Invalid sorting", "sorting", "query")])
}
