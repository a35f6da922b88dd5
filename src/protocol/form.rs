//! Form bodies
//!
//! Strict `application/x-www-form-urlencoded` decoding. Every `&`-separated
//! field must be non-empty and contain `=`; `name=Josh&` is rejected.

use crate::error::{Result, SquirrelError};

/// Decoded form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    /// Parse a form body
    ///
    /// An empty body is an empty form.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|_| SquirrelError::MalformedInput("Form body is not UTF-8".to_string()))?;

        if text.is_empty() {
            return Ok(Self::default());
        }

        for field in text.split('&') {
            if field.is_empty() {
                return Err(SquirrelError::MalformedInput(format!(
                    "Empty field in form body {:?}",
                    text
                )));
            }
            if !field.contains('=') {
                return Err(SquirrelError::MalformedInput(format!(
                    "Field {:?} has no value",
                    field
                )));
            }
        }

        let fields = url::form_urlencoded::parse(body).into_owned().collect();
        Ok(Self { fields })
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `name`, or `MalformedInput` if absent
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| SquirrelError::MalformedInput(format!("Missing field {:?}", name)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
