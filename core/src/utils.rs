//! Utility functions and types.

use std::fmt::{Debug, Formatter};

/// Debug view of a secret that keeps only a short prefix and suffix.
///
/// Values shorter than 12 characters are hidden entirely and an empty value
/// prints `EMPTY`. Longer values keep their first and last three characters
/// so that two different keys can still be told apart in logs.
#[derive(Clone, Copy)]
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or_default())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.chars().count() {
            0 => f.write_str("EMPTY"),
            n if n < 12 => f.write_str("***"),
            _ => {
                let head = self.0.char_indices().nth(3).map_or(0, |(i, _)| i);
                let tail = self.0.char_indices().rev().nth(2).map_or(0, |(i, _)| i);
                write!(f, "{}***{}", &self.0[..head], &self.0[tail..])
            }
        }
    }
}
