// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Raw document input and document kinds.
//!
//! Callers hand identifiers over either as text (punctuated or not) or as
//! integers. Integers lose their leading zeros, so they are re-padded to the
//! document width during normalization.

use crate::error::FormatError;
use std::borrow::Cow;
use std::fmt;

/// Kind of Brazilian taxpayer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Individual registration, 11 digits.
    Cpf,
    /// Legal-entity registration, 14 characters.
    Cnpj,
}

impl DocumentKind {
    /// Width of the normalized identifier.
    pub const fn width(self) -> usize {
        match self {
            Self::Cpf => 11,
            Self::Cnpj => 14,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpf => write!(f, "CPF"),
            Self::Cnpj => write!(f, "CNPJ"),
        }
    }
}

/// A document number as supplied by the caller, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput<'a> {
    /// Text, possibly punctuated (`111.444.777-35`).
    Text(Cow<'a, str>),
    /// Integer form; leading zeros are implied.
    Integer(i128),
}

impl<'a> From<&'a str> for DocumentInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a String> for DocumentInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(Cow::Borrowed(value.as_str()))
    }
}

impl From<String> for DocumentInput<'static> {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

macro_rules! integer_input {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DocumentInput<'static> {
                fn from(value: $ty) -> Self {
                    Self::Integer(i128::from(value))
                }
            }
        )*
    };
}

integer_input!(u32, u64, i32, i64, i128);

/// Characters removed from textual input before any other check.
pub(crate) fn is_separator(c: char) -> bool {
    matches!(c, '.' | '-' | '/') || c.is_whitespace()
}

/// Drop separators from textual input.
pub(crate) fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| !is_separator(*c)).collect()
}

/// Render an integer as a zero-padded identifier of the document width.
pub(crate) fn render_integer(kind: DocumentKind, value: i128) -> Result<String, FormatError> {
    let width = kind.width();
    let rendered = if value < 0 {
        None
    } else {
        Some(format!("{value:0width$}"))
    };

    match rendered {
        Some(text) if text.len() == width => Ok(text),
        _ => Err(FormatError::IntegerOutOfRange { kind, value }),
    }
}

/// Check that a normalized identifier has the document width.
pub(crate) fn ensure_width(kind: DocumentKind, clean: String, original: &str) -> Result<String, FormatError> {
    let actual = clean.chars().count();
    if actual == kind.width() {
        Ok(clean)
    } else {
        Err(FormatError::InvalidLength {
            kind,
            expected: kind.width(),
            actual,
            value: original.to_string(),
        })
    }
}

/// True when every character is the same (`00000000000`, `AAAAAAAAAAAAAA`).
pub(crate) fn is_repeated(clean: &str) -> bool {
    let mut chars = clean.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => true,
    }
}
