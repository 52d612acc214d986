// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CPF (Cadastro de Pessoas Físicas) handling.
//!
//! A CPF is 11 decimal digits, the last two being modulo-11 check digits
//! computed with descending weights (10..2, then 11..2).

use crate::checksum::{digit_char, mod11_digit};
use crate::error::{FormatError, ValidationError};
use crate::input::{self, DocumentInput, DocumentKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const KIND: DocumentKind = DocumentKind::Cpf;

/// Weights for the first check digit.
const FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second check digit.
const SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Normalize a CPF to its 11 bare digits.
///
/// Text input may carry `.`, `-`, `/` and whitespace; any other non-digit is
/// rejected. Integers are zero-padded to 11 digits.
pub fn normalize_cpf<'a>(value: impl Into<DocumentInput<'a>>) -> Result<String, FormatError> {
    match value.into() {
        DocumentInput::Integer(number) => input::render_integer(KIND, number),
        DocumentInput::Text(text) => {
            let clean = input::strip_separators(&text);
            if let Some(character) = clean.chars().find(|c| !c.is_ascii_digit()) {
                return Err(FormatError::InvalidCharacter {
                    kind: KIND,
                    character,
                    value: text.into_owned(),
                });
            }
            input::ensure_width(KIND, clean, &text)
        }
    }
}

/// Compute one CPF check digit from a 9- or 10-digit prefix.
///
/// The prefix length selects the weight sequence.
pub fn calculate_cpf_digit(partial: &str) -> Result<u8, FormatError> {
    let weights: &[u32] = match partial.chars().count() {
        9 => &FIRST_WEIGHTS,
        10 => &SECOND_WEIGHTS,
        actual => {
            return Err(FormatError::InvalidPartialLength {
                kind: KIND,
                expected: (9, 10),
                actual,
                value: partial.to_string(),
            })
        }
    };

    let values = partial
        .chars()
        .map(|c| {
            c.to_digit(10).ok_or_else(|| FormatError::InvalidCharacter {
                kind: KIND,
                character: c,
                value: partial.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(mod11_digit(values, weights))
}

/// Validate a CPF, propagating format errors.
///
/// Returns `Ok(Some(normalized))` when valid and `Ok(None)` when the input is
/// well formed but fails the check digits or is a repeated-digit pattern.
pub fn check_cpf<'a>(value: impl Into<DocumentInput<'a>>) -> Result<Option<String>, FormatError> {
    let clean = normalize_cpf(value)?;

    if input::is_repeated(&clean) {
        debug!(cpf = %clean, "CPF rejected: repeated digits");
        return Ok(None);
    }

    let mut expected = clean[..9].to_string();
    let first = calculate_cpf_digit(&expected)?;
    expected.push(digit_char(first));
    let second = calculate_cpf_digit(&expected)?;
    expected.push(digit_char(second));

    if expected == clean {
        Ok(Some(clean))
    } else {
        debug!(cpf = %clean, "CPF rejected: check digits mismatch");
        Ok(None)
    }
}

/// Validate a CPF.
///
/// Returns the normalized digits when valid. Malformed input, checksum
/// mismatches and repeated-digit patterns all yield `None`.
pub fn validate_cpf<'a>(value: impl Into<DocumentInput<'a>>) -> Option<String> {
    match check_cpf(value) {
        Ok(result) => result,
        Err(err) => {
            debug!(error = %err, "CPF rejected: malformed input");
            None
        }
    }
}

/// Format a CPF as `DDD.DDD.DDD-DD`.
///
/// Only the format is checked, not the check digits.
pub fn format_cpf<'a>(value: impl Into<DocumentInput<'a>>) -> Result<String, FormatError> {
    let clean = normalize_cpf(value)?;
    Ok(render(&clean))
}

fn render(clean: &str) -> String {
    format!(
        "{}.{}.{}-{}",
        &clean[..3],
        &clean[3..6],
        &clean[6..9],
        &clean[9..]
    )
}

/// A validated CPF, stored as 11 bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Parse and validate a CPF.
    pub fn parse<'a>(value: impl Into<DocumentInput<'a>>) -> Result<Self, ValidationError> {
        let value = value.into();
        let shown = match &value {
            DocumentInput::Text(text) => text.to_string(),
            DocumentInput::Integer(number) => number.to_string(),
        };
        match check_cpf(value)? {
            Some(clean) => Ok(Self(clean)),
            None => Err(ValidationError::Invalid {
                kind: KIND,
                value: shown,
            }),
        }
    }

    /// The 11 bare digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Punctuated form, `DDD.DDD.DDD-DD`.
    pub fn formatted(&self) -> String {
        render(&self.0)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cpf {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cpf {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}
