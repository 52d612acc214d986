// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CNPJ (Cadastro Nacional da Pessoa Jurídica) handling.
//!
//! Supports both the traditional all-numeric CNPJ and the alphanumeric
//! scheme, where the first 12 characters may be letters `A`-`Z`. The two
//! check digits are always decimal.
//!
//! Layout of a normalized CNPJ:
//!
//! ```text
//! RRRRRRRR BBBB DD
//! root     branch check digits
//! ```
//!
//! Branch `0001` is the headquarters.

use crate::checksum::{digit_char, mod11_digit};
use crate::error::{FormatError, ValidationError};
use crate::input::{self, DocumentInput, DocumentKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const KIND: DocumentKind = DocumentKind::Cnpj;

/// Weights for the first check digit.
const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second check digit: the first sequence prefixed with 6.
const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Branch order number of the headquarters.
pub const HEADQUARTERS_BRANCH: &str = "0001";

const ROOT_LEN: usize = 8;
const BODY_LEN: usize = 12;

/// Checksum value of a single CNPJ character.
///
/// `ord(c) - 48`: digits map to 0-9 and upper-case letters to 17-42.
pub fn character_value(character: char) -> Result<u32, FormatError> {
    match character {
        '0'..='9' | 'A'..='Z' => Ok(u32::from(character) - 48),
        _ => Err(FormatError::InvalidCharacter {
            kind: KIND,
            character,
            value: character.to_string(),
        }),
    }
}

/// Normalize a CNPJ to its 14 bare upper-case characters.
///
/// Text input may carry `.`, `-`, `/` and whitespace; letters are
/// upper-cased and any other character is rejected. Integers are
/// zero-padded to 14 digits.
pub fn normalize_cnpj<'a>(value: impl Into<DocumentInput<'a>>) -> Result<String, FormatError> {
    match value.into() {
        DocumentInput::Integer(number) => input::render_integer(KIND, number),
        DocumentInput::Text(text) => {
            let clean = input::strip_separators(&text).to_ascii_uppercase();
            if let Some(character) = clean
                .chars()
                .find(|c| !c.is_ascii_digit() && !c.is_ascii_uppercase())
            {
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

/// Compute one CNPJ check digit from a 12- or 13-character prefix.
///
/// The prefix length selects the weight sequence.
pub fn calculate_cnpj_digit(partial: &str) -> Result<u8, FormatError> {
    let weights: &[u32] = match partial.chars().count() {
        12 => &FIRST_WEIGHTS,
        13 => &SECOND_WEIGHTS,
        actual => {
            return Err(FormatError::InvalidPartialLength {
                kind: KIND,
                expected: (12, 13),
                actual,
                value: partial.to_string(),
            })
        }
    };

    let values = partial
        .chars()
        .map(|c| {
            character_value(c).map_err(|_| FormatError::InvalidCharacter {
                kind: KIND,
                character: c,
                value: partial.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(mod11_digit(values, weights))
}

/// Append both check digits to a 12-character body.
///
/// The body must already be normalized, so every character maps through
/// [`character_value`] without error.
fn complete(body: &str) -> String {
    let mut values: Vec<u32> = body.chars().map(|c| u32::from(c) - 48).collect();
    let mut full = body.to_string();
    for weights in [&FIRST_WEIGHTS[..], &SECOND_WEIGHTS[..]] {
        let digit = mod11_digit(values.iter().copied(), weights);
        values.push(u32::from(digit));
        full.push(digit_char(digit));
    }
    full
}

/// Validate a CNPJ, propagating format errors.
///
/// Returns `Ok(Some(normalized))` when valid and `Ok(None)` when the input is
/// well formed but is a repeated-character pattern, carries letters in the
/// check digit positions, or fails the check digits.
pub fn check_cnpj<'a>(value: impl Into<DocumentInput<'a>>) -> Result<Option<String>, FormatError> {
    let clean = normalize_cnpj(value)?;

    if input::is_repeated(&clean) {
        debug!(cnpj = %clean, "CNPJ rejected: repeated characters");
        return Ok(None);
    }

    if !clean[BODY_LEN..].chars().all(|c| c.is_ascii_digit()) {
        debug!(cnpj = %clean, "CNPJ rejected: non-numeric check digits");
        return Ok(None);
    }

    if complete(&clean[..BODY_LEN]) == clean {
        Ok(Some(clean))
    } else {
        debug!(cnpj = %clean, "CNPJ rejected: check digits mismatch");
        Ok(None)
    }
}

/// Validate a CNPJ.
///
/// Returns the normalized characters when valid. Malformed input, checksum
/// mismatches and repeated-character patterns all yield `None`.
pub fn validate_cnpj<'a>(value: impl Into<DocumentInput<'a>>) -> Option<String> {
    match check_cnpj(value) {
        Ok(result) => result,
        Err(err) => {
            debug!(error = %err, "CNPJ rejected: malformed input");
            None
        }
    }
}

/// Format a CNPJ as `XX.XXX.XXX/XXXX-XX`.
///
/// Only the format is checked, not the check digits.
pub fn format_cnpj<'a>(value: impl Into<DocumentInput<'a>>) -> Result<String, FormatError> {
    let clean = normalize_cnpj(value)?;
    Ok(render(&clean))
}

fn render(clean: &str) -> String {
    format!(
        "{}.{}.{}/{}-{}",
        &clean[..2],
        &clean[2..5],
        &clean[5..8],
        &clean[8..12],
        &clean[12..]
    )
}

/// Derive the formatted headquarters CNPJ from any valid branch CNPJ.
///
/// Keeps the 8-character root, sets the branch to `0001` and recomputes the
/// check digits. A headquarters CNPJ maps to itself.
pub fn find_headquarters<'a>(branch: impl Into<DocumentInput<'a>>) -> Result<String, ValidationError> {
    let branch = Cnpj::parse(branch)?;
    Ok(branch.headquarters().formatted())
}

/// A validated CNPJ, stored as 14 bare upper-case characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnpj(String);

impl Cnpj {
    /// Parse and validate a CNPJ.
    pub fn parse<'a>(value: impl Into<DocumentInput<'a>>) -> Result<Self, ValidationError> {
        let value = value.into();
        let shown = match &value {
            DocumentInput::Text(text) => text.to_string(),
            DocumentInput::Integer(number) => number.to_string(),
        };
        match check_cnpj(value)? {
            Some(clean) => Ok(Self(clean)),
            None => Err(ValidationError::Invalid {
                kind: KIND,
                value: shown,
            }),
        }
    }

    /// The 14 bare characters.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Punctuated form, `XX.XXX.XXX/XXXX-XX`.
    pub fn formatted(&self) -> String {
        render(&self.0)
    }

    /// Root registration number shared by all branches.
    pub fn root(&self) -> &str {
        &self.0[..ROOT_LEN]
    }

    /// Branch order number.
    pub fn branch(&self) -> &str {
        &self.0[ROOT_LEN..BODY_LEN]
    }

    pub fn check_digits(&self) -> &str {
        &self.0[BODY_LEN..]
    }

    pub fn is_headquarters(&self) -> bool {
        self.branch() == HEADQUARTERS_BRANCH
    }

    /// True when the identifier uses the alphanumeric scheme.
    pub fn is_alphanumeric(&self) -> bool {
        self.0.chars().any(|c| c.is_ascii_uppercase())
    }

    /// The headquarters CNPJ of this company.
    pub fn headquarters(&self) -> Cnpj {
        if self.is_headquarters() {
            return self.clone();
        }
        Cnpj(complete(&format!("{}{}", self.root(), HEADQUARTERS_BRANCH)))
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cnpj {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cnpj {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Cnpj> for String {
    fn from(cnpj: Cnpj) -> Self {
        cnpj.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_values() {
        assert_eq!(character_value('0').unwrap(), 0);
        assert_eq!(character_value('9').unwrap(), 9);
        assert_eq!(character_value('A').unwrap(), 17);
        assert_eq!(character_value('M').unwrap(), 29);
        assert_eq!(character_value('Z').unwrap(), 42);
    }

    #[test]
    fn test_character_value_rejects() {
        for c in ['a', '@', ' ', ':', 'Ç'] {
            assert!(
                matches!(
                    character_value(c),
                    Err(FormatError::InvalidCharacter { character, .. }) if character == c
                ),
                "{c:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_numeric() {
        assert_eq!(normalize_cnpj("12.345.678/0001-95").unwrap(), "12345678000195");
        assert_eq!(normalize_cnpj("12345678000195").unwrap(), "12345678000195");
        assert_eq!(normalize_cnpj(12345678000195u64).unwrap(), "12345678000195");
        assert_eq!(normalize_cnpj(1234567890123u64).unwrap(), "01234567890123");
    }

    #[test]
    fn test_normalize_alphanumeric() {
        assert_eq!(normalize_cnpj("ABC12345000195").unwrap(), "ABC12345000195");
        assert_eq!(normalize_cnpj("abc12345000195").unwrap(), "ABC12345000195");
        assert_eq!(normalize_cnpj("AB.C12.345/0001-95").unwrap(), "ABC12345000195");
    }

    #[test]
    fn test_normalize_rejects() {
        assert!(matches!(
            normalize_cnpj("1234567890123"),
            Err(FormatError::InvalidLength { actual: 13, .. })
        ));
        assert!(matches!(
            normalize_cnpj("123456789012345"),
            Err(FormatError::InvalidLength { actual: 15, .. })
        ));
        assert!(matches!(
            normalize_cnpj(""),
            Err(FormatError::InvalidLength { actual: 0, .. })
        ));
        assert!(matches!(
            normalize_cnpj(123456789012345u64),
            Err(FormatError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            normalize_cnpj(-12345678000195i64),
            Err(FormatError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            normalize_cnpj("123456@8000195"),
            Err(FormatError::InvalidCharacter { character: '@', .. })
        ));
    }

    #[test]
    fn test_calculate_digits() {
        assert_eq!(calculate_cnpj_digit("112223330001").unwrap(), 8);
        assert_eq!(calculate_cnpj_digit("1122233300018").unwrap(), 1);
        assert_eq!(calculate_cnpj_digit("000000000006").unwrap(), 0);
    }

    #[test]
    fn test_calculate_digits_alphanumeric() {
        assert_eq!(calculate_cnpj_digit("12ABC34501DE").unwrap(), 3);
        assert_eq!(calculate_cnpj_digit("12ABC34501DE3").unwrap(), 5);
    }

    #[test]
    fn test_calculate_digit_rejects_bad_partial() {
        for partial in ["", "12345678001", "12345678000195"] {
            assert!(matches!(
                calculate_cnpj_digit(partial),
                Err(FormatError::InvalidPartialLength { expected: (12, 13), .. })
            ));
        }
        assert!(matches!(
            calculate_cnpj_digit("12abc3450001"),
            Err(FormatError::InvalidCharacter { character: 'a', .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate_cnpj("11.222.333/0001-81").as_deref(), Some("11222333000181"));
        assert_eq!(validate_cnpj(11222333000181u64).as_deref(), Some("11222333000181"));
        assert_eq!(validate_cnpj("00000000000191").as_deref(), Some("00000000000191"));
        assert_eq!(validate_cnpj("12.ABC.345/01DE-35").as_deref(), Some("12ABC34501DE35"));
        assert_eq!(validate_cnpj("12.abc.345/01de-35").as_deref(), Some("12ABC34501DE35"));
    }

    #[test]
    fn test_validate_rejects() {
        assert_eq!(validate_cnpj("00000000000000"), None);
        assert_eq!(validate_cnpj("11111111111111"), None);
        assert_eq!(validate_cnpj("AAAAAAAAAAAAAA"), None);
        assert_eq!(validate_cnpj("11222333000182"), None);
        assert_eq!(validate_cnpj("11222333000191"), None);
        assert_eq!(validate_cnpj("1122233300018"), None);
        assert_eq!(validate_cnpj("11@22#33/0001-81"), None);
        assert_eq!(validate_cnpj("              "), None);
        assert_eq!(validate_cnpj(-11222333000181i64), None);
    }

    #[test]
    fn test_letters_in_check_positions_are_invalid() {
        assert_eq!(check_cnpj("112223330001AB").unwrap(), None);
        assert_eq!(validate_cnpj("12ABC34501DE3A"), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_cnpj("11222333000181").unwrap(), "11.222.333/0001-81");
        assert_eq!(format_cnpj(11222333000181u64).unwrap(), "11.222.333/0001-81");
        assert_eq!(format_cnpj(1222333000181u64).unwrap(), "01.222.333/0001-81");
        assert_eq!(format_cnpj("AB222333000181").unwrap(), "AB.222.333/0001-81");
        assert_eq!(format_cnpj("11.222.333/0001-81").unwrap(), "11.222.333/0001-81");
        assert!(format_cnpj("123").is_err());
    }

    #[test]
    fn test_find_headquarters() {
        assert_eq!(find_headquarters("11222333000262").unwrap(), "11.222.333/0001-81");
        assert_eq!(find_headquarters("11.222.333/0002-62").unwrap(), "11.222.333/0001-81");
        assert_eq!(find_headquarters("11222333000181").unwrap(), "11.222.333/0001-81");
        assert_eq!(find_headquarters("12ABC34501DE35").unwrap(), "12.ABC.345/0001-88");
    }

    #[test]
    fn test_find_headquarters_errors() {
        assert!(matches!(
            find_headquarters("11111111111111"),
            Err(ValidationError::Invalid { .. })
        ));
        assert!(matches!(
            find_headquarters("11222333000182"),
            Err(ValidationError::Invalid { .. })
        ));
        assert!(matches!(
            find_headquarters("123"),
            Err(ValidationError::Format(FormatError::InvalidLength { .. }))
        ));
    }

    #[test]
    fn test_accessors() {
        let cnpj = Cnpj::parse("11.222.333/0002-62").unwrap();
        assert_eq!(cnpj.root(), "11222333");
        assert_eq!(cnpj.branch(), "0002");
        assert_eq!(cnpj.check_digits(), "62");
        assert!(!cnpj.is_headquarters());
        assert!(!cnpj.is_alphanumeric());

        let hq = cnpj.headquarters();
        assert!(hq.is_headquarters());
        assert_eq!(hq.as_str(), "11222333000181");
        assert_eq!(hq.headquarters(), hq);

        assert!(Cnpj::parse("12ABC34501DE35").unwrap().is_alphanumeric());
    }

    #[test]
    fn test_newtype_serde() {
        let cnpj: Cnpj = serde_json::from_str("\"11.222.333/0001-81\"").unwrap();
        assert_eq!(cnpj.to_string(), "11222333000181");
        assert_eq!(serde_json::to_string(&cnpj).unwrap(), "\"11222333000181\"");
        assert!(serde_json::from_str::<Cnpj>("\"11222333000182\"").is_err());
    }
}
