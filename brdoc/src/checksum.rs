// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Modulo-11 check digit rule shared by CPF and CNPJ.

/// Compute a check digit from positional values and their weights.
///
/// `sum(value * weight) mod 11`; a remainder below 2 yields 0, otherwise
/// the digit is `11 - remainder`. Callers pass sequences of equal length.
pub(crate) fn mod11_digit<I>(values: I, weights: &[u32]) -> u8
where
    I: IntoIterator<Item = u32>,
{
    let sum: u32 = values
        .into_iter()
        .zip(weights.iter())
        .map(|(value, weight)| value * weight)
        .sum();

    match sum % 11 {
        remainder if remainder < 2 => 0,
        // remainder is in 2..=10, so the digit fits 1..=9
        remainder => (11 - remainder) as u8,
    }
}

/// Decimal text for a single check digit.
pub(crate) fn digit_char(digit: u8) -> char {
    char::from(b'0' + digit)
}
