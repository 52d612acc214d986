// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Brazilian taxpayer document toolkit
//!
//! Validates, normalizes and formats CPF and CNPJ numbers, and queries a
//! public CNPJ registry API with client-side throttling:
//!
//! - CPF: 11 digits, two modulo-11 check digits
//! - CNPJ: 14 characters, numeric or alphanumeric (`A`-`Z` in the first 12)
//! - Headquarters derivation from any branch CNPJ
//! - Minimum-interval rate limiting shared across concurrent lookups
//! - Server-declared release times honoured on 429 responses

mod checksum;

pub mod cnpj;
pub mod config;
pub mod cpf;
pub mod error;
pub mod input;
pub mod limiter;
pub mod lookup;
pub mod release;

pub use cnpj::{
    calculate_cnpj_digit, character_value, check_cnpj, find_headquarters, format_cnpj,
    normalize_cnpj, validate_cnpj, Cnpj,
};
pub use config::LookupConfig;
pub use cpf::{calculate_cpf_digit, check_cpf, format_cpf, normalize_cpf, validate_cpf, Cpf};
pub use error::{ApiError, FormatError, LookupError, TransportKind, ValidationError};
pub use input::{DocumentInput, DocumentKind};
pub use limiter::RateLimiter;
pub use lookup::{RegistryClient, RegistryRecord};
