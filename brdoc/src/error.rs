// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for document handling and registry lookups.
//!
//! A failed checksum is not an error here: the convenience validators report
//! it as `None`. Errors are reserved for malformed input and for lookups that
//! failed for a reason other than "not found".

use crate::input::DocumentKind;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Input is not a syntactically valid identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{kind} must have {expected} characters, got {actual}: {value:?}")]
    InvalidLength {
        kind: DocumentKind,
        expected: usize,
        actual: usize,
        value: String,
    },

    #[error("{kind} contains invalid character {character:?}: {value:?}")]
    InvalidCharacter {
        kind: DocumentKind,
        character: char,
        value: String,
    },

    #[error("{kind} integer out of range (negative or wider than {} digits): {value}", .kind.width())]
    IntegerOutOfRange { kind: DocumentKind, value: i128 },

    #[error("partial {kind} must have {} or {} characters, got {actual}: {value:?}", .expected.0, .expected.1)]
    InvalidPartialLength {
        kind: DocumentKind,
        expected: (usize, usize),
        actual: usize,
        value: String,
    },
}

/// Input parsed but is not a valid document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("{kind} {value} is invalid")]
    Invalid { kind: DocumentKind, value: String },
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The request exceeded its timeout.
    Timeout,
    /// Connection or TLS handshake failed.
    Connect,
    /// The request could not be built or sent.
    Request,
    /// Reading the response body failed.
    Body,
    /// Anything reqwest does not classify.
    Other,
}

impl TransportKind {
    pub(crate) fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_body() || err.is_decode() {
            Self::Body
        } else if err.is_request() || err.is_builder() {
            Self::Request
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connection failure"),
            Self::Request => write!(f, "request failure"),
            Self::Body => write!(f, "body failure"),
            Self::Other => write!(f, "transport failure"),
        }
    }
}

/// Registry lookup failed for a reason other than "not found".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("registry API {kind}: {source}")]
    Transport {
        kind: TransportKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry API returned status {status}")]
    UnexpectedStatus {
        status: u16,
        titulo: Option<String>,
        detalhes: Option<String>,
    },

    #[error("registry API returned a malformed body with status {status}")]
    MalformedBody {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not extract release time from throttling response: {detalhes:?}")]
    ReleaseTimeMissing { detalhes: Option<String> },

    #[error("declared release time is {wait:?} away, beyond the configured maximum")]
    ReleaseTooDistant { wait: Duration },

    #[error("registry API kept throttling after {attempts} attempts")]
    ThrottleRetriesExhausted { attempts: u32 },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("registry base URL must be an absolute http(s) URL: {url:?}")]
    InvalidBaseUrl { url: String },
}

impl ApiError {
    pub(crate) fn transport(source: reqwest::Error) -> Self {
        Self::Transport {
            kind: TransportKind::classify(&source),
            source,
        }
    }

    /// Transport category, when the failure happened below HTTP.
    pub fn transport_kind(&self) -> Option<TransportKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Error from the checked lookup entry point.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
