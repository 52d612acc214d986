// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! brdoc command-line tool
//!
//! Validates, formats and looks up Brazilian CPF and CNPJ numbers.
//!
//! ## Usage
//!
//! ```text
//! brdoc cpf validate 111.444.777-35
//! brdoc cnpj format 12abc34501de35
//! brdoc cnpj headquarters 11.222.333/0002-62
//! brdoc cnpj lookup 11.222.333/0001-81 --timeout 15
//! ```
//!
//! ## Configuration
//!
//! Lookups read optional environment variables:
//!
//! - `BRDOC_BASE_URL`: Registry base URL (default: https://publica.cnpj.ws/cnpj/)
//! - `BRDOC_MAX_RATE_RPM`: Registry requests per minute (default: 3)
//! - `BRDOC_TIMEOUT_SECS`: Request timeout in seconds (default: 10)
//!
//! Logs are JSON lines on stderr, filtered by `RUST_LOG` (default: info).

use std::process::ExitCode;
use std::time::Duration;

use brdoc::{
    find_headquarters, format_cnpj, format_cpf, validate_cnpj, validate_cpf, LookupConfig,
    RegistryClient,
};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "brdoc", version, about = "Brazilian CPF and CNPJ toolkit")]
struct Args {
    #[command(subcommand)]
    document: Document,
}

#[derive(Subcommand)]
enum Document {
    /// Individual taxpayer number (CPF)
    Cpf {
        #[command(subcommand)]
        action: CpfAction,
    },
    /// Company registration number (CNPJ)
    Cnpj {
        #[command(subcommand)]
        action: CnpjAction,
    },
}

#[derive(Subcommand)]
enum CpfAction {
    /// Print the normalized CPF if valid, exit 1 otherwise
    Validate { value: String },
    /// Print the CPF as DDD.DDD.DDD-DD
    Format { value: String },
}

#[derive(Subcommand)]
enum CnpjAction {
    /// Print the normalized CNPJ if valid, exit 1 otherwise
    Validate { value: String },
    /// Print the CNPJ as XX.XXX.XXX/XXXX-XX
    Format { value: String },
    /// Print the headquarters CNPJ of a branch
    Headquarters { value: String },
    /// Query the public registry and print the record as JSON
    Lookup {
        value: String,

        /// Request timeout in seconds (default: BRDOC_TIMEOUT_SECS or 10)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    match args.document {
        Document::Cpf { action } => match action {
            CpfAction::Validate { value } => Ok(report_validation(validate_cpf(&value))),
            CpfAction::Format { value } => {
                println!("{}", format_cpf(&value)?);
                Ok(ExitCode::SUCCESS)
            }
        },
        Document::Cnpj { action } => match action {
            CnpjAction::Validate { value } => Ok(report_validation(validate_cnpj(&value))),
            CnpjAction::Format { value } => {
                println!("{}", format_cnpj(&value)?);
                Ok(ExitCode::SUCCESS)
            }
            CnpjAction::Headquarters { value } => {
                println!("{}", find_headquarters(&value)?);
                Ok(ExitCode::SUCCESS)
            }
            CnpjAction::Lookup { value, timeout } => lookup(&value, timeout).await,
        },
    }
}

fn report_validation(result: Option<String>) -> ExitCode {
    match result {
        Some(clean) => {
            println!("{clean}");
            ExitCode::SUCCESS
        }
        None => {
            println!("invalid");
            ExitCode::FAILURE
        }
    }
}

async fn lookup(value: &str, timeout: Option<u64>) -> anyhow::Result<ExitCode> {
    let config = load_config();
    let timeout = timeout.map(Duration::from_secs).unwrap_or(config.timeout());
    info!(
        base_url = %config.base_url,
        max_rate_rpm = config.max_rate_rpm,
        ?timeout,
        "Looking up CNPJ"
    );

    let client = RegistryClient::new(config)?;
    match client.lookup(value, timeout).await? {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("CNPJ {value} not found");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_config() -> LookupConfig {
    let mut config = LookupConfig::default();
    if let Ok(base_url) = std::env::var("BRDOC_BASE_URL") {
        config.base_url = base_url;
    }
    if let Some(rpm) = std::env::var("BRDOC_MAX_RATE_RPM")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.max_rate_rpm = rpm;
    }
    if let Some(secs) = std::env::var("BRDOC_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.timeout_secs = secs;
    }
    config
}
