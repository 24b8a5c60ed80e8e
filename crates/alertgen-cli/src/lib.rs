//! # alertgen-cli
//!
//! Command-line front end of `alertgen-core`.
//!
//! Provides commands for:
//! - Generating `alert_rules.yml` and `notification_policies.yml`
//! - Checking a configuration without writing anything
//!
//! ```text
//! alerts_config.json ──► alertgen generate ──► alert_rules.yml
//!                                          └─► notification_policies.yml
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{CheckArgs, Cli, Commands, Format, GenerateArgs};
pub use error::CliError;
pub use output::Report;
