//! xrpl-iot - a terminal remote control for devices listening on the XRP Ledger.
//!
//! Commands are sent as payments carrying an `IOT_COMMAND` memo. The crate
//! signs locally, submits over a rippled websocket and waits for validation.
//! A listener mode follows the same account and runs a configured device
//! action for every validated command.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing UI components and event handling.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "xrpl-iot";
