//! # gsheet-core
//!
//! Core types for treating a spreadsheet tab as a table of records.
//!
//! This crate provides:
//! - Error types
//! - Sheet, record and ledger row types
//! - A1 range addressing
//! - The transport contract and an in-memory transport
//! - Configuration and sheet templates

/// A1 range addressing.
pub mod a1;
/// Runtime configuration.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// In-memory transport.
pub mod memory;
/// Sheet and record types.
pub mod model;
/// Header templates for new sheets.
pub mod template;
/// Transport contract.
pub mod transport;

/// Re-export configuration.
pub use config::StoreConfig;
/// Re-export core error types.
pub use error::{StoreError, StoreResult};
/// Re-export the in-memory transport.
pub use memory::MemoryTransport;
/// Re-export data model types.
pub use model::{LedgerEntry, Record, SheetData, SheetInfo};
/// Re-export templates.
pub use template::Template;
/// Re-export transport types.
pub use transport::{BatchReply, BatchRequest, SheetProperties, SheetsTransport};
