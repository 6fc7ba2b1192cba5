//! Core use-case services.
//!
//! # Responsibility
//! - Wrap ledger engine calls in transactions and change notifications.
//! - Keep CLI/FFI layers decoupled from storage details.

pub mod ledger_service;

pub use ledger_service::{
    ImportOutcome, ImportPreview, LedgerService, PreviewRow, ServiceError, ServiceResult,
};
