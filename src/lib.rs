//! TruthChain - a tamper-evident provenance ledger for written content
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`ledger`] - Entries, the hash-chained ledger, attestation and integrity checks
//! - [`clock`] - Injectable time sources for entry timestamps
//!
//! ## Classification
//! - [`classifier`] - AI-likelihood classifiers (offline heuristic, remote detector)
//!
//! ## Roles & Presentation
//! - [`participants`] - Content creators, fact checkers, publishers and end users
//! - [`dashboard`] - Terminal rendering of entries and chains
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`logging`] - Tracing subscriber setup

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod clock;
pub mod ledger;

// ============================================================================
// Classification
// ============================================================================
pub mod classifier;

// ============================================================================
// Roles & Presentation
// ============================================================================
pub mod dashboard;
pub mod participants;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
pub mod logging;

pub use error::{LedgerError, Result};
pub use ledger::{Entry, EntryView, Ledger, Validation, Violation, ViolationKind};
