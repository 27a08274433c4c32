// Thin re-export module: the ledger is split into the entry record, the chain
// that owns entries, and the whole-chain integrity checks.

pub mod chain;
pub mod entry;
#[cfg(any(test, feature = "tamper"))]
pub mod raw;
pub mod validation;

pub use chain::*;
pub use entry::*;
#[cfg(any(test, feature = "tamper"))]
pub use raw::RawEntry;
pub use validation::{Validation, Violation, ViolationKind};
