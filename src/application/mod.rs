// Application layer - the ledger engine and its error type.
// Transports (HTTP today) call into `LedgerService` and never touch the
// account store directly.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
