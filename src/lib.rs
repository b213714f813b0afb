pub mod application;
pub mod cli;
pub mod domain;
pub mod http;
pub mod storage;
pub mod telemetry;

pub use application::{LedgerError, LedgerService};
pub use domain::*;
pub use storage::AccountStore;
