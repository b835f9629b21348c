pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod session;
pub mod types;

pub use account::{Account, AccountKind, Kind};
pub use error::BankError;
pub use service::{BankingService, NewAccount};
