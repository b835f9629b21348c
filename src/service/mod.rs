pub mod banking;
pub mod pin;

pub use banking::{BankingService, NewAccount};
