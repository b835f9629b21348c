use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

use crate::account::Kind;

#[derive(Debug, ThisError)]
pub enum BankError {
    #[error("Mobile number {0} is already registered")]
    DuplicateRegistration(String),

    #[error("Invalid mobile number or PIN")]
    AuthenticationFailed,

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: f64, requested: f64 },

    #[error("Repayment of {requested} is more than the outstanding loan of {outstanding}")]
    OverRepayment { outstanding: f64, requested: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Operation `{operation}` is not available for {kind} accounts")]
    UnsupportedOperation { kind: Kind, operation: &'static str },

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Already logged in; logout first")]
    AlreadyLoggedIn,

    #[error("Stored account {phone} is unusable: {reason}")]
    CorruptRecord { phone: String, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl BankError {
    /// Infrastructure failures as opposed to refused operations.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            BankError::DatabaseError(_)
                | BankError::Io(_)
                | BankError::Config(_)
                | BankError::CorruptRecord { .. }
        )
    }
}

impl From<figment::Error> for BankError {
    fn from(e: figment::Error) -> Self {
        BankError::Config(Box::new(e))
    }
}
