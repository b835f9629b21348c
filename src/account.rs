//! In-memory account objects.
//!
//! Every account supports deposit and withdraw. The kind payload decides which
//! of interest, loan repayment and insurance claims are available.

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::error::BankError;

/// Account kind tag as stored in the `account_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Mobile,
    Savings,
    Loan,
    Insurance,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Mobile => "mobile",
            Kind::Savings => "savings",
            Kind::Loan => "loan",
            Kind::Insurance => "insurance",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" | "plain" => Ok(Kind::Mobile),
            "savings" => Ok(Kind::Savings),
            "loan" => Ok(Kind::Loan),
            "insurance" => Ok(Kind::Insurance),
            other => Err(BankError::InvalidCommand(format!(
                "unknown account type `{other}`"
            ))),
        }
    }
}

/// Kind plus the field that only that kind carries.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountKind {
    Mobile,
    Savings { interest_rate: f64 },
    Loan { loan_amount: f64 },
    Insurance { policy_number: String },
}

impl AccountKind {
    pub fn kind(&self) -> Kind {
        match self {
            AccountKind::Mobile => Kind::Mobile,
            AccountKind::Savings { .. } => Kind::Savings,
            AccountKind::Loan { .. } => Kind::Loan,
            AccountKind::Insurance { .. } => Kind::Insurance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsuranceClaim {
    pub policy_number: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub phone_number: String,
    pub name: Option<String>,
    pub balance: f64,
    pub kind: AccountKind,
}

impl Account {
    pub fn new(phone_number: impl Into<String>, name: Option<String>, kind: AccountKind) -> Self {
        Self {
            phone_number: phone_number.into(),
            name,
            balance: 0.0,
            kind,
        }
    }

    pub fn deposit(&mut self, amount: f64) -> f64 {
        self.balance += amount;
        self.balance
    }

    /// Leaves the balance untouched when it does not cover `amount`.
    pub fn withdraw(&mut self, amount: f64) -> Result<f64, BankError> {
        if self.balance < amount {
            return Err(BankError::InsufficientFunds {
                balance: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }

    pub fn calculate_interest(&self) -> Result<f64, BankError> {
        match &self.kind {
            AccountKind::Savings { interest_rate } => Ok(self.balance * interest_rate),
            other => Err(unsupported(other.kind(), "interest")),
        }
    }

    /// Returns the outstanding loan after the repayment.
    pub fn repay_loan(&mut self, amount: f64) -> Result<f64, BankError> {
        let kind = self.kind.kind();
        match &mut self.kind {
            AccountKind::Loan { loan_amount } => {
                if amount > *loan_amount {
                    return Err(BankError::OverRepayment {
                        outstanding: *loan_amount,
                        requested: amount,
                    });
                }
                *loan_amount -= amount;
                Ok(*loan_amount)
            }
            _ => Err(unsupported(kind, "repay")),
        }
    }

    pub fn claim_insurance(&self, amount: f64) -> Result<InsuranceClaim, BankError> {
        match &self.kind {
            AccountKind::Insurance { policy_number } => {
                info!(
                    phone = %self.phone_number,
                    policy = %policy_number,
                    amount,
                    "insurance claim filed"
                );
                Ok(InsuranceClaim {
                    policy_number: policy_number.clone(),
                    amount,
                })
            }
            other => Err(unsupported(other.kind(), "claim")),
        }
    }

    pub fn loan_amount(&self) -> Option<f64> {
        match self.kind {
            AccountKind::Loan { loan_amount } => Some(loan_amount),
            _ => None,
        }
    }
}

fn unsupported(kind: Kind, operation: &'static str) -> BankError {
    BankError::UnsupportedOperation { kind, operation }
}
