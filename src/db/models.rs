use crate::account::{Account, AccountKind, Kind};
use crate::error::BankError;
use chrono::{DateTime, Utc};

/// One row of the `accounts` table.
#[derive(Debug, Clone, PartialEq)]
pub struct DbAccount {
    pub phone_number: String,
    pub name: Option<String>,
    pub balance: f64,
    pub pin_hash: String,
    pub account_type: String,
    pub interest_rate: Option<f64>,
    pub loan_amount: Option<f64>,
    pub policy_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbAccount {
    /// Build the row for a freshly registered account.
    pub fn from_account(account: &Account, pin_hash: String) -> Self {
        let (interest_rate, loan_amount, policy_number) = match &account.kind {
            AccountKind::Mobile => (None, None, None),
            AccountKind::Savings { interest_rate } => (Some(*interest_rate), None, None),
            AccountKind::Loan { loan_amount } => (None, Some(*loan_amount), None),
            AccountKind::Insurance { policy_number } => (None, None, Some(policy_number.clone())),
        };
        let now = Utc::now();
        Self {
            phone_number: account.phone_number.clone(),
            name: account.name.clone(),
            balance: account.balance,
            pin_hash,
            account_type: account.kind.kind().as_str().to_string(),
            interest_rate,
            loan_amount,
            policy_number,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<DbAccount> for Account {
    type Error = BankError;

    fn try_from(row: DbAccount) -> Result<Self, Self::Error> {
        let corrupt = |reason: &str| BankError::CorruptRecord {
            phone: row.phone_number.clone(),
            reason: reason.to_string(),
        };

        let kind: Kind = row
            .account_type
            .parse()
            .map_err(|_| corrupt("unknown account_type"))?;

        let kind = match kind {
            Kind::Mobile => AccountKind::Mobile,
            Kind::Savings => AccountKind::Savings {
                interest_rate: row
                    .interest_rate
                    .ok_or_else(|| corrupt("savings account without interest_rate"))?,
            },
            Kind::Loan => AccountKind::Loan {
                loan_amount: row
                    .loan_amount
                    .ok_or_else(|| corrupt("loan account without loan_amount"))?,
            },
            Kind::Insurance => AccountKind::Insurance {
                policy_number: row
                    .policy_number
                    .clone()
                    .ok_or_else(|| corrupt("insurance account without policy_number"))?,
            },
        };

        Ok(Account {
            phone_number: row.phone_number,
            name: row.name,
            balance: row.balance,
            kind,
        })
    }
}

/// Columns rewritten after a balance-changing operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub balance: f64,
    pub loan_amount: Option<f64>,
    pub name: Option<String>,
}

impl AccountUpdate {
    pub fn balance(balance: f64) -> Self {
        Self {
            balance,
            loan_amount: None,
            name: None,
        }
    }
}

impl From<&Account> for AccountUpdate {
    fn from(account: &Account) -> Self {
        Self {
            balance: account.balance,
            loan_amount: account.loan_amount(),
            name: None,
        }
    }
}
