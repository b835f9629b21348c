use crate::account::{Account, AccountKind, InsuranceClaim};
use crate::db::models::{AccountUpdate, DbAccount};
use crate::db::sqlite::AccountsStorage;
use crate::error::BankError;
use crate::service::pin::{hash_pin, verify_pin};
use tracing::{info, warn};

/// Registration request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub phone_number: String,
    pub name: Option<String>,
    pub pin: String,
    pub kind: AccountKind,
}

/// Banking operations over the account store.
///
/// Mutating operations apply to a copy of the caller's account, persist the
/// result, and only then write the copy back, so a failed write leaves the
/// in-memory account as it was.
#[derive(Clone)]
pub struct BankingService {
    storage: AccountsStorage,
}

impl BankingService {
    pub fn new(storage: AccountsStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &AccountsStorage {
        &self.storage
    }

    pub async fn register(&self, new: NewAccount) -> Result<Account, BankError> {
        let phone_number = new.phone_number.trim();
        if phone_number.is_empty() {
            return Err(BankError::InvalidCommand(
                "phone number must not be empty".to_string(),
            ));
        }
        if new.pin.is_empty() {
            return Err(BankError::InvalidCommand("PIN must not be empty".to_string()));
        }
        match &new.kind {
            AccountKind::Savings { interest_rate } => ensure_rate(*interest_rate)?,
            AccountKind::Loan { loan_amount } => ensure_non_negative(*loan_amount)?,
            AccountKind::Insurance { policy_number } if policy_number.trim().is_empty() => {
                return Err(BankError::InvalidCommand(
                    "policy number must not be empty".to_string(),
                ));
            }
            _ => {}
        }

        if self.storage.get_by_phone(phone_number).await?.is_some() {
            warn!(phone = %phone_number, "registration refused: number already on record");
            return Err(BankError::DuplicateRegistration(phone_number.to_string()));
        }

        let name = new.name.filter(|n| !n.trim().is_empty());
        let account = Account::new(phone_number, name, new.kind);
        let row = DbAccount::from_account(&account, hash_pin(&new.pin));
        self.storage.create(&row).await?;

        info!(
            phone = %account.phone_number,
            kind = %account.kind.kind(),
            "account created"
        );
        Ok(account)
    }

    /// Unknown number and wrong PIN fail the same way.
    pub async fn authenticate(&self, phone_number: &str, pin: &str) -> Result<Account, BankError> {
        let phone_number = phone_number.trim();
        let Some(row) = self.storage.get_by_phone(phone_number).await? else {
            warn!(phone = %phone_number, "login failed");
            return Err(BankError::AuthenticationFailed);
        };
        if !verify_pin(pin, &row.pin_hash) {
            warn!(phone = %phone_number, "login failed");
            return Err(BankError::AuthenticationFailed);
        }

        let account = Account::try_from(row)?;
        info!(phone = %account.phone_number, kind = %account.kind.kind(), "logged in");
        Ok(account)
    }

    pub async fn deposit(&self, account: &mut Account, amount: f64) -> Result<f64, BankError> {
        let amount = ensure_amount(amount)?;
        let mut updated = account.clone();
        let balance = ensure_balance(updated.deposit(amount))?;
        self.storage
            .update(&updated.phone_number, &AccountUpdate::balance(balance))
            .await?;
        *account = updated;

        info!(phone = %account.phone_number, amount, balance, "deposit");
        Ok(balance)
    }

    pub async fn withdraw(&self, account: &mut Account, amount: f64) -> Result<f64, BankError> {
        let amount = ensure_amount(amount)?;
        let mut updated = account.clone();
        let balance = updated.withdraw(amount).inspect_err(|e| {
            warn!(phone = %account.phone_number, amount, error = %e, "withdrawal refused");
        })?;
        self.storage
            .update(&updated.phone_number, &AccountUpdate::balance(balance))
            .await?;
        *account = updated;

        info!(phone = %account.phone_number, amount, balance, "withdrawal");
        Ok(balance)
    }

    /// Move `amount` from `source` to the account registered under
    /// `target_phone`. Both balances are written in one transaction.
    /// Returns the target account as persisted.
    pub async fn transfer(
        &self,
        source: &mut Account,
        target_phone: &str,
        amount: f64,
    ) -> Result<Account, BankError> {
        let amount = ensure_amount(amount)?;
        let target_phone = target_phone.trim();
        if target_phone == source.phone_number {
            return Err(BankError::SelfTransfer);
        }
        if source.balance < amount {
            warn!(
                from = %source.phone_number,
                to = %target_phone,
                amount,
                "transfer refused: insufficient balance"
            );
            return Err(BankError::InsufficientFunds {
                balance: source.balance,
                requested: amount,
            });
        }

        let Some(row) = self.storage.get_by_phone(target_phone).await? else {
            return Err(BankError::AccountNotFound(target_phone.to_string()));
        };
        let mut target = Account::try_from(row)?;

        let mut updated = source.clone();
        updated.withdraw(amount)?;
        ensure_balance(target.deposit(amount))?;

        self.storage
            .transfer_balances(
                &updated.phone_number,
                updated.balance,
                &target.phone_number,
                target.balance,
            )
            .await?;
        *source = updated;

        info!(
            from = %source.phone_number,
            to = %target.phone_number,
            amount,
            "transfer"
        );
        Ok(target)
    }

    /// Re-read the persisted balance into `account`.
    pub async fn balance(&self, account: &mut Account) -> Result<f64, BankError> {
        let Some(row) = self.storage.get_by_phone(&account.phone_number).await? else {
            return Err(BankError::AccountNotFound(account.phone_number.clone()));
        };
        account.balance = row.balance;
        Ok(account.balance)
    }

    /// Change the display name stored for `account`.
    pub async fn rename(&self, account: &mut Account, name: &str) -> Result<(), BankError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BankError::InvalidCommand("name must not be empty".to_string()));
        }
        let fields = AccountUpdate {
            name: Some(name.to_string()),
            ..AccountUpdate::balance(account.balance)
        };
        self.storage.update(&account.phone_number, &fields).await?;
        account.name = Some(name.to_string());

        info!(phone = %account.phone_number, name = %name, "account renamed");
        Ok(())
    }

    pub fn calculate_interest(&self, account: &Account) -> Result<f64, BankError> {
        account.calculate_interest()
    }

    /// Returns the outstanding loan.
    pub async fn repay_loan(&self, account: &mut Account, amount: f64) -> Result<f64, BankError> {
        let amount = ensure_amount(amount)?;
        let mut updated = account.clone();
        let outstanding = updated.repay_loan(amount).inspect_err(|e| {
            warn!(phone = %account.phone_number, amount, error = %e, "loan repayment refused");
        })?;
        self.storage
            .update(&updated.phone_number, &AccountUpdate::from(&updated))
            .await?;
        *account = updated;

        info!(phone = %account.phone_number, amount, outstanding, "loan repayment");
        Ok(outstanding)
    }

    pub fn claim_insurance(
        &self,
        account: &Account,
        amount: f64,
    ) -> Result<InsuranceClaim, BankError> {
        let amount = ensure_amount(amount)?;
        account.claim_insurance(amount)
    }

    /// Every stored account, ordered by phone number.
    pub async fn accounts(&self) -> Result<Vec<Account>, BankError> {
        self.storage
            .list()
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }
}

/// Amounts moved by an operation must be finite and strictly positive.
pub fn ensure_amount(amount: f64) -> Result<f64, BankError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(BankError::InvalidAmount(format!(
            "{amount} is not a positive amount"
        )));
    }
    Ok(amount)
}

/// A balance that no longer fits in `f64` is refused before it is stored.
fn ensure_balance(balance: f64) -> Result<f64, BankError> {
    if !balance.is_finite() {
        return Err(BankError::InvalidAmount(
            "resulting balance is out of range".to_string(),
        ));
    }
    Ok(balance)
}

fn ensure_non_negative(amount: f64) -> Result<(), BankError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(BankError::InvalidAmount(format!(
            "{amount} must be zero or more"
        )));
    }
    Ok(())
}

fn ensure_rate(rate: f64) -> Result<(), BankError> {
    ensure_non_negative(rate)
        .map_err(|_| BankError::InvalidAmount(format!("{rate} is not a valid interest rate")))
}
