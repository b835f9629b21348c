use crate::db::models::{AccountUpdate, DbAccount};
use crate::db::schema::SQLITE_INIT;
use crate::error::BankError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const SELECT_BY_PHONE: &str = r#"SELECT phone_number, name, balance, pin_hash, account_type,
    interest_rate, loan_amount, policy_number, created_at, updated_at
    FROM accounts WHERE phone_number = ?"#;

const SELECT_ALL: &str = r#"SELECT phone_number, name, balance, pin_hash, account_type,
    interest_rate, loan_amount, policy_number, created_at, updated_at
    FROM accounts ORDER BY phone_number"#;

/// Handle to the account table. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct AccountsStorage {
    pool: SqlitePool,
}

impl AccountsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and ensure the schema.
    pub async fn connect(database_url: &str) -> Result<Self, BankError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BankError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a new row. A row with the same phone number already present
    /// yields `DuplicateRegistration`.
    pub async fn create(&self, account: &DbAccount) -> Result<(), BankError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                phone_number, name, balance, pin_hash, account_type,
                interest_rate, loan_amount, policy_number, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.phone_number)
        .bind(&account.name)
        .bind(account.balance)
        .bind(&account.pin_hash)
        .bind(&account.account_type)
        .bind(account.interest_rate)
        .bind(account.loan_amount)
        .bind(&account.policy_number)
        .bind(account.created_at.to_rfc3339())
        .bind(account.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                BankError::DuplicateRegistration(account.phone_number.clone()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_phone(&self, phone_number: &str) -> Result<Option<DbAccount>, BankError> {
        let row = sqlx::query(SELECT_BY_PHONE)
            .bind(phone_number)
            .fetch_optional(&self.pool)
            .await?;
        debug!(phone = %phone_number, found = row.is_some(), "account lookup");
        row.map(Self::row_to_model).transpose()
    }

    pub async fn list(&self) -> Result<Vec<DbAccount>, BankError> {
        let rows = sqlx::query(SELECT_ALL).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    /// Overwrite the balance, plus the loan amount and name when given.
    pub async fn update(&self, phone_number: &str, fields: &AccountUpdate) -> Result<(), BankError> {
        let updated_at = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"UPDATE accounts SET
                balance = ?,
                loan_amount = COALESCE(?, loan_amount),
                name = COALESCE(?, name),
                updated_at = ?
              WHERE phone_number = ?"#,
        )
        .bind(fields.balance)
        .bind(fields.loan_amount)
        .bind(&fields.name)
        .bind(updated_at)
        .bind(phone_number)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BankError::AccountNotFound(phone_number.to_string()));
        }
        Ok(())
    }

    /// Write both sides of a transfer in a single transaction.
    pub async fn transfer_balances(
        &self,
        source: &str,
        source_balance: f64,
        target: &str,
        target_balance: f64,
    ) -> Result<(), BankError> {
        let updated_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for (phone_number, balance) in [(source, source_balance), (target, target_balance)] {
            let result = sqlx::query(
                "UPDATE accounts SET balance = ?, updated_at = ? WHERE phone_number = ?",
            )
            .bind(balance)
            .bind(&updated_at)
            .bind(phone_number)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // dropping `tx` rolls back the other side
                return Err(BankError::AccountNotFound(phone_number.to_string()));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    fn row_to_model(row: SqliteRow) -> Result<DbAccount, BankError> {
        let phone_number: String = row.try_get("phone_number")?;
        let name: Option<String> = row.try_get("name")?;
        let balance: f64 = row.try_get("balance")?;
        let pin_hash: String = row.try_get("pin_hash")?;
        let account_type: String = row.try_get("account_type")?;
        let interest_rate: Option<f64> = row.try_get("interest_rate")?;
        let loan_amount: Option<f64> = row.try_get("loan_amount")?;
        let policy_number: Option<String> = row.try_get("policy_number")?;
        let created_str: String = row.try_get("created_at")?;
        let updated_str: String = row.try_get("updated_at")?;

        Ok(DbAccount {
            phone_number,
            name,
            balance,
            pin_hash,
            account_type,
            interest_rate,
            loan_amount,
            policy_number,
            created_at: parse_timestamp(&created_str)?,
            updated_at: parse_timestamp(&updated_str)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, BankError> {
    let ts = DateTime::parse_from_rfc3339(s)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc);
    Ok(ts)
}
