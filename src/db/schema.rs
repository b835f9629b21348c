//! SQL DDL for initializing the account storage.

/// SQLite schema with:
/// - `phone_number` TEXT PRIMARY KEY (the account identity)
/// - `balance` REAL, starts at 0
/// - `pin_hash` hex SHA-256 of the PIN, never the PIN itself
/// - `account_type` one of `mobile`, `savings`, `loan`, `insurance`
/// - `interest_rate` / `loan_amount` / `policy_number` set only for the matching type
/// - `created_at` / `updated_at` RFC3339 text
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    phone_number TEXT PRIMARY KEY NOT NULL,
    name TEXT NULL,
    balance REAL NOT NULL DEFAULT 0,
    pin_hash TEXT NOT NULL,
    account_type TEXT NOT NULL,
    interest_rate REAL NULL,
    loan_amount REAL NULL,
    policy_number TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);
"#;
