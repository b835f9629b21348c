use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::BankError;

/// Runtime configuration, read from `BANK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite connection string, e.g. `sqlite:mobile_banking_system.db`.
    pub database_url: String,
    pub loglevel: String,
    /// Currency label appended to rendered amounts.
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:mobile_banking_system.db".to_string(),
            loglevel: "info".to_string(),
            currency: "Tk".to_string(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("BANK_"))
    }

    pub fn load() -> Result<Self, BankError> {
        Ok(Self::figment().extract()?)
    }

    /// Render an amount the way the console shows balances: `1000 Tk/=`.
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{} {}/=", amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BANK_DATABASE_URL", "sqlite::memory:");
            jail.set_env("BANK_CURRENCY", "BDT");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.database_url, "sqlite::memory:");
            assert_eq!(cfg.currency, "BDT");
            assert_eq!(cfg.loglevel, "info");
            Ok(())
        });
    }

    #[test]
    fn amounts_carry_currency_suffix() {
        let cfg = Config::default();
        assert_eq!(cfg.format_amount(1000.0), "1000 Tk/=");
        assert_eq!(cfg.format_amount(12.5), "12.5 Tk/=");
    }
}
