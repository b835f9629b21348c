use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use mobile_bank::config::Config;
use mobile_bank::db::AccountsStorage;
use mobile_bank::service::BankingService;

/// A throwaway SQLite file, removed on drop.
pub struct TempDb {
    pub path: PathBuf,
    pub url: String,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "mobile-bank-{}-{}-{}.sqlite",
            tag,
            std::process::id(),
            nanos
        ));
        let url = format!("sqlite:{}", path.display());
        Self { path, url }
    }

    pub async fn service(&self) -> BankingService {
        let storage = AccountsStorage::connect(&self.url)
            .await
            .expect("failed to open test database");
        BankingService::new(storage)
    }

    pub fn config(&self) -> Config {
        Config {
            database_url: self.url.clone(),
            ..Config::default()
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
