use mimalloc::MiMalloc;
use mobile_bank::config::Config;
use mobile_bank::db::AccountsStorage;
use mobile_bank::service::BankingService;
use mobile_bank::session::{self, Session};
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        loglevel = %cfg.loglevel,
        currency = %cfg.currency
    );

    let storage = AccountsStorage::connect(&cfg.database_url).await?;
    let service = BankingService::new(storage);

    let mut session = Session::new(service, cfg);
    session::run(&mut session, BufReader::new(stdin()), stdout()).await?;

    info!("session closed");
    Ok(())
}
