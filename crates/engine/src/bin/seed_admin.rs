//! Create the default administrator account.
//!
//! Safe to run repeatedly: nothing happens once an admin exists.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sidesa_engine::infrastructure::{
    clock::SystemClock,
    config::{load_dotenv_from_repo_root, AppConfig},
    persistence::SqliteRepository,
};
use sidesa_engine::use_cases::UserUseCases;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sidesa_engine=info,seed_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let repos = SqliteRepository::new(&config.database_url).await?;
    let users = UserUseCases::new(
        Arc::new(repos.users()),
        Arc::new(SystemClock::new()),
        config.cooldown,
    );

    match users.seed_admin().await? {
        Some(admin) => tracing::info!(user_id = %admin.id, email = %admin.email, "Admin created"),
        None => tracing::info!("Admin already present, nothing to do"),
    }

    Ok(())
}
