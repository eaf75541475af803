use crate::{
    auth::AuthState,
    cli::{actions::Action, globals::GlobalArgs, telemetry},
    devconnect,
    store::{MemoryStore, PgStore, SharedStore},
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

/// Handle the server action
/// # Errors
/// Returns an error if the configuration is invalid, the database is unreachable or the server fails to start.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            let auth_state = Arc::new(
                AuthState::new(&globals.jwt_secret, globals.token_ttl_seconds)
                    .context("Invalid token signing configuration")?,
            );

            let store: SharedStore = match dsn {
                Some(dsn) => Arc::new(connect(&dsn).await?),
                None => {
                    warn!("No DSN configured, users are kept in memory");
                    Arc::new(MemoryStore::new())
                }
            };

            let result = devconnect::new(port, store, auth_state).await;

            telemetry::shutdown_tracer();

            result?;
        }
    }

    Ok(())
}

async fn connect(dsn: &str) -> Result<PgStore> {
    let url = Url::parse(dsn).context("Invalid DSN")?;

    info!("Connecting to {}", redact_dsn(&url));

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    let store = PgStore::new(pool);

    store
        .ensure_schema()
        .await
        .context("Failed to prepare database schema")?;

    Ok(store)
}

/// Render a DSN without its password.
fn redact_dsn(url: &Url) -> String {
    let mut redacted = url.clone();
    if redacted.password().is_some() && redacted.set_password(Some("****")).is_err() {
        return format!("{}://****", url.scheme());
    }
    redacted.to_string()
}
