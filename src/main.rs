//! Server entry point: configuration, tracing, database pool, routers.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rentdesk::adapters::email::ResendNotifier;
use rentdesk::adapters::esign::HttpEsignProvider;
use rentdesk::adapters::http::billing::{billing_routes, webhook_routes, BillingAppState};
use rentdesk::adapters::http::esign::{esign_routes, EsignAppState};
use rentdesk::adapters::postgres::{PostgresBillingAccountStore, PostgresCreditStore};
use rentdesk::adapters::stripe::StripePaymentProvider;
use rentdesk::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let accounts = Arc::new(PostgresBillingAccountStore::new(pool.clone()));
    let credits = Arc::new(PostgresCreditStore::new(pool.clone()));
    let payments = Arc::new(StripePaymentProvider::new(&config.payment));
    let esign = Arc::new(HttpEsignProvider::new(&config.esign));
    let notifier = Arc::new(ResendNotifier::new(&config.email));

    let billing_state = BillingAppState {
        accounts: accounts.clone(),
        credits: credits.clone(),
        payments,
        notifier,
        webhook_secret: config.payment.webhook_secret.clone(),
        trial_days: config.payment.trial_days,
        billing_alerts_email: config.email.billing_alerts_email.clone(),
    };

    let esign_state = EsignAppState {
        credits,
        esign,
        call_timeout: config.esign.call_timeout(),
    };

    let app = Router::new()
        .nest(
            "/api/billing",
            billing_routes().with_state(billing_state.clone()),
        )
        .nest("/api/webhooks", webhook_routes().with_state(billing_state))
        .nest("/api/esign", esign_routes().with_state(esign_state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr()?;
    info!(%addr, environment = ?config.server.environment, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if config.is_production() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
