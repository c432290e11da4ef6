use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    donation_ledger::{
        AppState,
        adapters::{http, paystack::PaystackClient, webhook},
        config::Config,
        domain::notifier::LogNotifier,
        infra::postgres::donation_ledger::PgLedger,
        services::sweeper,
    },
    sqlx::postgres::PgPoolOptions,
    std::{sync::Arc, time::Duration},
    tokio::{signal, sync::watch},
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let gateway = PaystackClient::new(&config.gateway).expect("failed to build gateway client");

    let state = AppState {
        ledger: Arc::new(PgLedger::new(pool)),
        gateway: Arc::new(gateway),
        notifier: Arc::new(LogNotifier),
        webhook_secret: config.gateway.secret_key.clone().into(),
        min_amount: config.min_amount,
        sweep_max_age: config.sweep_max_age,
        default_callback_url: config.callback_url.clone(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle = tokio::spawn(sweeper::run_sweeper(
        state.ledger.clone(),
        state.notifier.clone(),
        config.sweep_max_age,
        config.sweep_interval,
        shutdown_rx,
    ));

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/donation", post(http::create_donation_handler))
        .route("/donation/verify", post(http::verify_donation_handler))
        .route(
            "/donation/webhook/paystack",
            post(webhook::paystack_webhook_handler),
        )
        .route("/donation/cleanup", post(http::cleanup_handler))
        .layer(DefaultBodyLimit::max(64 * 1024)) // gateway events are well under this
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    shutdown_tx.send(true).ok();
    sweeper_handle.await.ok();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
