use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seat_sync::{
    api::BookingApiClient, config::Config, connection::ConnectionManager, models::UserIdentity,
    store::SeatStoreHandle, SyncContext,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting seat sync client");

    let identity = UserIdentity::local();
    let session_id = config.app.session_id.clone();
    let ctx = SyncContext::new(config, identity, session_id);
    info!(user = %ctx.identity.id, session = %ctx.session_id, "local identity ready");

    let store = SeatStoreHandle::new(&ctx.identity.id);

    // Seed the store with a full snapshot before streaming deltas on top.
    let api = BookingApiClient::new(&ctx.config.api).expect("failed to build HTTP client");
    match api.get_session(&ctx.session_id).await {
        Ok(session) => {
            info!(
                movie = %session.movie_title,
                seats = session.seats.len(),
                "session snapshot loaded"
            );
            store.load_snapshot(session);
        }
        Err(e) => error!(error = %e, "could not load session snapshot"),
    }

    let connection = ConnectionManager::start(&ctx, store.clone());
    connection.connect().await;

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");
    info!("Shutting down");

    connection.disconnect().await;

    let (available, locked, booked) = store.with(|s| {
        (
            s.available_seats().len(),
            s.locked_seats().len(),
            s.booked_seats().len(),
        )
    });
    info!(available, locked, booked, "final seat map");
}
