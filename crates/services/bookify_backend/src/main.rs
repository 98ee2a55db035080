// File: services/bookify_backend/src/main.rs
use axum::{routing::get, Router};
use bookify_booking::handlers::BookingState;
use bookify_booking::routes as booking_routes;
use bookify_common::logging;
use bookify_common::services::{BoxedError, PaymentService};
use bookify_config::load_config;
use bookify_db::{
    BookingRepository, DbClient, ServiceRepository, SqlBookingRepository, SqlServiceRepository,
};
use bookify_stripe::handlers::StripeState;
use bookify_stripe::routes as stripe_routes;
use bookify_stripe::StripePaymentService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));

    let db_client = DbClient::new(&config)
        .await
        .expect("Failed to connect to database");
    let bookings: Arc<dyn BookingRepository> =
        Arc::new(SqlBookingRepository::new(db_client.clone()));
    let services: Arc<dyn ServiceRepository> = Arc::new(SqlServiceRepository::new(db_client));
    bookings
        .init_schema()
        .await
        .expect("Failed to initialize bookings schema");
    services
        .init_schema()
        .await
        .expect("Failed to initialize services schema");

    let payments: Option<Arc<dyn PaymentService<Error = BoxedError>>> =
        if config.use_stripe && config.stripe.is_some() {
            info!("Stripe payment gateway enabled");
            Some(Arc::new(StripePaymentService::new(config.clone())))
        } else {
            info!("Stripe payment gateway disabled; bookings run without checkout");
            None
        };

    let booking_state = Arc::new(BookingState {
        config: config.clone(),
        bookings: bookings.clone(),
        services,
        payments,
    });
    let stripe_state = Arc::new(StripeState {
        config: config.clone(),
        bookings,
    });

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Bookify API!" }))
        .merge(booking_routes::routes(booking_state))
        .merge(stripe_routes::routes(stripe_state));

    let app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Bookify API listening on {}", addr);

    axum::serve(listener, app).await.expect("Server error");
}
