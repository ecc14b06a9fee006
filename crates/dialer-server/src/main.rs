use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dialer::{CallRepository, TelephonyProvider, UserResolver};

mod adapters;
mod application;
mod auth;
mod config;
mod models;
mod routes;

use adapters::{
    PgCallRepository, StaticTokenResolver, TwilioClient, UnconfiguredTelephony, WebhookSignature,
};
use application::{CallOriginator, EventCorrelator, OriginationSettings};
use config::DialerConfig;

/// Type aliases for application services behind trait objects
pub type AppCallOriginator = CallOriginator<dyn CallRepository, dyn TelephonyProvider>;
pub type AppEventCorrelator = EventCorrelator<dyn CallRepository>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub call_repo: Arc<dyn CallRepository>,
    pub originator: Arc<AppCallOriginator>,
    pub correlator: Arc<AppEventCorrelator>,
    pub user_resolver: Arc<dyn UserResolver>,
    pub webhook_signature: Arc<WebhookSignature>,
}

impl AppState {
    pub fn new(
        call_repo: Arc<dyn CallRepository>,
        provider: Arc<dyn TelephonyProvider>,
        user_resolver: Arc<dyn UserResolver>,
        settings: OriginationSettings,
        webhook_signature: WebhookSignature,
    ) -> Self {
        Self {
            originator: Arc::new(CallOriginator::new(call_repo.clone(), provider, settings)),
            correlator: Arc::new(EventCorrelator::new(call_repo.clone())),
            call_repo,
            user_resolver,
            webhook_signature: Arc::new(webhook_signature),
        }
    }
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Dialer API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn build_router(state: AppState) -> Router {
    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .merge(routes::calls::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::webhooks::router())
        .merge(routes::voice::router())
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("📞 Dialer API initializing...");

    let config = DialerConfig::from_secrets(&secrets);

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(shuttle_runtime::CustomError::new)?;

    tracing::info!("✅ Database migrations completed");

    let provider: Arc<dyn TelephonyProvider> = match config.twilio.clone() {
        Some(twilio) => {
            let client = TwilioClient::new(twilio, config.provider_timeout)
                .map_err(shuttle_runtime::CustomError::new)?;
            tracing::info!("☎️  Twilio provider configured");
            Arc::new(client)
        }
        None => {
            tracing::warn!("⚠️  No Twilio credentials set - every origination will fail");
            Arc::new(UnconfiguredTelephony)
        }
    };

    if config.from_number.is_empty() {
        tracing::warn!("⚠️  No TWILIO_PHONE_NUMBER set");
    }

    let user_resolver = StaticTokenResolver::new(config.api_keys.clone());
    if user_resolver.is_empty() {
        tracing::warn!("⚠️  No DIALER_API_KEYS set - /calls will reject every request");
    } else {
        tracing::info!("🔐 API key authentication enabled");
    }

    let webhook_signature = WebhookSignature::new(config.analyzer_webhook_secret.clone());
    if webhook_signature.is_enabled() {
        tracing::info!("🔏 Decision webhook signatures required");
    } else {
        tracing::warn!("⚠️  No ANALYZER_WEBHOOK_SECRET set - decision webhooks are unsigned");
    }

    let state = AppState::new(
        Arc::new(PgCallRepository::new(pool)),
        provider,
        Arc::new(user_resolver),
        config.origination_settings(),
        webhook_signature,
    );

    tracing::info!("🔔 Webhooks: {}", config.status_callback_url());
    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Dialer API ready");

    Ok(build_router(state).into())
}
