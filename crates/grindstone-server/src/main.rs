use std::sync::Arc;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod auth;
mod config;
mod models;
mod routes;

use adapters::{NoopPublisher, PgLedgerStore, RngSource, SystemClock, WebhookPublisher};
use application::{
    AmbientBossService, CampaignService, CurrencyService, EngineContext, FocusService,
    QuestService, ShopService, TitleService, XpService,
};
use config::EngineConfig;
use grindstone::EventPublisher;

/// Type aliases for application services over the Postgres ledger
pub type AppXpService = XpService<PgLedgerStore>;
pub type AppCurrencyService = CurrencyService<PgLedgerStore>;
pub type AppTitleService = TitleService<PgLedgerStore>;
pub type AppAmbientBossService = AmbientBossService<PgLedgerStore>;
pub type AppCampaignService = CampaignService<PgLedgerStore>;
pub type AppQuestService = QuestService<PgLedgerStore>;
pub type AppShopService = ShopService<PgLedgerStore>;
pub type AppFocusService = FocusService<PgLedgerStore>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub xp: Arc<AppXpService>,
    pub currency: Arc<AppCurrencyService>,
    pub titles: Arc<AppTitleService>,
    pub ambient: Arc<AppAmbientBossService>,
    pub campaign: Arc<AppCampaignService>,
    pub quests: Arc<AppQuestService>,
    pub shop: Arc<AppShopService>,
    pub focus: Arc<AppFocusService>,
}

impl AppState {
    pub fn new(ctx: Arc<EngineContext<PgLedgerStore>>) -> Self {
        Self {
            xp: Arc::new(XpService::new(ctx.clone())),
            currency: Arc::new(CurrencyService::new(ctx.clone())),
            titles: Arc::new(TitleService::new(ctx.clone())),
            ambient: Arc::new(AmbientBossService::new(ctx.clone())),
            campaign: Arc::new(CampaignService::new(ctx.clone())),
            quests: Arc::new(QuestService::new(ctx.clone())),
            shop: Arc::new(ShopService::new(ctx.clone())),
            focus: Arc::new(FocusService::new(ctx)),
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
        message: "Grindstone API is running - keep grinding".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("⚒️ Grindstone API initializing...");

    // Local development falls back to .env
    if dotenvy::dotenv().is_ok() {
        tracing::info!("📄 Loaded .env");
    }
    let lookup = |key: &str| secrets.get(key).or_else(|| std::env::var(key).ok());

    // Initialize API key for internal routes
    if let Some(api_key) = lookup("GRINDSTONE_API_KEY") {
        auth::init_api_key(api_key);
        tracing::info!("🔐 Internal API key authentication enabled");
    } else {
        tracing::warn!("⚠️  No GRINDSTONE_API_KEY set - internal routes are open");
    }

    let config = EngineConfig::from_lookup(lookup).context("Invalid engine configuration")?;
    tracing::info!("⚙️ Engine config: {:?}", config);

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations completed");

    // Event delivery
    let events: Arc<dyn EventPublisher> = match lookup("GRINDSTONE_WEBHOOK_URL") {
        Some(url) => {
            let publisher = WebhookPublisher::new(url, lookup("GRINDSTONE_WEBHOOK_SECRET"))
                .context("Failed to build webhook publisher")?;
            tracing::info!("🔔 Webhook event delivery enabled");
            Arc::new(publisher)
        }
        None => {
            tracing::warn!("⚠️  No GRINDSTONE_WEBHOOK_URL set - events are dropped");
            Arc::new(NoopPublisher)
        }
    };

    // Initialize application services
    let ctx = Arc::new(EngineContext::new(
        Arc::new(PgLedgerStore::new(pool)),
        Arc::new(RngSource::from_entropy()),
        Arc::new(SystemClock),
        events,
        config,
    ));
    let state = AppState::new(ctx);

    // Pipeline routes (require API key)
    let internal_routes =
        routes::internal::router().layer(middleware::from_fn(auth::auth_middleware));

    // User routes (identity resolved per request)
    let user_routes = Router::new()
        .merge(routes::me::router())
        .merge(routes::combat::router())
        .merge(routes::quests::router())
        .merge(routes::shop::router());

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    // Build router with shared state
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(user_routes)
        .merge(internal_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Grindstone API ready");

    Ok(router.into())
}
