use std::any::Any;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Result, anyhow};
use axum::middleware;
use axum::{
    Router,
    extract::Request,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, StatusCode, header};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::public::ApiError;
use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::chat::ChatBot;
use crate::core::AppConfig;

async fn set_static_cache_control(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

// The static file service answers other methods with a plain text 405
async fn json_method_not_allowed(request: Request, next: middleware::Next) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return ApiError::MethodNotAllowed.into_response();
    }
    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        String::from("unknown panic")
    };
    ApiError::Internal(anyhow!("Request handler panicked: {}", detail)).into_response()
}

pub fn app(shared_state: SharedState) -> Router {
    let cors = CorsLayer::permissive();
    let ui_path = shared_state
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .ui_path
        .clone();
    // Anything that isn't a file in the UI directory gets the chat page
    let index = ServeFile::new(Path::new(&ui_path).join("index.html"));

    Router::new()
        // API routes
        .nest("/api", routes::router())
        // Static server of the chat UI
        .fallback_service(
            ServiceBuilder::new()
                .layer(middleware::from_fn(set_static_cache_control))
                .layer(middleware::from_fn(json_method_not_allowed))
                .service(ServeDir::new(&ui_path).fallback(index)),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

pub fn init_tracing(debug: bool) {
    let default_filter = if debug {
        // axum logs rejections from built-in extractors with the `axum::rejection`
        // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
        format!(
            "{}=debug,tower_http=debug,axum::rejection=trace",
            env!("CARGO_CRATE_NAME")
        )
    } else {
        format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// Run the server
pub async fn serve(host: String, port: u16, config: AppConfig) -> Result<()> {
    init_tracing(config.debug);

    let chatbot = ChatBot::from_config(&config)?;
    tracing::info!(
        "Chatbot initialized. Model: {}, document search: {}",
        chatbot.model(),
        if chatbot.has_search() { "enabled" } else { "disabled" }
    );

    let app_state = AppState::new(chatbot, &config.ui_path);
    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!(
        "Server started. Listening on http://{} (debug: {})",
        listener.local_addr()?,
        config.debug
    );

    axum::serve(listener, app).await?;

    Ok(())
}
