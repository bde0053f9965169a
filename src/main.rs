//! Report Insight Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

mod api;
mod config;
mod error;
mod middleware;
mod models;
mod services;
mod state;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::ApiDoc;
use crate::config::Config;
use crate::services::router::QueryRouter;
use crate::services::{ClassifierBundle, ReportSource};
use crate::state::{AppState, LoadedReport};

/// Fetch the report and train the classifier once at startup.
///
/// A failure here is not fatal: the server starts with nothing loaded and
/// reports NOT_READY until a refresh succeeds.
async fn initial_load(source: &ReportSource, state: &AppState) {
    let raw = match source.fetch().await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Initial report fetch failed: {}", e);
            warn!("Starting without data; POST /api/v1/report/refresh to retry");
            return;
        }
    };

    let report = LoadedReport::new(raw);
    let records = services::build_records(&report.raw);
    info!(
        report_id = %report.id,
        tests = records.len(),
        "Initial report loaded"
    );

    match ClassifierBundle::train(&records) {
        Ok(bundle) => state.install(report, bundle).await,
        Err(e) => {
            warn!("Initial classifier training failed: {}", e);
            state.install_report(report).await;
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, RIS_REPORT_URL must be set");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Report Insight Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development default for RIS_REPORT_URL");
    }

    // Build the report source
    let source = match ReportSource::new(config.report_url.clone(), config.fetch_timeout) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to build report source: {}", e);
            std::process::exit(1);
        }
    };
    info!("Report source: {}", source.url());

    // Load the report and train the classifier before accepting queries
    let state = web::Data::new(AppState::new());
    initial_load(&source, &state).await;

    let router = web::Data::new(QueryRouter::new(config.display_offset()));
    let source = web::Data::new(source);

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let cors_origin = config.cors_origin.clone();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (2 workers - development mode)",
            bind_address
        );
        2
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600);
            if let Some(origin) = &cors_origin {
                cors = cors.allowed_origin(origin);
            }
            cors
        };

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(middleware::RequestLogger)
            // Add shared state
            .app_data(state.clone())
            .app_data(router.clone())
            .app_data(source.clone())
            // Configure API routes
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_report_routes)
                    .configure(api::configure_query_routes),
            )
            // Swagger UI with the OpenAPI document
            .service(
                SwaggerUi::new("/docs/{_url}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
