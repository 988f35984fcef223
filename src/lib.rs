use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod ledger;
pub mod models;
pub mod receipt;
pub mod state;
pub mod submission;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            details: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(crate::submission::handlers::submit_expense),
    components(schemas(
        models::ExpenseRecord,
        submission::models::SubmissionResponse,
        submission::models::SubmitExpenseRequest,
        submission::models::ImageSource,
        ErrorResponse,
    )),
    tags((name = "Rendiciones", description = "Expense report intake."))
)]
pub struct ApiDoc;

/// Register every route of the service on `cfg`.
///
/// The form page is mounted last so it does not shadow the API.
pub fn configure_app(cfg: &mut web::ServiceConfig, receipts_dir: std::path::PathBuf) {
    cfg.service(web::scope("/api").configure(submission::handlers::config))
        .service(actix_files::Files::new("/comprobantes", receipts_dir))
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
        )
        .service(
            actix_files::Files::new("/", receipt::common::get_static_dir())
                .index_file("index.html"),
        );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let app_state = match AppState::new(config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to prepare ledger or receipts directory. Check LEDGER_PATH and RECEIPTS_DIR. Error: {}",
                e
            );
            return Err(e.into());
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("rendiciones_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    let bind = (app_state.config.bind_addr.clone(), app_state.config.port);
    log::info!(
        "Starting server at http://{}:{} (ledger: {}, receipts: {})",
        bind.0,
        bind.1,
        app_state.config.ledger_path.display(),
        app_state.config.receipts_dir.display()
    );

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let receipts_dir = app_state.config.receipts_dir.clone();
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state)
            .configure(|cfg| configure_app(cfg, receipts_dir))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
