use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use dashboard_core::config::{include_non_clinical_from_env_value, summary_limit_from_env_value};
use dashboard_core::{CoreConfig, DEFAULT_PATIENT_DATA_DIR, SummaryQuery};

/// Main entry point for the patient dashboard
///
/// Resolves configuration once from the environment and serves the REST API.
///
/// # Environment Variables
/// - `DASHBOARD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "patient_data")
/// - `HIV_SUMMARY_LIMIT`: Maximum summary rows loaded per request (default: 20)
/// - `HIV_SUMMARY_INCLUDE_NON_CLINICAL`: Whether lab-only rows are loaded (default: true)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dashboard=info".parse()?)
                .add_directive("dashboard_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("DASHBOARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let patient_data_dir = std::env::var("PATIENT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_PATIENT_DATA_DIR));
    let query = SummaryQuery {
        limit: summary_limit_from_env_value(std::env::var("HIV_SUMMARY_LIMIT").ok())?,
        include_non_clinical: include_non_clinical_from_env_value(
            std::env::var("HIV_SUMMARY_INCLUDE_NON_CLINICAL").ok(),
        )?,
        ..SummaryQuery::default()
    };
    let cfg = Arc::new(CoreConfig::new(patient_data_dir, query)?);

    tracing::info!(
        data_dir = %cfg.patient_data_dir().display(),
        limit = query.limit,
        include_non_clinical = query.include_non_clinical,
        "++ Starting patient dashboard REST on {}",
        rest_addr
    );

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
