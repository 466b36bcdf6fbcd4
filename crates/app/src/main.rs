//! Walkthrough binary entry point.

use std::time::Duration;

use app::{App, AppError, Config, telemetry, walkthrough};
use chrono::Utc;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env()?;
    telemetry::init_tracing(&config)?;

    // 2. Install Prometheus metrics recorder
    let metrics_handle = telemetry::install_metrics()?;

    // 3. Wire services and start projections
    let app = App::new(config);

    // 4. Run the walkthrough
    let launch_at = Utc::now();
    let retire_at = launch_at + chrono::Duration::days(180);
    let report = walkthrough::household_insurance(&app, launch_at, retire_at).await?;

    // 5. Let projections catch up and report what they did
    app.drain(Duration::from_secs(5)).await?;

    if let Some(entry) = app.catalog.get(report.plan.id()).await {
        tracing::info!(plan_id = %entry.plan_id, status = %entry.status, version = %entry.version, "catalog entry");
    }
    for payment in app.payments.payments_for_contract(report.paying_contract) {
        tracing::info!(payment_id = %payment.id, amount = %payment.data.amount, "payment on file");
    }
    for handle in app.subscriptions() {
        for failure in handle.failures().await {
            tracing::warn!(projection = handle.name(), sequence = failure.sequence, error = %failure.error, "projection failure");
        }
    }

    // 6. Stop projections
    let print_metrics = app.config.print_metrics;
    for (projection, position) in app.shutdown().await {
        tracing::info!(projection, %position, "projection stopped");
    }

    if print_metrics {
        println!("{}", metrics_handle.render());
    }
    Ok(())
}
