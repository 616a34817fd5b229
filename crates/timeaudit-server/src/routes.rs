//! HTTP route handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use timeaudit_analyze::TimeAuditor;
use timeaudit_core::{AuditConfig, AuditError, AuditResult, Clock, DEFAULT_BIG_TASK_HOURS};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Base location for run directories.
    pub output_dir: PathBuf,
    pub retention_hours: u32,
    pub clock: Arc<dyn Clock>,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let reports = ServeDir::new(&state.output_dir);

    Router::new()
        .route("/api/audit", post(audit_csv))
        .route("/api/health", get(health))
        .nest_service("/reports", reports)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    #[serde(default = "default_big_task_hours")]
    big_task_hours: f64,
}

fn default_big_task_hours() -> f64 {
    DEFAULT_BIG_TASK_HOURS
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn audit_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditQuery>,
    mut multipart: Multipart,
) -> Result<Json<AuditResult>, (StatusCode, String)> {
    // Expect one file field.
    let field = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "No file uploaded".to_string()))?;

    let file_name = field.file_name().unwrap_or_default().to_string();
    if !file_name.ends_with(".csv") {
        return Err((StatusCode::BAD_REQUEST, "File must be a CSV".to_string()));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let config = AuditConfig {
        big_task_hours: query.big_task_hours,
        output_dir: state.output_dir.clone(),
        write_reports: true,
        retention_hours: state.retention_hours,
    };
    let auditor = TimeAuditor::with_clock(config, Arc::clone(&state.clock));

    tracing::info!(file = %file_name, bytes = bytes.len(), "auditing upload");

    let outcome = tokio::task::spawn_blocking(move || auditor.run_bytes(&bytes))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task failed: {}", e)))?;

    match outcome {
        Ok(result) => Ok(Json(result)),
        Err(e) if is_client_error(&e) => {
            tracing::warn!(file = %file_name, error = %e, "rejected upload");
            Err((StatusCode::BAD_REQUEST, format!("Processing error: {}", e)))
        }
        Err(e) => {
            tracing::error!(file = %file_name, error = %e, "audit failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Processing error: {}", e),
            ))
        }
    }
}

fn is_client_error(err: &AuditError) -> bool {
    err.is_malformed_input() || matches!(err, AuditError::InvalidConfig { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use timeaudit_core::FixedClock;
    use tower::ServiceExt;

    const BOUNDARY: &str = "timeaudit-test-boundary";

    const ALICE_CSV: &str = "User,Start Date,Start Time,End Date,End Time,Description,Duration (decimal)\n\
                             Alice,18/10/2026,09:00:00,18/10/2026,10:00:00,Task1,1.0\n\
                             Alice,18/10/2026,09:30:00,18/10/2026,10:30:00,Task2,1.0\n";

    fn app(output: &std::path::Path) -> Router {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        router(Arc::new(AppState {
            output_dir: output.to_path_buf(),
            retention_hours: 24,
            clock: Arc::new(FixedClock::new(now)),
        }))
    }

    fn upload(uri: &str, filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let temp = TempDir::new().unwrap();
        let response = app(temp.path())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_runs_audit_and_serves_reports() {
        let temp = TempDir::new().unwrap();
        let app = app(temp.path());

        let response = app
            .clone()
            .oneshot(upload("/api/audit?big_task_hours=0.5", "report.csv", ALICE_CSV))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["big_task_hours"].as_f64(), Some(0.5));
        assert_eq!(json["overlap_per_user"]["Alice"].as_array().unwrap().len(), 1);
        assert_eq!(json["big_tasks_per_user"]["Alice"][0]["task"], "Task1");
        assert_eq!(json["time_stats"]["time_per_user"]["Alice"].as_f64(), Some(2.0));

        let run_dir = json["run_dir"].as_str().unwrap();
        assert!(run_dir.starts_with("20261018T120000Z_"));
        let relative = json["report_files"][0]["relative_path"].as_str().unwrap();
        assert_eq!(relative, format!("{run_dir}/alice_report.json"));

        let response = app
            .oneshot(
                Request::get(format!("/reports/{relative}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(report["18/10/2026"][0]["duration_hm"], "1h 0m");
    }

    #[tokio::test]
    async fn test_rejects_non_csv_upload() {
        let temp = TempDir::new().unwrap();
        let response = app(temp.path())
            .oneshot(upload("/api/audit", "report.txt", ALICE_CSV))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "File must be a CSV");
    }

    #[tokio::test]
    async fn test_malformed_csv_is_bad_request() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("output");
        let response = app(&output)
            .oneshot(upload("/api/audit", "report.csv", "User,Description\nAlice,x"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("Processing error:"));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_overflowing_durations_are_bad_request() {
        let temp = TempDir::new().unwrap();
        let content = "User,Start Date,Start Time,End Date,End Time,Description,Duration (decimal)\n\
                       Alice,18/10/2026,09:00:00,18/10/2026,10:00:00,Task1,79228162514264337593543950335\n\
                       Alice,18/10/2026,11:00:00,18/10/2026,12:00:00,Task2,79228162514264337593543950335\n";
        let response = app(temp.path())
            .oneshot(upload("/api/audit", "report.csv", content))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("too large"));
    }

    #[tokio::test]
    async fn test_out_of_range_threshold_is_accepted() {
        let temp = TempDir::new().unwrap();
        let response = app(temp.path())
            .oneshot(upload("/api/audit?big_task_hours=1e29", "report.csv", ALICE_CSV))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["big_tasks_per_user"]["Alice"].as_array().unwrap().is_empty());
    }
}
