use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    config::validate_window_days,
    tracker::entities::{CheckinOutcome, DashboardWindow, StatusSnapshot},
};

use super::AppState;

/// Body of a failed request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

/// Turns errors from the engine into json responses.
#[derive(Debug)]
pub struct ApiError {
    code: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    pub fn bad_request(error: anyhow::Error) -> Self {
        Self {
            code: StatusCode::BAD_REQUEST,
            error,
        }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.code.is_server_error() {
            error!("Request failed {:?}", self.error);
        } else {
            warn!("Rejected request {}", self.error);
        }
        let body = ErrorBody {
            status: "error".into(),
            message: self.error.to_string(),
        };
        (self.code, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn checkin_response(outcome: CheckinOutcome) -> (StatusCode, CheckinResponse) {
    let status = outcome.status().to_string();
    match outcome {
        CheckinOutcome::Recorded(summary) | CheckinOutcome::AlreadyCheckedIn(summary) => (
            StatusCode::OK,
            CheckinResponse {
                status,
                current_streak: Some(summary.current_streak),
                best_streak: Some(summary.best_streak),
                message: None,
            },
        ),
        CheckinOutcome::Failed(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            CheckinResponse {
                status,
                current_streak: None,
                best_streak: None,
                message: Some(format!("Check-in failed: {e}")),
            },
        ),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DashboardQuery {
    pub days: Option<usize>,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<StatusSnapshot>, ApiError> {
    Ok(Json(state.service.status().await?))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardWindow>, ApiError> {
    let days = query
        .days
        .map(validate_window_days)
        .transpose()
        .map_err(ApiError::bad_request)?
        .unwrap_or(state.config.window_days);
    Ok(Json(state.service.dashboard(days).await?))
}

pub async fn checkins(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    Ok(Json(state.service.checkins().await?))
}

pub async fn checkin(State(state): State<Arc<AppState>>) -> (StatusCode, Json<CheckinResponse>) {
    let (code, response) = checkin_response(state.service.record_checkin().await);
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, path::Path, sync::Arc};

    use anyhow::{anyhow, Result};
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
        Json,
    };
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        config::AppConfig,
        server::AppState,
        tracker::{
            service::{CheckinService, DEFAULT_RETENTION_DAYS},
            store::{JsonFileStore, MockCheckinStore},
        },
        utils::clock::testing::FixedClock,
    };

    use super::{checkin, checkins, dashboard, status, ApiError, DashboardQuery};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(dir: &Path, clock: Arc<FixedClock>) -> Arc<AppState> {
        let config = AppConfig::new(dir.to_path_buf(), SocketAddr::from(([127, 0, 0, 1], 0)));
        let service = CheckinService::new(
            Box::new(JsonFileStore::in_dir(dir)),
            clock,
            config.retention_days,
        );
        Arc::new(AppState::new(Arc::new(service), config))
    }

    #[tokio::test]
    async fn test_checkin_then_read_endpoints() -> Result<()> {
        let dir = tempdir()?;
        let state = state(dir.path(), Arc::new(FixedClock::on(date(2024, 1, 10))));

        let (code, Json(first)) = checkin(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(first.status, "success");
        assert_eq!(first.current_streak, Some(1));

        let (code, Json(second)) = checkin(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(second.status, "info");
        assert_eq!(second.best_streak, Some(1));

        let Json(snapshot) = status(State(state.clone())).await.unwrap();
        assert_eq!(snapshot.current_streak, 1);
        assert!(snapshot.last_checkin_time.is_some());

        let Json(dates) = checkins(State(state.clone())).await.unwrap();
        assert_eq!(dates, vec![date(2024, 1, 10)]);

        let Json(window) = dashboard(State(state.clone()), Query(DashboardQuery::default()))
            .await
            .unwrap();
        assert_eq!(window.days.len(), 30);
        assert_eq!(window.missed_dates.len(), 29);

        let Json(window) = dashboard(State(state), Query(DashboardQuery { days: Some(3) }))
            .await
            .unwrap();
        assert_eq!(window.missed_dates, vec![date(2024, 1, 9), date(2024, 1, 8)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_json_shape() -> Result<()> {
        let dir = tempdir()?;
        let state = state(dir.path(), Arc::new(FixedClock::on(date(2024, 1, 10))));

        let Json(snapshot) = status(State(state)).await.unwrap();
        assert_eq!(
            serde_json::to_value(&snapshot)?,
            serde_json::json!({"currentStreak": 0, "lastCheckInTime": null, "bestStreak": 0})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_rejects_bad_window() -> Result<()> {
        let dir = tempdir()?;
        let state = state(dir.path(), Arc::new(FixedClock::on(date(2024, 1, 10))));

        let error = dashboard(State(state), Query(DashboardQuery { days: Some(0) }))
            .await
            .unwrap_err();
        assert_eq!(error.code(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_server_error() {
        let mut store = MockCheckinStore::new();
        store
            .expect_load_raw()
            .returning(|| Err(anyhow!("disk is gone")));
        let config = AppConfig::new("/nonexistent".into(), SocketAddr::from(([127, 0, 0, 1], 0)));
        let service = CheckinService::new(
            Box::new(store),
            Arc::new(FixedClock::on(date(2024, 1, 10))),
            DEFAULT_RETENTION_DAYS,
        );
        let state = Arc::new(AppState::new(Arc::new(service), config));

        let (code, Json(body)) = checkin(State(state.clone())).await;
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, "error");
        assert_eq!(body.current_streak, None);

        let error = status(State(state)).await.unwrap_err();
        assert_eq!(error.code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_defaults_to_server_error() {
        let error = ApiError::from(anyhow!("boom"));
        assert_eq!(error.code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
