//! Chart endpoint: one pipeline run per request
//!
//! The handler only builds a `ChartConfig` from query parameters and
//! returns the presentation boundary's output as JSON; all logic lives
//! in the pipeline.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{parse_symbol_list, ChartConfig, Frequency, PriceField};
use crate::server::AppState;
use crate::services::pipeline;

/// Query parameters for the /chart endpoint
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Comma-separated ticker symbols (default: MSFT,GE,AAPL)
    pub symbols: Option<String>,

    /// Start date (YYYY-MM-DD, default: 2010-01-01)
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD, default: today)
    pub end_date: Option<String>,

    /// Price field: open, high, low, close, adj_close, volume
    pub field: Option<String>,

    /// Resampling frequency: daily, weekly, monthly
    pub frequency: Option<String>,

    /// Rebase each symbol so its first valid value is 100
    #[serde(default)]
    pub normalize: bool,

    /// First moving-average window (2-200)
    pub ma1: Option<u32>,

    /// Second moving-average window (2-200)
    pub ma2: Option<u32>,
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidConfig(format!("invalid date: {}", s)))
}

fn build_config(params: ChartQuery) -> Result<ChartConfig> {
    let mut config = match params.symbols {
        Some(symbols) => ChartConfig::new(parse_symbol_list(&symbols)),
        None => ChartConfig::default(),
    };

    if let Some(start) = params.start_date {
        config.start = parse_date(&start)?;
    }
    if let Some(end) = params.end_date {
        config.end = parse_date(&end)?;
    }
    if let Some(field) = params.field {
        config.field = PriceField::from_str(&field).map_err(AppError::InvalidConfig)?;
    }
    if let Some(frequency) = params.frequency {
        config.frequency = Frequency::from_str(&frequency).map_err(AppError::InvalidConfig)?;
    }
    config.normalize = params.normalize;
    config.ma1 = params.ma1;
    config.ma2 = params.ma2;

    Ok(config)
}

/// GET /chart - run the pipeline for one configuration
///
/// Examples:
/// - /chart?symbols=AAPL&start_date=2020-01-01&end_date=2020-01-10
/// - /chart?symbols=MSFT,GE&frequency=monthly&normalize=true
/// - /chart?symbols=AAPL&ma1=20&ma2=50
pub async fn get_chart_handler(
    State(app_state): State<AppState>,
    Query(params): Query<ChartQuery>,
) -> Response {
    debug!("Chart request: {:?}", params);

    let config = match build_config(params) {
        Ok(config) => config,
        Err(e) => return error_response(&e),
    };

    match pipeline::run(&config, app_state.source.as_ref()).await {
        Ok(chart) => (StatusCode::OK, Json(chart)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /health - liveness probe
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn error_response(err: &AppError) -> Response {
    let status = match err {
        AppError::InvalidConfig(_) | AppError::FieldUnavailable(_) => StatusCode::BAD_REQUEST,
        AppError::EmptyData | AppError::NoDataAfterResample => StatusCode::NOT_FOUND,
        AppError::Network(_) | AppError::Parse(_) => StatusCode::BAD_GATEWAY,
        AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> ChartQuery {
        ChartQuery {
            symbols: Some("msft, ge".to_string()),
            start_date: Some("2020-01-01".to_string()),
            end_date: Some("2020-06-30".to_string()),
            field: Some("adj_close".to_string()),
            frequency: Some("weekly".to_string()),
            normalize: true,
            ma1: Some(20),
            ma2: None,
        }
    }

    #[test]
    fn test_build_config() {
        let config = build_config(query()).unwrap();

        assert_eq!(config.field, PriceField::AdjClose);
        assert_eq!(config.frequency, Frequency::Weekly);
        assert!(config.normalize);
        assert_eq!(config.ma1, Some(20));
        assert_eq!(config.ma2, None);
        assert_eq!(config.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn test_build_config_rejects_bad_inputs() {
        let mut params = query();
        params.start_date = Some("01/01/2020".to_string());
        assert!(matches!(
            build_config(params),
            Err(AppError::InvalidConfig(_))
        ));

        let mut params = query();
        params.field = Some("vwap".to_string());
        assert!(matches!(
            build_config(params),
            Err(AppError::InvalidConfig(_))
        ));

        let mut params = query();
        params.frequency = Some("hourly".to_string());
        assert!(matches!(
            build_config(params),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_config_defaults() {
        let params = ChartQuery {
            symbols: None,
            start_date: None,
            end_date: None,
            field: None,
            frequency: None,
            normalize: false,
            ma1: None,
            ma2: None,
        };
        let config = build_config(params).unwrap();

        assert_eq!(config.symbols, vec!["MSFT", "GE", "AAPL"]);
        assert_eq!(config.field, PriceField::Close);
        assert_eq!(config.frequency, Frequency::Daily);
    }
}
