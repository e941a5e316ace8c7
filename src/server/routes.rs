use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use deskio_core::{
    dashboard::{DashboardReport, FilterOptions, RatingFilter, RatingFrame},
    handler::RATING_ACKNOWLEDGMENT,
    StoreError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, NoneAsEmptyString};

use super::{error::AppError, state::AppState};

pub const NO_RATINGS: &str = "No ratings have been recorded yet.";
pub const NO_MATCHING_RATINGS: &str = "No ratings match the selected filters.";

type Payload = Result<Json<Map<String, Value>>, JsonRejection>;

fn fields(payload: Payload) -> Result<Map<String, Value>, AppError> {
    payload
        .map(|Json(fields)| fields)
        .map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketCreated {
    #[serde(rename = "ticketNumber")]
    pub ticket_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub status: String,
    pub message: String,
}

pub async fn incident_handler(State(state): State<Arc<AppState>>, payload: Payload) -> Result<impl IntoResponse, AppError> {
    let ticket = state.desk.create_incident(&fields(payload)?).await?;
    Ok((StatusCode::CREATED, Json(TicketCreated { ticket_number: ticket.ticket_number })))
}

pub async fn service_request_handler(State(state): State<Arc<AppState>>, payload: Payload) -> Result<impl IntoResponse, AppError> {
    let ticket = state.desk.create_service_request(&fields(payload)?).await?;
    Ok((StatusCode::CREATED, Json(TicketCreated { ticket_number: ticket.ticket_number })))
}

pub async fn rating_handler(State(state): State<Arc<AppState>>, payload: Payload) -> Result<impl IntoResponse, AppError> {
    state.desk.submit_rating(fields(payload)?).await?;
    Ok((
        StatusCode::OK,
        Json(Acknowledgment {
            status: "success".to_string(),
            message: RATING_ACKNOWLEDGMENT.to_string(),
        }),
    ))
}

/// Query string of `/dashboard`. Empty parameters (`?year=`) are ignored.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    #[serde_as(as = "NoneAsEmptyString")]
    pub year: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub month: Option<u32>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub from: Option<NaiveDate>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub to: Option<NaiveDate>,
}

impl From<DashboardQuery> for RatingFilter {
    fn from(query: DashboardQuery) -> Self {
        RatingFilter {
            year: query.year,
            month: query.month,
            from: query.from,
            to: query.to,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DashboardBody {
    Message { message: String },
    Report {
        options: FilterOptions,
        #[serde(flatten)]
        report: DashboardReport,
    },
}

impl DashboardBody {
    fn message(message: &str) -> Self {
        DashboardBody::Message {
            message: message.to_string(),
        }
    }
}

pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardBody>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))?;
    let frame = match RatingFrame::load(state.desk.store().as_ref()).await {
        Ok(frame) => frame,
        Err(StoreError::Missing(table)) => {
            log_debug!("Dashboard: table {} does not exist yet", table);
            RatingFrame::default()
        }
        Err(e) => return Err(e.into()),
    };
    if frame.is_empty() {
        return Ok(Json(DashboardBody::message(NO_RATINGS)));
    }
    let options = frame.filter_options(query.year);
    let frame = frame.filter(&query.into());
    if frame.is_empty() {
        return Ok(Json(DashboardBody::message(NO_MATCHING_RATINGS)));
    }
    Ok(Json(DashboardBody::Report {
        options,
        report: frame.report(state.trend_window),
    }))
}
