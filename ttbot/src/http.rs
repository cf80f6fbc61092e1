use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;
use tracing::error;

use ttbot_rozklad::timetable::{Entry, LessonType, TimeSlot};
use ttbot_rozklad::{Converter, WeekCache};

pub fn router(cache: Arc<WeekCache>) -> Router {
  Router::new()
    .route("/days/:day", get(get_day).delete(delete_day))
    .route("/lessons", get(get_lesson))
    .layer(TraceLayer::new_for_http())
    .with_state(cache)
}

#[derive(Debug, Serialize)]
pub struct LessonDto {
  pub slot: Option<usize>,
  #[serde(with = "time::serde::rfc3339")]
  pub start: OffsetDateTime,
  pub end: Option<String>,
  #[serde(rename = "type")]
  pub kind: LessonType,
  pub name: String,
  pub classroom: String,
  pub lecturer: String,
}

impl LessonDto {
  fn new(entry: Entry, converter: &Converter) -> Self {
    let start = converter.zone().local(entry.time);
    let slot = converter.slots().number_of(TimeSlot::of(start));

    Self {
      slot,
      start,
      end: slot
        .and_then(|slot| converter.slots().end(slot))
        .map(|end| end.to_string()),
      kind: entry.kind,
      name: entry.name,
      classroom: entry.classroom,
      lecturer: entry.lecturer,
    }
  }
}

#[derive(Deserialize)]
struct LessonQuery {
  at: String,
}

async fn get_day(
  State(cache): State<Arc<WeekCache>>,
  Path(day): Path<String>,
) -> Result<Json<Vec<LessonDto>>, ApiError> {
  let day = crate::parse_day(&day, cache.zone()).ok_or(ApiError::InvalidDate(day))?;
  let entries = cache.on_day(day).await?;

  Ok(Json(
    entries
      .into_iter()
      .map(|entry| LessonDto::new(entry, cache.converter()))
      .collect(),
  ))
}

async fn delete_day(
  State(cache): State<Arc<WeekCache>>,
  Path(day): Path<String>,
) -> Result<StatusCode, ApiError> {
  let day = crate::parse_day(&day, cache.zone()).ok_or(ApiError::InvalidDate(day))?;
  cache.evict(day).await;

  Ok(StatusCode::NO_CONTENT)
}

async fn get_lesson(
  State(cache): State<Arc<WeekCache>>,
  Query(query): Query<LessonQuery>,
) -> Result<Json<Option<LessonDto>>, ApiError> {
  let at =
    OffsetDateTime::parse(&query.at, &Rfc3339).map_err(|_| ApiError::InvalidTimestamp(query.at))?;
  let entry = cache.exact_get(at).await?;

  Ok(Json(
    entry.map(|entry| LessonDto::new(entry, cache.converter())),
  ))
}

enum ApiError {
  InvalidDate(String),
  InvalidTimestamp(String),
  Load(ttbot_rozklad::Error),
}

impl From<ttbot_rozklad::Error> for ApiError {
  fn from(err: ttbot_rozklad::Error) -> Self {
    Self::Load(err)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::InvalidDate(day) => {
        (StatusCode::BAD_REQUEST, format!("invalid date {day:?}")).into_response()
      }
      ApiError::InvalidTimestamp(at) => {
        (StatusCode::BAD_REQUEST, format!("invalid timestamp {at:?}")).into_response()
      }
      ApiError::Load(err) => {
        error!("Failed to load schedule: {}", err);
        (StatusCode::BAD_GATEWAY, "could not load schedule").into_response()
      }
    }
  }
}
