//! Error types for every stage between the outbound request and the cache.

use reqwest::StatusCode;
use tokio::task::JoinError;

/// Failure of the single outbound request issued per week refresh.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  #[error("table get: {0}")]
  Request(#[source] reqwest::Error),

  #[error("HTTP status {0}")]
  Status(StatusCode),

  #[error("table read: {0}")]
  Body(#[source] reqwest::Error),

  #[error("no data")]
  EmptyBody,

  #[error("http client: {0}")]
  Client(#[source] reqwest::Error),
}

/// Failure to open a fetched document. Row-level noise never ends up here.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
  #[error("xls parse: {0}")]
  Spreadsheet(#[from] calamine::XlsError),

  #[error("xls parse: workbook has no sheets")]
  NoSheet,

  #[error("table parse: document contains no timetable")]
  MissingTable,
}

/// Failure to turn one raw lesson record into an [`Entry`](crate::timetable::Entry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
  #[error("lesson {sequence} is outside of the {slots} configured time slots")]
  SlotOutOfRange {
    /// 1-based sequence of the offending record.
    sequence: usize,
    /// Number of configured slot start times.
    slots: usize,
  },

  #[error("unknown lesson type {0:?}")]
  UnknownLessonType(String),

  #[error("{date} {slot} does not exist in {zone}")]
  NonexistentTime {
    date: time::Date,
    slot: crate::timetable::TimeSlot,
    zone: &'static str,
  },
}

/// Invalid `"HH:MM"` text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeSlotError {
  #[error("invalid timeslot format {0:?}")]
  Format(String),

  #[error("invalid hour value in {0:?}")]
  Hour(String),

  #[error("invalid minute value in {0:?}")]
  Minute(String),
}

/// Rejected configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("unknown timezone {0:?}")]
  UnknownTimezone(String),

  #[error("no time slots configured")]
  NoTimeSlots,

  #[error("{begin} slot start times but {end} slot end times")]
  SlotCountMismatch { begin: usize, end: usize },

  #[error("invalid source url {url:?}: {reason}")]
  InvalidUrl { url: String, reason: String },

  #[error(transparent)]
  Fetch(#[from] FetchError),
}

/// Umbrella error returned by the cache and the source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  Parse(#[from] ParseError),

  #[error("cache janitor failed: {0}")]
  Janitor(#[from] JoinError),
}
