use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, Time};

use crate::error::TimeSlotError;

pub use day::{DayKey, Week};
pub use types::{LessonTypes, LESSON_TYPES};

mod day;
mod types;

/// Wall-clock start (or end) of a lesson slot, without a date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct TimeSlot(Time);

impl TimeSlot {
  pub fn new(hour: u8, minute: u8) -> Result<Self, TimeSlotError> {
    Time::from_hms(hour, minute, 0)
      .map(Self)
      .map_err(|_| TimeSlotError::Format(format!("{hour:02}:{minute:02}")))
  }

  pub fn hour(self) -> u8 {
    self.0.hour()
  }

  pub fn minute(self) -> u8 {
    self.0.minute()
  }

  pub fn time(self) -> Time {
    self.0
  }

  /// Slot of a timestamp, seconds dropped.
  pub fn of(at: OffsetDateTime) -> Self {
    let minutes = i64::from(at.hour()) * 60 + i64::from(at.minute());
    Self(Time::MIDNIGHT + time::Duration::minutes(minutes))
  }
}

impl FromStr for TimeSlot {
  type Err = TimeSlotError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let parts = value.split(':').collect::<Vec<&str>>();
    if parts.len() != 2 {
      return Err(TimeSlotError::Format(value.to_string()));
    }

    let hour = u8::from_str(parts[0].trim()).map_err(|_| TimeSlotError::Hour(value.to_string()))?;
    let minute =
      u8::from_str(parts[1].trim()).map_err(|_| TimeSlotError::Minute(value.to_string()))?;

    let time = Time::from_hms(hour, minute, 0).map_err(|err| match err.name() {
      "hour" => TimeSlotError::Hour(value.to_string()),
      _ => TimeSlotError::Minute(value.to_string()),
    })?;

    Ok(Self(time))
  }
}

impl TryFrom<String> for TimeSlot {
  type Error = TimeSlotError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl fmt::Display for TimeSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}:{:02}", self.hour(), self.minute())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
  Lab,
  Practice,
  Lecture,
  Exam,
  Credit,
  Seminar,
}

impl fmt::Display for LessonType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      LessonType::Lab => "lab",
      LessonType::Practice => "practice",
      LessonType::Lecture => "lecture",
      LessonType::Exam => "exam",
      LessonType::Credit => "credit",
      LessonType::Seminar => "seminar",
    })
  }
}

/// A concrete lesson occurrence, ready to be shown to a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
  pub time: OffsetDateTime,
  pub kind: LessonType,
  pub classroom: String,
  pub lecturer: String,
  pub name: String,
}

/// A lesson as it appears in the source document.
///
/// `sequence` is the 1-based slot number, not a wall-clock time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawEntry {
  pub sequence: usize,
  pub name: String,
  pub kind: String,
  pub classroom: String,
  pub lecturer: String,
  pub notes: Option<String>,
}

#[cfg(test)]
mod test {
  use time::macros::datetime;

  use super::*;

  #[test]
  fn parses_time_slot() {
    let slot = TimeSlot::from_str("08:00").unwrap();
    assert_eq!((slot.hour(), slot.minute()), (8, 0));
    assert_eq!(slot, TimeSlot::new(8, 0).unwrap());
    assert_eq!(slot.to_string(), "08:00");
    assert_eq!(TimeSlot::from_str("9:5").unwrap(), TimeSlot::new(9, 5).unwrap());
  }

  #[test]
  fn rejects_malformed_time_slots() {
    assert_eq!(
      TimeSlot::from_str("08:00:00"),
      Err(TimeSlotError::Format("08:00:00".to_string()))
    );
    assert_eq!(
      TimeSlot::from_str("0800"),
      Err(TimeSlotError::Format("0800".to_string()))
    );
    assert_eq!(
      TimeSlot::from_str("ab:00"),
      Err(TimeSlotError::Hour("ab:00".to_string()))
    );
    assert_eq!(
      TimeSlot::from_str("08:xx"),
      Err(TimeSlotError::Minute("08:xx".to_string()))
    );
    assert_eq!(
      TimeSlot::from_str("25:00"),
      Err(TimeSlotError::Hour("25:00".to_string()))
    );
  }

  #[test]
  fn slot_of_timestamp_drops_seconds() {
    let at = datetime!(2022-09-12 08:00:59.5 +3);
    assert_eq!(TimeSlot::of(at), TimeSlot::new(8, 0).unwrap());
  }
}
