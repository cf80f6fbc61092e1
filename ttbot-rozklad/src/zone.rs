use std::fmt;

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use time_tz::{timezones, OffsetDateTimeExt, OffsetResult, PrimitiveDateTimeExt, TimeZone, Tz};

use crate::error::ConfigError;

/// The reference timezone every day key and lesson time is expressed in.
#[derive(Clone, Copy)]
pub struct Zone {
  tz: &'static Tz,
}

impl Zone {
  pub fn by_name(name: &str) -> Result<Self, ConfigError> {
    timezones::get_by_name(name)
      .map(|tz| Self { tz })
      .ok_or_else(|| ConfigError::UnknownTimezone(name.to_string()))
  }

  pub fn name(&self) -> &'static str {
    self.tz.name()
  }

  pub fn now(&self) -> OffsetDateTime {
    self.local(OffsetDateTime::now_utc())
  }

  /// The same instant, with the offset of this zone.
  pub fn local(&self, at: OffsetDateTime) -> OffsetDateTime {
    at.to_timezone(self.tz)
  }

  /// Calendar day of an instant as observed in this zone.
  pub fn date_of(&self, at: OffsetDateTime) -> Date {
    self.local(at).date()
  }

  /// Combines a civil date and wall-clock time. Ambiguous times (clocks going back) resolve to
  /// the earlier instant, skipped times (clocks going forward) do not exist.
  pub fn at(&self, date: Date, time: Time) -> Option<OffsetDateTime> {
    match PrimitiveDateTime::new(date, time).assume_timezone(self.tz) {
      OffsetResult::Some(at) => Some(at),
      OffsetResult::Ambiguous(first, second) => Some(first.min(second)),
      OffsetResult::None => None,
    }
  }
}

impl fmt::Debug for Zone {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Zone").field(&self.name()).finish()
  }
}

#[cfg(test)]
mod test {
  use time::macros::{date, datetime, time};

  use super::*;

  #[test]
  fn resolves_known_zone() {
    let zone = Zone::by_name("Europe/Berlin").unwrap();
    assert_eq!(zone.name(), "Europe/Berlin");
  }

  #[test]
  fn rejects_unknown_zone() {
    assert!(matches!(
      Zone::by_name("Mars/Olympus_Mons"),
      Err(ConfigError::UnknownTimezone(_))
    ));
  }

  #[test]
  fn date_of_uses_local_calendar_day() {
    let zone = Zone::by_name("Europe/Berlin").unwrap();
    assert_eq!(zone.date_of(datetime!(2022-09-11 23:30 UTC)), date!(2022-09-12));
    assert_eq!(zone.date_of(datetime!(2022-09-12 21:59 UTC)), date!(2022-09-12));
  }

  #[test]
  fn at_applies_summer_offset() {
    let zone = Zone::by_name("Europe/Berlin").unwrap();
    let at = zone.at(date!(2022-09-12), time!(08:00)).unwrap();
    assert_eq!(at, datetime!(2022-09-12 06:00 UTC));
    assert_eq!(at.hour(), 8);
  }
}
