use std::fmt;
use std::iter::successors;

use time::Weekday::{Monday, Sunday};
use time::{Date, Duration, OffsetDateTime, Weekday};

use crate::zone::Zone;

/// A calendar day in the reference timezone. Two instants on the same local day always map to the
/// same key, whatever their time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(Date);

impl DayKey {
  pub fn of(at: OffsetDateTime, zone: Zone) -> Self {
    Self(zone.date_of(at))
  }

  pub fn today(zone: Zone) -> Self {
    Self(zone.now().date())
  }

  pub fn date(self) -> Date {
    self.0
  }

  pub fn weekday(self) -> Weekday {
    self.0.weekday()
  }

  pub fn next(self) -> Self {
    Self(self.0 + Duration::DAY)
  }

  pub fn previous(self) -> Self {
    Self(self.0 - Duration::DAY)
  }

  pub fn offset(self, days: usize) -> Self {
    Self(self.0 + Duration::days(days as i64))
  }
}

impl From<Date> for DayKey {
  fn from(date: Date) -> Self {
    Self(date)
  }
}

impl fmt::Display for DayKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:02}.{:02}.{}",
      self.0.day(),
      u8::from(self.0.month()),
      self.0.year()
    )
  }
}

/// Monday to Sunday, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Week {
  first: DayKey,
  last: DayKey,
}

impl Week {
  pub fn containing(day: DayKey) -> Self {
    let mut first = day;
    while first.weekday() != Monday {
      first = first.previous();
    }

    let mut last = day;
    while last.weekday() != Sunday {
      last = last.next();
    }

    Self { first, last }
  }

  pub fn first(&self) -> DayKey {
    self.first
  }

  pub fn last(&self) -> DayKey {
    self.last
  }

  pub fn contains(&self, day: DayKey) -> bool {
    self.first <= day && day <= self.last
  }

  pub fn len(&self) -> usize {
    (self.last.0 - self.first.0).whole_days() as usize + 1
  }

  pub fn days(&self) -> impl Iterator<Item = DayKey> {
    let last = self.last;
    successors(Some(self.first), move |day| (*day < last).then(|| day.next()))
  }
}

#[cfg(test)]
mod test {
  use time::macros::{date, datetime};

  use super::*;

  #[test]
  fn same_local_day_same_key() {
    let zone = Zone::by_name("Europe/Berlin").unwrap();
    let morning = DayKey::of(datetime!(2022-09-12 00:00 +2), zone);
    let evening = DayKey::of(datetime!(2022-09-12 23:59:59 +2), zone);
    let utc_late = DayKey::of(datetime!(2022-09-11 22:30 UTC), zone);

    assert_eq!(morning, evening);
    assert_eq!(morning, utc_late);
    assert_eq!(morning, DayKey::from(date!(2022-09-12)));
    assert_ne!(morning, DayKey::of(datetime!(2022-09-12 22:30 UTC), zone));
  }

  #[test]
  fn week_spans_monday_to_sunday() {
    for day in [
      date!(2022-09-12),
      date!(2022-09-14),
      date!(2022-09-18),
    ] {
      let week = Week::containing(day.into());
      assert_eq!(week.first().weekday(), Monday);
      assert_eq!(week.last().weekday(), Sunday);
      assert_eq!(week.first(), date!(2022-09-12).into());
      assert_eq!(week.last(), date!(2022-09-18).into());
      assert_eq!(week.len(), 7);
      assert_eq!(week.days().count(), 7);
    }
  }

  #[test]
  fn week_crosses_month_and_year() {
    let week = Week::containing(date!(2023-01-01).into());
    assert_eq!(week.first(), date!(2022-12-26).into());
    assert_eq!(week.last(), date!(2023-01-01).into());
    assert!(week.contains(date!(2022-12-31).into()));
    assert!(!week.contains(date!(2023-01-02).into()));
  }

  #[test]
  fn displays_as_day_month_year() {
    assert_eq!(DayKey::from(date!(2022-09-05)).to_string(), "05.09.2022");
  }
}
