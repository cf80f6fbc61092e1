use tracing::warn;

use crate::config::ScheduleConfig;
use crate::error::{ConfigError, ConvertError};
use crate::timetable::{DayKey, Entry, LessonTypes, RawEntry, TimeSlot};
use crate::zone::Zone;

/// Ordered start and end times of the daily lesson slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slots {
  begin: Vec<TimeSlot>,
  end: Vec<TimeSlot>,
}

impl Slots {
  /// `end` may be empty when the source never needs end times.
  pub fn new(begin: Vec<TimeSlot>, end: Vec<TimeSlot>) -> Result<Self, ConfigError> {
    if begin.is_empty() {
      return Err(ConfigError::NoTimeSlots);
    }
    if !end.is_empty() && end.len() != begin.len() {
      return Err(ConfigError::SlotCountMismatch {
        begin: begin.len(),
        end: end.len(),
      });
    }

    Ok(Self { begin, end })
  }

  pub fn len(&self) -> usize {
    self.begin.len()
  }

  /// Start of the 1-based slot `sequence`.
  pub fn start(&self, sequence: usize) -> Option<TimeSlot> {
    sequence
      .checked_sub(1)
      .and_then(|index| self.begin.get(index))
      .copied()
  }

  pub fn end(&self, sequence: usize) -> Option<TimeSlot> {
    sequence
      .checked_sub(1)
      .and_then(|index| self.end.get(index))
      .copied()
  }

  /// 1-based number of the slot starting at `start`.
  pub fn number_of(&self, start: TimeSlot) -> Option<usize> {
    self
      .begin
      .iter()
      .position(|slot| *slot == start)
      .map(|index| index + 1)
  }
}

/// Maps document-shaped lesson records to absolute lesson times.
#[derive(Clone, Debug)]
pub struct Converter {
  zone: Zone,
  slots: Slots,
  types: LessonTypes,
}

impl Converter {
  pub fn new(zone: Zone, slots: Slots, types: LessonTypes) -> Self {
    Self { zone, slots, types }
  }

  pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
    let zone = Zone::by_name(&config.timezone)?;
    let slots = Slots::new(
      config.timeslots_begin.clone(),
      config.timeslots_end.clone(),
    )?;
    let types = match &config.lesson_types {
      Some(table) => LessonTypes::new(table.iter().map(|(text, kind)| (text, *kind))),
      None => LessonTypes::default(),
    };

    Ok(Self::new(zone, slots, types))
  }

  pub fn zone(&self) -> Zone {
    self.zone
  }

  pub fn slots(&self) -> &Slots {
    &self.slots
  }

  /// Strict conversion of a single record.
  pub fn convert_entry(&self, day: DayKey, raw: &RawEntry) -> Result<Entry, ConvertError> {
    let slot = self
      .slots
      .start(raw.sequence)
      .ok_or(ConvertError::SlotOutOfRange {
        sequence: raw.sequence,
        slots: self.slots.len(),
      })?;
    let kind = self.types.resolve(&raw.kind)?;
    let time = self
      .zone
      .at(day.date(), slot.time())
      .ok_or(ConvertError::NonexistentTime {
        date: day.date(),
        slot,
        zone: self.zone.name(),
      })?;

    Ok(Entry {
      time,
      kind,
      classroom: raw.classroom.clone(),
      lecturer: raw.lecturer.clone(),
      name: raw.name.clone(),
    })
  }

  /// Converts a whole scraped day. A malformed record is logged and dropped, the rest of the day
  /// is kept.
  pub fn convert(&self, day: DayKey, raw: &[RawEntry]) -> Vec<Entry> {
    raw
      .iter()
      .filter_map(|entry| match self.convert_entry(day, entry) {
        Ok(entry) => Some(entry),
        Err(err) => {
          warn!("Dropping lesson {:?} on {}: {}", entry.name, day, err);
          None
        }
      })
      .collect()
  }
}
