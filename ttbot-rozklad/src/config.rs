use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::timetable::{LessonType, TimeSlot};

pub const DEFAULT_SPREADSHEET_URL: &str = "http://e-rozklad.dut.edu.ua/timeTable/groupExcel?type=0";

/// Everything the core needs to know about the institution it scrapes.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
  pub timezone: String,
  pub timeslots_begin: Vec<TimeSlot>,
  #[serde(default)]
  pub timeslots_end: Vec<TimeSlot>,
  /// Replaces the built-in lesson type table when present.
  #[serde(default)]
  pub lesson_types: Option<HashMap<String, LessonType>>,
  #[serde(default = "default_fetch_timeout")]
  pub fetch_timeout_secs: u64,
  pub source: SourceConfig,
}

impl ScheduleConfig {
  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs)
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
  /// Legacy spreadsheet export, requested with a form post.
  Spreadsheet {
    #[serde(default = "default_spreadsheet_url")]
    url: String,
    course: u32,
    faculty: u32,
    group: u32,
  },
  /// HTML page with one table body per day, requested with a query.
  HtmlTable {
    url: String,
    group: u32,
    #[serde(default)]
    columns: HtmlColumns,
  },
}

/// Column positions inside one lesson row of the HTML variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlColumns {
  /// `"<name> - <type>"`
  pub subject: usize,
  pub classroom: usize,
  pub lecturer: usize,
  pub notes: usize,
}

impl Default for HtmlColumns {
  fn default() -> Self {
    Self {
      subject: 1,
      classroom: 2,
      lecturer: 3,
      notes: 4,
    }
  }
}

fn default_fetch_timeout() -> u64 {
  30
}

fn default_spreadsheet_url() -> String {
  DEFAULT_SPREADSHEET_URL.to_string()
}
