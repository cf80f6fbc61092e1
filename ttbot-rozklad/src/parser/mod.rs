use std::collections::HashMap;

use crate::config::SourceConfig;
use crate::error::ParseError;
use crate::timetable::{DayKey, RawEntry, Week};

pub use html::HtmlTableParser;
pub use xls::SpreadsheetParser;

mod html;
mod xls;

/// Lessons of every day found in one document. Days without recognized lessons are absent.
pub type RawWeek = HashMap<DayKey, Vec<RawEntry>>;

/// Turns a fetched document into raw lesson records.
pub trait DocumentParser: Send + Sync {
  /// `week` is the requested range; documents that only imply dates by position count from its
  /// first day.
  fn parse(&self, document: &[u8], week: &Week) -> Result<RawWeek, ParseError>;
}

pub fn for_source(source: &SourceConfig) -> Box<dyn DocumentParser> {
  match source {
    SourceConfig::Spreadsheet { .. } => Box::new(SpreadsheetParser),
    SourceConfig::HtmlTable { columns, .. } => Box::new(HtmlTableParser::new(*columns)),
  }
}
