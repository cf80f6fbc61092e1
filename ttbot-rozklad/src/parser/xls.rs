use std::io::Cursor;
use std::mem::take;
use std::str::FromStr;

use calamine::{open_workbook_from_rs, Reader, Xls};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use time::{Date, Month};
use tracing::debug;

use crate::error::ParseError;
use crate::parser::{DocumentParser, RawWeek};
use crate::timetable::{DayKey, RawEntry, Week};

static DATE_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new("(\\d{2})\\.(\\d{2})\\.(\\d{4})").unwrap());
static TIMESLOT_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new("(\\d+) пара: \\d\\d:\\d\\d-\\d\\d:\\d\\d").unwrap());
static ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new("(.+)\\[(Лк|Пз|Лб|Зач|Экз|Сем)\\][^\\n]*\\nауд\\. (.+)\\n(.+)").unwrap()
});

const SLOT_COLUMN: usize = 0;
const DATE_COLUMN: usize = 1;
const ENTRY_COLUMN: usize = 1;

/// Legacy `.xls` export of e-rozklad.
///
/// Only the first week of a sheet is read reliably; a sheet with several weeks in the same layout
/// is not supported.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpreadsheetParser;

impl DocumentParser for SpreadsheetParser {
  fn parse(&self, document: &[u8], _week: &Week) -> Result<RawWeek, ParseError> {
    let mut workbook: Xls<_> = open_workbook_from_rs(Cursor::new(document))?;
    let sheet = workbook
      .worksheet_range_at(0)
      .ok_or(ParseError::NoSheet)??;

    // rows of a range start at its first used column
    let padding = sheet
      .start()
      .map(|(_, column)| column as usize)
      .unwrap_or(0);

    let rows = sheet.rows().map(|row| {
      let mut cells = vec![String::new(); padding];
      cells.extend(row.iter().map(|cell| cell.to_string()));
      cells
    });

    let week = read_entries(rows);
    debug!("Raw entries: {:?}", week);

    Ok(week)
  }
}

/// Scans sheet rows top to bottom. A date row opens a day block, slot rows inside a block become
/// lessons, everything else is skipped.
pub fn read_entries<I, R, C>(rows: I) -> RawWeek
where
  I: IntoIterator<Item = R>,
  R: AsRef<[C]>,
  C: AsRef<str>,
{
  let mut week = RawWeek::new();
  let mut current: Option<DayKey> = None;
  let mut entries = Vec::new();

  for row in rows {
    let row = row.as_ref();

    if let Some(captures) = DATE_REGEX.captures(cell(row, DATE_COLUMN)) {
      if let Some(day) = current.take() {
        if !entries.is_empty() {
          week.insert(day, take(&mut entries));
        }
      }

      // a malformed date closes the block without opening a new one
      current = parse_date(&captures).map(DayKey::from);
    }

    if current.is_none() {
      continue;
    }

    let sequence = match TIMESLOT_REGEX
      .captures(cell(row, SLOT_COLUMN))
      .and_then(|captures| usize::from_str(&captures[1]).ok())
    {
      Some(sequence) => sequence,
      None => continue,
    };

    let captures = match ENTRY_REGEX.captures(cell(row, ENTRY_COLUMN)) {
      Some(captures) => captures,
      None => continue,
    };

    entries.push(RawEntry {
      sequence,
      name: captures[1].trim().to_string(),
      kind: captures[2].to_lowercase(),
      classroom: captures[3].trim().to_string(),
      lecturer: captures[4].trim().to_string(),
      notes: None,
    });
  }

  if let Some(day) = current {
    if !entries.is_empty() {
      week.insert(day, entries);
    }
  }

  week
}

fn cell<C: AsRef<str>>(row: &[C], column: usize) -> &str {
  row.get(column).map_or("", |value| value.as_ref())
}

fn parse_date(captures: &Captures) -> Option<Date> {
  let day = u8::from_str(&captures[1]).ok()?;
  let month = u8::from_str(&captures[2]).ok()?;
  let year = i32::from_str(&captures[3]).ok()?;

  Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

#[cfg(test)]
mod test {
  use time::macros::date;

  use super::*;

  const ALGEBRA: &str = "Алгебра[Лк] \nауд. 326\nИванов И.И.";

  fn algebra(sequence: usize) -> RawEntry {
    RawEntry {
      sequence,
      name: "Алгебра".to_string(),
      kind: "лк".to_string(),
      classroom: "326".to_string(),
      lecturer: "Иванов И.И.".to_string(),
      notes: None,
    }
  }

  #[test]
  fn reads_single_lesson() {
    let week = read_entries([["", "12.09.2022"], ["1 пара: 08:00-09:35", ALGEBRA]]);

    assert_eq!(
      week,
      RawWeek::from([(date!(2022-09-12).into(), vec![algebra(1)])])
    );
  }

  #[test]
  fn splits_days_and_skips_noise() {
    let rows = vec![
      vec!["Розклад групи", ""],
      vec!["1 пара: 08:00-09:35", ALGEBRA],
      vec!["", "12.09.2022"],
      vec!["Понеділок", ""],
      vec!["1 пара: 08:00-09:35", ALGEBRA],
      vec!["2 пара: 09:45-11:20", ""],
      vec!["3 пара: 11:45-13:20", "Фізкультура"],
      vec![
        "4 пара: 13:35-15:10",
        "Фізика[Лб] підгр. 1\nауд. 214\nПетров П.П.",
      ],
      vec!["", "13.09.2022"],
      vec!["", "14.09.2022"],
      vec!["2 пара: 09:45-11:20", "Алгебра[Пз] \nауд. 101\nИванов И.И."],
    ];

    let week = read_entries(rows);

    assert_eq!(week.len(), 2);
    assert_eq!(
      week[&DayKey::from(date!(2022-09-12))],
      vec![
        algebra(1),
        RawEntry {
          sequence: 4,
          name: "Фізика".to_string(),
          kind: "лб".to_string(),
          classroom: "214".to_string(),
          lecturer: "Петров П.П.".to_string(),
          notes: None,
        },
      ]
    );
    assert!(!week.contains_key(&DayKey::from(date!(2022-09-13))));
    assert_eq!(week[&DayKey::from(date!(2022-09-14))][0].kind, "пз");
    assert_eq!(week[&DayKey::from(date!(2022-09-14))][0].classroom, "101");
  }

  #[test]
  fn malformed_date_closes_block() {
    let rows = [
      ["", "12.09.2022"],
      ["1 пара: 08:00-09:35", ALGEBRA],
      ["", "31.02.2022"],
      ["2 пара: 09:45-11:20", ALGEBRA],
    ];

    let week = read_entries(rows);

    assert_eq!(
      week,
      RawWeek::from([(date!(2022-09-12).into(), vec![algebra(1)])])
    );
  }

  #[test]
  fn empty_sheet() {
    assert!(read_entries(Vec::<Vec<String>>::new()).is_empty());
  }

  #[test]
  fn rejects_non_spreadsheet_document() {
    let week = Week::containing(date!(2022-09-12).into());
    assert!(matches!(
      SpreadsheetParser.parse(b"<html>not a workbook</html>", &week),
      Err(ParseError::Spreadsheet(_))
    ));
  }
}
