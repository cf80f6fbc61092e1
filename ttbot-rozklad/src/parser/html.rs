use select::document::Document;
use select::node::Node;
use select::predicate::Name;
use tracing::debug;

use crate::config::HtmlColumns;
use crate::error::ParseError;
use crate::parser::{DocumentParser, RawWeek};
use crate::timetable::{RawEntry, Week};

const SUBJECT_SEPARATOR: &str = " - ";

/// Page with one `<tbody>` per day, in date order from the first requested day on.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlTableParser {
  columns: HtmlColumns,
}

impl HtmlTableParser {
  pub fn new(columns: HtmlColumns) -> Self {
    Self { columns }
  }

  /// Lessons of one table body. The sequence is the position of the row, so a skipped row leaves a
  /// gap in the numbering.
  fn read_day(&self, body: Node) -> Vec<RawEntry> {
    let mut entries = Vec::new();

    for (index, row) in body.find(Name("tr")).enumerate() {
      let columns = row
        .find(Name("td"))
        .map(|data| data.text().trim().to_string())
        .collect::<Vec<String>>();

      let column = |position: usize| columns.get(position).cloned().unwrap_or_default();

      let subject = column(self.columns.subject);
      if subject.is_empty() {
        continue;
      }

      let (name, kind) = split_subject(&subject);
      let notes = column(self.columns.notes);

      entries.push(RawEntry {
        sequence: index + 1,
        name,
        kind,
        classroom: column(self.columns.classroom),
        lecturer: column(self.columns.lecturer),
        notes: if notes.is_empty() { None } else { Some(notes) },
      });
    }

    entries
  }
}

impl DocumentParser for HtmlTableParser {
  fn parse(&self, document: &[u8], week: &Week) -> Result<RawWeek, ParseError> {
    let text = String::from_utf8_lossy(document);
    let document = Document::from(text.as_ref());

    if document.find(Name("table")).next().is_none() {
      return Err(ParseError::MissingTable);
    }

    let mut days = RawWeek::new();

    for (offset, body) in document.find(Name("tbody")).enumerate() {
      let entries = self.read_day(body);
      if !entries.is_empty() {
        days.insert(week.first().offset(offset), entries);
      }
    }

    debug!("Raw entries: {:?}", days);

    Ok(days)
  }
}

/// Splits `"<name> - <type>"` at the last separator, names may contain it too.
fn split_subject(subject: &str) -> (String, String) {
  match subject.rsplit_once(SUBJECT_SEPARATOR) {
    Some((name, kind)) => (name.trim().to_string(), kind.trim().to_string()),
    None => (subject.to_string(), String::new()),
  }
}

#[cfg(test)]
mod test {
  use time::macros::date;

  use crate::timetable::DayKey;

  use super::*;

  const PAGE: &str = r#"
    <html><body>
      <table>
        <thead><tr><th>#</th><th>Дисципліна</th><th>Ауд.</th><th>Викладач</th><th></th></tr></thead>
        <tbody>
          <tr><td>1</td><td>Алгебра - Лк</td><td>326</td><td>Іванов І.І.</td><td></td></tr>
          <tr><td>2</td><td>  </td><td></td><td></td><td></td></tr>
          <tr><td>3</td><td>Web - технології - Лб</td><td>214</td><td>Петров П.П.</td><td>підгрупа 1</td></tr>
        </tbody>
      </table>
      <table><tbody></tbody></table>
      <table>
        <tbody>
          <tr><td>1</td><td>Фізика - Пз</td><td>101</td><td>Сидоренко С.С.</td><td></td></tr>
        </tbody>
      </table>
    </body></html>
  "#;

  fn week() -> Week {
    Week::containing(date!(2022-09-12).into())
  }

  #[test]
  fn reads_one_table_body_per_day() {
    let days = HtmlTableParser::default()
      .parse(PAGE.as_bytes(), &week())
      .unwrap();

    assert_eq!(days.len(), 2);
    assert!(!days.contains_key(&DayKey::from(date!(2022-09-13))));

    let wednesday = &days[&DayKey::from(date!(2022-09-14))];
    assert_eq!(
      wednesday,
      &vec![RawEntry {
        sequence: 1,
        name: "Фізика".to_string(),
        kind: "Пз".to_string(),
        classroom: "101".to_string(),
        lecturer: "Сидоренко С.С.".to_string(),
        notes: None,
      }]
    );
  }

  #[test]
  fn splits_subject_at_last_separator() {
    let days = HtmlTableParser::default()
      .parse(PAGE.as_bytes(), &week())
      .unwrap();

    let monday = &days[&DayKey::from(date!(2022-09-12))];
    assert_eq!(monday[0].name, "Алгебра");
    assert_eq!(monday[0].kind, "Лк");
    assert_eq!(monday[1].name, "Web - технології");
    assert_eq!(monday[1].kind, "Лб");
    assert_eq!(monday[1].notes.as_deref(), Some("підгрупа 1"));
  }

  /// A blank row is skipped but still counts as a position, so the lesson after it keeps its
  /// physical row number and the sequence has a gap.
  #[test]
  fn blank_row_leaves_sequence_gap() {
    let days = HtmlTableParser::default()
      .parse(PAGE.as_bytes(), &week())
      .unwrap();

    let sequences = days[&DayKey::from(date!(2022-09-12))]
      .iter()
      .map(|entry| entry.sequence)
      .collect::<Vec<usize>>();
    assert_eq!(sequences, vec![1, 3]);
  }

  #[test]
  fn page_without_table_is_an_error() {
    assert!(matches!(
      HtmlTableParser::default().parse(b"<html><body>Service unavailable</body></html>", &week()),
      Err(ParseError::MissingTable)
    ));
  }

  #[test]
  fn subject_without_type() {
    assert_eq!(
      split_subject("Кураторська година"),
      ("Кураторська година".to_string(), String::new())
    );
  }
}
