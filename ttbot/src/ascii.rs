use ttbot_rozklad::timetable::{Entry, TimeSlot};
use ttbot_rozklad::Converter;

const HEADER: [&str; 6] = ["#", "Time", "Type", "Room", "Lesson", "Lecturer"];

pub fn table(entries: &[Entry], converter: &Converter) -> String {
  if entries.is_empty() {
    return "No lessons.\n".to_string();
  }

  let rows = entries
    .iter()
    .map(|entry| row(entry, converter))
    .collect::<Vec<[String; 6]>>();

  let mut widths = HEADER.map(|title| title.chars().count());
  for row in &rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  line(&mut out, &HEADER.map(str::to_string), &widths);
  let rule = widths
    .iter()
    .map(|width| "-".repeat(*width))
    .collect::<Vec<String>>()
    .join("-+-");
  out.push_str(&rule);
  out.push('\n');
  for row in &rows {
    line(&mut out, row, &widths);
  }

  out
}

fn row(entry: &Entry, converter: &Converter) -> [String; 6] {
  let start = TimeSlot::of(converter.zone().local(entry.time));
  let number = converter.slots().number_of(start);

  let time = match number.and_then(|number| converter.slots().end(number)) {
    Some(end) => format!("{start}-{end}"),
    None => start.to_string(),
  };

  [
    number.map(|number| number.to_string()).unwrap_or_default(),
    time,
    entry.kind.to_string(),
    entry.classroom.clone(),
    entry.name.clone(),
    entry.lecturer.clone(),
  ]
}

fn line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
  let last = cells.len() - 1;
  for (index, (cell, &width)) in cells.iter().zip(widths).enumerate() {
    if index == last {
      out.push_str(cell);
      out.push('\n');
    } else {
      out.push_str(&format!("{cell:<width$} | "));
    }
  }
}

#[cfg(test)]
mod test {
  use time::macros::datetime;

  use ttbot_rozklad::timetable::{LessonType, LessonTypes};
  use ttbot_rozklad::{Slots, Zone};

  use super::*;

  #[test]
  fn renders_aligned_rows() {
    let converter = Converter::new(
      Zone::by_name("Europe/Berlin").unwrap(),
      Slots::new(
        vec!["08:00".parse().unwrap(), "09:45".parse().unwrap()],
        vec!["09:35".parse().unwrap(), "11:20".parse().unwrap()],
      )
      .unwrap(),
      LessonTypes::default(),
    );
    let entries = [
      Entry {
        time: datetime!(2022-09-12 08:00 +2),
        kind: LessonType::Lecture,
        classroom: "326".to_string(),
        lecturer: "Иванов И.И.".to_string(),
        name: "Алгебра".to_string(),
      },
      Entry {
        time: datetime!(2022-09-12 09:45 +2),
        kind: LessonType::Lab,
        classroom: "214".to_string(),
        lecturer: "Петров П.П.".to_string(),
        name: "Фізика".to_string(),
      },
    ];

    assert_eq!(
      table(&entries, &converter),
      "\
# | Time        | Type    | Room | Lesson  | Lecturer
--+-------------+---------+------+---------+------------
1 | 08:00-09:35 | lecture | 326  | Алгебра | Иванов И.И.
2 | 09:45-11:20 | lab     | 214  | Фізика  | Петров П.П.
"
    );
  }

  #[test]
  fn renders_empty_day() {
    let converter = Converter::new(
      Zone::by_name("Europe/Berlin").unwrap(),
      Slots::new(vec!["08:00".parse().unwrap()], vec![]).unwrap(),
      LessonTypes::default(),
    );

    assert_eq!(table(&[], &converter), "No lessons.\n");
  }
}
