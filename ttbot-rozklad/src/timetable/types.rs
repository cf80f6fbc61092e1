use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::ConvertError;
use crate::timetable::LessonType::{self, Credit, Exam, Lab, Lecture, Practice, Seminar};

/// Full words and abbreviations used by e-rozklad, lower case.
pub static LESSON_TYPES: Lazy<HashMap<&'static str, LessonType>> = Lazy::new(|| {
  HashMap::from([
    ("лб", Lab),
    ("лабораторная", Lab),
    ("лабораторна", Lab),
    ("пз", Practice),
    ("практическое", Practice),
    ("практичне", Practice),
    ("лк", Lecture),
    ("лекция", Lecture),
    ("лекція", Lecture),
    ("экз", Exam),
    ("экзамен", Exam),
    ("екзамен", Exam),
    ("зач", Credit),
    ("зачет", Credit),
    ("залік", Credit),
    ("сем", Seminar),
    ("семинар", Seminar),
    ("семінар", Seminar),
  ])
});

/// Case-insensitive free-text to [`LessonType`] lookup.
#[derive(Clone, Debug)]
pub struct LessonTypes(HashMap<String, LessonType>);

impl LessonTypes {
  pub fn new<K: AsRef<str>>(table: impl IntoIterator<Item = (K, LessonType)>) -> Self {
    Self(
      table
        .into_iter()
        .map(|(text, kind)| (text.as_ref().trim().to_lowercase(), kind))
        .collect(),
    )
  }

  pub fn resolve(&self, text: &str) -> Result<LessonType, ConvertError> {
    self
      .0
      .get(&text.trim().to_lowercase())
      .copied()
      .ok_or_else(|| ConvertError::UnknownLessonType(text.to_string()))
  }
}

impl Default for LessonTypes {
  fn default() -> Self {
    Self::new(LESSON_TYPES.iter().map(|(text, kind)| (*text, *kind)))
  }
}
