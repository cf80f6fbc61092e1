//! Group timetable of e-rozklad, scraped from the documents the site exports and served per day
//! from a self-refreshing week cache.

pub use cache::WeekCache;
pub use config::{HtmlColumns, ScheduleConfig, SourceConfig};
pub use convert::{Converter, Slots};
pub use error::{ConfigError, ConvertError, Error, FetchError, ParseError, TimeSlotError};
pub use source::{Scraper, Source};
pub use zone::Zone;

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod source;
pub mod timetable;
pub mod zone;
