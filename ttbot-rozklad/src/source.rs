use async_trait::async_trait;

use crate::config::ScheduleConfig;
use crate::error::{ConfigError, Error};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::parser::{self, DocumentParser, RawWeek};
use crate::timetable::Week;

/// Where the cache gets whole weeks of raw lessons from.
#[async_trait]
pub trait Source: Send + Sync {
  async fn load(&self, week: &Week) -> Result<RawWeek, Error>;
}

/// Fetcher and parser of one institution site.
pub struct Scraper {
  fetcher: Box<dyn Fetcher>,
  parser: Box<dyn DocumentParser>,
}

impl Scraper {
  pub fn new(fetcher: Box<dyn Fetcher>, parser: Box<dyn DocumentParser>) -> Self {
    Self { fetcher, parser }
  }

  pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
    let fetcher = HttpFetcher::for_source(&config.source, config.fetch_timeout())?;

    Ok(Self::new(
      Box::new(fetcher),
      parser::for_source(&config.source),
    ))
  }
}

#[async_trait]
impl Source for Scraper {
  async fn load(&self, week: &Week) -> Result<RawWeek, Error> {
    let document = self.fetcher.fetch(week).await?;
    Ok(self.parser.parse(&document, week)?)
  }
}
