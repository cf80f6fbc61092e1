use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::info;

use crate::config::SourceConfig;
use crate::error::{ConfigError, FetchError};
use crate::timetable::Week;

/// Issues the single outbound request for a week and returns the raw document.
#[async_trait]
pub trait Fetcher: Send + Sync {
  async fn fetch(&self, week: &Week) -> Result<Vec<u8>, FetchError>;
}

#[derive(Clone, Debug)]
enum Request {
  /// Form post of the spreadsheet export.
  Form { course: u32, faculty: u32, group: u32 },
  /// Plain GET with the range in the query string.
  Query { group: u32 },
}

pub struct HttpFetcher {
  client: Client,
  url: Url,
  request: Request,
}

impl HttpFetcher {
  pub fn for_source(source: &SourceConfig, timeout: Duration) -> Result<Self, ConfigError> {
    let (url, request) = match source {
      SourceConfig::Spreadsheet {
        url,
        course,
        faculty,
        group,
      } => (
        url,
        Request::Form {
          course: *course,
          faculty: *faculty,
          group: *group,
        },
      ),
      SourceConfig::HtmlTable { url, group, .. } => (url, Request::Query { group: *group }),
    };

    let url = Url::parse(url).map_err(|err| ConfigError::InvalidUrl {
      url: url.clone(),
      reason: err.to_string(),
    })?;
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(FetchError::Client)?;

    Ok(Self {
      client,
      url,
      request,
    })
  }
}

#[async_trait]
impl Fetcher for HttpFetcher {
  async fn fetch(&self, week: &Week) -> Result<Vec<u8>, FetchError> {
    let from = week.first().to_string();
    let to = week.last().to_string();

    let request = match &self.request {
      Request::Form {
        course,
        faculty,
        group,
      } => self.client.post(self.url.clone()).form(&[
        ("timeTable", "0".to_string()),
        ("TimeTableForm[course]", course.to_string()),
        ("TimeTableForm[date1]", from),
        ("TimeTableForm[date2]", to),
        ("TimeTableForm[group]", group.to_string()),
        ("TimeTableForm[faculty]", faculty.to_string()),
        ("TimeTableForm[r11]", "5".to_string()),
      ]),
      Request::Query { group } => self.client.get(self.url.clone()).query(&[
        ("group", group.to_string()),
        ("date_from", from),
        ("date_to", to),
      ]),
    };

    let response = request.send().await.map_err(FetchError::Request)?;

    let status = response.status();
    if status != StatusCode::OK {
      return Err(FetchError::Status(status));
    }

    // chunked responses carry no length and count as empty
    match response.content_length() {
      None | Some(0) => return Err(FetchError::EmptyBody),
      Some(_) => {}
    }

    let body = response.bytes().await.map_err(FetchError::Body)?;
    if body.is_empty() {
      return Err(FetchError::EmptyBody);
    }

    info!(
      "Fetched {} bytes for {}-{} from {}",
      body.len(),
      week.first(),
      week.last(),
      self.url
    );

    Ok(body.to_vec())
  }
}
