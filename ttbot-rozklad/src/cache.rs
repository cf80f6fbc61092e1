use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use time::{OffsetDateTime, UtcOffset};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::convert::Converter;
use crate::error::Error;
use crate::source::Source;
use crate::timetable::{DayKey, Entry, Week};
use crate::zone::Zone;

/// How long a fetched day is served before it is fetched again.
pub const MAX_AGE: Duration = Duration::from_secs(60 * 60);
/// Upper bound of cached days after a janitor pass.
pub const CAPACITY: usize = 100;
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

struct CachedDay {
  entries: Vec<Entry>,
  retrieved_on: Instant,
}

impl CachedDay {
  fn is_fresh(&self) -> bool {
    self.retrieved_on.elapsed() <= MAX_AGE
  }
}

struct Shared {
  source: Arc<dyn Source>,
  converter: Converter,
  days: RwLock<HashMap<DayKey, CachedDay>>,
}

/// Per-day lesson cache that refreshes whole Monday–Sunday weeks from its [`Source`].
///
/// Owns a janitor task evicting stale days every [`CLEANUP_INTERVAL`]; stop it with
/// [`WeekCache::close`]. Must be created inside a tokio runtime.
pub struct WeekCache {
  shared: Arc<Shared>,
  cancel: CancellationToken,
  janitor: Mutex<Option<JoinHandle<()>>>,
}

impl WeekCache {
  pub fn new(source: Arc<dyn Source>, converter: Converter) -> Self {
    let shared = Arc::new(Shared {
      source,
      converter,
      days: RwLock::new(HashMap::new()),
    });
    let cancel = CancellationToken::new();
    let janitor = tokio::spawn(janitor(shared.clone(), cancel.clone()));

    Self {
      shared,
      cancel,
      janitor: Mutex::new(Some(janitor)),
    }
  }

  pub fn zone(&self) -> Zone {
    self.shared.converter.zone()
  }

  pub fn converter(&self) -> &Converter {
    &self.shared.converter
  }

  /// Lessons of `day`, refreshing its week first when the day is missing or stale.
  ///
  /// An empty list is a valid answer for a day without lessons. On error nothing is cached.
  pub async fn on_day(&self, day: DayKey) -> Result<Vec<Entry>, Error> {
    if let Some(cached) = self.shared.days.read().await.get(&day) {
      if cached.is_fresh() {
        return Ok(cached.entries.clone());
      }
    }

    self.shared.refresh(day).await
  }

  /// The lesson starting in the same minute as `at`, if there is one.
  pub async fn exact_get(&self, at: OffsetDateTime) -> Result<Option<Entry>, Error> {
    let day = DayKey::of(at, self.zone());
    let minute = truncate_to_minute(at);

    Ok(
      self
        .on_day(day)
        .await?
        .into_iter()
        .find(|entry| truncate_to_minute(entry.time) == minute),
    )
  }

  /// Forgets `day` without fetching; the next read refreshes its week.
  pub async fn evict(&self, day: DayKey) {
    if self.shared.days.write().await.remove(&day).is_some() {
      info!("Evicted {} from cache", day);
    }
  }

  /// Runs one janitor pass now and returns the number of removed days.
  pub async fn purge(&self) -> usize {
    self.shared.purge().await
  }

  pub async fn len(&self) -> usize {
    self.shared.days.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.len().await == 0
  }

  /// Stops the janitor and waits until it has exited.
  pub async fn close(&self) -> Result<(), Error> {
    self.cancel.cancel();

    if let Some(handle) = self.janitor.lock().await.take() {
      handle.await?;
    }

    Ok(())
  }
}

impl Drop for WeekCache {
  fn drop(&mut self) {
    self.cancel.cancel();
  }
}

impl Shared {
  async fn refresh(&self, day: DayKey) -> Result<Vec<Entry>, Error> {
    let week = Week::containing(day);

    info!("Downloading table for {}-{}...", week.first(), week.last());
    let mut raw = self.source.load(&week).await?;

    let outside = raw.keys().filter(|key| !week.contains(**key)).count();
    if outside != 0 {
      debug!(
        "Ignoring {} days outside of {}-{}",
        outside,
        week.first(),
        week.last()
      );
    }

    let mut days = Vec::with_capacity(week.len());
    for day in week.days() {
      let entries = raw.remove(&day).unwrap_or_default();
      days.push((day, self.converter.convert(day, &entries)));
    }

    let requested = days
      .iter()
      .find(|(key, _)| *key == day)
      .map(|(_, entries)| entries.clone())
      .unwrap_or_default();

    let retrieved_on = Instant::now();
    let mut cache = self.days.write().await;
    for (day, entries) in days {
      cache.insert(
        day,
        CachedDay {
          entries,
          retrieved_on,
        },
      );
    }

    Ok(requested)
  }

  async fn purge(&self) -> usize {
    let mut days = self.days.write().await;
    let before = days.len();

    days.retain(|_, day| day.is_fresh());

    while days.len() > CAPACITY {
      let oldest = days
        .iter()
        .min_by_key(|(_, day)| day.retrieved_on)
        .map(|(key, _)| *key);

      match oldest {
        Some(key) => days.remove(&key),
        None => break,
      };
    }

    let removed = before - days.len();
    if removed != 0 {
      info!("Removed {} stale days from cache", removed);
    }

    removed
  }
}

/// Same instant with seconds and below dropped, independent of the offset.
fn truncate_to_minute(at: OffsetDateTime) -> OffsetDateTime {
  let at = at.to_offset(UtcOffset::UTC);
  at - time::Duration::seconds(at.second().into())
    - time::Duration::nanoseconds(at.nanosecond().into())
}

async fn janitor(shared: Arc<Shared>, cancel: CancellationToken) {
  let mut interval = interval_at(Instant::now() + CLEANUP_INTERVAL, CLEANUP_INTERVAL);

  loop {
    tokio::select! {
      _ = cancel.cancelled() => break,
      _ = interval.tick() => {
        shared.purge().await;
      }
    }
  }

  debug!("Cache janitor stopped");
}
