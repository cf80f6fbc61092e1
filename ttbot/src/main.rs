use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use time::macros::format_description;
use time::Date;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ttbot_rozklad::timetable::DayKey;
use ttbot_rozklad::{Converter, ScheduleConfig, Scraper, SourceConfig, WeekCache, Zone};

mod ascii;
mod http;

#[derive(Parser)]
#[command(author, version, about, long_about)]
struct Args {
  #[arg(long, short, env = "TTBOT_CONFIG", default_value = "ttbot.toml")]
  config: PathBuf,
  /// More output per occurrence; `RUST_LOG` takes precedence.
  #[arg(long, short, action = clap::ArgAction::Count)]
  verbose: u8,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve lessons per day over HTTP.
  Serve {
    #[arg(long, short, env = "TTBOT_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,
  },
  /// Print the lessons of one day.
  Show {
    /// `YYYY-MM-DD`, `DD.MM.YYYY`, `today` or `tomorrow`
    #[arg(default_value = "today")]
    day: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  init_logging(args.verbose);

  let config = load_config(&args.config)?;
  let converter = Converter::from_config(&config)?;
  let scraper = Scraper::from_config(&config)?;

  info!("Configuration:");
  info!("- Timezone: {}", config.timezone);
  info!("- Time slots: {}", config.timeslots_begin.len());
  match &config.source {
    SourceConfig::Spreadsheet {
      url,
      course,
      faculty,
      group,
    } => info!("- Source: spreadsheet {url} (course {course}, faculty {faculty}, group {group})"),
    SourceConfig::HtmlTable { url, group, .. } => info!("- Source: html table {url} (group {group})"),
  }

  let cache = Arc::new(WeekCache::new(Arc::new(scraper), converter));

  let result = match args.command {
    Command::Serve { listen } => serve(cache.clone(), listen).await,
    Command::Show { day } => show(&cache, &day).await,
  };

  cache.close().await?;
  info!("Stopped.");

  result
}

fn init_logging(verbosity: u8) {
  let level = match verbosity {
    0 => "info",
    1 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    EnvFilter::new(format!(
      "ttbot={level},ttbot_rozklad={level},tower_http={level}"
    ))
  });

  tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: &Path) -> anyhow::Result<ScheduleConfig> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file {}", path.display()))?;

  toml::from_str(&raw).with_context(|| format!("Failed to decode config file {}", path.display()))
}

async fn serve(cache: Arc<WeekCache>, listen: SocketAddr) -> anyhow::Result<()> {
  let listener = TcpListener::bind(listen)
    .await
    .with_context(|| format!("Failed to listen on {listen}"))?;

  info!("Listening on {}", listen);

  axum::serve(listener, http::router(cache))
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}

async fn show(cache: &WeekCache, day: &str) -> anyhow::Result<()> {
  let day = parse_day(day, cache.zone()).with_context(|| format!("Invalid date {day:?}"))?;
  let entries = cache
    .on_day(day)
    .await
    .context("Could not load schedule")?;

  println!(
    "{} {}\n{}",
    day.weekday(),
    day,
    ascii::table(&entries, cache.converter())
  );

  Ok(())
}

/// Accepts ISO dates, `DD.MM.YYYY`, `today` and `tomorrow` (in the reference timezone).
pub(crate) fn parse_day(value: &str, zone: Zone) -> Option<DayKey> {
  let today = DayKey::today(zone);

  match value.trim() {
    "today" => Some(today),
    "tomorrow" => Some(today.next()),
    value => Date::parse(value, format_description!("[year]-[month]-[day]"))
      .or_else(|_| Date::parse(value, format_description!("[day].[month].[year]")))
      .ok()
      .map(DayKey::from),
  }
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(err) = tokio::signal::ctrl_c().await {
      tracing::error!("Failed to listen for ctrl-c: {}", err);
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(err) => {
        tracing::error!("Failed to listen for SIGTERM: {}", err);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }

  info!("Shutting down...");
}
