//! A tracing layer that drops events for selected exceptions at selected
//! levels.
//!
//! Some failures (upstream read timeouts, for example) are expected and
//! produce a noisy event every time. An event is suppressed when it carries
//! an `exception` field whose value equals a configured exception name and
//! its level is exactly the configured level. Events at other levels, for
//! other exceptions, or without an `exception` field pass through.
//!
//! ```rust,ignore
//! tracing::warn!(exception = "ReadTimeout", "upstream request timed out");
//! ```

use std::fmt;

use thiserror::Error;
use tracing::{
  Event, Level, Subscriber,
  field::{Field, Visit},
};
use tracing_subscriber::layer::{Context, Layer};

/// Field carrying the type name of the captured exception.
pub const EXCEPTION_FIELD: &str = "exception";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid log level name: {0:?}")]
pub struct InvalidLevel(pub String);

/// Parse a level name or number.
///
/// Accepts the tracing names plus their common aliases (`WARNING`,
/// `CRITICAL`, `FATAL`) in any case, and the numeric levels `5` through `50`.
/// `CRITICAL` and `FATAL` map to [`Level::ERROR`].
pub fn parse_level(name: &str) -> Result<Level, InvalidLevel> {
  match name.trim().to_ascii_uppercase().as_str() {
    "TRACE" | "5" => Ok(Level::TRACE),
    "DEBUG" | "10" => Ok(Level::DEBUG),
    "INFO" | "20" => Ok(Level::INFO),
    "WARN" | "WARNING" | "30" => Ok(Level::WARN),
    "ERROR" | "40" | "CRITICAL" | "FATAL" | "50" => Ok(Level::ERROR),
    _ => Err(InvalidLevel(name.to_owned())),
  }
}

/// Drops events for configured `(exception, level)` pairs.
#[derive(Debug, Clone, Default)]
pub struct ExceptionFilter {
  suppressed: Vec<(String, Level)>,
}

impl ExceptionFilter {
  /// Build a filter from `(exception name, level name)` pairs. Fails on the
  /// first level name [`parse_level`] does not recognise.
  pub fn new<I, N, L>(pairs: I) -> Result<Self, InvalidLevel>
  where
    I: IntoIterator<Item = (N, L)>,
    N: Into<String>,
    L: AsRef<str>,
  {
    let mut suppressed: Vec<(String, Level)> = Vec::new();
    for (name, level) in pairs {
      suppressed.push((name.into(), parse_level(level.as_ref())?));
    }
    Ok(Self { suppressed })
  }

  pub fn from_levels<I, N>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (N, Level)>,
    N: Into<String>,
  {
    Self { suppressed: pairs.into_iter().map(|(name, level)| (name.into(), level)).collect() }
  }

  /// Whether an event at `level` carrying `exception` should be dropped.
  pub fn suppresses(&self, exception: Option<&str>, level: Level) -> bool {
    let Some(exception) = exception else {
      return false;
    };
    self.suppressed.iter().any(|(name, l)| name == exception && *l == level)
  }
}

/// Pulls the `exception` field out of an event.
#[derive(Default)]
struct ExceptionVisitor(Option<String>);

impl Visit for ExceptionVisitor {
  fn record_str(&mut self, field: &Field, value: &str) {
    if field.name() == EXCEPTION_FIELD {
      self.0 = Some(value.to_owned());
    }
  }

  fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
    if field.name() == EXCEPTION_FIELD {
      self.0 = Some(format!("{value:?}").trim_matches('"').to_owned());
    }
  }
}

impl<S: Subscriber> Layer<S> for ExceptionFilter {
  fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
    if self.suppressed.is_empty() {
      return true;
    }
    let mut visitor = ExceptionVisitor::default();
    event.record(&mut visitor);
    !self.suppresses(visitor.0.as_deref(), *event.metadata().level())
  }
}
