//! Cron-driven recurring generation

use crate::{GenerationError, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Parsed cron schedule, evaluated in UTC
#[derive(Debug, Clone)]
pub struct Schedule {
    expression: String,
    inner: cron::Schedule,
}

impl Schedule {
    /// Accepts standard 5-field cron (minute precision) or 6/7-field
    /// expressions with a leading seconds field.
    pub fn parse(expr: &str) -> Result<Self> {
        let expression = expr.split_whitespace().collect::<Vec<_>>().join(" ");
        let fields = expression.split(' ').filter(|f| !f.is_empty()).count();

        let normalized = match fields {
            5 => format!("0 {}", expression),
            6 | 7 => expression.clone(),
            _ => {
                return Err(GenerationError::Config(format!(
                    "Invalid cron expression: {}",
                    expr
                )))
            }
        };

        let inner = cron::Schedule::from_str(&normalized).map_err(|e| {
            GenerationError::Config(format!("Invalid cron expression: {} ({})", expr, e))
        })?;

        Ok(Self { expression, inner })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `after`
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.inner.after(after).next()
    }
}

/// Run `job` at every fire time until `shutdown` is cancelled
///
/// A failing job is logged and the loop keeps going. Cancellation is
/// honoured while waiting; a job already running is allowed to finish.
pub async fn run_scheduler<F, Fut>(schedule: Schedule, mut job: F, shutdown: CancellationToken)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    info!("Scheduler running: {}", schedule.expression());

    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(&now) else {
            warn!("Schedule '{}' has no future fire times", schedule.expression());
            break;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        info!("Next run at {}", next.to_rfc3339());

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        info!("[{}] Running batch generation", Utc::now().to_rfc3339());
        if let Err(e) = job().await {
            error!("Batch failed: {}", e);
        }

        if shutdown.is_cancelled() {
            break;
        }
    }

    info!("Scheduler stopped");
}
