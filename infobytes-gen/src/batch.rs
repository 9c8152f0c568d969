//! Sequential batch generation

use crate::pipeline::PostGenerator;
use infobytes_common::models::Post;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub requested: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub posts: Vec<Post>,
    /// Error message of each failed run
    pub errors: Vec<String>,
}

/// Generate `count` posts one after another
///
/// A failed post is recorded and skipped. `delay` separates consecutive runs
/// and is not applied after the last one.
pub async fn run_batch(
    generator: &PostGenerator,
    count: u32,
    niche: Option<&str>,
    delay: Duration,
) -> BatchReport {
    let batch_id = Uuid::new_v4();
    info!(%batch_id, "Batch generating {} post(s)", count);

    let mut report = BatchReport {
        batch_id,
        requested: count,
        succeeded: 0,
        failed: 0,
        posts: Vec::new(),
        errors: Vec::new(),
    };

    for i in 0..count {
        info!(%batch_id, "[{}/{}]", i + 1, count);
        match generator.generate(niche).await {
            Ok(generated) => {
                report.succeeded += 1;
                report.posts.push(generated.post);
            }
            Err(e) => {
                warn!(%batch_id, "Post {} failed: {}", i + 1, e);
                report.failed += 1;
                report.errors.push(e.to_string());
            }
        }

        if i + 1 < count && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    info!(
        %batch_id,
        "Done! {} succeeded, {} failed", report.succeeded, report.failed
    );
    report
}
