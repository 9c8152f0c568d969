//! Housekeeping commands over the local database

use crate::Result;
use infobytes_common::models::MarketBreakdown;
use infobytes_common::store::{NicheCount, PostSummary, SqliteStore};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Niche ids retired from the catalogue in earlier releases
pub const RETIRED_NICHE_IDS: [&str; 9] = [
    "insurance",
    "health",
    "education",
    "banking",
    "indian-real-estate",
    "real-estate",
    "legal",
    "personal-finance",
    "us-tax",
];

/// Every post plus post counts per niche
#[derive(Debug, Clone, Serialize)]
pub struct PostsReport {
    pub posts: Vec<PostSummary>,
    pub niches: Vec<NicheCount>,
}

impl fmt::Display for PostsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total posts: {}", self.posts.len())?;
        writeln!(f)?;
        for post in &self.posts {
            writeln!(
                f,
                "  [{}] {} — {}",
                post.id,
                post.niche_id.as_deref().unwrap_or("-"),
                post.title
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Niches with post counts:")?;
        for niche in &self.niches {
            writeln!(f, "  {}: {} posts ({})", niche.id, niche.count, niche.name)?;
        }
        Ok(())
    }
}

pub async fn report(store: &SqliteStore) -> Result<PostsReport> {
    let (posts, niches) = store.posts_report().await?;
    Ok(PostsReport { posts, niches })
}

/// Copy each post's niche market onto the post; returns post counts per market
pub async fn sync_markets(store: &SqliteStore) -> Result<Vec<MarketBreakdown>> {
    let breakdown = store.sync_post_markets().await?;
    for row in &breakdown {
        info!(
            "Posts in market {}: {}",
            row.market.as_deref().unwrap_or("-"),
            row.count
        );
    }
    Ok(breakdown)
}

/// Deactivate niches; an empty list means [`RETIRED_NICHE_IDS`]
///
/// Returns the ids that were active before.
pub async fn deactivate_niches(store: &SqliteStore, ids: &[String]) -> Result<Vec<String>> {
    let ids: Vec<String> = if ids.is_empty() {
        RETIRED_NICHE_IDS.iter().map(|s| s.to_string()).collect()
    } else {
        ids.to_vec()
    };

    let changed = store.deactivate_niches(&ids).await?;
    for id in &changed {
        info!(niche = %id, "Deactivated");
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = PostsReport {
            posts: vec![PostSummary {
                id: 7,
                niche_id: Some("crypto".into()),
                title: "Bitcoin Halving Explained".into(),
                created_at: "2026-03-01 10:00:00".into(),
            }],
            niches: vec![NicheCount {
                id: "crypto".into(),
                name: "Cryptocurrency & Blockchain".into(),
                count: 1,
            }],
        };
        let text = report.to_string();
        assert!(text.starts_with("Total posts: 1\n"));
        assert!(text.contains("  [7] crypto — Bitcoin Halving Explained\n"));
        assert!(text.contains("  crypto: 1 posts (Cryptocurrency & Blockchain)\n"));
    }
}
