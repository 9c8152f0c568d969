//! SqliteStore behaviour against an in-memory database

use infobytes_common::db::connect_in_memory;
use infobytes_common::models::{
    GenerationStatus, Market, NewPost, Niche, PostQuery, PostStatus, PostUpdate,
};
use infobytes_common::store::{BlogStore, SqliteStore, RELATED_POSTS_LIMIT};
use infobytes_common::Error;

fn niche(id: &str, market: Market, avg_cpc: f64) -> Niche {
    Niche {
        id: id.to_string(),
        name: id.to_uppercase(),
        description: Some(format!("{} niche", id)),
        avg_cpc,
        keywords: Some("alpha, beta".to_string()),
        market,
        is_active: true,
        created_at: String::new(),
        post_count: None,
    }
}

fn new_post(title: &str, niche_id: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        excerpt: Some(format!("About {}", title)),
        content: "word ".repeat(900),
        niche_id: Some(niche_id.to_string()),
        tags: Some("one, two".to_string()),
        ..Default::default()
    }
}

async fn setup_store() -> SqliteStore {
    let store = SqliteStore::new(connect_in_memory().await.unwrap());
    store.upsert_niche(&niche("movies", Market::Global, 1.5)).await.unwrap();
    store.upsert_niche(&niche("mutual-funds", Market::India, 9.0)).await.unwrap();
    store.upsert_niche(&niche("us-stocks", Market::Us, 6.0)).await.unwrap();
    store
}

#[tokio::test]
async fn tc_create_post_fills_defaults_and_inherits_niche_market() {
    let store = setup_store().await;

    let post = store
        .create_post(new_post("Best SIP Plans 2026", "mutual-funds"))
        .await
        .unwrap();

    assert_eq!(post.slug, "best-sip-plans-2026");
    assert_eq!(post.market, Market::India);
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.reading_time, 4);
    assert_eq!(post.author, "Editorial Team");
    assert_eq!(post.meta_title.as_deref(), Some("Best SIP Plans 2026"));
    assert_eq!(post.tag_list(), vec!["one", "two"]);
}

#[tokio::test]
async fn tc_duplicate_slug_is_conflict() {
    let store = setup_store().await;
    store.create_post(new_post("Same Title", "movies")).await.unwrap();

    let err = store.create_post(new_post("Same Title", "movies")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
async fn tc_unknown_niche_is_invalid_input() {
    let store = setup_store().await;
    let err = store.create_post(new_post("Orphan", "nope")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "got {:?}", err);
}

#[tokio::test]
async fn tc_featured_prefers_views_then_newest() {
    let store = setup_store().await;
    assert!(store.featured_post().await.unwrap().is_none());

    let a = store.create_post(new_post("First", "movies")).await.unwrap();
    let b = store.create_post(new_post("Second", "movies")).await.unwrap();

    // Equal views: newest wins
    assert_eq!(store.featured_post().await.unwrap().unwrap().id, b.id);

    store.record_view(a.id).await.unwrap();
    assert_eq!(store.featured_post().await.unwrap().unwrap().id, a.id);

    // Drafts never feature
    store
        .update_post(
            a.id,
            PostUpdate {
                status: Some(PostStatus::Draft),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.featured_post().await.unwrap().unwrap().id, b.id);
}

#[tokio::test]
async fn tc_post_by_slug_hides_drafts() {
    let store = setup_store().await;
    let mut draft = new_post("Hidden", "movies");
    draft.status = Some(PostStatus::Draft);
    store.create_post(draft).await.unwrap();

    assert!(store.post_by_slug("hidden").await.unwrap().is_none());
    assert!(store.all_slugs().await.unwrap().is_empty());
}

#[tokio::test]
async fn tc_related_posts_same_niche_excluding_self() {
    let store = setup_store().await;
    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(
            store
                .create_post(new_post(&format!("Movie {}", i), "movies"))
                .await
                .unwrap()
                .id,
        );
    }
    store.create_post(new_post("Fund", "mutual-funds")).await.unwrap();

    let current = store.post_by_slug("movie-0").await.unwrap().unwrap();
    let related = store.related_posts(&current, RELATED_POSTS_LIMIT).await.unwrap();

    assert_eq!(related.len(), 4);
    assert!(related.iter().all(|p| p.id != current.id));
    assert!(related.iter().all(|p| p.niche_id.as_deref() == Some("movies")));
    // Newest first
    assert_eq!(related[0].id, ids[5]);
}

#[tokio::test]
async fn tc_category_paging_and_unknown_niche() {
    let store = setup_store().await;
    for i in 0..14 {
        store
            .create_post(new_post(&format!("Stock {}", i), "us-stocks"))
            .await
            .unwrap();
    }

    let page1 = store.posts_by_category("us-stocks", 1).await.unwrap();
    assert_eq!(page1.niche.as_ref().map(|n| n.id.as_str()), Some("us-stocks"));
    assert_eq!(page1.total, 14);
    assert_eq!(page1.pages, 2);
    assert_eq!(page1.posts.len(), 12);

    let page2 = store.posts_by_category("us-stocks", 2).await.unwrap();
    assert_eq!(page2.posts.len(), 2);

    let unknown = store.posts_by_category("gardening", 1).await.unwrap();
    assert!(unknown.niche.is_none());
    assert!(unknown.posts.is_empty());
    assert_eq!(unknown.total, 0);
}

#[tokio::test]
async fn tc_search_filters() {
    let store = setup_store().await;
    store.create_post(new_post("Index Funds Explained", "mutual-funds")).await.unwrap();
    store.create_post(new_post("Top Thrillers", "movies")).await.unwrap();
    let mut draft = new_post("Draft Fund Notes", "mutual-funds");
    draft.status = Some(PostStatus::Draft);
    store.create_post(draft).await.unwrap();

    let all = store.search_posts(&PostQuery::default()).await.unwrap();
    assert_eq!(all.total, 3);

    let funds = store
        .search_posts(&PostQuery {
            q: Some("fund".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(funds.total, 2);

    let published_india = store
        .search_posts(&PostQuery {
            market: Some(Market::India),
            status: Some(PostStatus::Published),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(published_india.total, 1);
    assert_eq!(published_india.posts[0].slug, "index-funds-explained");

    let paged = store
        .search_posts(&PostQuery {
            limit: Some(2),
            page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paged.pages, 2);
    assert_eq!(paged.posts.len(), 1);
}

#[tokio::test]
async fn tc_niches_sorted_by_cpc_with_counts() {
    let store = setup_store().await;
    store.create_post(new_post("A", "movies")).await.unwrap();
    store.create_post(new_post("B", "movies")).await.unwrap();
    store.deactivate_niches(&["us-stocks".to_string()]).await.unwrap();

    let niches = store.niches().await.unwrap();
    let ids: Vec<&str> = niches.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["mutual-funds", "movies"]);
    assert_eq!(niches[1].post_count, Some(2));

    assert_eq!(store.all_niches().await.unwrap().len(), 3);
}

#[tokio::test]
async fn tc_update_partial_and_missing() {
    let store = setup_store().await;
    let post = store.create_post(new_post("Original", "movies")).await.unwrap();

    let updated = store
        .update_post(
            post.id,
            PostUpdate {
                title: Some("Renamed".to_string()),
                is_trending: Some(true),
                content: Some("short body".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.slug, "original");
    assert!(updated.is_trending);
    assert_eq!(updated.reading_time, 3);

    let err = store
        .update_post(
            post.id,
            PostUpdate {
                title: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = store.update_post(9999, PostUpdate::default()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn tc_delete_post() {
    let store = setup_store().await;
    let post = store.create_post(new_post("Gone Soon", "movies")).await.unwrap();

    store.delete_post(post.id).await.unwrap();
    assert!(store.post_by_id(post.id).await.unwrap().is_none());
    assert!(matches!(store.delete_post(post.id).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn tc_toggle_niche() {
    let store = setup_store().await;

    let niche = store.toggle_niche("movies").await.unwrap();
    assert!(!niche.is_active);
    assert!(store.active_niche("movies").await.unwrap().is_none());

    let niche = store.toggle_niche("movies").await.unwrap();
    assert!(niche.is_active);

    assert!(matches!(store.toggle_niche("nope").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn tc_stats_aggregate() {
    let store = setup_store().await;
    let a = store.create_post(new_post("Alpha", "mutual-funds")).await.unwrap();
    store.create_post(new_post("Beta", "movies")).await.unwrap();
    let mut draft = new_post("Gamma", "movies");
    draft.status = Some(PostStatus::Draft);
    store.create_post(draft).await.unwrap();

    for _ in 0..250 {
        store.record_view(a.id).await.unwrap();
    }
    store
        .log_generation(Some("movies"), "Beta", GenerationStatus::Success, None)
        .await
        .unwrap();
    store
        .log_generation(None, "unknown", GenerationStatus::Failed, Some("boom"))
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_posts, 3);
    assert_eq!(stats.published_posts, 2);
    assert_eq!(stats.draft_posts, 1);
    assert_eq!(stats.total_views, 250);
    assert_eq!(stats.today_posts, 3);
    assert_eq!(stats.estimated_revenue, "12.00");
    assert_eq!(stats.niche_breakdown.len(), 3);
    assert_eq!(stats.recent_logs.len(), 2);
    assert_eq!(stats.recent_logs[0].status, GenerationStatus::Failed);

    let india = stats
        .market_breakdown
        .iter()
        .find(|m| m.market.as_deref() == Some("india"))
        .unwrap();
    assert_eq!(india.count, 1);
    assert_eq!(india.views, 250);
}

#[tokio::test]
async fn tc_generator_queries() {
    let store = setup_store().await;
    store.create_post(new_post("Old Movie", "movies")).await.unwrap();
    store.create_post(new_post("New Movie", "movies")).await.unwrap();
    store.create_post(new_post("Fund", "mutual-funds")).await.unwrap();

    let counts = store.post_counts_by_niche().await.unwrap();
    assert_eq!(counts.get("movies"), Some(&2));
    assert_eq!(counts.get("us-stocks"), None);

    let titles = store.recent_titles("movies", 30).await.unwrap();
    assert_eq!(titles, vec!["New Movie", "Old Movie"]);

    assert!(store.slug_exists("fund").await.unwrap());
    assert!(!store.slug_exists("fund-2").await.unwrap());

    let active: Vec<String> = store
        .active_niches()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(active, vec!["movies", "mutual-funds", "us-stocks"]);
}

#[tokio::test]
async fn tc_insert_generated_post_keeps_slug() {
    let store = setup_store().await;
    let post = NewPost {
        slug: Some("my-slug-loyw3v28".to_string()),
        ..new_post("Generated", "movies")
    };
    let saved = store.insert_generated_post(post).await.unwrap();
    assert_eq!(saved.slug, "my-slug-loyw3v28");

    let missing_slug = new_post("No Slug", "movies");
    assert!(matches!(
        store.insert_generated_post(missing_slug).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn tc_upsert_niche_keeps_posts_and_reactivates() {
    let store = setup_store().await;
    store.create_post(new_post("Kept", "movies")).await.unwrap();
    store.deactivate_niches(&["movies".to_string()]).await.unwrap();

    let mut updated = niche("movies", Market::Global, 2.5);
    updated.name = "Movies & Cinema".to_string();
    store.upsert_niche(&updated).await.unwrap();

    let refreshed = store.active_niche("movies").await.unwrap().unwrap();
    assert_eq!(refreshed.name, "Movies & Cinema");
    assert_eq!(refreshed.avg_cpc, 2.5);
    assert!(store.post_by_slug("kept").await.unwrap().is_some());
}

#[tokio::test]
async fn tc_sync_markets_and_report() {
    let store = setup_store().await;
    let mut post = new_post("Mislabelled", "mutual-funds");
    post.market = Some(Market::Us);
    let created = store.create_post(post).await.unwrap();
    assert_eq!(created.market, Market::Us);

    let by_market = store.sync_post_markets().await.unwrap();
    assert_eq!(by_market.len(), 1);
    assert_eq!(by_market[0].market.as_deref(), Some("india"));

    let (posts, counts) = store.posts_report().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(counts[0].id, "mutual-funds");
    assert_eq!(counts[0].count, 1);

    let changed = store
        .deactivate_niches(&["movies".to_string(), "movies".to_string(), "nope".to_string()])
        .await
        .unwrap();
    assert_eq!(changed, vec!["movies"]);
}
