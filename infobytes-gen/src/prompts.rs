//! Prompt construction for topic, article and draft generation
//!
//! Prompts are date-aware: every request carries today's date so the model
//! frames content for the current year.

use chrono::{Datelike, Duration, NaiveDate};
use infobytes_common::models::{Market, Niche};
use serde::{Deserialize, Serialize};

/// Existing titles listed in a topic prompt
pub const MAX_AVOID_TITLES: usize = 30;

/// Niches written in the entertainment voice
const ENTERTAINMENT_NICHES: [&str; 5] = ["movies", "tv-series", "bollywood", "hollywood", "ott-streaming"];

/// Niche ids a free-form draft may be filed under
pub const KNOWN_NICHE_IDS: [&str; 15] = [
    "movies",
    "tv-series",
    "bollywood",
    "hollywood",
    "ott-streaming",
    "trending",
    "indian-stocks",
    "mutual-funds",
    "tax-planning",
    "indian-insurance",
    "us-stocks",
    "us-insurance",
    "finance",
    "technology",
    "crypto",
];

/// Today's date rendered the ways the prompts need it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateContext {
    /// "October 19, 2026"
    pub full: String,
    /// "October 2026"
    pub month: String,
    pub year: i32,
    /// "October 18, 2026"
    pub yesterday: String,
}

impl DateContext {
    pub fn for_date(date: NaiveDate) -> Self {
        let yesterday = date - Duration::days(1);
        Self {
            full: date.format("%B %-d, %Y").to_string(),
            month: date.format("%B %Y").to_string(),
            year: date.year(),
            yesterday: yesterday.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Topic object requested by [`topic_prompt`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "imageQuery")]
    pub image_query: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
}

impl Topic {
    /// Audience for the article: the market the model named for this topic,
    /// else the niche's. A name that is not a known market means global.
    pub fn audience(&self, niche_market: Market) -> Market {
        match self.market.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(name) => Market::parse_or_global(name),
            None => niche_market,
        }
    }
}

/// Post object requested by [`from_request_prompt`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftReply {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub niche_id: Option<String>,
    #[serde(default, rename = "imageQuery")]
    pub image_query: Option<String>,
}

/// Persona text for niches that have one
pub fn niche_persona(niche_id: &str) -> &'static str {
    match niche_id {
        "movies" => "You are a professional movie critic and film journalist. Cover latest movie releases, reviews, box office analysis, trailers, casting news. Include IMDb/Rotten Tomatoes-style ratings where appropriate. Reference specific actors, directors, studios, release dates.",
        "tv-series" => "You are a TV series reviewer. Cover latest streaming shows, season reviews, episode guides, casting news, show comparisons. Reference specific streaming platforms (Netflix, Prime, HBO, Disney+, Apple TV+).",
        "bollywood" => "You are a Bollywood entertainment journalist. Cover latest Hindi/regional Indian films, OTT releases on JioCinema/Hotstar/Netflix India, box office collection in crores (₹), Bollywood gossip and upcoming releases. Use Indian context.",
        "hollywood" => "You are a Hollywood entertainment journalist. Cover Marvel/DC movies, Oscar predictions, big-budget blockbusters, director spotlights, and industry trends. Use US box office numbers in USD.",
        "ott-streaming" => "You are a streaming platform expert. Compare shows across Netflix, Amazon Prime, Disney+, HBO Max, Apple TV+. Cover new releases this week, hidden gems, subscription deals, and \"what to watch\" guides.",
        "trending" => "You are a news journalist covering today's trending topics. Write about viral stories, breaking developments, Google Trends topics, social media buzz, and current events from the last 24-48 hours. Be timely and factual.",
        _ => "",
    }
}

pub fn is_entertainment(niche_id: &str) -> bool {
    ENTERTAINMENT_NICHES.contains(&niche_id)
}

fn topic_market_context(market: Market) -> &'static str {
    match market {
        Market::India => "Target audience: Indian readers. Use Indian context: INR (₹) currency, Indian references, Bollywood, Indian streaming platforms (JioCinema, Hotstar, SonyLIV), SEBI, RBI, Indian tax laws where relevant.",
        Market::Us => "Target audience: American readers. Use US context: USD ($) currency, Hollywood, US streaming platforms, SEC, IRS where relevant.",
        Market::Global => "Target audience: Global readers. Keep content internationally relevant.",
    }
}

fn content_market_context(market: Market) -> &'static str {
    match market {
        Market::India => "Write for an INDIAN audience. Use INR (₹) for currency. Reference Indian context.",
        Market::Us => "Write for an AMERICAN audience. Use USD ($) for currency. Reference US context.",
        Market::Global => "Write for a GLOBAL audience.",
    }
}

fn draft_market_context(market: Market) -> &'static str {
    match market {
        Market::India => "Indian audience (use ₹, Indian context)",
        Market::Us => "US audience (use $, US context)",
        Market::Global => "Global audience",
    }
}

/// Ask for a fresh, current topic in `niche` that avoids `existing_titles`
pub fn topic_prompt(
    niche: &Niche,
    existing_titles: &[String],
    market: Market,
    date: &DateContext,
) -> String {
    let avoid_list = existing_titles
        .iter()
        .take(MAX_AVOID_TITLES)
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");

    let keywords = match niche.keywords.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(k) => format!("Seed keywords: {}", k),
        None => String::new(),
    };

    let avoid = if avoid_list.is_empty() {
        String::new()
    } else {
        format!("ALREADY PUBLISHED (do NOT repeat):\n{}\n", avoid_list)
    };

    format!(
        r#"{persona}

You are a content strategist for "Info Bytes", a trending news and entertainment blog.
CURRENT DATE: {full} (YESTERDAY: {yesterday})
CURRENT YEAR: {year}

{market_context}

Goal: Generate a blog post topic that:
1. Is EXTREMELY CURRENT: reference things happening THIS WEEK or YESTERDAY
2. Would rank well in Google search TODAY and attract clicks
3. Has high search volume potential
4. MUST be about {year} content ONLY. NEVER reference {prev_year} or older content as current

NICHE: {name}
{keywords}

{avoid}
Return ONLY a JSON object (no markdown, no backticks):
{{
  "title": "Compelling, click-worthy title with {year} reference (50-65 chars ideal)",
  "slug": "url-friendly-slug-with-dashes",
  "keyword": "primary target keyword phrase",
  "excerpt": "Compelling 1-2 sentence meta description (120-155 chars)",
  "tags": ["tag1", "tag2", "tag3", "tag4"],
  "imageQuery": "2-3 word search query for hero image",
  "market": "{market}"
}}"#,
        persona = niche_persona(&niche.id),
        full = date.full,
        yesterday = date.yesterday,
        year = date.year,
        prev_year = date.year - 1,
        market_context = topic_market_context(market),
        name = niche.name,
        keywords = keywords,
        avoid = avoid,
        market = market,
    )
}

/// Ask for the full markdown article for `topic`
pub fn content_prompt(topic: &Topic, niche: &Niche, market: Market, date: &DateContext) -> String {
    let entertainment = is_entertainment(&niche.id);
    let tone = if entertainment {
        "Engaging, passionate, opinionated but balanced. Include personal-style recommendations."
    } else {
        "Authoritative, helpful, clear. Write like a senior expert."
    };
    let detail = if entertainment {
        "Include specific ratings (out of 10), streaming platform availability, cast/director names, and release dates."
    } else {
        "Include specific numbers, current data points, and statistics."
    };

    format!(
        r#"{persona}

Write a comprehensive blog article for the "Info Bytes" blog.
CURRENT DATE: {full}
YESTERDAY: {yesterday}

TOPIC: {title}
PRIMARY KEYWORD: {keyword}
TARGET: People searching Google for this topic TODAY in {month}.

{market_context}

STRICT RULES:
1. Write 1800-2500 words of HIGH-QUALITY, original, CURRENT content
2. ALL information must be CURRENT as of {month}. NEVER write about {prev_year} events as current
3. Use Markdown formatting:
   - Start with a strong intro paragraph (NO H1)
   - Use ## for main sections (4-6 sections)
   - Use ### for sub-sections where needed
   - Use bullet/numbered lists where appropriate
   - Bold **key terms** naturally
4. SEO OPTIMIZATION:
   - Include the primary keyword in the first paragraph
   - Use the keyword in at least 2 H2 headings naturally
   - Include 3-5 related/LSI keywords throughout
   - End with a "Key Takeaways" or "The Bottom Line" section
5. TONE: {tone}
6. {detail}
7. DO NOT reference {prev_year} or earlier as current. Everything must be framed for {year}.
8. DO NOT start with "In today's world" or similar cliches.
9. Reference that this content is updated for {month} where natural.

Return ONLY the markdown content, nothing else."#,
        persona = niche_persona(&niche.id),
        full = date.full,
        yesterday = date.yesterday,
        title = topic.title,
        keyword = topic.keyword,
        month = date.month,
        market_context = content_market_context(market),
        prev_year = date.year - 1,
        tone = tone,
        detail = detail,
        year = date.year,
    )
}

/// Admin AI assist: turn a free-form request into a complete post object
pub fn from_request_prompt(user_prompt: &str, market: Market, date: &DateContext) -> String {
    format!(
        r#"You are an expert blog content writer for "Info Bytes". Current date: {full}.

USER REQUEST: {user_prompt}

Generate a complete blog post based on the user's request.
IMPORTANT: Content MUST be about {year}. NEVER reference {prev_year} or earlier as current.
Market: {market_context}

Return ONLY a JSON object (no markdown, no backticks):
{{
  "title": "SEO-optimized title",
  "slug": "url-friendly-slug",
  "excerpt": "Meta description (120-155 chars)",
  "content": "Full markdown article (1800-2500 words, well-structured with ## headings, lists, bold terms)",
  "tags": ["tag1", "tag2", "tag3"],
  "niche_id": "best matching niche id from: {niche_ids}",
  "imageQuery": "2-3 word image search query"
}}"#,
        full = date.full,
        user_prompt = user_prompt,
        year = date.year,
        prev_year = date.year - 1,
        market_context = draft_market_context(market),
        niche_ids = KNOWN_NICHE_IDS.join(", "),
    )
}

/// Ask for a short stock-photo search query
pub fn image_query_prompt(subject: &str) -> String {
    format!(
        "Generate a single, specific Unsplash-style search query (2-4 words max) for a blog hero image about: \"{}\". Return ONLY the search words, nothing else.",
        subject
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn niche(id: &str, keywords: Option<&str>) -> Niche {
        Niche {
            id: id.to_string(),
            name: "Mutual Funds India".to_string(),
            description: None,
            avg_cpc: 7.5,
            keywords: keywords.map(str::to_string),
            market: Market::India,
            is_active: true,
            created_at: String::new(),
            post_count: None,
        }
    }

    fn date() -> DateContext {
        DateContext::for_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
    }

    #[test]
    fn test_date_context() {
        let d = date();
        assert_eq!(d.full, "March 1, 2026");
        assert_eq!(d.month, "March 2026");
        assert_eq!(d.year, 2026);
        assert_eq!(d.yesterday, "February 28, 2026");
    }

    #[test]
    fn test_topic_prompt_lists_at_most_30_titles() {
        let titles: Vec<String> = (0..40).map(|i| format!("Title {}", i)).collect();
        let prompt = topic_prompt(&niche("mutual-funds", Some("sip, elss")), &titles, Market::India, &date());

        assert!(prompt.contains("ALREADY PUBLISHED"));
        assert!(prompt.contains("- Title 29"));
        assert!(!prompt.contains("- Title 30"));
        assert!(prompt.contains("Seed keywords: sip, elss"));
        assert!(prompt.contains("Target audience: Indian readers"));
        assert!(prompt.contains("\"market\": \"india\""));
        assert!(prompt.contains("\"imageQuery\""));
    }

    #[test]
    fn test_topic_prompt_without_history_or_keywords() {
        let prompt = topic_prompt(&niche("finance", None), &[], Market::Global, &date());
        assert!(!prompt.contains("ALREADY PUBLISHED"));
        assert!(!prompt.contains("Seed keywords"));
        assert!(prompt.contains("Target audience: Global readers"));
    }

    #[test]
    fn test_content_prompt_tone_by_niche() {
        let topic = Topic {
            title: "Top Thrillers".into(),
            keyword: "best thrillers".into(),
            ..Default::default()
        };
        let movie = content_prompt(&topic, &niche("movies", None), Market::Us, &date());
        assert!(movie.starts_with("You are a professional movie critic"));
        assert!(movie.contains("ratings (out of 10)"));
        assert!(movie.contains("Write for an AMERICAN audience"));
        assert!(movie.contains("PRIMARY KEYWORD: best thrillers"));

        let fund = content_prompt(&topic, &niche("mutual-funds", None), Market::India, &date());
        assert!(fund.contains("Write like a senior expert"));
        assert!(fund.contains("Key Takeaways"));
    }

    #[test]
    fn test_from_request_prompt_lists_niches() {
        let prompt = from_request_prompt("Write about SIPs", Market::India, &date());
        assert!(prompt.contains("USER REQUEST: Write about SIPs"));
        assert!(prompt.contains("movies, tv-series, bollywood"));
        assert!(prompt.contains("finance, technology, crypto"));
        assert!(prompt.contains("Indian audience"));
    }

    #[test]
    fn test_topic_reply_shape() {
        let topic: Topic = serde_json::from_str(
            r#"{"title":"T","slug":"t","keyword":"k","excerpt":"e","tags":["a"],"imageQuery":"stock chart","market":"india"}"#,
        )
        .unwrap();
        assert_eq!(topic.image_query.as_deref(), Some("stock chart"));
        assert_eq!(topic.tags, vec!["a"]);
        assert_eq!(topic.audience(Market::Us), Market::India);
    }

    #[test]
    fn test_topic_audience_fallbacks() {
        let mut topic = Topic::default();
        assert_eq!(topic.audience(Market::India), Market::India);

        topic.market = Some("  ".to_string());
        assert_eq!(topic.audience(Market::Us), Market::Us);

        topic.market = Some("US".to_string());
        assert_eq!(topic.audience(Market::India), Market::Us);

        topic.market = Some("europe".to_string());
        assert_eq!(topic.audience(Market::India), Market::Global);
    }
}
