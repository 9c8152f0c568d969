//! Curated Unsplash photos per content category

use super::{HeroImage, HERO_HEIGHT, HERO_WIDTH};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

const FALLBACK_KEY: &str = "trending";

const MOVIES: &[&str] = &[
    "photo-1489599849927-2ee91cede3ba",
    "photo-1536440136628-849c177e76a1",
    "photo-1478720568477-152d9b164e26",
];
const TV_SERIES: &[&str] = &[
    "photo-1593784991095-a205069470b6",
    "photo-1574375927938-d5a98e8d7e28",
    "photo-1611162617213-7d7a39e9b1d7",
];
const BOLLYWOOD: &[&str] = &[
    "photo-1598899134739-24c46f58b8c0",
    "photo-1517604931442-7e0c8ed2963c",
    "photo-1489599849927-2ee91cede3ba",
];
const HOLLYWOOD: &[&str] = &[
    "photo-1478720568477-152d9b164e26",
    "photo-1542204165-65bf26472b9b",
    "photo-1485846234645-a62644f84728",
];
const OTT_STREAMING: &[&str] = &[
    "photo-1611162617213-7d7a39e9b1d7",
    "photo-1574375927938-d5a98e8d7e28",
    "photo-1593784991095-a205069470b6",
];
const TRENDING: &[&str] = &[
    "photo-1495020689067-958852a7765e",
    "photo-1585829365295-ab7cd400c167",
    "photo-1590283603385-17ffb3a7f29f",
];
const MARKETS: &[&str] = &[
    "photo-1611974789855-9c2a0a7236a3",
    "photo-1590283603385-17ffb3a7f29f",
    "photo-1579532537598-459ecdaf39cc",
];
const INSURANCE: &[&str] = &[
    "photo-1554224155-6726b3ff858f",
    "photo-1521791136064-7986c2920216",
    "photo-1556742049-0cfed4f6a45d",
];
const TECHNOLOGY: &[&str] = &[
    "photo-1518770660439-4636190af475",
    "photo-1488590528505-98d2b5aba04b",
    "photo-1550751827-4bd374c3f58b",
];
const CRYPTO: &[&str] = &[
    "photo-1639762681057-408e52192e55",
    "photo-1621761191319-c6fb62004040",
    "photo-1622630998477-20aa696ecb05",
];

/// Category patterns, first match wins
static CATEGORY_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"movie|film|cinema|oscar|box.?office|director|actor|actress", "movies"),
        (r"series|tv.?show|season|episode|binge|sitcom|drama.?series", "tv-series"),
        (r"bollywood|hindi.?movie|south.?indian|tollywood|kollywood", "bollywood"),
        (r"hollywood|marvel|dc|blockbuster|superhero", "hollywood"),
        (r"netflix|prime.?video|disney|hbo|streaming|ott|hotstar", "ott-streaming"),
        (r"trending|viral|breaking|news|buzz", "trending"),
        (r"financ|invest|stock|money|budget|mutual.?fund|nifty|sensex", "finance"),
        (r"insur|policy|coverage|claim|mediclaim", "insurance"),
        (r"tech|software|ai|coding|program|gadget|laptop", "technology"),
        (r"crypto|bitcoin|blockchain|defi|web3|ethereum", "crypto"),
    ]
    .into_iter()
    .map(|(pattern, key)| (Regex::new(pattern).expect("valid category pattern"), key))
    .collect()
});

/// Photo category for free text (case-insensitive)
pub fn niche_key(query: &str) -> &'static str {
    let query = query.to_lowercase();
    CATEGORY_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&query))
        .map(|(_, key)| *key)
        .unwrap_or(FALLBACK_KEY)
}

fn photos_for(key: &str) -> &'static [&'static str] {
    match key {
        "movies" => MOVIES,
        "tv-series" => TV_SERIES,
        "bollywood" => BOLLYWOOD,
        "hollywood" => HOLLYWOOD,
        "ott-streaming" => OTT_STREAMING,
        "finance" | "indian-stocks" | "us-stocks" => MARKETS,
        "insurance" => INSURANCE,
        "technology" => TECHNOLOGY,
        "crypto" => CRYPTO,
        _ => TRENDING,
    }
}

/// A random curated photo URL for `query`
pub fn unsplash_url<R: Rng + ?Sized>(query: &str, width: u32, height: u32, rng: &mut R) -> String {
    let photos = photos_for(niche_key(query));
    let photo = photos.choose(rng).copied().unwrap_or(TRENDING[0]);
    format!(
        "https://images.unsplash.com/{}?w={}&h={}&fit=crop&auto=format&q=80",
        photo, width, height
    )
}

/// Curated hero image at the default size
pub fn unsplash_image<R: Rng + ?Sized>(query: &str, rng: &mut R) -> HeroImage {
    HeroImage {
        url: unsplash_url(query, HERO_WIDTH, HERO_HEIGHT, rng),
        alt: query.to_string(),
        width: HERO_WIDTH,
        height: HERO_HEIGHT,
        photographer: None,
    }
}
