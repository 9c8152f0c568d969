//! Default niche catalogue

use crate::Result;
use infobytes_common::models::{Market, Niche};
use infobytes_common::store::SqliteStore;
use tracing::info;

/// One catalogue entry
#[derive(Debug, Clone, Copy)]
pub struct SeedNiche {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Average advertiser cost per click, USD
    pub avg_cpc: f64,
    pub market: Market,
    pub keywords: &'static str,
}

impl SeedNiche {
    pub fn to_niche(&self) -> Niche {
        Niche {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            avg_cpc: self.avg_cpc,
            keywords: Some(self.keywords.to_string()),
            market: self.market,
            is_active: true,
            created_at: String::new(),
            post_count: None,
        }
    }
}

pub const DEFAULT_NICHES: [SeedNiche; 15] = [
    // Entertainment
    SeedNiche {
        id: "movies",
        name: "Movies",
        description: "Latest movie reviews, box office updates, upcoming releases, and film analysis.",
        avg_cpc: 3.50,
        market: Market::Global,
        keywords: "new movie releases 2026, best movies 2026, movie reviews, box office collection, upcoming movies, hollywood movies, bollywood movies, movie ratings, oscar nominations, best sci-fi movies",
    },
    SeedNiche {
        id: "tv-series",
        name: "TV Series",
        description: "Latest TV show reviews, streaming series, season updates, and binge-worthy recommendations.",
        avg_cpc: 3.00,
        market: Market::Global,
        keywords: "best tv series 2026, netflix new shows, amazon prime series, hbo max shows, disney plus series, best thriller series, top 10 tv shows, season premiere dates, tv show reviews, streaming recommendations",
    },
    SeedNiche {
        id: "bollywood",
        name: "Bollywood & Indian Cinema",
        description: "Bollywood movies, south Indian films, OTT releases, and Indian entertainment news.",
        avg_cpc: 2.50,
        market: Market::India,
        keywords: "bollywood new movies 2026, south indian movies, ott release this week, bollywood box office, upcoming bollywood movies, netflix india movies, tamil movies 2026, telugu movies latest, web series hindi, jio cinema movies",
    },
    SeedNiche {
        id: "hollywood",
        name: "Hollywood & Global Cinema",
        description: "Hollywood blockbusters, Marvel/DC updates, Oscar contenders, and international films.",
        avg_cpc: 4.00,
        market: Market::Us,
        keywords: "hollywood movies 2026, marvel phase 6, dc universe movies, oscar predictions 2026, best action movies, horror movies 2026, sci-fi movies upcoming, movie trailers latest, imdb top rated, rotten tomatoes scores",
    },
    SeedNiche {
        id: "ott-streaming",
        name: "OTT & Streaming",
        description: "Netflix, Amazon Prime, Disney+, HBO Max: new releases, comparisons, and reviews.",
        avg_cpc: 3.50,
        market: Market::Global,
        keywords: "netflix new releases this week, amazon prime best movies, disney plus upcoming, hbo max shows 2026, best streaming service comparison, apple tv plus series, peacock originals, crunchyroll anime, ott subscription plans, free streaming movies",
    },
    SeedNiche {
        id: "trending",
        name: "Trending News",
        description: "Today's trending topics, viral stories, breaking news, and what's buzzing on the internet.",
        avg_cpc: 2.00,
        market: Market::Global,
        keywords: "trending news today, viral stories, breaking news, google trending searches, twitter trending, what happened today, latest news updates, trending topics, popular news today, current events",
    },
    // India
    SeedNiche {
        id: "indian-stocks",
        name: "Indian Stock Market",
        description: "NSE, BSE, Nifty 50, Sensex, IPOs, SEBI regulations, FII/DII flows, and Indian equity analysis.",
        avg_cpc: 6.00,
        market: Market::India,
        keywords: "nifty 50 analysis today, best stocks to buy india, ipo listing today, sensex prediction, midcap stocks india, sebi new rules, fii dii data, indian stock market crash, penny stocks india, nse bse live",
    },
    SeedNiche {
        id: "mutual-funds",
        name: "Mutual Funds India",
        description: "SIP plans, ELSS, debt funds, hybrid funds, AMC comparisons, and mutual fund taxation in India.",
        avg_cpc: 7.50,
        market: Market::India,
        keywords: "best sip plans 2026, elss tax saving mutual funds, mutual fund returns comparison, sbi mutual fund, hdfc mutual fund, axis mutual fund, flexi cap fund, index fund india, mutual fund taxation, lumpsum vs sip",
    },
    SeedNiche {
        id: "tax-planning",
        name: "Tax Planning India",
        description: "Income tax saving, ITR filing, Section 80C/80D, GST, HRA exemption, and Indian tax strategies.",
        avg_cpc: 8.00,
        market: Market::India,
        keywords: "income tax saving tips, section 80c deductions, itr filing online, new tax regime vs old, hra exemption calculation, capital gains tax india, gst latest news, tax saving fd, nps tax benefit, ltcg stcg tax",
    },
    SeedNiche {
        id: "indian-insurance",
        name: "Insurance India",
        description: "LIC plans, health insurance, term insurance, motor insurance, IRDAI regulations in India.",
        avg_cpc: 10.00,
        market: Market::India,
        keywords: "best term insurance plan india, lic new plan, health insurance family floater, star health insurance, car insurance renewal online, irdai new rules, mediclaim policy comparison, critical illness cover india, group health insurance, insurance claim process",
    },
    // US
    SeedNiche {
        id: "us-stocks",
        name: "US Stock Market",
        description: "S&P 500, NASDAQ, Dow Jones, US IPOs, SEC filings, earnings reports, and American equity analysis.",
        avg_cpc: 9.00,
        market: Market::Us,
        keywords: "best stocks to buy now, s&p 500 forecast, nasdaq today, dow jones prediction, us stock market crash, tech stocks to buy, dividend stocks, growth stocks 2026, pre market movers, after hours trading",
    },
    SeedNiche {
        id: "us-insurance",
        name: "Insurance US",
        description: "Health insurance, Medicare, auto insurance, life insurance, and ACA marketplace in the US.",
        avg_cpc: 14.00,
        market: Market::Us,
        keywords: "best health insurance plans, medicare enrollment, car insurance comparison, term life insurance quotes, home insurance, aca marketplace, dental insurance, disability insurance, umbrella insurance, insurance deductible explained",
    },
    // Global
    SeedNiche {
        id: "finance",
        name: "Finance & Investing",
        description: "Personal finance, stock market investing, mutual funds, tax planning, and wealth building strategies.",
        avg_cpc: 8.50,
        market: Market::Global,
        keywords: "best investment plans, how to invest money, stock market for beginners, portfolio management, compound interest calculator, index funds vs mutual funds, financial planning tips, passive income ideas, wealth building strategies, retirement planning",
    },
    SeedNiche {
        id: "technology",
        name: "Technology & AI",
        description: "AI tools, software reviews, gadgets, cybersecurity, and tech news.",
        avg_cpc: 6.50,
        market: Market::Global,
        keywords: "best ai tools 2026, chatgpt alternatives, cybersecurity tips, cloud hosting comparison, vpn comparison, ai image generator, best laptops 2026, smartphone reviews, tech news today, ai trends 2026",
    },
    SeedNiche {
        id: "crypto",
        name: "Cryptocurrency & Blockchain",
        description: "Bitcoin, Ethereum, DeFi, NFTs, crypto trading, and blockchain technology explained.",
        avg_cpc: 7.00,
        market: Market::Global,
        keywords: "bitcoin price prediction, best crypto exchange, ethereum staking guide, defi explained, crypto tax guide, bitcoin vs ethereum, blockchain technology uses, crypto wallet security, altcoin investing strategy, web3 trends",
    },
];

/// Upsert the default catalogue; every seeded niche ends up active
pub async fn seed_niches(store: &SqliteStore) -> Result<usize> {
    for seed in DEFAULT_NICHES.iter() {
        store.upsert_niche(&seed.to_niche()).await?;
        info!(
            niche = %seed.id,
            "Seeded [{}] {} (Avg CPC: ${:.2})",
            seed.market,
            seed.name,
            seed.avg_cpc
        );
    }
    info!("{} niches seeded", DEFAULT_NICHES.len());
    Ok(DEFAULT_NICHES.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::KNOWN_NICHE_IDS;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_ids_are_unique_and_known() {
        let ids: HashSet<&str> = DEFAULT_NICHES.iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), DEFAULT_NICHES.len());
        let known: HashSet<&str> = KNOWN_NICHE_IDS.iter().copied().collect();
        assert_eq!(ids, known);
    }

    #[test]
    fn test_highest_cpc_is_us_insurance() {
        let top = DEFAULT_NICHES
            .iter()
            .max_by(|a, b| a.avg_cpc.total_cmp(&b.avg_cpc))
            .unwrap();
        assert_eq!(top.id, "us-insurance");
        assert_eq!(top.market, Market::Us);
    }
}
