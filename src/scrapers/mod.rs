pub mod gold;

use rust_decimal::Decimal;

/// One parsed price observation from the scrape target. The sync service
/// owns persistence and change detection; the scraper only parses.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPrice {
    pub metal: String,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub source: String,
}
