//! Gold/silver price page scraper
//!
//! Fetches the dealer's price page and parses its price table into
//! observations. The HTML shape of the target site is confined to this
//! file; everything downstream works with `ScrapedPrice`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};

use super::ScrapedPrice;
use crate::services::upstream::{UpstreamClient, UpstreamError};

lazy_static! {
    // "1,23,456.78" — the site groups digits in the South Asian style, so
    // accept any comma grouping and an optional decimal part
    static ref PRICE_REGEX: Regex = Regex::new(r"([\d,]+(?:\.\d+)?)").unwrap();
    static ref KARAT_REGEX: Regex = Regex::new(r"(?i)(\d{2})\s*(?:k|karat|carat)").unwrap();
}

#[derive(Clone)]
pub struct GoldPriceScraper {
    upstream: UpstreamClient,
    page_url: String,
}

impl GoldPriceScraper {
    pub fn new(page_url: String, upstream: UpstreamClient) -> Self {
        Self { upstream, page_url }
    }

    pub async fn fetch_prices(&self) -> Result<Vec<ScrapedPrice>, UpstreamError> {
        tracing::info!("Scraping metal prices from {}", self.page_url);

        let html = self.upstream.get_text(&self.page_url).await?;
        let prices = parse_price_table(&html);

        if prices.is_empty() {
            // A parse that finds nothing usually means the page layout
            // changed; surface it as a payload error, not an empty success
            return Err(UpstreamError::Payload(
                "no price rows found in page".to_string(),
            ));
        }

        Ok(prices)
    }
}

/// Parse every price row out of the page. Rows are
/// <tr><td>metal</td><td>category</td><td>unit</td><td>price</td></tr>;
/// rows that don't parse are skipped, not fatal.
pub fn parse_price_table(html: &str) -> Vec<ScrapedPrice> {
    let document = Html::parse_document(html);

    let Ok(row_selector) = Selector::parse("table tr") else {
        return Vec::new();
    };
    let Ok(cell_selector) = Selector::parse("td") else {
        return Vec::new();
    };

    let mut prices = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|c| c.text().collect::<String>().trim().to_string())
            .collect();

        if cells.len() < 4 {
            continue;
        }

        let Some(metal) = parse_metal(&cells[0]) else {
            continue;
        };
        let Some(price) = parse_price(&cells[3]) else {
            tracing::debug!("Skipping row with unparseable price: {:?}", cells);
            continue;
        };

        prices.push(ScrapedPrice {
            metal: metal.to_string(),
            category: normalize_category(&cells[1]),
            unit: cells[2].to_lowercase(),
            price,
            source: "scraper".to_string(),
        });
    }

    prices
}

fn parse_metal(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    if lower.contains("gold") {
        Some("gold")
    } else if lower.contains("silver") {
        Some("silver")
    } else {
        None
    }
}

/// "22 Karat" / "22K" / "22 carat" all normalize to "22k"; anything else is
/// kept verbatim in lowercase (e.g. "traditional", "sanadi").
fn normalize_category(text: &str) -> String {
    if let Some(cap) = KARAT_REGEX.captures(text) {
        format!("{}k", &cap[1])
    } else {
        text.trim().to_lowercase()
    }
}

fn parse_price(text: &str) -> Option<Decimal> {
    let cap = PRICE_REGEX.captures(text)?;
    let digits = cap[1].replace(',', "");
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = r#"
        <html><body>
        <table>
            <tr><th>Metal</th><th>Category</th><th>Unit</th><th>Price</th></tr>
            <tr><td>Gold</td><td>22 Karat</td><td>Gram</td><td>৳ 12,345.50</td></tr>
            <tr><td>Gold</td><td>21 Karat</td><td>Gram</td><td>11,780</td></tr>
            <tr><td>Silver</td><td>Traditional</td><td>Vori</td><td>2,100.25</td></tr>
            <tr><td>Platinum</td><td>Ignored</td><td>Gram</td><td>9,999</td></tr>
            <tr><td>Gold</td><td>18 Karat</td><td>Gram</td><td>n/a</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_price_table_rows() {
        let prices = parse_price_table(FIXTURE);
        assert_eq!(prices.len(), 3);

        assert_eq!(
            prices[0],
            ScrapedPrice {
                metal: "gold".to_string(),
                category: "22k".to_string(),
                unit: "gram".to_string(),
                price: dec!(12345.50),
                source: "scraper".to_string(),
            }
        );
        assert_eq!(prices[1].price, dec!(11780));
        assert_eq!(prices[2].metal, "silver");
        assert_eq!(prices[2].category, "traditional");
    }

    #[test]
    fn test_unknown_metal_rows_skipped() {
        let prices = parse_price_table(FIXTURE);
        assert!(prices.iter().all(|p| p.metal != "platinum"));
    }

    #[test]
    fn test_unparseable_price_skipped() {
        let prices = parse_price_table(FIXTURE);
        assert!(prices.iter().all(|p| p.category != "18k"));
    }

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price("৳ 1,23,456.78"), Some(dec!(123456.78)));
        assert_eq!(parse_price("2100"), Some(dec!(2100)));
        assert_eq!(parse_price("no digits"), None);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("22 Karat"), "22k");
        assert_eq!(normalize_category("22K"), "22k");
        assert_eq!(normalize_category("Sanadi"), "sanadi");
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_price_table("<html></html>").is_empty());
    }
}
