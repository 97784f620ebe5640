//! Client for the upstream hadith corpus API

use serde::Deserialize;
use serde_json::Value;

use crate::services::upstream::{UpstreamClient, UpstreamError};

#[derive(Clone)]
pub struct SunnahApiService {
    upstream: UpstreamClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Paginated<T> {
    data: Vec<T>,
    #[serde(default)]
    total: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "totalHadith", default)]
    pub total_hadith: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookInfo {
    #[serde(rename = "bookNumber")]
    pub book_number: String,
    #[serde(rename = "bookName", default)]
    pub book_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HadithRecord {
    pub hadith_number: String,
    pub text_ar: Option<String>,
    pub text_en: Option<String>,
    pub grade: Option<String>,
    pub raw: Value,
}

impl SunnahApiService {
    pub fn new(base_url: String, upstream: UpstreamClient) -> Self {
        Self { upstream, base_url }
    }

    /// Fetch one collection's metadata plus the raw payload.
    pub async fn fetch_collection(
        &self,
        collection_key: &str,
    ) -> Result<(CollectionInfo, Value), UpstreamError> {
        tracing::info!("Fetching hadith collection '{}'", collection_key);

        let url = format!("{}/collections/{}", self.base_url, collection_key);
        let raw: Value = self.upstream.get_json(&url, &[]).await?;
        let info: CollectionInfo = serde_json::from_value(raw.clone())
            .map_err(|e| UpstreamError::Payload(e.to_string()))?;

        Ok((info, raw))
    }

    /// Fetch a collection's book list.
    pub async fn fetch_books(&self, collection_key: &str) -> Result<Vec<BookInfo>, UpstreamError> {
        let url = format!("{}/collections/{}/books", self.base_url, collection_key);
        let page: Paginated<BookInfo> = self
            .upstream
            .get_json(&url, &[("limit", "100".to_string())])
            .await?;

        Ok(page.data)
    }

    /// Fetch one page of hadiths for a book. Returns the records and the
    /// upstream total so callers can drive pagination and progress.
    pub async fn fetch_hadiths_page(
        &self,
        collection_key: &str,
        book_number: i32,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<HadithRecord>, Option<i64>), UpstreamError> {
        let url = format!(
            "{}/collections/{}/books/{}/hadiths",
            self.base_url, collection_key, book_number
        );
        let response: Paginated<Value> = self
            .upstream
            .get_json(
                &url,
                &[
                    ("page", page.to_string()),
                    ("limit", per_page.to_string()),
                ],
            )
            .await?;

        let total = response.total;
        let mut records = Vec::new();
        for raw in response.data {
            match parse_hadith(&raw) {
                Some(record) => records.push(record),
                None => {
                    tracing::warn!(
                        "Skipping hadith without hadithNumber in {}/{} page {}",
                        collection_key,
                        book_number,
                        page
                    );
                }
            }
        }

        Ok((records, total))
    }
}

/// Pull the fields we persist out of one upstream hadith object.
/// Returns None when the record has no hadith number at all.
fn parse_hadith(raw: &Value) -> Option<HadithRecord> {
    let hadith_number = raw
        .get("hadithNumber")
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })?;

    let mut text_ar = None;
    let mut text_en = None;
    let mut grade = None;

    if let Some(bodies) = raw.get("hadith").and_then(|v| v.as_array()) {
        for body in bodies {
            let lang = body.get("lang").and_then(|v| v.as_str()).unwrap_or("");
            let text = body
                .get("body")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            match lang {
                "ar" => text_ar = text,
                "en" => {
                    if grade.is_none() {
                        grade = body
                            .get("grades")
                            .and_then(|v| v.as_array())
                            .and_then(|g| g.first())
                            .and_then(|g| g.get("grade"))
                            .and_then(|v| v.as_str())
                            .map(|s| s.to_string());
                    }
                    text_en = text;
                }
                _ => {}
            }
        }
    }

    Some(HadithRecord {
        hadith_number,
        text_ar,
        text_en,
        grade,
        raw: raw.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_hadith_extracts_both_languages() {
        let raw = json!({
            "hadithNumber": "1",
            "hadith": [
                {"lang": "en", "body": "Actions are by intentions", "grades": [{"grade": "Sahih"}]},
                {"lang": "ar", "body": "إنما الأعمال بالنيات"}
            ]
        });

        let record = parse_hadith(&raw).unwrap();
        assert_eq!(record.hadith_number, "1");
        assert_eq!(record.text_en.as_deref(), Some("Actions are by intentions"));
        assert!(record.text_ar.is_some());
        assert_eq!(record.grade.as_deref(), Some("Sahih"));
    }

    #[test]
    fn test_parse_hadith_numeric_number() {
        let raw = json!({"hadithNumber": 42, "hadith": []});
        let record = parse_hadith(&raw).unwrap();
        assert_eq!(record.hadith_number, "42");
        assert!(record.text_en.is_none());
    }

    #[test]
    fn test_parse_hadith_missing_number() {
        let raw = json!({"hadith": [{"lang": "en", "body": "text"}]});
        assert!(parse_hadith(&raw).is_none());
    }
}
