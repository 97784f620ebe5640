//! Client for the machine-translation backend used by the translation
//! pipeline. Deliberately minimal: one text in, one text out.

use serde::Deserialize;

use crate::services::upstream::{UpstreamClient, UpstreamError};

#[derive(Clone)]
pub struct TranslationService {
    upstream: UpstreamClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(alias = "translatedText")]
    translated_text: String,
}

impl TranslationService {
    pub fn new(base_url: String, upstream: UpstreamClient) -> Self {
        Self { upstream, base_url }
    }

    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}/translate", self.base_url);
        let response: TranslateResponse = self
            .upstream
            .get_json(
                &url,
                &[
                    ("q", text.to_string()),
                    ("source", source_lang.to_string()),
                    ("target", target_lang.to_string()),
                ],
            )
            .await?;

        if response.translated_text.trim().is_empty() {
            return Err(UpstreamError::Payload(
                "translation backend returned empty text".to_string(),
            ));
        }

        Ok(response.translated_text)
    }
}
