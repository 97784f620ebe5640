//! Client for the upstream Quran content API (reciters, audio, translations)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::upstream::{UpstreamClient, UpstreamError};

pub const CHAPTER_COUNT: u32 = 114;

#[derive(Clone)]
pub struct QuranApiService {
    upstream: UpstreamClient,
    base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitationInfo {
    pub id: i32,
    #[serde(alias = "reciter_name")]
    pub name: String,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecitationsResponse {
    recitations: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFileInfo {
    pub verse_key: String,
    pub url: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AudioFilesResponse {
    audio_files: Vec<AudioFileInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerseTranslationInfo {
    pub verse_key: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct TranslationsResponse {
    translations: Vec<VerseTranslationInfo>,
}

impl QuranApiService {
    pub fn new(base_url: String, upstream: UpstreamClient) -> Self {
        Self { upstream, base_url }
    }

    /// Fetch the reciter list. Returns (parsed, raw) pairs so the sync
    /// service can snapshot the raw payload.
    pub async fn fetch_recitations(&self) -> Result<Vec<(RecitationInfo, Value)>, UpstreamError> {
        tracing::info!("Fetching recitations from {}", self.base_url);

        let url = format!("{}/resources/recitations", self.base_url);
        let response: RecitationsResponse = self.upstream.get_json(&url, &[]).await?;

        let mut recitations = Vec::new();
        for raw in response.recitations {
            match serde_json::from_value::<RecitationInfo>(raw.clone()) {
                Ok(info) => recitations.push((info, raw)),
                Err(e) => {
                    tracing::warn!("Skipping malformed recitation entry: {}", e);
                }
            }
        }

        tracing::info!("Fetched {} recitations", recitations.len());
        Ok(recitations)
    }

    /// Fetch per-verse audio files for one reciter and one chapter.
    pub async fn fetch_audio_files(
        &self,
        recitation_id: i32,
        chapter: u32,
    ) -> Result<Vec<AudioFileInfo>, UpstreamError> {
        let url = format!(
            "{}/recitations/{}/by_chapter/{}",
            self.base_url, recitation_id, chapter
        );
        let response: AudioFilesResponse = self
            .upstream
            .get_json(&url, &[("per_page", "300".to_string())])
            .await?;

        Ok(response.audio_files)
    }

    /// Fetch one translation resource for one chapter.
    pub async fn fetch_verse_translations(
        &self,
        resource_id: i32,
        chapter: u32,
    ) -> Result<Vec<VerseTranslationInfo>, UpstreamError> {
        let url = format!("{}/quran/translations/{}", self.base_url, resource_id);
        let response: TranslationsResponse = self
            .upstream
            .get_json(&url, &[("chapter_number", chapter.to_string())])
            .await?;

        Ok(response.translations)
    }
}
