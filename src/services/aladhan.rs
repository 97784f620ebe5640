//! Client for the upstream prayer-time calculation API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::services::upstream::{UpstreamClient, UpstreamError};

#[derive(Clone)]
pub struct AladhanService {
    upstream: UpstreamClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i32,
    data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub struct TimingsData {
    pub timings: HashMap<String, String>,
}

/// One day's timings plus the raw payload for the snapshot column.
#[derive(Debug)]
pub struct DayTimings {
    pub timings: HashMap<String, String>,
    pub raw: Value,
}

impl AladhanService {
    pub fn new(base_url: String, upstream: UpstreamClient) -> Self {
        Self { upstream, base_url }
    }

    /// Fetch the list of calculation methods. The upstream returns a map
    /// keyed by method name; ids are what we key on locally.
    pub async fn fetch_methods(&self) -> Result<Vec<(MethodInfo, Value)>, UpstreamError> {
        tracing::info!("Fetching calculation methods from {}", self.base_url);

        let url = format!("{}/methods", self.base_url);
        let envelope: Envelope<HashMap<String, Value>> = self.upstream.get_json(&url, &[]).await?;

        if envelope.code != 200 {
            return Err(UpstreamError::Payload(format!(
                "methods endpoint returned code {}",
                envelope.code
            )));
        }

        let mut methods = Vec::new();
        for (name, raw) in envelope.data {
            // Some entries are placeholders without a numeric id; skip them
            let Some(id) = raw.get("id").and_then(|v| v.as_i64()) else {
                tracing::debug!("Skipping method '{}' without numeric id", name);
                continue;
            };
            let params = raw.get("params").cloned().unwrap_or(Value::Null);
            methods.push((
                MethodInfo {
                    id: id as i32,
                    name,
                    params,
                },
                raw,
            ));
        }

        tracing::info!("Fetched {} calculation methods", methods.len());
        Ok(methods)
    }

    /// Fetch timings for one location and one day.
    pub async fn fetch_timings(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        method: i32,
        school: i32,
    ) -> Result<DayTimings, UpstreamError> {
        let url = format!("{}/timings/{}", self.base_url, date.format("%d-%m-%Y"));

        let envelope: Envelope<Value> = self
            .upstream
            .get_json(
                &url,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("method", method.to_string()),
                    ("school", school.to_string()),
                ],
            )
            .await?;

        if envelope.code != 200 {
            return Err(UpstreamError::Payload(format!(
                "timings endpoint returned code {}",
                envelope.code
            )));
        }

        let timings: TimingsData = serde_json::from_value(envelope.data.clone())
            .map_err(|e| UpstreamError::Payload(e.to_string()))?;

        Ok(DayTimings {
            timings: timings.timings,
            raw: envelope.data,
        })
    }
}
