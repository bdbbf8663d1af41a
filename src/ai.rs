use async_trait::async_trait;
use color_eyre::Result;
use serde::Deserialize;

use crate::notes::{CriterionScore, NoteSuggester, NoteSuggestion};

/// HTTP implementation of the suggestion collaborator. Posts the criterion
/// scores to a configured endpoint and expects drafted notes back.
pub struct HttpSuggester {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpSuggester {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct SuggestResponse {
    notes: Vec<NoteSuggestion>,
}

#[async_trait]
impl NoteSuggester for HttpSuggester {
    async fn suggest(&self, criteria: &[CriterionScore]) -> Result<Vec<NoteSuggestion>> {
        let payload = serde_json::json!({ "criteria": criteria });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: SuggestResponse = response.json().await?;
        tracing::debug!("received {} note suggestions", body.notes.len());
        Ok(body.notes)
    }
}

/// Stands in when no endpoint is configured: drafts simply get no
/// suggestions, and editing is unaffected.
pub struct NullSuggester;

#[async_trait]
impl NoteSuggester for NullSuggester {
    async fn suggest(&self, _criteria: &[CriterionScore]) -> Result<Vec<NoteSuggestion>> {
        Ok(Vec::new())
    }
}
