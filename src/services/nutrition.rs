//! Nutritionix natural-nutrients client backing the search proxy.

use serde_json::{json, Value};

const DEFAULT_ENDPOINT: &str = "https://trackapi.nutritionix.com/v2/natural/nutrients";

#[derive(Debug, thiserror::Error)]
pub enum NutritionError {
    #[error("NUTRITIONIX_APP_ID / NUTRITIONIX_APP_KEY not configured")]
    MissingCredentials,
    #[error("nutrition request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("nutrition API returned {0}")]
    Upstream(reqwest::StatusCode),
}

pub struct NutritionClient {
    http: reqwest::Client,
    endpoint: String,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl NutritionClient {
    pub fn from_env() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: std::env::var("NUTRITIONIX_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            app_id: std::env::var("NUTRITIONIX_APP_ID").ok(),
            app_key: std::env::var("NUTRITIONIX_APP_KEY").ok(),
        }
    }

    /// Forwards a natural-language food query and returns the raw
    /// Nutritionix response body.
    pub async fn natural_nutrients(&self, query: &str) -> Result<Value, NutritionError> {
        let (Some(app_id), Some(app_key)) = (&self.app_id, &self.app_key) else {
            return Err(NutritionError::MissingCredentials);
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-app-id", app_id)
            .header("x-app-key", app_key)
            .json(&json!({ "query": query }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NutritionError::Upstream(response.status()));
        }
        Ok(response.json().await?)
    }
}
