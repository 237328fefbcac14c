/// Recommendation backend client
///
/// The backend is an opaque ranking oracle: it receives the hiring query and answers
/// with `{"recommendations": [...]}`, assumed to be in descending relevance order.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    middleware::{RequestId, REQUEST_ID_HEADER},
    models::{ApiRecommendation, RecommendRequest},
};

/// Source of recommendations for a hiring query
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Fetch the recommendations for a trimmed, non-empty query
    ///
    /// `request_id` is the id of the inbound request that triggered the fetch and is
    /// forwarded to the backend.
    async fn fetch_recommendations(
        &self,
        query: &str,
        request_id: RequestId,
    ) -> AppResult<Vec<ApiRecommendation>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}

/// HTTP client for the recommendation endpoint
#[derive(Clone)]
pub struct HttpRecommender {
    http_client: HttpClient,
    endpoint: String,
}

impl HttpRecommender {
    pub fn new(endpoint: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl RecommendationSource for HttpRecommender {
    async fn fetch_recommendations(
        &self,
        query: &str,
        request_id: RequestId,
    ) -> AppResult<Vec<ApiRecommendation>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Query is required".to_string()));
        }

        tracing::info!(
            endpoint = %self.endpoint,
            request_id = %request_id,
            "Requesting recommendations"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(&RecommendRequest { query })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recommendation API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let body: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::MalformedResponse(format!("Response is not JSON: {}", e)))?;

        let recommendations = parse_recommendations(&body)?;

        tracing::info!(
            request_id = %request_id,
            count = recommendations.len(),
            "Recommendations received"
        );

        Ok(recommendations)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Validates a backend response body
///
/// `recommendations` must be an array and every element a complete record with a
/// non-empty name. A single bad record rejects the whole response.
pub fn parse_recommendations(body: &Value) -> AppResult<Vec<ApiRecommendation>> {
    let items = body
        .get("recommendations")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AppError::MalformedResponse(
                "'recommendations' missing or not an array".to_string(),
            )
        })?;

    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let rec = ApiRecommendation::deserialize(item).map_err(|e| {
                AppError::MalformedResponse(format!("Record {} is invalid: {}", position, e))
            })?;
            if rec.name.trim().is_empty() {
                return Err(AppError::MalformedResponse(format!(
                    "Record {} has an empty name",
                    position
                )));
            }
            Ok(rec)
        })
        .collect()
}
