//! HTTP client for the model server's listing, chat and generate endpoints.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::{
    ChatMessage, ChatRequest, GenerateRequest, ModelDescriptor, TagsResponse, CHAT_ENDPOINT,
    GENERATE_ENDPOINT, TAGS_ENDPOINT,
};
use crate::core::config::ServerConfig;
use crate::core::error::{server_error, unreachable, ClientError};
use crate::core::stream_decoder::{decode_deltas, DeltaField, DeltaStream};
use crate::utils::url::construct_api_url;

/// Stateless wrapper around a shared [`reqwest::Client`].
///
/// Every call takes the [`ServerConfig`] to use, so a base URL changed between
/// two calls is picked up by the second one.
#[derive(Clone, Default)]
pub struct ModelServerClient {
    http: reqwest::Client,
}

impl ModelServerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// True iff the listing endpoint answers with a success status.
    pub async fn test_connection(&self, config: &ServerConfig) -> bool {
        let url = construct_api_url(&config.base_url, TAGS_ENDPOINT);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(url = %url, error = %err, "connection test failed");
                false
            }
        }
    }

    /// Installed models, or an empty list when the server cannot be listed.
    ///
    /// Use [`try_list_models`](Self::try_list_models) to tell "no models" apart
    /// from "unreachable".
    pub async fn list_models(&self, config: &ServerConfig) -> Vec<ModelDescriptor> {
        match self.try_list_models(config).await {
            Ok(models) => models,
            Err(err) => {
                debug!(error = %err, "model listing failed");
                Vec::new()
            }
        }
    }

    pub async fn try_list_models(
        &self,
        config: &ServerConfig,
    ) -> Result<Vec<ModelDescriptor>, ClientError> {
        let url = construct_api_url(&config.base_url, TAGS_ENDPOINT);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| unreachable(&url, e))?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let tags = response
            .json::<TagsResponse>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(tags.models)
    }

    /// One-shot chat completion; returns `message.content` or `""` when absent.
    pub async fn complete_once(
        &self,
        config: &ServerConfig,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ClientError> {
        let body = ChatRequest {
            model,
            messages,
            stream: false,
        };
        let value = self.post_once(config, CHAT_ENDPOINT, &body).await?;
        Ok(DeltaField::CHAT.extract(&value).unwrap_or_default().to_string())
    }

    /// One-shot text completion; returns `response` or `""` when absent.
    pub async fn generate_once(
        &self,
        config: &ServerConfig,
        model: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, ClientError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
            system,
        };
        let value = self.post_once(config, GENERATE_ENDPOINT, &body).await?;
        Ok(DeltaField::GENERATE
            .extract(&value)
            .unwrap_or_default()
            .to_string())
    }

    /// Streaming chat completion.
    ///
    /// Fails before yielding anything when the server rejects the request.
    /// Dropping the returned stream closes the response body.
    pub async fn complete_stream(
        &self,
        config: &ServerConfig,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<DeltaStream, ClientError> {
        let body = ChatRequest {
            model,
            messages,
            stream: true,
        };
        self.post_stream(config, CHAT_ENDPOINT, &body, DeltaField::CHAT)
            .await
    }

    /// Streaming text completion against the generate endpoint.
    pub async fn generate_stream(
        &self,
        config: &ServerConfig,
        model: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<DeltaStream, ClientError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: true,
            system,
        };
        self.post_stream(config, GENERATE_ENDPOINT, &body, DeltaField::GENERATE)
            .await
    }

    async fn post_once<B: Serialize>(
        &self,
        config: &ServerConfig,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        let response = self.send_post(config, endpoint, body).await?;
        let text = response.text().await.map_err(ClientError::Stream)?;
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn post_stream<B: Serialize>(
        &self,
        config: &ServerConfig,
        endpoint: &str,
        body: &B,
        field: DeltaField,
    ) -> Result<DeltaStream, ClientError> {
        let response = self.send_post(config, endpoint, body).await?;
        Ok(decode_deltas(response.bytes_stream(), field))
    }

    async fn send_post<B: Serialize>(
        &self,
        config: &ServerConfig,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let url = construct_api_url(&config.base_url, endpoint);
        debug!(url = %url, "sending request to model server");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| unreachable(&url, e))?;

        if !response.status().is_success() {
            let err = server_error(response).await;
            debug!(url = %url, error = %err, "model server rejected request");
            return Err(err);
        }

        Ok(response)
    }
}
