//! REST client for the feature-flag API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::EnvironmentConfig;
use crate::error::{ApiError, Error, Result};
use crate::models::{CreateFlagRequest, Flag, FlagId, FlagUpdate};

/// Operations the admin workflows need from the backend.
///
/// `HttpFlagApi` is the production implementation; tests substitute
/// in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait FlagApi {
    /// `GET /feature-flags`
    async fn list_flags(&self) -> Result<Vec<Flag>>;

    /// `POST /feature-flags/{id}/toggle`
    async fn toggle_flag(&self, id: FlagId) -> Result<Flag>;

    /// `POST /feature-flags`
    async fn create_flag(&self, request: &CreateFlagRequest) -> Result<Flag>;

    /// `PUT /feature-flags/{id}`
    async fn update_flag(&self, id: FlagId, update: &FlagUpdate) -> Result<Flag>;

    /// `DELETE /feature-flags/{id}`
    async fn delete_flag(&self, id: FlagId) -> Result<()>;
}

/// `reqwest`-backed client
#[derive(Clone, Debug)]
pub struct HttpFlagApi {
    flags_url: String,
    client: Client,
}

impl HttpFlagApi {
    pub fn new(config: &EnvironmentConfig) -> Result<Self> {
        Self::with_timeout(&config.flags_url(), config.request_timeout)
    }

    /// Client for an explicit collection URL, e.g. `http://localhost:8080/api/feature-flags`
    pub fn with_timeout(flags_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::Config(format!("failed to build HTTP client: {error}")))?;
        Ok(Self {
            flags_url: flags_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn flags_url(&self) -> &str {
        &self.flags_url
    }

    fn flag_url(&self, id: FlagId) -> String {
        format!("{}/{id}", self.flags_url)
    }
}

impl FlagApi for HttpFlagApi {
    async fn list_flags(&self) -> Result<Vec<Flag>> {
        let url = self.flags_url.clone();
        send_json(Method::GET, &url, self.client.get(&url)).await
    }

    async fn toggle_flag(&self, id: FlagId) -> Result<Flag> {
        let url = format!("{}/toggle", self.flag_url(id));
        let request = self.client.post(&url).json(&serde_json::json!({}));
        send_json(Method::POST, &url, request).await
    }

    async fn create_flag(&self, request: &CreateFlagRequest) -> Result<Flag> {
        let url = self.flags_url.clone();
        let builder = self.client.post(&url).json(request);
        send_json(Method::POST, &url, builder).await
    }

    async fn update_flag(&self, id: FlagId, update: &FlagUpdate) -> Result<Flag> {
        let url = self.flag_url(id);
        let builder = self.client.put(&url).json(update);
        send_json(Method::PUT, &url, builder).await
    }

    async fn delete_flag(&self, id: FlagId) -> Result<()> {
        let url = self.flag_url(id);
        send(Method::DELETE, &url, self.client.delete(&url))
            .await
            .map(|_| ())
    }
}

async fn send(method: Method, url: &str, request: RequestBuilder) -> Result<String> {
    let response = match request.header("Accept", "application/json").send().await {
        Ok(response) => response,
        Err(error) => {
            let error = ApiError::from_transport(method.as_str(), url, &error);
            tracing::error!(method = %method, url, "HTTP request failed: {}", error);
            return Err(error.into());
        }
    };

    let status = response.status();
    let body = response.text().await.map_err(|error| {
        Error::from(ApiError::from_transport(method.as_str(), url, &error))
    })?;

    if !status.is_success() {
        let error = ApiError::from_response(method.as_str(), url, status, &body);
        tracing::error!(
            method = %method,
            url,
            status = status.as_u16(),
            "HTTP error: {}",
            error.message
        );
        return Err(error.into());
    }

    Ok(body)
}

async fn send_json<T: DeserializeOwned>(
    method: Method,
    url: &str,
    request: RequestBuilder,
) -> Result<T> {
    let body = send(method, url, request).await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    use crate::error::ApiErrorKind;

    const FLAG_JSON: &str = r#"{
        "id": 7,
        "name": "ui.dark-mode",
        "description": "Dark theme",
        "enabled": true,
        "environment": "all",
        "rolloutPercentage": 100,
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-02T10:00:00Z"
    }"#;

    fn api_for(server: &MockServer) -> HttpFlagApi {
        HttpFlagApi::with_timeout(&server.url("/api/feature-flags"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn list_flags_parses_array() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/feature-flags");
            then.status(200)
                .header("content-type", "application/json")
                .body(format!("[{FLAG_JSON}]"));
        });

        let flags = api_for(&server).list_flags().await.unwrap();
        mock.assert();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].name, "ui.dark-mode");
    }

    #[tokio::test]
    async fn list_flags_clamps_bad_rollout_instead_of_failing() {
        let server = MockServer::start_async().await;
        let bad = FLAG_JSON
            .replace("\"id\": 7", "\"id\": 8")
            .replace("\"rolloutPercentage\": 100", "\"rolloutPercentage\": 250");
        server.mock(|when, then| {
            when.method(GET).path("/api/feature-flags");
            then.status(200).body(format!("[{FLAG_JSON}, {bad}]"));
        });

        let flags = api_for(&server).list_flags().await.unwrap();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[1].rollout_percentage.get(), 100);
    }

    #[tokio::test]
    async fn toggle_posts_empty_object() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/feature-flags/7/toggle")
                .json_body(serde_json::json!({}));
            then.status(200).body(FLAG_JSON);
        });

        let flag = api_for(&server).toggle_flag(FlagId(7)).await.unwrap();
        mock.assert();
        assert_eq!(flag.id, FlagId(7));
    }

    #[tokio::test]
    async fn create_sends_request_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/feature-flags").json_body(serde_json::json!({
                "name": "ui.dark-mode",
                "description": "Dark theme",
                "environment": "all",
                "rolloutPercentage": 100,
                "enabled": true
            }));
            then.status(201).body(FLAG_JSON);
        });

        let request = CreateFlagRequest::new("ui.dark-mode").description("Dark theme");
        let created = api_for(&server).create_flag(&request).await.unwrap();
        mock.assert();
        assert!(created.enabled);
    }

    #[tokio::test]
    async fn update_and_delete_target_flag_url() {
        let server = MockServer::start_async().await;
        let put = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/feature-flags/7")
                .json_body(serde_json::json!({ "description": "Dark theme" }));
            then.status(200).body(FLAG_JSON);
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/feature-flags/7");
            then.status(204);
        });

        let api = api_for(&server);
        let update = FlagUpdate {
            description: Some("Dark theme".to_string()),
            ..Default::default()
        };
        api.update_flag(FlagId(7), &update).await.unwrap();
        api.delete_flag(FlagId(7)).await.unwrap();
        put.assert();
        delete.assert();
    }

    #[tokio::test]
    async fn error_status_is_classified() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/feature-flags/9/toggle");
            then.status(403);
        });

        let error = api_for(&server).toggle_flag(FlagId(9)).await.unwrap_err();
        let Error::Api(api_error) = error else {
            panic!("expected API error");
        };
        assert_eq!(api_error.kind, ApiErrorKind::Authorization);
        assert_eq!(api_error.status, 403);
        assert_eq!(api_error.method, "POST");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let api = HttpFlagApi::with_timeout("http://127.0.0.1:9/api/feature-flags", Duration::from_secs(2))
            .unwrap();
        let Error::Api(api_error) = api.list_flags().await.unwrap_err() else {
            panic!("expected API error");
        };
        assert_eq!(api_error.kind, ApiErrorKind::Network);
        assert_eq!(api_error.status, 0);
    }
}
