//! Salesforce REST client
//!
//! Implements the core [`RecordStore`] port over the REST subset the
//! gateway consumes (query, sobject get/create/update). Every request
//! carries a bearer token; a 401/403 invalidates the cached credential and
//! the request is retried exactly once with a fresh token before the
//! failure surfaces as an auth error. No other retries: mutations are not
//! idempotent at the remote store.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use trackgate_core::ports::RecordStore;
use trackgate_domain::constants::API_VERSION;
use trackgate_domain::{FieldMap, GatewayError, QueryResult, Result, SalesforceConfig};
use url::form_urlencoded;

use crate::http::HttpClient;
use crate::salesforce::AccessTokenProvider;

/// Structured error element the remote store returns on 4xx responses
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "errorCode")]
    error_code: String,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

/// REST adapter over the remote record store
pub struct SalesforceClient {
    http: HttpClient,
    /// `{instance}/services/data/v62.0`
    data_url: String,
    credentials: Arc<dyn AccessTokenProvider>,
}

impl SalesforceClient {
    pub fn new(
        config: &SalesforceConfig,
        http: HttpClient,
        credentials: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http,
            data_url: format!("{}/services/data/{}", config.base_url(), API_VERSION),
            credentials,
        }
    }

    /// Dispatch with the single auth retry.
    ///
    /// `make_request` is invoked per attempt with the current token so the
    /// retried request carries the freshly acquired credential.
    async fn dispatch<F>(&self, make_request: F) -> Result<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.credentials.access_token().await?;
        let response = self.http.send(make_request(&token)).await?;
        if !matches!(response.status().as_u16(), 401 | 403) {
            return Ok(response);
        }

        debug!(status = response.status().as_u16(), "token rejected; refreshing and retrying once");
        self.credentials.invalidate().await;
        let token = self.credentials.access_token().await?;
        let retried = self.http.send(make_request(&token)).await?;
        if matches!(retried.status().as_u16(), 401 | 403) {
            let status = retried.status();
            let body = retried.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!(
                "remote store rejected credentials (HTTP {status}): {body}"
            )));
        }
        Ok(retried)
    }

    /// Translate a non-success response into the typed taxonomy
    async fn translate_error(response: Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            400 => match serde_json::from_str::<Vec<ApiError>>(&body) {
                Ok(errors) => {
                    let fields: Vec<String> = errors
                        .iter()
                        .flat_map(|e| e.fields.clone().unwrap_or_default())
                        .collect();
                    let message = errors
                        .iter()
                        .map(|e| format!("{} ({})", e.message, e.error_code))
                        .collect::<Vec<_>>()
                        .join("; ");
                    GatewayError::Validation { fields, message }
                }
                Err(_) => GatewayError::Validation { fields: Vec::new(), message: body },
            },
            404 => {
                let message = serde_json::from_str::<Vec<ApiError>>(&body)
                    .ok()
                    .and_then(|errors| errors.into_iter().next().map(|e| e.message))
                    .unwrap_or_else(|| "record not found".to_string());
                GatewayError::NotFound(message)
            }
            401 | 403 => {
                GatewayError::Auth(format!("remote store rejected credentials (HTTP {status}): {body}"))
            }
            500..=599 => {
                GatewayError::Transport(format!("remote store error (HTTP {status}): {body}"))
            }
            _ => GatewayError::Internal(format!("unexpected response (HTTP {status}): {body}")),
        }
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Internal(format!("failed to decode remote response: {e}")))
    }
}

#[async_trait]
impl RecordStore for SalesforceClient {
    async fn query(&self, soql: &str) -> Result<QueryResult> {
        // Form-style encoding per the query endpoint's contract: spaces
        // become '+', quotes are percent-encoded
        let encoded = form_urlencoded::Serializer::new(String::new())
            .append_pair("q", soql)
            .finish();
        let url = format!("{}/query/?{}", self.data_url, encoded);

        let response =
            self.dispatch(|token| self.http.request(Method::GET, &url).bearer_auth(token)).await?;
        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }
        Self::read_json(response).await
    }

    async fn get_record(
        &self,
        sobject: &str,
        record_id: &str,
        fields: Option<&[&str]>,
    ) -> Result<FieldMap> {
        let mut url = format!("{}/sobjects/{}/{}", self.data_url, sobject, record_id);
        if let Some(fields) = fields {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .append_pair("fields", &fields.join(","))
                .finish();
            url = format!("{url}?{encoded}");
        }

        let response =
            self.dispatch(|token| self.http.request(Method::GET, &url).bearer_auth(token)).await?;
        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }
        Self::read_json(response).await
    }

    async fn create_record(&self, sobject: &str, body: &Value) -> Result<String> {
        let url = format!("{}/sobjects/{}/", self.data_url, sobject);

        let response = self
            .dispatch(|token| {
                self.http.request(Method::POST, &url).bearer_auth(token).json(body)
            })
            .await?;
        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }
        let created: CreateResponse = Self::read_json(response).await?;
        Ok(created.id)
    }

    async fn update_record(&self, sobject: &str, record_id: &str, body: &Value) -> Result<()> {
        let url = format!("{}/sobjects/{}/{}", self.data_url, sobject, record_id);

        let response = self
            .dispatch(|token| {
                self.http.request(Method::PATCH, &url).bearer_auth(token).json(body)
            })
            .await?;
        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }
        // 204 no body on success
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Canned token provider: `invalidate` advances to the next token
    struct SequenceTokenProvider {
        tokens: Mutex<Vec<&'static str>>,
    }

    impl SequenceTokenProvider {
        fn new(tokens: &[&'static str]) -> Arc<Self> {
            Arc::new(Self { tokens: Mutex::new(tokens.to_vec()) })
        }
    }

    #[async_trait]
    impl AccessTokenProvider for SequenceTokenProvider {
        async fn access_token(&self) -> Result<String> {
            Ok(self.tokens.lock().unwrap().first().expect("token sequence exhausted").to_string())
        }

        async fn invalidate(&self) {
            let mut tokens = self.tokens.lock().unwrap();
            if tokens.len() > 1 {
                tokens.remove(0);
            }
        }
    }

    fn client(server: &MockServer, tokens: &[&'static str]) -> SalesforceClient {
        let config = SalesforceConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            instance_url: server.uri(),
            user_email: "cde@example.com".into(),
            manager_email: None,
        };
        SalesforceClient::new(&config, HttpClient::new().unwrap(), SequenceTokenProvider::new(tokens))
    }

    #[tokio::test]
    async fn query_encodes_spaces_as_plus_and_quotes_percent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/query/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 0, "done": true, "records": []
            })))
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        client
            .query("SELECT Id FROM Implementation__c WHERE Name = 'Acme Corp'")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let raw_query = requests[0].url.query().unwrap();
        assert!(raw_query.contains("SELECT+Id+FROM+Implementation__c"));
        assert!(raw_query.contains("%27Acme+Corp%27"));
    }

    #[tokio::test]
    async fn requests_carry_the_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/query/"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 0, "records": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        client.query("SELECT Id FROM Implementation__c").await.unwrap();
    }

    #[tokio::test]
    async fn retries_exactly_once_with_a_fresh_token_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/query/"))
            .and(header("Authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/query/"))
            .and(header("Authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 1, "records": [{"Id": "a0B000000000001"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, &["stale", "fresh"]);
        let result = client.query("SELECT Id FROM Implementation__c").await.unwrap();
        assert_eq!(result.total_size, 1);
    }

    #[tokio::test]
    async fn recurring_401_surfaces_auth_error_after_one_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/query/"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#,
            ))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server, &["stale", "also-stale"]);
        let err = client.query("SELECT Id FROM Implementation__c").await.unwrap_err();
        assert!(matches!(err, GatewayError::Auth(_)));
    }

    #[tokio::test]
    async fn field_level_400_surfaces_validation_with_remote_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v62.0/sobjects/Implementation__c/"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"[{"message":"bad value for restricted picklist field: Sideways","errorCode":"INVALID_OR_NULL_FOR_RESTRICTED_PICKLIST","fields":["Type__c"]}]"#,
            ))
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        let err = client
            .create_record("Implementation__c", &json!({"Type__c": "Sideways"}))
            .await
            .unwrap_err();

        match err {
            GatewayError::Validation { fields, message } => {
                assert_eq!(fields, vec!["Type__c"]);
                assert!(message.contains("bad value for restricted picklist field"));
                assert!(message.contains("INVALID_OR_NULL_FOR_RESTRICTED_PICKLIST"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"[{"message":"The requested resource does not exist","errorCode":"NOT_FOUND"}]"#,
            ))
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        let err = client
            .get_record("Implementation__c", "a0B000000000404", None)
            .await
            .unwrap_err();

        match err {
            GatewayError::NotFound(message) => {
                assert!(message.contains("does not exist"));
            }
            other => panic!("expected not-found error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_returns_the_new_record_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v62.0/sobjects/Implementation__c/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "a0B00000000NEW1", "success": true, "errors": []
            })))
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        let id = client
            .create_record("Implementation__c", &json!({"Name": "Acme Corp - Join - 2026-02-27"}))
            .await
            .unwrap();
        assert_eq!(id, "a0B00000000NEW1");
    }

    #[tokio::test]
    async fn update_accepts_no_content_success() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/services/data/v62.0/sobjects/Implementation__c/a0B000000000001"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        client
            .update_record("Implementation__c", "a0B000000000001", &json!({"Comments__c": "ok"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_record_restricts_to_requested_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/sobjects/Implementation__c/a0B000000000001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "CDE__c": "005STD000000001"
            })))
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        let record = client
            .get_record("Implementation__c", "a0B000000000001", Some(&["CDE__c"]))
            .await
            .unwrap();

        assert_eq!(record["CDE__c"], "005STD000000001");
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.query().unwrap().contains("fields=CDE__c"));
    }

    #[tokio::test]
    async fn server_errors_become_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = client(&server, &["tok"]);
        let err = client.query("SELECT Id FROM Implementation__c").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
