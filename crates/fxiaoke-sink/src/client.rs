//! CRM push clients and response classification.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use sync_core::{ConsumableRecord, SyncOutcome};

use crate::auth::{TokenRequest, TokenResponse};
use crate::error::SinkError;
use crate::payload;

const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
const CREATE_TIMEOUT: Duration = Duration::from_secs(10);
const DIRECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Code the direct ingest endpoint returns for accepted objects.
const DIRECT_SUCCESS_CODE: &str = "s106240000";

/// How many characters of a response body to keep in failure messages.
const BODY_SNIPPET_CHARS: usize = 200;

/// Client for the token-based open API.
pub struct FxiaokeClient {
    http: reqwest::Client,
    api_base: String,
    app_id: String,
    app_secret: String,
    permanent_code: String,
}

impl FxiaokeClient {
    pub fn new(
        api_base: &str,
        app_id: &str,
        app_secret: &str,
        permanent_code: &str,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            permanent_code: permanent_code.to_string(),
        })
    }

    /// Exchange app credentials for a corp access token.
    ///
    /// Any failure here aborts the run: the caller must not attempt to
    /// push records without a token.
    pub async fn acquire_token(&self) -> Result<String, SinkError> {
        let url = format!("{}/corpAccessToken/get/V2", self.api_base);
        let request = TokenRequest {
            app_id: &self.app_id,
            app_secret: &self.app_secret,
            permanent_code: &self.permanent_code,
        };

        let resp = self
            .http
            .post(&url)
            .timeout(TOKEN_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SinkError::Auth(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        let parsed: TokenResponse = resp
            .json()
            .await
            .map_err(|e| SinkError::Auth(format!("malformed token response: {e}")))?;
        parsed.into_token()
    }

    /// Create one CRM object for the record.
    ///
    /// Delivery problems become a failure outcome so the push loop can
    /// count them and continue.
    pub async fn create_object(&self, token: &str, record: &ConsumableRecord) -> SyncOutcome {
        let url = format!("{}/crm/v2/object/create", self.api_base);
        let body = payload::create_object_body(token, &self.app_id, record);

        let resp = match self
            .http
            .post(&url)
            .timeout(CREATE_TIMEOUT)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return SyncOutcome::Failure {
                    error: format!("request failed: {e}"),
                }
            }
        };

        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                return SyncOutcome::Failure {
                    error: format!("failed to read response: {e}"),
                }
            }
        };
        parse_create_response(&text)
    }
}

/// Client for the fixed-URL direct ingest endpoint.
pub struct DirectPusher {
    http: reqwest::Client,
    url: String,
    dc_id: String,
    tenant_id: String,
    token: String,
    extra_headers: HashMap<String, String>,
}

impl DirectPusher {
    pub fn new(
        url: &str,
        dc_id: &str,
        tenant_id: &str,
        token: &str,
        extra_headers: HashMap<String, String>,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            url: url.to_string(),
            dc_id: dc_id.to_string(),
            tenant_id: tenant_id.to_string(),
            token: token.to_string(),
            extra_headers,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Push one record to the ingest URL.
    pub async fn push(&self, record: &ConsumableRecord) -> SyncOutcome {
        let unique_id = record.unique_id();
        let body = payload::direct_push_body(record);

        let mut request = self
            .http
            .post(&self.url)
            .timeout(DIRECT_TIMEOUT)
            .header("dataCenterId", self.dc_id.as_str())
            .header("tenantId", self.tenant_id.as_str())
            .header("objectApiName", payload::DIRECT_OBJECT_API_NAME)
            .header("id", unique_id.as_str())
            .header("version", "v1")
            .header("directSync", "false")
            .header("token", self.token.as_str());
        for (name, value) in &self.extra_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let resp = match request.json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return SyncOutcome::Failure {
                    error: format!("request failed: {e}"),
                }
            }
        };

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        parse_direct_response(status, &text)
    }
}

fn parse_create_response(body: &str) -> SyncOutcome {
    #[derive(Deserialize)]
    struct CreateResponse {
        #[serde(rename = "errorCode")]
        error_code: i64,
        #[serde(rename = "errorMessage", default)]
        error_message: String,
    }

    match serde_json::from_str::<CreateResponse>(body) {
        Ok(parsed) if parsed.error_code == 0 => SyncOutcome::Success { trace: None },
        Ok(parsed) => SyncOutcome::Failure {
            error: format!("errorCode {}: {}", parsed.error_code, parsed.error_message),
        },
        Err(e) => SyncOutcome::Failure {
            error: format!("malformed response: {e} ({})", snippet(body)),
        },
    }
}

fn parse_direct_response(status: StatusCode, body: &str) -> SyncOutcome {
    #[derive(Deserialize)]
    struct DirectResponse {
        #[serde(rename = "errCode", default)]
        err_code: String,
        #[serde(rename = "errMsg", default)]
        err_msg: String,
        #[serde(rename = "traceMsg", default)]
        trace_msg: String,
    }

    match serde_json::from_str::<DirectResponse>(body) {
        Ok(parsed) => {
            if parsed.err_code == DIRECT_SUCCESS_CODE {
                let trace = if parsed.trace_msg.is_empty() {
                    None
                } else {
                    Some(parsed.trace_msg)
                };
                SyncOutcome::Success { trace }
            } else {
                SyncOutcome::Failure {
                    error: format!("HTTP {} {} {}", status.as_u16(), snippet(body), parsed.err_msg),
                }
            }
        }
        // Not a JSON body: classify by HTTP status alone.
        Err(_) if status.is_success() => SyncOutcome::Success { trace: None },
        Err(_) => SyncOutcome::Failure {
            error: format!("HTTP {} {}", status.as_u16(), snippet(body)),
        },
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
