//! Corp access-token exchange.

use serde::{Deserialize, Serialize};

use crate::error::SinkError;

/// Request body for `corpAccessToken/get/V2`.
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    #[serde(rename = "appId")]
    pub app_id: &'a str,
    #[serde(rename = "appSecret")]
    pub app_secret: &'a str,
    #[serde(rename = "permanentCode")]
    pub permanent_code: &'a str,
}

/// Response body of the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(rename = "errorCode")]
    pub error_code: i64,
    #[serde(rename = "errorMessage", default)]
    pub error_message: String,
    #[serde(rename = "corpAccessToken", default)]
    pub corp_access_token: Option<String>,
}

impl TokenResponse {
    /// Extract the token, treating a zero error code without a token as a
    /// failure too.
    pub fn into_token(self) -> Result<String, SinkError> {
        if self.error_code != 0 {
            return Err(SinkError::Auth(format!(
                "errorCode {}: {}",
                self.error_code, self.error_message
            )));
        }
        self.corp_access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SinkError::Auth("token endpoint returned no corpAccessToken".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_exchange() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"errorCode": 0, "errorMessage": "success", "corpAccessToken": "tok-1"}"#,
        )
        .unwrap();

        assert_eq!(response.into_token().unwrap(), "tok-1");
    }

    #[test]
    fn test_rejected_credentials() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"errorCode": 20016, "errorMessage": "invalid appSecret"}"#,
        )
        .unwrap();

        let err = response.into_token().unwrap_err();
        assert!(err.to_string().contains("invalid appSecret"));
    }

    #[test]
    fn test_zero_code_without_token_is_failure() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"errorCode": 0, "errorMessage": "success"}"#).unwrap();

        assert!(response.into_token().is_err());
    }

    #[test]
    fn test_request_field_names() {
        let request = TokenRequest {
            app_id: "app",
            app_secret: "secret",
            permanent_code: "code",
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["appId"], "app");
        assert_eq!(value["appSecret"], "secret");
        assert_eq!(value["permanentCode"], "code");
    }
}
