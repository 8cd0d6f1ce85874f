//! NerdGraph API client
//!
//! POSTs `{query, variables}` bodies to the fixed US or EU endpoint with
//! a static `API-Key` header. Responses are JSON; a top-level `errors`
//! list fails the call, and mutation payloads carry their own `errors`
//! list which callers check through [`check_operation_errors`].

use crate::error::{NewRelicError, Result};
use serde::Serialize;
use serde_json::Value;

const NERDGRAPH_URL: &str = "https://api.newrelic.com/graphql";
const NERDGRAPH_URL_EU: &str = "https://api.eu.newrelic.com/graphql";

/// Which NerdGraph endpoint to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewRelicRegion {
    #[default]
    Us,
    Eu,
}

impl NewRelicRegion {
    pub fn endpoint(self) -> &'static str {
        match self {
            NewRelicRegion::Us => NERDGRAPH_URL,
            NewRelicRegion::Eu => NERDGRAPH_URL_EU,
        }
    }
}

impl std::str::FromStr for NewRelicRegion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(NewRelicRegion::Us),
            "eu" => Ok(NewRelicRegion::Eu),
            other => Err(format!("unknown New Relic region '{other}' (use us or eu)")),
        }
    }
}

/// NerdGraph client
pub struct NerdGraph {
    client: reqwest::Client,
    api_key: String,
    endpoint: &'static str,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

impl NerdGraph {
    pub fn new(api_key: impl Into<String>, region: NewRelicRegion) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: region.endpoint(),
        }
    }

    /// Execute a query and return the `data` payload.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        tracing::debug!("NerdGraph query: {} variables: {}", query, variables);

        let response = self
            .client
            .post(self.endpoint)
            .header("API-Key", &self.api_key)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(NewRelicError::Unauthorized(status.as_u16()));
        }

        let body: Value = response.json().await?;
        tracing::debug!("NerdGraph response: {}", body);

        if let Some(errors) = body.get("errors").and_then(Value::as_array)
            && !errors.is_empty()
        {
            return Err(NewRelicError::Api(flatten_errors(errors)));
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| NewRelicError::MalformedResponse(body.to_string()))
    }
}

/// Fail on an operation payload's own `errors` list.
pub(crate) fn check_operation_errors(payload: &Value) -> Result<()> {
    if let Some(errors) = payload.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        return Err(NewRelicError::Api(flatten_errors(errors)));
    }
    Ok(())
}

/// Flatten error objects, unwrapping any downstream `errors` list they
/// carry, into one newline-joined message string.
fn flatten_errors(errors: &[Value]) -> String {
    let mut messages = Vec::new();
    for error in errors {
        match error.get("errors").and_then(Value::as_array) {
            Some(nested) if !nested.is_empty() => {
                messages.extend(nested.iter().map(error_message));
            }
            _ => messages.push(error_message(error)),
        }
    }
    messages.join("\n")
}

fn error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn region_selects_endpoint() {
        assert_eq!(NewRelicRegion::Us.endpoint(), NERDGRAPH_URL);
        assert_eq!(NewRelicRegion::Eu.endpoint(), NERDGRAPH_URL_EU);
        assert_eq!("EU".parse::<NewRelicRegion>().unwrap(), NewRelicRegion::Eu);
        assert!("apac".parse::<NewRelicRegion>().is_err());
    }

    #[test]
    fn flattens_plain_errors() {
        let errors = [json!({"message": "first"}), json!({"message": "second"})];
        assert_eq!(flatten_errors(&errors), "first\nsecond");
    }

    #[test]
    fn flattens_nested_downstream_errors() {
        let errors = [json!({
            "type": "SERVICE",
            "errors": [{"message": "inner one"}, {"message": "inner two"}]
        })];
        assert_eq!(flatten_errors(&errors), "inner one\ninner two");
    }

    #[test]
    fn falls_back_to_raw_json_without_message() {
        let errors = [json!({"code": 42})];
        assert_eq!(flatten_errors(&errors), r#"{"code":42}"#);
    }

    #[test]
    fn operation_errors_fail_the_call() {
        let payload = json!({"linkedAccounts": [], "errors": [{"message": "bad arn"}]});
        let err = check_operation_errors(&payload).unwrap_err();
        assert!(matches!(err, NewRelicError::Api(m) if m == "bad arn"));

        let clean = json!({"linkedAccounts": [], "errors": []});
        assert!(check_operation_errors(&clean).is_ok());
    }
}
