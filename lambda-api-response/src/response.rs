//! API Gateway proxy responses.
//!
//! [`InvocationContext::send_api_response`] validates the input, shapes it into a
//! [`ProxyResponse`] and hands it to the completion callback. 5xx responses are
//! reported to the developers via SNS before the callback is called.

use crate::context::InvocationContext;
use crate::notifier::{Notifier, Publisher};
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Added to every response to let browsers call the API from any origin.
pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";

/// SNS subject of the 5xx error reports.
pub const SERVER_ERROR_SUBJECT: &str = "Api gateway 5xx error";

/// The response structure expected by API Gateway from a Lambda proxy integration.
/// Serializes as `{"headers":{..},"statusCode":200,"body":".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub headers: BTreeMap<String, String>,
    pub status_code: i64,
    /// JSON-serialized response body
    pub body: String,
}

impl ProxyResponse {
    /// Creates a response with the permissive CORS header.
    pub fn new(status_code: i64, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(ALLOW_ORIGIN_HEADER.to_owned(), "*".to_owned());

        Self {
            headers,
            status_code,
            body: body.into(),
        }
    }

    /// True if the status code starts with 5, e.g. 500, 503.
    /// Only the first digit is checked, so 5 and 5000 also qualify.
    pub fn is_server_error(&self) -> bool {
        is_server_error(self.status_code)
    }
}

fn is_server_error(status_code: i64) -> bool {
    status_code.to_string().starts_with('5')
}

/// A status code as received from the calling lambda, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatusCode {
    Number(i64),
    Text(String),
}

impl From<i64> for RawStatusCode {
    fn from(v: i64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for RawStatusCode {
    fn from(v: i32) -> Self {
        Self::Number(v.into())
    }
}

impl From<u16> for RawStatusCode {
    fn from(v: u16) -> Self {
        Self::Number(v.into())
    }
}

impl From<&str> for RawStatusCode {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for RawStatusCode {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl RawStatusCode {
    /// Returns the status code as an integer.
    ///
    /// Text is parsed from its leading integer part, e.g. `" 404 Not Found"` is 404.
    /// Zero and empty text count as a missing status code.
    pub fn parse(&self) -> Result<i64, Error> {
        match self {
            Self::Number(0) => Err(Error::MissingStatusCode),
            Self::Number(v) => Ok(*v),
            Self::Text(v) if v.is_empty() => Err(Error::MissingStatusCode),
            Self::Text(v) => parse_leading_int(v).ok_or_else(|| Error::InvalidStatusCode(v.clone())),
        }
    }
}

/// Parses optional whitespace, an optional sign and at least one digit, ignoring the rest.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let digits_start = if s.starts_with(['+', '-']) { 1 } else { 0 };
    let digits_len = s[digits_start..].bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    s[..digits_start + digits_len].parse::<i64>().ok()
}

/// JSON type names as reported in error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

impl InvocationContext {
    /// Sends the api response to the client via the completion callback.
    ///
    /// * status 200 and any non-5xx status are passed through as-is
    /// * 5xx responses are also reported to the SNS topic together with `error_body`.
    ///   A failed notification is logged and does not change the response.
    ///
    /// Returns the envelope given to the callback. Both context handles are cleared on success.
    /// Nothing is sent and nothing is cleared if the input is invalid.
    pub async fn send_api_response<P, B>(
        &mut self,
        notifier: &Notifier<P>,
        status_code: impl Into<RawStatusCode>,
        response_body: &B,
        error_body: Option<&Value>,
    ) -> Result<ProxyResponse, Error>
    where
        P: Publisher,
        B: Serialize + ?Sized,
    {
        if self.completion.is_none() {
            return Err(Error::MissingCallback);
        }
        let metadata = self.metadata.as_mut().ok_or(Error::MissingContext)?;

        let status_code = status_code.into().parse()?;

        match serde_json::to_value(response_body)? {
            Value::Null => return Err(Error::MissingBody),
            Value::Object(_) | Value::Array(_) => {}
            other => return Err(Error::BodyNotStructured(json_type_name(&other))),
        }

        // do not wait for pending work after the response is sent
        metadata.callback_waits_for_empty_event_loop = false;

        let response = ProxyResponse::new(status_code, serde_json::to_string(response_body)?);
        debug!("Api response: {}", response.status_code);

        if response.is_server_error() {
            let report = format!(
                "Error : \n{}\n\n---------\nClient received this 5xx api response : \n{}",
                serde_json::to_string(&error_body)?,
                serde_json::to_string(&response)?,
            );

            match notifier
                .send_sns_notif(self.metadata.as_ref(), &report, SERVER_ERROR_SUBJECT)
                .await
            {
                Ok(ack) => info!(
                    message_id = ack.message_id.as_deref().unwrap_or_default(),
                    "A notification message was posted to notify the developers of the api error."
                ),
                Err(e) => error!(
                    "<!>Warning : sns related error, no email notification posted to report this 5xx error.<!> {e}"
                ),
            }
        }

        if let Some(completion) = self.completion.take() {
            completion(response.clone());
        }
        self.metadata = None;

        Ok(response)
    }
}
