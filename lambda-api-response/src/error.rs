use thiserror::Error;

/// Errors returned by the response formatter and the notifier.
///
/// The first group signals misuse by the calling lambda (the response was never sent),
/// the second group is operational and is only logged on the 5xx path.
#[derive(Debug, Error)]
pub enum Error {
    #[error("undefined aws callback function received, make sure you have initialized the sdk with set_context.")]
    MissingCallback,

    #[error("undefined aws context object received, make sure you have initialized the sdk with set_context.")]
    MissingContext,

    #[error("undefined api response status code received.")]
    MissingStatusCode,

    #[error("status code is not parsable integer (received : {0})")]
    InvalidStatusCode(String),

    #[error("undefined api response body received.")]
    MissingBody,

    #[error("responseBody is not json, received : {0}")]
    BodyNotStructured(&'static str),

    #[error("failed to serialize the api response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("undefined messageBody received.")]
    EmptyMessage,

    #[error("undefined {} environment variable.", crate::config::TOPIC_ARN_ENV_VAR)]
    MissingTopicArn,

    #[error("SNS publish failed: {0}")]
    Publish(String),
}
