//! Helpers for AWS Lambda functions behind an API Gateway proxy integration.
//!
//! - [`InvocationContext`] holds the completion callback and the invocation metadata
//! - [`InvocationContext::send_api_response`] shapes the proxy response and reports 5xx errors
//! - [`Notifier`] posts developer notifications to an SNS topic
//!
//! ```no_run
//! use lambda_api_response::{InvocationContext, InvocationMetadata, Notifier};
//! use lambda_runtime::{service_fn, Error, LambdaEvent};
//! use serde_json::{json, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     lambda_api_response::init_tracing();
//!     let notifier = &Notifier::from_env().await;
//!
//!     lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
//!         let mut ctx = InvocationContext::new();
//!         ctx.set_context(|_| {}, Some(InvocationMetadata::from(&event.context)));
//!         let resp = ctx.send_api_response(notifier, 200, &json!({"ok": true}), None).await?;
//!         Ok::<_, Error>(resp)
//!     }))
//!     .await
//! }
//! ```

mod config;
mod context;
mod error;
mod notifier;
mod response;
mod sns;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{NotifierConfig, TOPIC_ARN_ENV_VAR};
pub use context::{Completion, InvocationContext, InvocationMetadata};
pub use error::Error;
pub use notifier::{Notifier, PublishAck, Publisher, SNS_MAX_MESSAGE_BYTES, SNS_MAX_SUBJECT_CHARS};
pub use response::{ProxyResponse, RawStatusCode, ALLOW_ORIGIN_HEADER, SERVER_ERROR_SUBJECT};
pub use sns::SnsPublisher;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initializes the tracing from RUST_LOG env var if present or logs at INFO.
/// The output goes to CloudWatch, so there are no colors and no timestamps.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(false)
        .without_time()
        .compact()
        .init();
}
