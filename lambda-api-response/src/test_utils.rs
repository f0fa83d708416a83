//! Test doubles for the SNS publisher and the lambda context.
//!
//! Available in unit tests and to other crates via the `test-utils` feature.

use crate::context::InvocationMetadata;
use crate::notifier::{PublishAck, Publisher};
use crate::Error;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A single call to [`MockPublisher::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub message: String,
    pub subject: String,
    pub topic_arn: String,
}

/// Records all publish calls. Returns sequential message IDs or a fixed error.
#[derive(Debug, Default)]
pub struct MockPublisher {
    published: Mutex<Vec<PublishedMessage>>,
    fail_with: Option<String>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish call is recorded and then fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            published: Mutex::default(),
            fail_with: Some(reason.into()),
        }
    }

    /// A copy of all messages received so far, including the failed ones.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().expect("MockPublisher lock is poisoned").clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, message: &str, subject: &str, topic_arn: &str) -> Result<PublishAck, Error> {
        let count = {
            let mut published = self.published.lock().expect("MockPublisher lock is poisoned");
            published.push(PublishedMessage {
                message: message.to_owned(),
                subject: subject.to_owned(),
                topic_arn: topic_arn.to_owned(),
            });
            published.len()
        };

        match &self.fail_with {
            Some(reason) => Err(Error::Publish(reason.clone())),
            None => Ok(PublishAck {
                message_id: Some(format!("mock-message-{count}")),
            }),
        }
    }
}

/// Metadata of a running invocation: function `f`, request `1`, log group `g`, log stream `s`.
pub fn mock_metadata() -> InvocationMetadata {
    InvocationMetadata {
        function_name: "f".to_owned(),
        request_id: "1".to_owned(),
        log_group: "g".to_owned(),
        log_stream: "s".to_owned(),
        ..Default::default()
    }
    .with_remaining_time(Duration::from_secs(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_numbers_messages() {
        let publisher = MockPublisher::new();
        let first = publisher.publish("a", "s", "t").await.expect("mock succeeds");
        let second = publisher.publish("b", "s", "t").await.expect("mock succeeds");

        assert_eq!(first.message_id.as_deref(), Some("mock-message-1"));
        assert_eq!(second.message_id.as_deref(), Some("mock-message-2"));
        assert_eq!(publisher.published().len(), 2);
    }

    #[tokio::test]
    async fn failing_publisher_records_too() {
        let publisher = MockPublisher::failing("boom");
        assert!(publisher.publish("a", "s", "t").await.is_err());
        assert_eq!(publisher.published().len(), 1);
    }
}
