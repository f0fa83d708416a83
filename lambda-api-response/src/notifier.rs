use crate::config::NotifierConfig;
use crate::context::InvocationMetadata;
use crate::Error;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// SNS messages must be no longer than 262144 bytes
pub const SNS_MAX_MESSAGE_BYTES: usize = 262144;

/// SNS subjects must be shorter than 100 characters
pub const SNS_MAX_SUBJECT_CHARS: usize = 99;

/// Replaces the AWS context block if the remaining time cannot be fetched.
const CONTEXT_PLACEHOLDER: &str = "error : can't fetch the aws context.";

/// Acknowledgement of a published notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishAck {
    /// Assigned by SNS, if returned
    pub message_id: Option<String>,
}

/// Sends a single message to a topic. Implemented by [`crate::SnsPublisher`] and test mocks.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &str, subject: &str, topic_arn: &str) -> Result<PublishAck, Error>;
}

/// Posts developer notifications with some details of the invocation to the configured topic.
#[derive(Debug)]
pub struct Notifier<P> {
    publisher: P,
    config: NotifierConfig,
}

impl<P: Publisher> Notifier<P> {
    pub fn new(publisher: P, config: NotifierConfig) -> Self {
        Self { publisher, config }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Posts `message_body` with `title` as the subject, prefixed with the invocation details.
    /// Nothing is published if there is no metadata, no message or no topic.
    pub async fn send_sns_notif(
        &self,
        metadata: Option<&InvocationMetadata>,
        message_body: &str,
        title: &str,
    ) -> Result<PublishAck, Error> {
        let metadata = metadata.ok_or(Error::MissingContext)?;
        if message_body.is_empty() {
            return Err(Error::EmptyMessage);
        }
        let topic_arn = self.config.topic_arn.as_deref().ok_or(Error::MissingTopicArn)?;

        let message = truncate_message(format!(
            "This is a back end notification message.\n\n-------AWS CONTEXT :----\n{}\n-------MESSAGE :---------\n{}",
            context_preamble(metadata),
            message_body
        ));
        let subject = sanitize_subject(title);

        debug!("SNS message to {topic_arn}:\n{message}");

        let ack = self.publisher.publish(&message, &subject, topic_arn).await?;
        info!("SNS message sent with ID: {}", ack.message_id.as_deref().unwrap_or_default());

        Ok(ack)
    }
}

/// Invocation details for the developers, one `name:value` per line.
fn context_preamble(metadata: &InvocationMetadata) -> String {
    match metadata.remaining_time_millis() {
        Some(remaining) => format!(
            "remaining time:{}\nfunctionName:{}\nAWSrequestID:{}\nlogGroupName:{}\nlogStreamName:{}\n",
            remaining, metadata.function_name, metadata.request_id, metadata.log_group, metadata.log_stream
        ),
        None => CONTEXT_PLACEHOLDER.to_owned(),
    }
}

/// Cuts the message down to the SNS limit at a char boundary.
fn truncate_message(mut message: String) -> String {
    if message.len() <= SNS_MAX_MESSAGE_BYTES {
        return message;
    }

    warn!(
        "Message size is too big for SNS: {}B, max allowed: 262,144 bytes. Truncating...",
        message.len()
    );

    let mut end = SNS_MAX_MESSAGE_BYTES;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message.truncate(end);

    message
}

/// SNS rejects subjects with line breaks, control chars or 100+ chars.
fn sanitize_subject(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(SNS_MAX_SUBJECT_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_metadata, MockPublisher};

    const TOPIC: &str = "arn:aws:sns:us-east-1:512295225992:api-errors";

    fn notifier(publisher: MockPublisher) -> Notifier<MockPublisher> {
        Notifier::new(publisher, NotifierConfig::new(TOPIC))
    }

    #[tokio::test]
    async fn publishes_with_context() {
        let notifier = notifier(MockPublisher::new());

        let ack = notifier
            .send_sns_notif(Some(&mock_metadata()), "disk full", "Low disk")
            .await
            .expect("published");
        assert_eq!(ack.message_id.as_deref(), Some("mock-message-1"));

        let published = notifier.publisher().published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].subject, "Low disk");
        assert_eq!(published[0].topic_arn, TOPIC);

        let message = &published[0].message;
        assert!(message.starts_with("This is a back end notification message.\n\n-------AWS CONTEXT :----\nremaining time:"));
        assert!(message.contains("\nfunctionName:f\nAWSrequestID:1\nlogGroupName:g\nlogStreamName:s\n"));
        assert!(message.ends_with("\n-------MESSAGE :---------\ndisk full"));
    }

    #[tokio::test]
    async fn placeholder_without_deadline() {
        let notifier = notifier(MockPublisher::new());
        let metadata = InvocationMetadata {
            deadline: 0,
            ..mock_metadata()
        };

        notifier
            .send_sns_notif(Some(&metadata), "msg", "title")
            .await
            .expect("published");

        let message = &notifier.publisher().published()[0].message;
        assert!(message.contains("-------AWS CONTEXT :----\nerror : can't fetch the aws context.\n-------MESSAGE"));
        assert!(!message.contains("functionName"));
    }

    #[tokio::test]
    async fn preconditions_in_order() {
        let notifier = Notifier::new(MockPublisher::new(), NotifierConfig::default());

        let err = notifier.send_sns_notif(None, "", "t").await;
        assert!(matches!(err, Err(Error::MissingContext)));

        let err = notifier.send_sns_notif(Some(&mock_metadata()), "", "t").await;
        assert!(matches!(err, Err(Error::EmptyMessage)));

        let err = notifier.send_sns_notif(Some(&mock_metadata()), "msg", "t").await;
        assert!(matches!(err, Err(Error::MissingTopicArn)));

        assert!(notifier.publisher().published().is_empty());
    }

    #[tokio::test]
    async fn publish_error_is_returned() {
        let notifier = notifier(MockPublisher::failing("throttled"));

        let err = notifier.send_sns_notif(Some(&mock_metadata()), "msg", "t").await;
        assert!(matches!(err, Err(Error::Publish(e)) if e == "throttled"));
    }

    #[test]
    fn long_messages_are_truncated() {
        let short = "abc".to_owned();
        assert_eq!(truncate_message(short.clone()), short);

        // 3-byte chars do not line up with the limit
        let long = "€".repeat(SNS_MAX_MESSAGE_BYTES / 3 + 10);
        let truncated = truncate_message(long);
        assert!(truncated.len() <= SNS_MAX_MESSAGE_BYTES);
        assert!(truncated.len() > SNS_MAX_MESSAGE_BYTES - 3);
        assert!(truncated.chars().all(|c| c == '€'));
    }

    #[test]
    fn subjects_are_sanitized() {
        assert_eq!(sanitize_subject("Api gateway 5xx error"), "Api gateway 5xx error");
        assert_eq!(sanitize_subject("line1\nline2"), "line1 line2");
        assert_eq!(sanitize_subject(&"x".repeat(150)).len(), SNS_MAX_SUBJECT_CHARS);
    }
}
