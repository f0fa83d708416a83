use crate::config::NotifierConfig;
use crate::notifier::{Notifier, PublishAck, Publisher};
use crate::Error;
use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client as SnsClient;
use tracing::debug;

/// Publishes notifications to an SNS topic.
#[derive(Debug, Clone)]
pub struct SnsPublisher {
    client: SnsClient,
}

impl SnsPublisher {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }

    /// Creates a client from the default AWS config chain: env vars, profile, lambda role.
    pub async fn from_env() -> Self {
        Self::new(SnsClient::new(&aws_config::load_from_env().await))
    }
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(&self, message: &str, subject: &str, topic_arn: &str) -> Result<PublishAck, Error> {
        let mut request = self.client.publish().message(message).topic_arn(topic_arn);

        // SNS rejects empty subjects, but the subject itself is optional
        if !subject.is_empty() {
            request = request.subject(subject);
        }

        match request.send().await {
            Ok(v) => Ok(PublishAck {
                message_id: v.message_id().map(str::to_owned),
            }),
            Err(e) => {
                debug!("Error publishing to SNS: {:?}", e);
                Err(Error::Publish(DisplayErrorContext(&e).to_string()))
            }
        }
    }
}

impl Notifier<SnsPublisher> {
    /// A notifier with the topic ARN and the AWS config taken from the environment.
    pub async fn from_env() -> Self {
        Self::new(SnsPublisher::from_env().await, NotifierConfig::from_env())
    }
}
