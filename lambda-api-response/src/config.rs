use std::env::var;
use tracing::{debug, warn};

/// The env var holding the ARN of the SNS topic for developer notifications,
/// e.g. arn:aws:sns:us-east-1:512295225992:api-errors
pub const TOPIC_ARN_ENV_VAR: &str = "MANASOFT_SDK_NOTIFICATIONS_SNS_ARN";

/// Notifier settings supplied at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifierConfig {
    /// No notifications can be sent if this is None.
    /// The notifier reports it as an error on every call instead of failing at startup.
    pub topic_arn: Option<String>,
}

impl NotifierConfig {
    pub fn new(topic_arn: impl Into<String>) -> Self {
        Self {
            topic_arn: Some(topic_arn.into()),
        }
    }

    /// Creates a new config from the environment variables.
    /// Does not panic: a missing or blank topic ARN is left as None.
    pub fn from_env() -> Self {
        let topic_arn = match var(TOPIC_ARN_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => {
                debug!("Notifications topic: {v}");
                Some(v)
            }
            _ => {
                warn!("{TOPIC_ARN_ENV_VAR} env var is not set. 5xx notifications will not be sent.");
                None
            }
        };

        Self { topic_arn }
    }

    /// Replaces the topic ARN, e.g. to point a test at a different topic.
    pub fn with_topic_arn(mut self, topic_arn: impl Into<String>) -> Self {
        self.topic_arn = Some(topic_arn.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_topic() {
        assert_eq!(NotifierConfig::default().topic_arn, None);
    }

    #[test]
    fn explicit_topic() {
        let config = NotifierConfig::default().with_topic_arn("arn:aws:sns:us-east-1:1:t");
        assert_eq!(config, NotifierConfig::new("arn:aws:sns:us-east-1:1:t"));
    }
}
