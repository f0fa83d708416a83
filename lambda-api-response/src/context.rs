use crate::response::ProxyResponse;
use lambda_runtime::Context;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The completion callback: receives the final envelope once per invocation.
pub type Completion = Box<dyn FnOnce(ProxyResponse) + Send>;

/// Runtime-supplied information about the current invocation.
/// A trimmed copy of `lambda_runtime::Context` with the fields used in notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationMetadata {
    pub function_name: String,
    pub request_id: String,
    /// E.g. /aws/lambda/my-lambda
    pub log_group: String,
    /// E.g. 2024/06/11/my-lambda[$LATEST]b1de3d3cab074896b448859c52fa1a2d
    pub log_stream: String,
    /// Execution deadline in ms since epoch. 0 means unknown.
    pub deadline: u64,
    /// A hint for the host runtime. It is set to false before the api response is sent.
    pub callback_waits_for_empty_event_loop: bool,
}

impl Default for InvocationMetadata {
    fn default() -> Self {
        Self {
            function_name: String::new(),
            request_id: String::new(),
            log_group: String::new(),
            log_stream: String::new(),
            deadline: 0,
            callback_waits_for_empty_event_loop: true,
        }
    }
}

impl InvocationMetadata {
    /// Sets the deadline to `remaining` from now.
    pub fn with_remaining_time(mut self, remaining: Duration) -> Self {
        self.deadline = now_millis().map_or(0, |now| now.saturating_add(remaining.as_millis() as u64));
        self
    }

    /// Time left before the invocation is killed, in ms.
    /// Negative if the deadline has passed, None if the deadline is unknown or the clock is off.
    pub fn remaining_time_millis(&self) -> Option<i64> {
        if self.deadline == 0 {
            return None;
        }

        let now = now_millis()?;
        Some(self.deadline as i64 - now as i64)
    }
}

impl From<&Context> for InvocationMetadata {
    fn from(ctx: &Context) -> Self {
        Self {
            function_name: ctx.env_config.function_name.clone(),
            request_id: ctx.request_id.clone(),
            log_group: ctx.env_config.log_group.clone(),
            log_stream: ctx.env_config.log_stream.clone(),
            deadline: ctx.deadline,
            callback_waits_for_empty_event_loop: true,
        }
    }
}

fn now_millis() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|v| v.as_millis() as u64)
}

/// Per-invocation holder for the completion callback and the invocation metadata.
///
/// Create one per invocation and pass it to the response functions.
/// Both handles are cleared once the api response is sent.
#[derive(Default)]
pub struct InvocationContext {
    pub(crate) completion: Option<Completion>,
    pub(crate) metadata: Option<InvocationMetadata>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the completion callback and the metadata, replacing any previous values.
    pub fn set_context<F>(&mut self, completion: F, metadata: Option<InvocationMetadata>)
    where
        F: FnOnce(ProxyResponse) + Send + 'static,
    {
        self.completion = Some(Box::new(completion));
        self.metadata = metadata;
    }

    pub fn metadata(&self) -> Option<&InvocationMetadata> {
        self.metadata.as_ref()
    }

    /// True if the completion callback has not been consumed yet.
    pub fn is_pending(&self) -> bool {
        self.completion.is_some()
    }

    /// Drops both handles without calling the completion callback.
    pub fn clear(&mut self) {
        self.completion = None;
        self.metadata = None;
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("completion", &self.completion.as_ref().map(|_| "FnOnce(ProxyResponse)"))
            .field("metadata", &self.metadata)
            .finish()
    }
}
