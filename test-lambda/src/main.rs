//! This is a basic API Gateway lambda showing how to use lambda-api-response.
use lambda_api_response::{InvocationContext, InvocationMetadata, Notifier, ProxyResponse, Publisher};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// The part of the API Gateway proxy request this lambda needs.
#[derive(Deserialize, Debug)]
pub(crate) struct ApiRequest {
    /// JSON-encoded `Request`
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Request {
    command: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // required to enable CloudWatch error logging by the runtime
    lambda_api_response::init_tracing();

    // the notifier is reused by all invocations
    let notifier = &Notifier::from_env().await;

    let func = service_fn(move |event: LambdaEvent<ApiRequest>| async move { my_handler(notifier, event).await });
    lambda_runtime::run(func).await?;
    Ok(())
}

pub(crate) async fn my_handler<P: Publisher>(
    notifier: &Notifier<P>,
    event: LambdaEvent<ApiRequest>,
) -> Result<ProxyResponse, Error> {
    let (request, ctx) = event.into_parts();
    debug!("Request: {:?}", request);

    let mut invocation = InvocationContext::new();
    invocation.set_context(
        |resp| info!("Responding with {}", resp.status_code),
        Some(InvocationMetadata::from(&ctx)),
    );

    // extract the command from the request body
    let command = match request.body.as_deref().map(serde_json::from_str::<Request>) {
        Some(Ok(v)) => v.command,
        _ => {
            let body = json!({ "error": "expected a JSON body with a command" });
            return Ok(invocation.send_api_response(notifier, 400, &body, None).await?);
        }
    };

    info!("Command received: {}", command);

    let resp = match command.as_str() {
        "missing" => {
            let body = json!({ "error": format!("{command} not found") });
            invocation.send_api_response(notifier, 404, &body, None).await?
        }
        "fail" => {
            let body = json!({ "error": "internal error", "req_id": ctx.request_id });
            let error_body = json!({ "command": command, "cause": "the command failed on purpose" });
            invocation
                .send_api_response(notifier, 500, &body, Some(&error_body))
                .await?
        }
        _ => {
            let body = json!({ "req_id": ctx.request_id, "msg": format!("Command {command} executed.") });
            invocation.send_api_response(notifier, 200, &body, None).await?
        }
    };

    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_api_response::test_utils::MockPublisher;
    use lambda_api_response::{NotifierConfig, SERVER_ERROR_SUBJECT};
    use lambda_runtime::Context;

    fn event(body: Option<&str>) -> LambdaEvent<ApiRequest> {
        let mut ctx = Context::default();
        ctx.request_id = "test-request-1".to_owned();

        LambdaEvent::new(
            ApiRequest {
                body: body.map(str::to_owned),
            },
            ctx,
        )
    }

    fn notifier() -> Notifier<MockPublisher> {
        Notifier::new(
            MockPublisher::new(),
            NotifierConfig::new("arn:aws:sns:us-east-1:512295225992:api-errors"),
        )
    }

    #[tokio::test]
    async fn command_executed() {
        let notifier = notifier();
        let resp = my_handler(&notifier, event(Some(r#"{"command":"ping"}"#)))
            .await
            .expect("handler succeeds");

        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, r#"{"msg":"Command ping executed.","req_id":"test-request-1"}"#);
        assert!(notifier.publisher().published().is_empty());
    }

    #[tokio::test]
    async fn bad_request() {
        let notifier = notifier();
        let resp = my_handler(&notifier, event(None)).await.expect("handler succeeds");
        assert_eq!(resp.status_code, 400);

        let resp = my_handler(&notifier, event(Some("not json")))
            .await
            .expect("handler succeeds");
        assert_eq!(resp.status_code, 400);
        assert!(notifier.publisher().published().is_empty());
    }

    #[tokio::test]
    async fn not_found() {
        let notifier = notifier();
        let resp = my_handler(&notifier, event(Some(r#"{"command":"missing"}"#)))
            .await
            .expect("handler succeeds");

        assert_eq!(resp.status_code, 404);
        assert!(notifier.publisher().published().is_empty());
    }

    #[tokio::test]
    async fn failure_is_reported() {
        let notifier = notifier();
        let resp = my_handler(&notifier, event(Some(r#"{"command":"fail"}"#)))
            .await
            .expect("handler succeeds");

        assert_eq!(resp.status_code, 500);

        let published = notifier.publisher().published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].subject, SERVER_ERROR_SUBJECT);
        assert!(published[0].message.contains("the command failed on purpose"));
    }
}
