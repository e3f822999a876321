use crate::config::WebhookConfig;
use crate::platform::http::HttpJsonClient;
use crate::webhook::signature::{sign_payload, SIGNATURE_HEADER};
use crate::workflow::types::OutcomePayload;

/// Best-effort delivery of the run outcome to a configured URL.
#[derive(Clone)]
pub struct WebhookNotifier {
    http: HttpJsonClient,
    url: Option<String>,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(http: HttpJsonClient, config: &WebhookConfig) -> Self {
        Self {
            http,
            url: config.url.clone().filter(|url| !url.trim().is_empty()),
            secret: config.secret.clone().filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// POST `payload` to the webhook, if one is configured.
    ///
    /// Never fails: delivery problems are logged and dropped so they cannot
    /// replace the outcome being reported.
    pub async fn notify(&self, payload: &OutcomePayload) {
        let Some(url) = &self.url else {
            return;
        };

        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode webhook payload");
                return;
            }
        };

        let mut headers = Vec::new();
        if let Some(secret) = &self.secret {
            match sign_payload(secret, &body) {
                Ok(signature) => headers.push((SIGNATURE_HEADER, signature)),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to sign webhook payload");
                    return;
                }
            }
        }

        match self.http.post_json_bytes(url, body, &headers).await {
            Ok(_) => tracing::info!(status = ?payload.status, "Webhook delivered"),
            Err(e) => tracing::warn!(error = %e, "Webhook delivery failed"),
        }
    }
}

// Manual Debug impl to avoid leaking the signing secret
impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::signature::verify_signature;
    use crate::workflow::types::{PrResult, RunStatus, SkipReason};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> OutcomePayload {
        OutcomePayload {
            status: RunStatus::Success,
            repo: "acme/widgets".to_string(),
            branch: Some("mini-agent-action/x".to_string()),
            pr: Some(PrResult::skipped(SkipReason::NoChanges)),
            error: None,
        }
    }

    fn notifier(url: Option<String>, secret: Option<&str>) -> WebhookNotifier {
        WebhookNotifier::new(
            HttpJsonClient::new("mini-agent-action-test").unwrap(),
            &WebhookConfig {
                url,
                secret: secret.map(str::to_string),
            },
        )
    }

    #[tokio::test]
    async fn test_notify_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/status"))
            .and(body_json(json!({
                "status": "success",
                "repo": "acme/widgets",
                "branch": "mini-agent-action/x",
                "pr": {"skipped": true, "reason": "no_changes"},
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        notifier(Some(format!("{}/status", server.uri())), None)
            .notify(&payload())
            .await;
    }

    #[tokio::test]
    async fn test_notify_signs_when_secret_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        notifier(Some(server.uri()), Some("s3cret"))
            .notify(&payload())
            .await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let signature = requests[0]
            .headers
            .get("x-hub-signature-256")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(verify_signature("s3cret", &requests[0].body, signature).is_ok());
    }

    #[tokio::test]
    async fn test_notify_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        notifier(Some(server.uri()), None).notify(&payload()).await;

        // Unreachable endpoint
        notifier(Some("http://127.0.0.1:1/hook".to_string()), None)
            .notify(&payload())
            .await;
    }

    #[tokio::test]
    async fn test_unconfigured_is_noop() {
        let n = notifier(None, None);
        assert!(!n.is_configured());
        n.notify(&payload()).await;

        assert!(!notifier(Some("  ".to_string()), None).is_configured());
    }
}
