use reqwest::{header, StatusCode};
use thiserror::Error;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument};

use super::{Notifier, WebhookEnvelope};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("failed to reach webhook: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook responded with {0}")]
    Status(StatusCode),
}

/// Posts envelopes on background tasks. Clones share the same client and task set, so one
/// clone can be handed to the tracker while another is kept to [HttpNotifier::drain] on exit.
#[derive(Clone, Default)]
pub struct HttpNotifier {
    client: reqwest::Client,
    tasks: TaskTracker,
}

impl HttpNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for deliveries that are still in flight. Nothing can be sent afterwards.
    pub async fn drain(&self) {
        self.tasks.close();
        if !self.tasks.is_empty() {
            debug!("Waiting for {} webhook deliveries", self.tasks.len());
        }
        self.tasks.wait().await;
    }
}

impl Notifier for HttpNotifier {
    /// Must be called from within a tokio runtime.
    fn notify(&self, url: &str, envelope: WebhookEnvelope) {
        let client = self.client.clone();
        let url = url.to_owned();
        self.tasks.spawn(async move {
            // Delivery is best effort. The entry is already saved either way.
            if let Err(e) = deliver(&client, &url, &envelope).await {
                error!("Error sending webhook for entry {}: {e}", envelope.data.unique_id);
            }
        });
    }
}

/// Single POST of the envelope. Anything but a 2xx status counts as a failure.
#[instrument(skip(client, envelope), fields(entry = %envelope.data.unique_id))]
pub async fn deliver(
    client: &reqwest::Client,
    url: &str,
    envelope: &WebhookEnvelope,
) -> Result<(), WebhookError> {
    debug!("Sending webhook data {:?}", envelope);
    let response = client
        .post(url)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json")
        .json(envelope)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(WebhookError::Status(status));
    }

    info!("Webhook sent successfully with status {status}");
    Ok(())
}
