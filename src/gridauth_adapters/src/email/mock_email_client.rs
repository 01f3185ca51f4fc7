use gridauth_core::{Email, EmailClient, EmailClientError, EmailPurpose};
use secrecy::ExposeSecret;

/// Email client that logs instead of sending. For tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MockEmailClient;

impl MockEmailClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send_email(
        &self,
        recipient: &Email,
        purpose: EmailPurpose,
        subject: &str,
        _content: &str,
    ) -> Result<(), EmailClientError> {
        tracing::debug!(
            recipient = %recipient.as_ref().expose_secret(),
            purpose = purpose.as_str(),
            subject,
            "mock email client: dropping outbound email"
        );
        Ok(())
    }
}
