use gridauth_core::{Email, EmailClient, EmailClientError, EmailPurpose};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use crate::config::settings::EmailClientSettings;

const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";
const MESSAGE_STREAM: &str = "outbound";

/// Postmark transport for the platform's outbound auth mail. Every message
/// carries its purpose as a Postmark tag, so reset links and verification
/// codes show up as separate delivery series in the provider dashboard.
#[derive(Debug)]
pub struct PostmarkEmailClient {
    http_client: Client,
    endpoint: Url,
    sender: Email,
    authorization_token: Secret<String>,
}

impl PostmarkEmailClient {
    /// Build the client from its settings block. Base URL and sender
    /// address are validated here, once, not on every send.
    pub fn new(
        settings: &EmailClientSettings,
        http_client: Client,
    ) -> Result<Self, EmailClientError> {
        let endpoint = Url::parse(&settings.base_url)
            .and_then(|base| base.join("/email"))
            .map_err(|e| EmailClientError::Configuration(format!("bad base url: {e}")))?;
        let sender = Email::parse(&settings.sender)
            .map_err(|e| EmailClientError::Configuration(format!("bad sender address: {e}")))?;

        Ok(Self {
            http_client,
            endpoint,
            sender,
            authorization_token: settings.auth_token.clone(),
        })
    }
}

/// Postmark's send-email payload. The OTP code body is plain text and the
/// reset mail is rendered HTML; both land in `html_body` and `text_body`
/// so every mail reader gets something usable.
#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
    tag: &'a str,
}

#[async_trait::async_trait]
impl EmailClient for PostmarkEmailClient {
    #[tracing::instrument(
        name = "Sending email via Postmark",
        skip_all,
        fields(purpose = purpose.as_str())
    )]
    async fn send_email(
        &self,
        recipient: &Email,
        purpose: EmailPurpose,
        subject: &str,
        content: &str,
    ) -> Result<(), EmailClientError> {
        let message = OutboundMessage {
            from: self.sender.as_ref().expose_secret(),
            to: recipient.as_ref().expose_secret(),
            subject,
            html_body: content,
            text_body: content,
            message_stream: MESSAGE_STREAM,
            tag: purpose.as_str(),
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(
                POSTMARK_AUTH_HEADER,
                self.authorization_token.expose_secret(),
            )
            .json(&message)
            .send()
            .await
            .map_err(|e| EmailClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmailClientError::Rejected(status.as_u16()));
        }

        Ok(())
    }
}
