use std::convert::TryInto;
use std::sync::Arc;

use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::Tls;
use lettre::{SmtpTransport, Transport};
use serde_json::Value;

use crate::{config::Template, Error, Result, Success};

use super::definition::AbstractDispatcher;

lazy_static! {
    static ref HANDLEBARS: handlebars::Handlebars<'static> = handlebars::Handlebars::new();
}

/// SMTP mail server configuration
#[derive(Serialize, Deserialize, Clone)]
pub struct SmtpSettings {
    /// Sender address
    pub from: String,

    /// Reply-To address
    pub reply_to: Option<String>,

    /// SMTP host
    pub host: String,

    /// SMTP port
    pub port: Option<i32>,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Whether to use TLS
    pub use_tls: Option<bool>,
}

/// Dispatcher delivering through an SMTP relay
#[derive(Clone)]
pub struct SmtpDispatcher {
    settings: SmtpSettings,
    transport: Arc<SmtpTransport>,
}

impl SmtpDispatcher {
    pub fn new(settings: SmtpSettings) -> Result<SmtpDispatcher> {
        let relay = SmtpTransport::relay(&settings.host).map_err(|_| Error::EmailFailed)?;

        let relay = if let Some(port) = settings.port {
            relay.port(port.try_into().map_err(|_| Error::EmailFailed)?)
        } else {
            relay
        };

        let relay = if let Some(false) = settings.use_tls {
            relay.tls(Tls::None)
        } else {
            relay
        };

        let transport = relay
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(SmtpDispatcher {
            settings,
            transport: Arc::new(transport),
        })
    }

    fn render(&self, text: &str, variables: &Value) -> Result<String> {
        HANDLEBARS
            .render_template(text, variables)
            .map_err(|_| Error::InternalError)
    }
}

#[async_trait]
impl AbstractDispatcher for SmtpDispatcher {
    /// Deliver `template` to every recipient, one message each
    async fn send(&self, to: &[String], template: &Template, variables: Value) -> Success {
        let text = self.render(&template.text, &variables)?;
        let html = match &template.html {
            Some(html) => Some(self.render(html, &variables)?),
            None => None,
        };

        for recipient in to {
            let message = lettre::Message::builder()
                .from(self.settings.from.parse().map_err(|_| Error::EmailFailed)?)
                .to(recipient.parse().map_err(|_| Error::EmailFailed)?)
                .subject(template.title.clone());

            let message = if let Some(reply_to) = &self.settings.reply_to {
                message.reply_to(reply_to.parse().map_err(|_| Error::EmailFailed)?)
            } else {
                message
            };

            let message = if let Some(html) = &html {
                message.multipart(lettre::message::MultiPart::alternative_plain_html(
                    text.clone(),
                    html.clone(),
                ))
            } else {
                message.body(text.clone())
            }
            .map_err(|_| Error::EmailFailed)?;

            if let Err(error) = self.transport.send(&message) {
                error!("Failed to send email to {}: {}", recipient, error);
                return Err(Error::EmailFailed);
            }
        }

        Ok(())
    }
}
