//! Outbound notification gateway.
//!
//! Everything behind [`Notifier`] honors one contract: a send returns a
//! [`NotificationResult`] and never raises. Provider errors are folded
//! into `success == false`; callers treat failure as non-fatal and leave
//! retry to the next scheduled pass.

use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::domain::models::notification::NotificationResult;

/// Sender name stamped on outbound messages.
pub const SENDER_NAME: &str = "MHAAS";

pub trait Notifier: Send + Sync {
    fn send_email(&self, to: &str, subject: &str, body: &str) -> NotificationResult;
    fn send_sms(&self, to: &str, message: &str) -> NotificationResult;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// HTTP endpoint of the SMS gateway
    pub gateway_url: String,
    pub api_key: String,
    pub username: String,
    /// Registered alphanumeric sender id
    pub sender_id: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            gateway_url: "https://api.africastalking.com/version1/messaging".to_string(),
            api_key: String::new(),
            username: String::new(),
            sender_id: SENDER_NAME.to_string(),
        }
    }
}

/// Notifier backed by real providers: SMTP for email, an HTTP SMS
/// gateway for texts. Either channel may be left unconfigured; sends on
/// a missing channel come back as failures and are retried like any
/// other delivery problem.
pub struct ProviderNotifier {
    smtp: Option<SmtpChannel>,
    sms: Option<SmsChannel>,
}

impl ProviderNotifier {
    pub fn new(smtp_config: Option<SmtpConfig>, sms_config: Option<SmsConfig>) -> Result<Self> {
        let smtp = match smtp_config {
            Some(config) => Some(SmtpChannel::new(config)?),
            None => None,
        };
        let sms = sms_config.map(SmsChannel::new);
        Ok(Self { smtp, sms })
    }
}

impl Notifier for ProviderNotifier {
    fn send_email(&self, to: &str, subject: &str, body: &str) -> NotificationResult {
        let outcome = match &self.smtp {
            Some(channel) => channel.send(to, subject, body),
            None => Err(anyhow::anyhow!("Email channel is not configured")),
        };
        match outcome {
            Ok(()) => {
                info!("[Email] Sent to {}: {}", to, subject);
                NotificationResult::ok("Email sent successfully")
            }
            Err(err) => {
                error!("[Email] Error sending to {}: {:#}", to, err);
                NotificationResult::failed("Failed to send email", format!("{:#}", err))
            }
        }
    }

    fn send_sms(&self, to: &str, message: &str) -> NotificationResult {
        let outcome = match &self.sms {
            Some(channel) => channel.send(to, message),
            None => Err(anyhow::anyhow!("SMS channel is not configured")),
        };
        match outcome {
            Ok(()) => {
                info!("[SMS] Sent to {}: \"{}\"", to, message);
                NotificationResult::ok("SMS sent successfully")
            }
            Err(err) => {
                error!("[SMS] Error sending to {}: {:#}", to, err);
                NotificationResult::failed("Failed to send SMS", format!("{:#}", err))
            }
        }
    }
}

struct SmtpChannel {
    config: SmtpConfig,
    transport: SmtpTransport,
}

impl SmtpChannel {
    fn new(config: SmtpConfig) -> Result<Self> {
        info!(
            "Initializing SMTP channel for {}:{}",
            config.smtp_server, config.smtp_port
        );
        let tls_params = TlsParameters::new(config.smtp_server.clone())
            .context("Failed to create TLS parameters")?;

        let transport = SmtpTransport::relay(&config.smtp_server)
            .context("Failed to create SMTP relay")?
            .port(config.smtp_port)
            .tls(Tls::Required(tls_params))
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { config, transport })
    }

    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                format!("\"{}\" <{}>", SENDER_NAME, self.config.from_email)
                    .parse::<Mailbox>()
                    .context("Failed to parse from email")?,
            )
            .to(to.parse::<Mailbox>().context("Failed to parse recipient email")?)
            .subject(subject)
            .body(body.to_string())
            .context("Failed to build email")?;

        self.transport.send(&email).context("Failed to send email")?;
        Ok(())
    }
}

struct SmsChannel {
    config: SmsConfig,
    // Built on first send: the blocking client must be created outside
    // the async runtime, and sends always run on the blocking pool.
    client: OnceCell<reqwest::blocking::Client>,
}

impl SmsChannel {
    fn new(config: SmsConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    fn send(&self, to: &str, message: &str) -> Result<()> {
        let client = self.client.get_or_init(reqwest::blocking::Client::new);
        let response = client
            .post(&self.config.gateway_url)
            .header("apiKey", &self.config.api_key)
            .header("Accept", "application/json")
            .form(&[
                ("username", self.config.username.as_str()),
                ("to", to),
                ("message", message),
                ("from", self.config.sender_id.as_str()),
            ])
            .send()
            .context("SMS gateway request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("SMS gateway returned {}", status);
        }
        Ok(())
    }
}

/// Notifier for local development: logs every message and reports
/// success without touching any provider.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send_email(&self, to: &str, subject: &str, _body: &str) -> NotificationResult {
        info!("[Email/console] To {}: {}", to, subject);
        NotificationResult::ok("Email logged to console")
    }

    fn send_sms(&self, to: &str, message: &str) -> NotificationResult {
        info!("[SMS/console] To {}: \"{}\"", to, message);
        NotificationResult::ok("SMS logged to console")
    }
}

#[cfg(test)]
pub mod test_support {
    //! Recording notifier used by service tests.

    use std::sync::Mutex;

    use super::Notifier;
    use crate::domain::models::notification::NotificationResult;

    #[derive(Debug, Clone, PartialEq)]
    pub struct SentSms {
        pub to: String,
        pub message: String,
    }

    /// Records every send; can be flipped into a failing mode to
    /// exercise the retry path.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sms_sent: Mutex<Vec<SentSms>>,
        pub fail_sends: Mutex<bool>,
    }

    impl RecordingNotifier {
        pub fn set_failing(&self, failing: bool) {
            *self.fail_sends.lock().unwrap() = failing;
        }

        pub fn sms_count(&self) -> usize {
            self.sms_sent.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn send_email(&self, _to: &str, _subject: &str, _body: &str) -> NotificationResult {
            if *self.fail_sends.lock().unwrap() {
                return NotificationResult::failed("Failed to send email", "provider down".to_string());
            }
            NotificationResult::ok("Email sent successfully")
        }

        fn send_sms(&self, to: &str, message: &str) -> NotificationResult {
            if *self.fail_sends.lock().unwrap() {
                return NotificationResult::failed("Failed to send SMS", "provider down".to_string());
            }
            self.sms_sent.lock().unwrap().push(SentSms {
                to: to.to_string(),
                message: message.to_string(),
            });
            NotificationResult::ok("SMS sent successfully")
        }
    }
}
