use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{MailBackend, MailSettings};
use crate::errors::InternalError;
use crate::errors::internal::NotificationError;

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound notification collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError>;
}

/// Build the notifier selected by `MAIL_BACKEND`
pub fn notifier_from_settings(settings: &MailSettings) -> Result<Arc<dyn Notifier>, InternalError> {
    match settings.backend {
        MailBackend::Console => Ok(Arc::new(ConsoleNotifier)),
        MailBackend::Smtp => Ok(Arc::new(SmtpNotifier::new(settings)?)),
    }
}

/// Sends mail over SMTP with STARTTLS
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &MailSettings) -> Result<Self, NotificationError> {
        let host = settings
            .smtp_host
            .as_deref()
            .ok_or_else(|| NotificationError::Transport("SMTP_HOST is not set".to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| NotificationError::Transport(e.to_string()))?
            .port(settings.smtp_port);
        if let (Some(username), Some(password)) = (&settings.smtp_username, &settings.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: parse_mailbox(&settings.mail_from)?,
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address.parse::<Mailbox>().map_err(|e| NotificationError::Address {
        address: address.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email (console backend)"
        );
        Ok(())
    }
}

/// Records messages in memory; can be told to fail
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    fail: Mutex<bool>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        if let Ok(mut flag) = self.fail.lock() {
            *flag = fail;
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        let fail = self.fail.lock().map(|flag| *flag).unwrap_or(false);
        if fail {
            return Err(NotificationError::Transport("delivery rejected".to_string()));
        }
        parse_mailbox(&message.to)?;
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}
