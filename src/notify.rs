//! Email notification of new articles.
//!
//! # Architecture
//!
//! - [`compose`]: builds the subject and plain-text body for a site
//! - [`Notifier`]: delivery seam used by the pipeline
//! - [`SmtpNotifier`]: delivers over SMTP with implicit TLS via `lettre`
//! - [`LogNotifier`]: dry-run delivery that only logs the email
//!
//! Delivery failures surface as [`NotifyError`]; the pipeline logs them and
//! carries on.

use crate::error::NotifyError;
use crate::models::Article;
use crate::settings::SmtpSettings;
use crate::sites::Site;
use itertools::Itertools;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

/// A composed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

/// Build the notification for `items`, newest first.
pub fn compose(site: Site, items: &[Article]) -> Email {
    let mut lines = vec![
        "Hi".to_string(),
        String::new(),
        "PFB for the news updates!".to_string(),
        String::new(),
    ];
    for article in items {
        lines.extend(site.email_lines(article));
        lines.push(String::new());
    }
    lines.push("Thanks!".to_string());

    Email {
        subject: site.subject().to_string(),
        body: lines.join("\n"),
    }
}

/// Delivers a composed email.
pub trait Notifier {
    async fn notify(&self, email: &Email) -> Result<(), NotifyError>;
}

/// SMTP delivery to every configured recipient.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    host: String,
    port: u16,
    user: String,
    password: String,
    to: Vec<String>,
}

impl SmtpNotifier {
    pub fn new(smtp: &SmtpSettings, password: &str) -> Self {
        Self {
            host: smtp.host.clone(),
            port: smtp.port,
            user: smtp.mail.clone(),
            password: password.to_string(),
            to: smtp.recipients().into_iter().map(String::from).collect(),
        }
    }

    /// Build the message without sending it.
    pub fn message(&self, email: &Email) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(mailbox(&self.user)?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for address in &self.to {
            builder = builder.to(mailbox(address)?);
        }
        Ok(builder.body(email.body.clone())?)
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

impl Notifier for SmtpNotifier {
    #[instrument(level = "info", skip_all, fields(host = %self.host, port = self.port))]
    async fn notify(&self, email: &Email) -> Result<(), NotifyError> {
        let message = self.message(email)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(self.user.clone(), self.password.clone()))
            .build();

        transport.send(message).await?;
        info!(to = %self.to.iter().join(", "), "Email notification sent");
        Ok(())
    }
}

/// Logs the email instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, email: &Email) -> Result<(), NotifyError> {
        info!(subject = %email.subject, body = %email.body, "Dry run; email not sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp(to: &str) -> SmtpSettings {
        SmtpSettings {
            mail: "watcher@example.com".to_string(),
            password: None,
            to: to.to_string(),
            host: "smtp.example.com".to_string(),
            port: 465,
        }
    }

    #[test]
    fn test_compose_body_layout() {
        let items = vec![
            Article::new("https://www.nst.com.my/2", "Two").with_create_time("5 minutes ago"),
            Article::new("https://www.nst.com.my/1", "One").with_create_time("1 hour ago"),
        ];
        let email = compose(Site::Nst, &items);

        assert_eq!(email.subject, "Notification | NST.");
        assert_eq!(
            email.body,
            "Hi\n\nPFB for the news updates!\n\n\
             Time: 5 minutes ago\nCategory: Two\nLink: https://www.nst.com.my/2\n\n\
             Time: 1 hour ago\nCategory: One\nLink: https://www.nst.com.my/1\n\n\
             Thanks!"
        );
    }

    #[test]
    fn test_compose_uses_site_labels() {
        let items = vec![Article::new("https://www.theedgemarkets.com/n/1", "Ringgit steady")
            .with_create_time("Oct 18, 2024 09:05 AM")];
        let email = compose(Site::EdgeMarkets, &items);
        assert!(email.body.contains("News: Ringgit steady"));
        assert!(!email.body.contains("Category:"));
    }

    #[test]
    fn test_message_has_every_recipient() {
        let notifier = SmtpNotifier::new(&smtp("a@example.com, b@example.com"), "pw");
        let email = Email {
            subject: "Notification | NST.".to_string(),
            body: "Hi".to_string(),
        };
        let message = notifier.message(&email).unwrap();

        let to: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["a@example.com", "b@example.com"]);
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Notification | NST."));
    }

    #[test]
    fn test_bad_recipient_is_address_error() {
        let notifier = SmtpNotifier::new(&smtp("not-an-address"), "pw");
        let email = Email {
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(matches!(notifier.message(&email), Err(NotifyError::Address { .. })));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let email = compose(Site::TheStar, &[]);
        assert!(LogNotifier.notify(&email).await.is_ok());
    }
}
