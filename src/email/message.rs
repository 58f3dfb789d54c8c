//! src/email/message.rs
use crate::domain::{Address, Sender};
use crate::email::RelayError;
use lettre::message::{header::ContentType, Mailbox};
use lettre::Message;

#[derive(Debug)]
pub struct OutgoingEmail<'a> {
    pub sender: &'a Sender,
    pub to: &'a Address,
    pub subject: &'a str,
    pub html_content: &'a str,
}

pub struct EmailBuilder<'a> {
    sender: &'a Sender,
    to: &'a Address,
    subject: &'a str,
    html_content: &'a str,
}

impl<'a> EmailBuilder<'a> {
    pub fn new(sender: &'a Sender, to: &'a Address) -> Self {
        Self {
            sender,
            to,
            subject: "",
            html_content: "",
        }
    }

    pub fn subject(mut self, subject: &'a str) -> Self {
        self.subject = subject;
        self
    }

    pub fn html_content(mut self, html_content: &'a str) -> Self {
        self.html_content = html_content;
        self
    }

    pub fn build(self) -> OutgoingEmail<'a> {
        OutgoingEmail {
            sender: self.sender,
            to: self.to,
            subject: self.subject,
            html_content: self.html_content,
        }
    }
}

impl<'a> OutgoingEmail<'a> {
    pub fn builder(sender: &'a Sender, to: &'a Address) -> EmailBuilder<'a> {
        EmailBuilder::new(sender, to)
    }

    /// Renders the email as an HTML-only MIME message.
    pub fn to_message(&self) -> Result<Message, RelayError> {
        let from = Mailbox::new(
            Some(self.sender.name().as_ref().to_owned()),
            self.sender.address().as_ref().parse()?,
        );
        let to = Mailbox::new(None, self.to.as_ref().parse()?);

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject)
            .header(ContentType::TEXT_HTML)
            .body(self.html_content.to_owned())?;

        Ok(message)
    }
}
