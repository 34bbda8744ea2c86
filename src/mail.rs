// ABOUTME: Notification mail for the course-agent application
// ABOUTME: Builds plain-text messages and sends them through Gmail

use crate::errors::Result;
use crate::google::GoogleApi;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use log::info;
use serde_json::json;

const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Sends one message to one recipient
pub trait Mailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Gmail client sending as the authorized user
pub struct GmailClient {
    api: GoogleApi,
}

impl GmailClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }
}

impl Mailer for GmailClient {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let raw = URL_SAFE.encode(build_message(to, subject, body));
        self.api.post(GMAIL_SEND_URL, &[], &json!({ "raw": raw }))?;
        info!("Sent notification to {}", to);
        Ok(())
    }
}

/// Render a single-part UTF-8 text message.
///
/// The subject uses RFC 2047 encoded-word syntax and the body is base64 so
/// non-ASCII course names survive transport.
pub fn build_message(to: &str, subject: &str, body: &str) -> String {
    let mut message = String::new();
    message.push_str(&format!("To: {}\r\n", to.trim()));
    message.push_str(&format!("Subject: =?UTF-8?B?{}?=\r\n", STANDARD.encode(subject)));
    message.push_str("MIME-Version: 1.0\r\n");
    message.push_str("Content-Type: text/plain; charset=\"utf-8\"\r\n");
    message.push_str("Content-Transfer-Encoding: base64\r\n");
    message.push_str("\r\n");
    let encoded = STANDARD.encode(body);
    for line in encoded.as_bytes().chunks(76) {
        message.push_str(&String::from_utf8_lossy(line));
        message.push_str("\r\n");
    }
    message
}
