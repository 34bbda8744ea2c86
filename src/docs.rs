// ABOUTME: Document driver for the course-agent application
// ABOUTME: Creates a Google Doc and writes the generated plan into it

use crate::drive::DriveClient;
use crate::errors::Result;
use crate::google::{required_str, GoogleApi};
use log::info;
use serde_json::json;

const DOCS_URL: &str = "https://docs.googleapis.com/v1/documents";

/// Backend that owns plain-text documents
pub trait DocumentDriver {
    /// Create an empty document and return its id
    fn create_document(&self, title: &str) -> Result<String>;
    /// Insert `text` at the start of the document body
    fn insert_text(&self, document_id: &str, text: &str) -> Result<()>;
    fn share_link(&self, document_id: &str) -> Result<String>;
}

/// Google Docs client
pub struct DocsClient {
    api: GoogleApi,
    drive: DriveClient,
}

impl DocsClient {
    pub fn new(api: GoogleApi, drive: DriveClient) -> Self {
        Self { api, drive }
    }
}

impl DocumentDriver for DocsClient {
    fn create_document(&self, title: &str) -> Result<String> {
        let created = self.api.post(DOCS_URL, &[], &json!({ "title": title }))?;
        let id = required_str(&created, "/documentId")?.to_string();
        info!("Created document {}", id);
        Ok(id)
    }

    fn insert_text(&self, document_id: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let url = format!("{}/{}:batchUpdate", DOCS_URL, document_id);
        // Index 1 is the first position inside the body
        let body = json!({
            "requests": [
                { "insertText": { "location": { "index": 1 }, "text": text } }
            ]
        });
        self.api.post(&url, &[], &body)?;
        info!("Inserted {} characters into document {}", text.chars().count(), document_id);
        Ok(())
    }

    fn share_link(&self, document_id: &str) -> Result<String> {
        self.drive.web_view_link(document_id)
    }
}
