// ABOUTME: File sharing for the course-agent application
// ABOUTME: Grants collaborators write access and looks up share links via Google Drive

use crate::errors::Result;
use crate::google::{required_str, GoogleApi};
use log::info;
use serde_json::json;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Grants access to a provisioned file
pub trait Sharing {
    /// Give `email` write access to `file_id`
    fn grant_writer(&self, file_id: &str, email: &str) -> Result<()>;
}

/// Google Drive client
#[derive(Clone)]
pub struct DriveClient {
    api: GoogleApi,
}

impl DriveClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }

    /// Browser link for a Drive file
    pub fn web_view_link(&self, file_id: &str) -> Result<String> {
        let url = format!("{}/{}", DRIVE_FILES_URL, file_id);
        let file = self.api.get(&url, &[("fields", "webViewLink")])?;
        Ok(required_str(&file, "/webViewLink")?.to_string())
    }
}

impl Sharing for DriveClient {
    fn grant_writer(&self, file_id: &str, email: &str) -> Result<()> {
        let url = format!("{}/{}/permissions", DRIVE_FILES_URL, file_id);
        let permission = json!({
            "type": "user",
            "role": "writer",
            "emailAddress": email.trim(),
        });
        // Collaborators are notified by our own mail, not Drive's
        self.api.post(
            &url,
            &[("fields", "id"), ("sendNotificationEmail", "false")],
            &permission,
        )?;
        info!("Granted writer access on {} to {}", file_id, email);
        Ok(())
    }
}
