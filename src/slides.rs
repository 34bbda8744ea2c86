// ABOUTME: Presentation driver for the course-agent application
// ABOUTME: Creates Google Slides decks and applies edit-scripts in one batch

use crate::drive::DriveClient;
use crate::errors::{AgentError, Result};
use crate::google::{required_str, GoogleApi};
use crate::script::EditOperation;
use log::info;
use serde_json::{json, Value};

const SLIDES_URL: &str = "https://slides.googleapis.com/v1/presentations";

/// A freshly created presentation and the slide it starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationHandle {
    pub id: String,
    pub default_slide_id: String,
}

/// Backend that owns presentations.
///
/// `apply_edits` either accepts the whole batch or fails; callers must not
/// assume individual operations were rolled back on failure.
pub trait PresentationDriver {
    fn create_presentation(&self, title: &str) -> Result<PresentationHandle>;
    fn apply_edits(&self, presentation_id: &str, operations: &[EditOperation]) -> Result<()>;
    fn share_link(&self, presentation_id: &str) -> Result<String>;
}

/// Google Slides client
pub struct SlidesClient {
    api: GoogleApi,
    drive: DriveClient,
}

impl SlidesClient {
    pub fn new(api: GoogleApi, drive: DriveClient) -> Self {
        Self { api, drive }
    }
}

impl PresentationDriver for SlidesClient {
    fn create_presentation(&self, title: &str) -> Result<PresentationHandle> {
        let created = self.api.post(SLIDES_URL, &[], &json!({ "title": title }))?;
        let id = required_str(&created, "/presentationId")?.to_string();
        let default_slide_id = required_str(&created, "/slides/0/objectId")?.to_string();
        info!("Created presentation {} (default slide {})", id, default_slide_id);
        Ok(PresentationHandle {
            id,
            default_slide_id,
        })
    }

    fn apply_edits(&self, presentation_id: &str, operations: &[EditOperation]) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }
        let url = format!("{}/{}:batchUpdate", SLIDES_URL, presentation_id);
        let body = json!({ "requests": to_requests(operations) });
        self.api.post(&url, &[], &body).map_err(|e| AgentError::BackendError {
            message: format!(
                "Batch update of {} operations on {} was rejected",
                operations.len(),
                presentation_id
            ),
            source: Some(Box::new(e)),
        })?;
        info!(
            "Applied {} operations to presentation {}",
            operations.len(),
            presentation_id
        );
        Ok(())
    }

    fn share_link(&self, presentation_id: &str) -> Result<String> {
        self.drive.web_view_link(presentation_id)
    }
}

/// Translate an edit-script into Slides API batch requests
pub fn to_requests(operations: &[EditOperation]) -> Vec<Value> {
    operations.iter().map(to_request).collect()
}

fn to_request(operation: &EditOperation) -> Value {
    match operation {
        EditOperation::CreateSlide {
            slide_id,
            layout,
            placeholder_mappings,
        } => {
            let mappings: Vec<Value> = placeholder_mappings
                .iter()
                .map(|m| {
                    json!({
                        "layoutPlaceholder": { "type": m.placeholder.as_str(), "index": m.index },
                        "objectId": m.object_id,
                    })
                })
                .collect();
            json!({
                "createSlide": {
                    "objectId": slide_id,
                    "slideLayoutReference": { "predefinedLayout": layout.as_str() },
                    "placeholderIdMappings": mappings,
                }
            })
        }
        EditOperation::InsertText { object_id, text } => json!({
            "insertText": {
                "objectId": object_id,
                "insertionIndex": 0,
                "text": text,
            }
        }),
        EditOperation::SetFontSize {
            object_id,
            points,
            unit,
        } => json!({
            "updateTextStyle": {
                "objectId": object_id,
                "textRange": { "type": "ALL" },
                "style": { "fontSize": { "magnitude": points, "unit": unit.as_str() } },
                "fields": "fontSize",
            }
        }),
        EditOperation::DeleteObject { object_id } => json!({
            "deleteObject": { "objectId": object_id }
        }),
    }
}
