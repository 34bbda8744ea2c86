// ABOUTME: Edit-script builder for the course-agent application
// ABOUTME: Compiles a slide outline into an ordered list of presentation edits

use crate::errors::{AgentError, Result};
use crate::outline::{FieldValue, SlideOutline, SlideSpec};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;

/// Font size forced onto the cover title; the title layout default is too large
pub const COVER_TITLE_FONT_SIZE: u32 = 42;

/// Predefined layouts used by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layout {
    Title,
    TitleAndBody,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Title => "TITLE",
            Layout::TitleAndBody => "TITLE_AND_BODY",
        }
    }
}

/// Placeholder regions of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceholderKind {
    CenteredTitle,
    Subtitle,
    Title,
    Body,
}

impl PlaceholderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderKind::CenteredTitle => "CENTERED_TITLE",
            PlaceholderKind::Subtitle => "SUBTITLE",
            PlaceholderKind::Title => "TITLE",
            PlaceholderKind::Body => "BODY",
        }
    }
}

/// Binds a layout placeholder to the object id the new slide gives it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderMapping {
    pub placeholder: PlaceholderKind,
    pub index: u32,
    pub object_id: String,
}

impl PlaceholderMapping {
    fn new(placeholder: PlaceholderKind, object_id: String) -> Self {
        Self {
            placeholder,
            index: 0,
            object_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    Pt,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Pt => "PT",
        }
    }
}

/// A primitive mutation applied to a presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    CreateSlide {
        slide_id: String,
        layout: Layout,
        placeholder_mappings: Vec<PlaceholderMapping>,
    },
    InsertText {
        object_id: String,
        text: String,
    },
    SetFontSize {
        object_id: String,
        points: u32,
        unit: Unit,
    },
    DeleteObject {
        object_id: String,
    },
}

impl EditOperation {
    /// Object ids this operation introduces
    pub fn created_ids(&self) -> Vec<&str> {
        match self {
            EditOperation::CreateSlide {
                slide_id,
                placeholder_mappings,
                ..
            } => std::iter::once(slide_id.as_str())
                .chain(placeholder_mappings.iter().map(|m| m.object_id.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Object id this operation acts on, if it refers to an existing object
    pub fn referenced_id(&self) -> Option<&str> {
        match self {
            EditOperation::CreateSlide { .. } => None,
            EditOperation::InsertText { object_id, .. }
            | EditOperation::SetFontSize { object_id, .. }
            | EditOperation::DeleteObject { object_id } => Some(object_id.as_str()),
        }
    }
}

/// Deterministic object ids for the slide at outline index `index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideIds {
    pub slide: String,
    pub title: String,
    pub content: String,
}

impl SlideIds {
    pub fn for_index(index: usize) -> Self {
        let content = if index == 0 {
            format!("subtitle_{}", index)
        } else {
            format!("body_{}", index)
        };
        Self {
            slide: format!("slide_{}", index),
            title: format!("title_{}", index),
            content,
        }
    }
}

/// Ordered edit operations for one presentation batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditScript {
    pub operations: Vec<EditOperation>,
}

impl EditScript {
    /// Compile the per-slide operations of an outline.
    ///
    /// The default slide is not removed yet; call [`EditScript::finish`] once
    /// the presentation exists and its default slide id is known.
    pub fn compile(outline: &SlideOutline, fallback_title: &str) -> Result<Self> {
        let mut operations = Vec::new();
        for (index, slide) in outline.iter().enumerate() {
            if index == 0 {
                compile_cover(slide, fallback_title, &mut operations)?;
            } else {
                compile_body(index, slide, &mut operations)?;
            }
        }
        debug!(
            "Compiled {} slides into {} operations",
            outline.len(),
            operations.len()
        );
        Ok(Self { operations })
    }

    /// Append removal of the presentation's default slide.
    ///
    /// An empty script stays empty so the only slide is never deleted.
    pub fn finish(mut self, default_slide_id: &str) -> Self {
        if !self.operations.is_empty() {
            self.operations.push(EditOperation::DeleteObject {
                object_id: default_slide_id.to_string(),
            });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn slide_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, EditOperation::CreateSlide { .. }))
            .count()
    }

    /// Verify that every referenced id was created earlier in the script or
    /// is one of the ids that already exist in the presentation.
    pub fn check_references(&self, existing_ids: &[&str]) -> Result<()> {
        let mut known: HashSet<&str> = existing_ids.iter().copied().collect();
        for (position, op) in self.operations.iter().enumerate() {
            if let Some(id) = op.referenced_id() {
                if !known.contains(id) {
                    return Err(AgentError::ValidationError(format!(
                        "operation {} references unknown object `{}`",
                        position, id
                    )));
                }
            }
            for id in op.created_ids() {
                if !known.insert(id) {
                    return Err(AgentError::ValidationError(format!(
                        "operation {} creates duplicate object `{}`",
                        position, id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Compile an outline into the full edit-script for a presentation whose
/// pre-existing slide is `default_slide_id`.
pub fn build_edit_script(
    outline: &SlideOutline,
    fallback_title: &str,
    default_slide_id: &str,
) -> Result<EditScript> {
    let script = EditScript::compile(outline, fallback_title)?.finish(default_slide_id);
    info!(
        "Built edit-script: {} slides, {} operations",
        script.slide_count(),
        script.len()
    );
    Ok(script)
}

fn compile_cover(
    slide: &SlideSpec,
    fallback_title: &str,
    operations: &mut Vec<EditOperation>,
) -> Result<()> {
    let ids = SlideIds::for_index(0);
    operations.push(EditOperation::CreateSlide {
        slide_id: ids.slide,
        layout: Layout::Title,
        placeholder_mappings: vec![
            PlaceholderMapping::new(PlaceholderKind::CenteredTitle, ids.title.clone()),
            PlaceholderMapping::new(PlaceholderKind::Subtitle, ids.content.clone()),
        ],
    });

    let title = match &slide.title {
        Some(value) => title_text(0, value)?,
        None => fallback_title.to_string(),
    };
    if !title.is_empty() {
        operations.push(EditOperation::InsertText {
            object_id: ids.title.clone(),
            text: title,
        });
        operations.push(EditOperation::SetFontSize {
            object_id: ids.title,
            points: COVER_TITLE_FONT_SIZE,
            unit: Unit::Pt,
        });
    }

    let subtitle = match (&slide.subtitle, &slide.points) {
        (Some(value), _) => Some(content_text(0, "subtitle", value)?),
        (None, Some(value)) => Some(content_text(0, "points", value)?),
        (None, None) => None,
    };
    push_text(operations, ids.content, subtitle);
    Ok(())
}

fn compile_body(index: usize, slide: &SlideSpec, operations: &mut Vec<EditOperation>) -> Result<()> {
    let ids = SlideIds::for_index(index);
    operations.push(EditOperation::CreateSlide {
        slide_id: ids.slide,
        layout: Layout::TitleAndBody,
        placeholder_mappings: vec![
            PlaceholderMapping::new(PlaceholderKind::Title, ids.title.clone()),
            PlaceholderMapping::new(PlaceholderKind::Body, ids.content.clone()),
        ],
    });

    let title = slide
        .title
        .as_ref()
        .map(|value| title_text(index, value))
        .transpose()?;
    push_text(operations, ids.title, title);

    let body = slide
        .points
        .as_ref()
        .map(|value| content_text(index, "points", value))
        .transpose()?;
    push_text(operations, ids.content, body);
    Ok(())
}

// Empty strings are skipped; the backend rejects empty insertions.
fn push_text(operations: &mut Vec<EditOperation>, object_id: String, text: Option<String>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        operations.push(EditOperation::InsertText { object_id, text });
    }
}

fn title_text(slide: usize, value: &FieldValue) -> Result<String> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or(AgentError::InvalidFieldType {
            slide,
            field: "title",
            expected: "a string",
        })
}

fn content_text(slide: usize, field: &'static str, value: &FieldValue) -> Result<String> {
    value.to_slide_text().ok_or(AgentError::InvalidFieldType {
        slide,
        field,
        expected: "a string or a list of strings",
    })
}
