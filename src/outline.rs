// ABOUTME: Slide outline types for the course-agent application
// ABOUTME: Holds the slide-by-slide content extracted from model output

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker placed before every bullet item when a list is flattened to text
pub const BULLET: &str = "• ";

/// Value of a single outline field as the model wrote it.
///
/// Shapes that are not text or a list of strings are kept as `Other` so the
/// edit-script builder can report them instead of the parser dropping them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Items(Vec<String>),
    Other(Value),
}

impl FieldValue {
    /// Flatten the value into slide text.
    ///
    /// A list becomes one bulleted line per item; text passes through as is.
    /// Returns `None` for values that have no text form.
    pub fn to_slide_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::Items(items) => Some(bulleted(items)),
            FieldValue::Other(_) => None,
        }
    }

    /// The value when it is plain text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Join items with newlines, prefixing each with a bullet marker
pub fn bulleted<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", BULLET, item.as_ref()))
        .collect::<Vec<String>>()
        .join("\n")
}

/// One slide of an outline. Missing and `null` keys are both absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<FieldValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<FieldValue>,
}

impl SlideSpec {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(FieldValue::Text(title.to_string())),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(FieldValue::Text(subtitle.to_string()));
        self
    }

    pub fn with_points<S: AsRef<str>>(mut self, points: &[S]) -> Self {
        self.points = Some(FieldValue::Items(
            points.iter().map(|p| p.as_ref().to_string()).collect(),
        ));
        self
    }

    /// True when the slide carries no title, subtitle or points
    pub fn is_blank(&self) -> bool {
        self.title.is_none() && self.subtitle.is_none() && self.points.is_none()
    }
}

/// Ordered slides of a deck; the first one is the cover slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideOutline {
    pub slides: Vec<SlideSpec>,
}

impl SlideOutline {
    pub fn new(slides: Vec<SlideSpec>) -> Self {
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn cover(&self) -> Option<&SlideSpec> {
        self.slides.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlideSpec> {
        self.slides.iter()
    }
}
