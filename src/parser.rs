// ABOUTME: Outline parser for the course-agent application
// ABOUTME: Extracts a slide outline array from noisy language-model output

use crate::errors::{AgentError, Result};
use crate::outline::{SlideOutline, SlideSpec};
use log::{debug, info};

const FENCE: &str = "```";

/// Parse raw model output into a slide outline.
///
/// Code fences are removed first, then the widest span from the first `[` to
/// the last `]` is taken as the payload. The text must carry exactly one
/// array; trailing bracketed prose or a second array breaks the extraction.
/// An opening `[` with no `]` after it is an unterminated array, not a
/// missing one. A `]` that only appears before the first `[` does not close
/// anything, so such text has no array at all.
pub fn parse_outline(raw: &str) -> Result<SlideOutline> {
    let stripped = strip_code_fences(raw);
    let span = match extract_array_span(&stripped) {
        ArraySpan::Found(span) => span,
        ArraySpan::Missing => return Err(AgentError::NoArrayFound),
        ArraySpan::Unterminated => {
            return Err(AgentError::MalformedArray(
                "array is never closed".to_string(),
            ))
        }
    };
    debug!("Extracted outline span of {} bytes", span.len());

    let slides: Vec<SlideSpec> =
        serde_json::from_str(span).map_err(|e| AgentError::MalformedArray(e.to_string()))?;

    if slides.is_empty() {
        return Err(AgentError::MalformedArray(
            "array contains no slides".to_string(),
        ));
    }

    info!("Parsed slide outline with {} slides", slides.len());
    Ok(SlideOutline::new(slides))
}

/// Drop markdown code-fence lines such as a `` ```json `` opener and its
/// closing fence. Backticks inside the payload are left alone.
pub fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with(FENCE))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of looking for the bracketed payload
#[derive(Debug, PartialEq, Eq)]
pub enum ArraySpan<'a> {
    Found(&'a str),
    Missing,
    Unterminated,
}

/// Widest `[`..`]` span of the text
pub fn extract_array_span(text: &str) -> ArraySpan<'_> {
    let Some(start) = text.find('[') else {
        return ArraySpan::Missing;
    };
    match text.rfind(']') {
        Some(end) if end > start => ArraySpan::Found(&text[start..=end]),
        Some(_) => ArraySpan::Missing,
        None => ArraySpan::Unterminated,
    }
}
