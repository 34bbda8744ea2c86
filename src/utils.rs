// ABOUTME: Utility functions for the course-agent application
// ABOUTME: Provides input validation, assignment loading and recipient address handling

use crate::errors::{AgentError, Result};
use log::debug;
use lopdf::Document;
use std::fs;
use std::path::Path;

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(AgentError::ValidationError(format!(
            "Path not found: {:?}",
            path
        )));
    }
    if !path.is_file() {
        return Err(AgentError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Read the assignment description, rejecting empty files.
///
/// A `.pdf` file has the text of every page extracted, each page followed by
/// a newline; anything else is read as UTF-8 text.
pub fn read_assignment(path: &Path) -> Result<String> {
    validate_file_exists(path)?;
    let text = if is_pdf(path) {
        extract_pdf_text(path)?
    } else {
        fs::read_to_string(path).map_err(AgentError::FileReadError)?
    };
    if text.trim().is_empty() {
        return Err(AgentError::ValidationError(format!(
            "Assignment file {:?} is empty",
            path
        )));
    }
    Ok(text)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn extract_pdf_text(path: &Path) -> Result<String> {
    let document =
        Document::load(path).map_err(|e| AgentError::PdfError(format!("{:?}: {}", path, e)))?;
    let mut text = String::new();
    for page in document.get_pages().keys() {
        let page_text = document
            .extract_text(&[*page])
            .map_err(|e| AgentError::PdfError(format!("{:?} page {}: {}", path, page, e)))?;
        text.push_str(&page_text);
        text.push('\n');
    }
    debug!("Extracted {} characters from {:?}", text.len(), path);
    Ok(text)
}

/// Turn a comma-separated list of student ids and addresses into addresses.
///
/// Entries without an `@` are treated as student ids on `domain`.
pub fn parse_recipients(raw: &str, domain: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            if entry.contains('@') {
                entry.to_string()
            } else {
                format!("{}@{}", entry, domain)
            }
        })
        .collect()
}
