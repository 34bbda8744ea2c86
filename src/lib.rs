// ABOUTME: Library module for the course-agent program.
// ABOUTME: Contains outline parsing, edit-script building and the workspace workflow.

// Reexport modules
pub mod auth;
pub mod config;
pub mod docs;
pub mod drive;
pub mod errors;
pub mod google;
pub mod llm;
pub mod mail;
pub mod outline;
pub mod parser;
pub mod script;
pub mod slides;
pub mod utils;
pub mod workflow;

// Reexport common types and functions
pub use config::Config;
pub use errors::{AgentError, Result};
pub use outline::{FieldValue, SlideOutline, SlideSpec};
pub use parser::parse_outline;
pub use script::{build_edit_script, EditOperation, EditScript};
pub use slides::{PresentationDriver, PresentationHandle};
pub use workflow::{prepare_plan, OutputMode, PreparedPlan, ProjectRequest, RunReport, Workflow};

#[cfg(test)]
mod tests;
