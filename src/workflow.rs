// ABOUTME: End-to-end workflow for the course-agent application
// ABOUTME: Generates a plan, provisions a document or deck, shares it and notifies the team

use crate::config::Config;
use crate::docs::DocumentDriver;
use crate::drive::Sharing;
use crate::errors::{AgentError, Result};
use crate::llm::{build_prompt, strip_markdown, PlanGenerator};
use crate::mail::Mailer;
use crate::outline::SlideOutline;
use crate::parser::parse_outline;
use crate::script::EditScript;
use crate::slides::PresentationDriver;
use crate::utils::parse_recipients;
use chrono::NaiveDate;
use log::{info, warn};
use std::fmt;
use std::str::FromStr;

/// What the plan is turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Document,
    Slides,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" | "doc" => Ok(OutputMode::Document),
            "slides" | "deck" => Ok(OutputMode::Slides),
            other => Err(format!(
                "unknown mode `{}`; expected `document` or `slides`",
                other
            )),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Document => write!(f, "document"),
            OutputMode::Slides => write!(f, "slides"),
        }
    }
}

/// Everything the team supplies for one run
#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub course_name: String,
    /// Comma-separated student ids or email addresses
    pub members: String,
    pub assignment_text: String,
    pub today: NaiveDate,
    pub due_date: NaiveDate,
    pub mode: OutputMode,
}

impl ProjectRequest {
    pub fn workspace_title(&self) -> String {
        format!("[{}] Final Project Workspace", self.course_name)
    }

    pub fn notification_subject(&self) -> String {
        format!("[{}] Final project assignment notice", self.course_name)
    }

    pub fn notification_body(&self, link: &str) -> String {
        format!(
            "Hello everyone,\n\n\
             This message was sent automatically by the course agent.\n\
             A first task breakdown for the {} final project has been generated \
             from the assignment description.\n\n\
             Please start collaborating here:\n{}\n\n\
             (This is an automated message.)\n",
            self.course_name, link
        )
    }
}

/// Generated plan, validated and ready to provision
#[derive(Debug, Clone)]
pub enum PreparedPlan {
    Document { text: String },
    Slides { outline: SlideOutline, script: EditScript },
}

/// Per-recipient outcome of a best-effort step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl Delivery {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: OutputMode,
    pub file_id: String,
    pub link: String,
    pub slide_count: Option<usize>,
    pub shared: Delivery,
    pub notified: Delivery,
}

/// Ask the model for a plan and validate it for the requested mode.
///
/// Nothing outside the process is changed, so a malformed outline or an
/// inconsistent edit-script stops the run before any presentation exists.
pub fn prepare_plan(generator: &dyn PlanGenerator, request: &ProjectRequest) -> Result<PreparedPlan> {
    info!("Generating {} plan for {}", request.mode, request.course_name);
    let raw = generator.complete(&build_prompt(request))?;

    match request.mode {
        OutputMode::Document => {
            let text = strip_markdown(&raw);
            if text.trim().is_empty() {
                return Err(AgentError::LlmError("model returned an empty plan".to_string()));
            }
            Ok(PreparedPlan::Document { text })
        }
        OutputMode::Slides => {
            let outline = parse_outline(&raw)?;
            if outline.cover().is_some_and(|cover| cover.title.is_none()) {
                info!("Cover slide has no title; using {:?}", request.course_name);
            }
            let blank = outline.iter().filter(|slide| slide.is_blank()).count();
            if blank > 0 {
                warn!("{} of {} slides have no content", blank, outline.len());
            }

            let script = EditScript::compile(&outline, &request.course_name)?;
            script.check_references(&[])?;
            Ok(PreparedPlan::Slides { outline, script })
        }
    }
}

/// Drives one run from plan generation to notification.
///
/// Runs are strictly sequential and a workflow must not be shared by two
/// concurrent runs; each run creates a new file rather than updating a
/// previous one.
pub struct Workflow<'a> {
    generator: &'a dyn PlanGenerator,
    presentations: &'a dyn PresentationDriver,
    documents: &'a dyn DocumentDriver,
    sharing: &'a dyn Sharing,
    mailer: &'a dyn Mailer,
    recipient_domain: String,
}

impl<'a> Workflow<'a> {
    pub fn new(
        config: &Config,
        generator: &'a dyn PlanGenerator,
        presentations: &'a dyn PresentationDriver,
        documents: &'a dyn DocumentDriver,
        sharing: &'a dyn Sharing,
        mailer: &'a dyn Mailer,
    ) -> Self {
        Self {
            generator,
            presentations,
            documents,
            sharing,
            mailer,
            recipient_domain: config.recipient_domain.clone(),
        }
    }

    pub fn run(&self, request: &ProjectRequest) -> Result<RunReport> {
        if request.due_date < request.today {
            warn!(
                "Deadline {} is before today ({})",
                request.due_date, request.today
            );
        }
        let recipients = parse_recipients(&request.members, &self.recipient_domain);
        if recipients.is_empty() {
            return Err(AgentError::ValidationError(
                "no team members were given".to_string(),
            ));
        }

        let plan = prepare_plan(self.generator, request)?;
        let (file_id, link, slide_count) = self.provision(request, plan)?;
        info!("Workspace ready: {}", link);

        let shared = self.share(&file_id, &recipients);
        let notified = self.notify(request, &link, &recipients);

        Ok(RunReport {
            mode: request.mode,
            file_id,
            link,
            slide_count,
            shared,
            notified,
        })
    }

    fn provision(
        &self,
        request: &ProjectRequest,
        plan: PreparedPlan,
    ) -> Result<(String, String, Option<usize>)> {
        let title = request.workspace_title();
        match plan {
            PreparedPlan::Document { text } => {
                info!("Creating document {:?}", title);
                let id = self.documents.create_document(&title)?;
                self.documents.insert_text(&id, &text)?;
                let link = self.documents.share_link(&id)?;
                Ok((id, link, None))
            }
            PreparedPlan::Slides { outline, script } => {
                info!("Creating presentation {:?}", title);
                let handle = self.presentations.create_presentation(&title)?;
                let script = script.finish(&handle.default_slide_id);
                self.presentations
                    .apply_edits(&handle.id, &script.operations)?;
                let link = self.presentations.share_link(&handle.id)?;
                Ok((handle.id, link, Some(outline.len())))
            }
        }
    }

    fn share(&self, file_id: &str, recipients: &[String]) -> Delivery {
        let mut delivery = Delivery::default();
        for email in recipients {
            match self.sharing.grant_writer(file_id, email) {
                Ok(()) => delivery.succeeded.push(email.clone()),
                Err(e) => {
                    warn!("Could not share with {} (possibly an invalid address): {}", email, e);
                    delivery.failed.push((email.clone(), e.to_string()));
                }
            }
        }
        delivery
    }

    fn notify(&self, request: &ProjectRequest, link: &str, recipients: &[String]) -> Delivery {
        let subject = request.notification_subject();
        let body = request.notification_body(link);
        let mut delivery = Delivery::default();
        for email in recipients {
            match self.mailer.send(email, &subject, &body) {
                Ok(()) => delivery.succeeded.push(email.clone()),
                Err(e) => {
                    warn!("Failed to send mail to {}: {}", email, e);
                    delivery.failed.push((email.clone(), e.to_string()));
                }
            }
        }
        delivery
    }
}
