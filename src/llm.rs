// ABOUTME: Language-model client for the course-agent application
// ABOUTME: Builds planning prompts and requests chat completions over HTTP

use crate::config::LlmConfig;
use crate::errors::{AgentError, Result};
use crate::workflow::{OutputMode, ProjectRequest};
use log::{debug, info};
use reqwest::blocking::Client;
use serde_json::{json, Value};

/// Produces text for a prompt
pub trait PlanGenerator {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat-completion client for an Ollama-style or OpenAI-style endpoint
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(AgentError::FetchError)?;
        Ok(Self { client, config })
    }
}

impl PlanGenerator for LlmClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });

        info!(
            "Sending request to {} (model: {})",
            self.config.api_url, self.config.model
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::TimeoutError(format!(
                        "model did not answer within {} seconds",
                        self.config.request_timeout_secs
                    ))
                } else {
                    AgentError::FetchError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(AgentError::LlmError(format!(
                "request failed (status {}): {}",
                status, text
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| AgentError::LlmError(format!("response is not JSON: {}", e)))?;
        let content = extract_content(&body)
            .ok_or_else(|| AgentError::LlmError(format!("unrecognized response shape: {}", body)))?;
        debug!("Model returned {} characters", content.chars().count());
        Ok(content)
    }
}

/// Pull the generated text out of a chat response.
///
/// Accepts `message.content` (Ollama chat), `response` (Ollama generate) and
/// `choices[0].message.content` (OpenAI-compatible).
pub fn extract_content(body: &Value) -> Option<String> {
    ["/message/content", "/response", "/choices/0/message/content"]
        .iter()
        .find_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
        .map(str::to_string)
}

/// Remove markdown emphasis and heading markers the model may still emit
pub fn strip_markdown(text: &str) -> String {
    text.replace("**", "").replace("###", "").replace("##", "")
}

/// Prompt asking for a plan in the shape the output mode needs
pub fn build_prompt(request: &ProjectRequest) -> String {
    let mut prompt = format!(
        "You are an experienced project manager and academic advisor. \
         Draft a final-project plan for a student team.\n\n\
         Course: {course}\n\
         Team members: {members}\n\
         Assignment description:\n{assignment}\n\n\
         Today is {today} and the project is due on {due}. \
         Schedule checkpoints that fit this time span.\n\n",
        course = request.course_name,
        members = request.members,
        assignment = request.assignment_text,
        today = request.today.format("%Y-%m-%d"),
        due = request.due_date.format("%Y-%m-%d"),
    );

    match request.mode {
        OutputMode::Document => prompt.push_str(
            "Write plain text only so it can be pasted into a document: \
             no markdown tables, no bold markers, no '#' headings. \
             Mark section headings with square brackets, e.g. [1. Project goals]. \
             Express the schedule as milestones counted back from the deadline, \
             e.g. \"Before 12/20: <task> (<owner>)\".\n\n\
             Include these sections:\n\
             1. Three project topic ideas related to the course\n\
             2. Project goals\n\
             3. Task assignment across the team members\n\
             4. Key milestones: 3-4 dated checkpoints with deliverables\n\
             5. Expected difficulties and how to handle them\n",
        ),
        OutputMode::Slides => prompt.push_str(
            "Return the plan as a slide outline: a JSON array of objects and nothing else. \
             The first object is the cover slide with keys \"title\" and \"subtitle\". \
             Every other object has a \"title\" string and a \"points\" array of short strings. \
             Cover topic ideas, goals, task assignment, milestones and risks.\n",
        ),
    }
    prompt
}
