// ABOUTME: Main entry point for the course-agent program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use course_agent::auth::GoogleAuth;
use course_agent::docs::DocsClient;
use course_agent::drive::DriveClient;
use course_agent::google::GoogleApi;
use course_agent::llm::LlmClient;
use course_agent::mail::GmailClient;
use course_agent::slides::SlidesClient;
use course_agent::{
    build_edit_script, parse_outline, prepare_plan, utils, Config, OutputMode, PreparedPlan,
    ProjectRequest, Workflow,
};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a project and provision a shared workspace for the team
    Run(RunArgs),

    /// Compile a saved model response into an edit-script (offline)
    Outline(OutlineArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Course name
    #[arg(short, long)]
    course: String,

    /// Student ids or email addresses, separated by commas
    #[arg(short, long)]
    members: String,

    /// Path to the assignment description (PDF or UTF-8 text)
    #[arg(short, long)]
    assignment: PathBuf,

    /// Project deadline as YYYY-MM-DD (defaults to two weeks from today)
    #[arg(short, long)]
    deadline: Option<NaiveDate>,

    /// Output kind: 'document' or 'slides'
    #[arg(long, default_value = "document")]
    mode: OutputMode,

    /// Generate and print the plan without touching Google services
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct OutlineArgs {
    /// File holding the raw model response
    #[arg(short, long)]
    input: PathBuf,

    /// Cover title used when the outline's first slide has none
    #[arg(short, long, default_value = "Presentation")]
    title: String,

    /// Object id of the presentation's default slide
    #[arg(long, default_value = "p")]
    default_slide_id: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Run(args)) => {
            println!("Executing run command...");
            run(args)
        }
        Some(Commands::Outline(args)) => outline(args),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &RunArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    config.validate()?;
    if !args.dry_run && !config.has_google_credentials() {
        anyhow::bail!(
            "No Google credentials configured; set GOOGLE_ACCESS_TOKEN, \
             GOOGLE_SERVICE_ACCOUNT_KEY or GOOGLE_SERVICE_ACCOUNT_JSON"
        );
    }

    let assignment_text = utils::read_assignment(&args.assignment)?;
    info!("Assignment loaded ({} characters)", assignment_text.chars().count());

    let today = Local::now().date_naive();
    let request = ProjectRequest {
        course_name: args.course.clone(),
        members: args.members.clone(),
        assignment_text,
        today,
        due_date: args
            .deadline
            .unwrap_or_else(|| today + chrono::Duration::days(14)),
        mode: args.mode,
    };

    let generator = LlmClient::new(config.llm.clone())?;

    if args.dry_run {
        match prepare_plan(&generator, &request)? {
            PreparedPlan::Document { text } => println!("{}", text),
            PreparedPlan::Slides { script, .. } => {
                println!("{}", serde_json::to_string_pretty(&script)?)
            }
        }
        return Ok(());
    }

    let auth = GoogleAuth::from_config(&config.google).context("Google sign-in failed")?;
    let api = GoogleApi::new(Arc::new(auth))?;
    let drive = DriveClient::new(api.clone());
    let slides = SlidesClient::new(api.clone(), drive.clone());
    let docs = DocsClient::new(api.clone(), drive.clone());
    let gmail = GmailClient::new(api);

    let workflow = Workflow::new(&config, &generator, &slides, &docs, &drive, &gmail);
    let report = workflow.run(&request)?;

    println!("Workspace created: {}", report.link);
    if let Some(count) = report.slide_count {
        println!("Slides: {}", count);
    }
    println!("Shared with: {}", report.shared.succeeded.join(", "));
    for (email, error) in &report.shared.failed {
        println!("Could not share with {}: {}", email, error);
    }
    println!("Notified: {}", report.notified.succeeded.join(", "));
    for (email, error) in &report.notified.failed {
        println!("Could not notify {}: {}", email, error);
    }
    Ok(())
}

fn outline(args: &OutlineArgs) -> anyhow::Result<()> {
    utils::validate_file_exists(&args.input)?;
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {:?}", args.input))?;

    let outline = parse_outline(&raw)?;
    let script = build_edit_script(&outline, &args.title, &args.default_slide_id)?;
    println!("{}", serde_json::to_string_pretty(&script)?);
    Ok(())
}
