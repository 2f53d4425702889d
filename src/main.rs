//! chatlayout - layout inspector entry point

use chatlayout::config::{ConfigError, ResolvedConfig};
use chatlayout::layout::dump::{dump, render_text};
use chatlayout::layout::{AnchorPolicy, LayoutEngine, Viewport};
use chatlayout::logging::LoggingError;
use chatlayout::model::LayoutError;
use chatlayout::session::{LayoutSession, MeasurePass, TracingObserver};
use chatlayout::source::{MonospaceMeasurer, TranscriptError, TranscriptSource};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;

/// Lay out a chat transcript and print every frame
#[derive(Parser, Debug)]
#[command(name = "chatlayout")]
#[command(version)]
#[command(about = "Lay out a chat transcript and print the resulting frames")]
pub struct Args {
    /// Path to a JSON array of chat messages
    pub transcript: PathBuf,

    /// Second transcript applied as an incremental update
    #[arg(long)]
    pub next: Option<PathBuf>,

    /// Container width in points
    #[arg(long)]
    pub width: Option<f64>,

    /// Top of the viewport in content coordinates
    #[arg(long, default_value = "0")]
    pub viewport_offset: f64,

    /// Viewport height; without it every item is measured
    #[arg(long)]
    pub viewport_height: Option<f64>,

    /// Scroll anchoring policy
    #[arg(long, value_parser = ["topmost_visible", "stick_to_bottom"])]
    pub anchor: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

/// Anything that can stop the inspector.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// A transcript could not be loaded.
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    /// The layout engine rejected an update.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Output could not be encoded.
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

fn parse_anchor(raw: Option<&str>) -> Option<AnchorPolicy> {
    match raw? {
        "stick_to_bottom" => Some(AnchorPolicy::StickToBottom),
        _ => Some(AnchorPolicy::TopmostVisible),
    }
}

fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    // Defaults → Config File → CLI Args
    let config_file = chatlayout::config::load_config_with_precedence(args.config.clone())?;
    let merged = chatlayout::config::merge_config(config_file)?;
    Ok(chatlayout::config::apply_cli_overrides(
        merged,
        args.width,
        parse_anchor(args.anchor.as_deref()),
    ))
}

type Session = LayoutSession<TranscriptSource, MonospaceMeasurer>;

fn measure(session: &mut Session, args: &Args) -> Result<MeasurePass, LayoutError> {
    match args.viewport_height {
        Some(height) => {
            session.set_viewport(Viewport::new(args.viewport_offset, height));
            session.measure_visible()
        }
        None => session.measure_all(),
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = resolve_config(&args)?;

    if args.log_stderr {
        chatlayout::logging::init_stderr()?;
    } else {
        chatlayout::logging::init(&config.log_file_path)?;
    }
    info!(config = ?config, "Configuration loaded and resolved");

    let source = TranscriptSource::load(&args.transcript)?;
    let engine = LayoutEngine::new(config.settings).with_anchor_policy(config.anchor_policy);
    let mut session =
        LayoutSession::new(source, MonospaceMeasurer::default(), engine).with_overscan(config.overscan);
    session.add_observer(Box::new(TracingObserver));

    session.resize(config.container_width)?;
    session.reload()?;
    measure(&mut session, &args)?;

    let mut incremental = None;
    if let Some(next_path) = &args.next {
        let next = TranscriptSource::load(next_path)?;
        session.source_mut().replace(next.messages().to_vec());
        let outcome = session.reload()?;
        let pass = measure(&mut session, &args)?;
        incremental = Some((
            outcome.changeset.summary(),
            outcome.update.scroll_adjustment + pass.scroll_adjustment,
        ));
    }

    let rows = dump(session.engine());
    let content_height = session.engine().content_height();

    if args.json {
        let mut output = serde_json::json!({
            "content_height": content_height,
            "rows": rows,
        });
        if let Some((summary, adjustment)) = &incremental {
            output["changeset"] = serde_json::json!(summary);
            output["scroll_adjustment"] = serde_json::json!(adjustment);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some((summary, adjustment)) = &incremental {
            println!("changeset: {summary}");
            println!("scroll adjustment: {adjustment}");
        }
        println!("{}", render_text(&rows));
        println!("content height: {content_height}");
    }

    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("chatlayout: {err}");
            ExitCode::FAILURE
        }
    }
}
