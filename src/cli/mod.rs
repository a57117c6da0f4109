//! # CLI Module
//!
//! Command-line interface for the media deduplicator.
//!
//! ## Usage
//! ```bash
//! # Copy one file per base name into ./MEDIADUPES
//! mediadupes -s ~/Pictures
//!
//! # Report what would be copied, without copying
//! mediadupes -s ~/Pictures --plan
//!
//! # Everything into one directory, 8 parallel copies
//! mediadupes -s ~/Pictures -d ~/Flat --one-dir -c 8
//!
//! # JSON summary for scripting
//! mediadupes -s ~/Pictures --plan --output json
//! ```

use clap::{Arg, ArgAction, Command, CommandFactory, FromArgMatches, Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_dedup::core::metadata::{ExifSourceFactory, ExiftoolSourceFactory, MetadataSourceFactory};
use media_dedup::core::pipeline::{
    parse_list, Pipeline, PipelineResult, RunConfig, DEFAULT_COPY_CONCURRENCY,
};
use media_dedup::error::Result;
use media_dedup::events::{
    CopyEvent, DiagnosticEvent, Event, EventChannel, EventReceiver, PipelineEvent, ScanEvent,
};
use std::path::PathBuf;
use std::thread;

/// Media Dedup - copy one of every photo and video
#[derive(Parser, Debug)]
#[command(name = "mediadupes")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Source directory [default: .]
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Destination directory [default: MEDIADUPES]
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Scan workers [default: number of CPUs]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Parallel copies
    #[arg(short = 'c', long = "copy-parallel", default_value_t = DEFAULT_COPY_CONCURRENCY)]
    copy_parallel: usize,

    /// Comma-separated image extensions
    #[arg(long = "image-exts")]
    image_exts: Option<String>,

    /// Comma-separated video extensions
    #[arg(long = "video-exts")]
    video_exts: Option<String>,

    /// Comma-separated exclude patterns, replacing the default ".*"
    #[arg(long)]
    exclude: Option<String>,

    /// Only scan the top level of the source
    #[arg(long)]
    no_recursive: bool,

    /// Skip creation-time lookups
    #[arg(long)]
    no_meta: bool,

    /// Keep every file, even when base names collide
    #[arg(long)]
    no_dedup: bool,

    /// Scan and report only, copy nothing
    #[arg(long)]
    plan: bool,

    /// Copy everything into the destination root
    #[arg(long)]
    one_dir: bool,

    /// Show the file being processed and metadata diagnostics
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Where creation times come from
    #[arg(long, default_value = "exif")]
    metadata_backend: MetadataBackend,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON summary for scripting
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetadataBackend {
    /// Built-in EXIF reader (images)
    Exif,
    /// External exiftool process per worker (images and videos)
    Exiftool,
}

impl MetadataBackend {
    fn factory(self) -> Box<dyn MetadataSourceFactory> {
        match self {
            MetadataBackend::Exif => Box::new(ExifSourceFactory),
            MetadataBackend::Exiftool => Box::new(ExiftoolSourceFactory::default()),
        }
    }
}

impl Cli {
    /// Nothing to do unless a source, a destination or a plan was asked for
    fn is_empty(&self) -> bool {
        self.source.is_none() && self.dest.is_none() && !self.plan
    }

    fn into_config(self) -> RunConfig {
        let defaults = RunConfig::default();

        RunConfig {
            source: self.source.unwrap_or(defaults.source),
            destination: self.dest.unwrap_or(defaults.destination),
            workers: self.workers.unwrap_or(defaults.workers),
            copy_concurrency: self.copy_parallel,
            image_extensions: self
                .image_exts
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.image_extensions),
            video_extensions: self
                .video_exts
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.video_extensions),
            exclude_patterns: self
                .exclude
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.exclude_patterns),
            recursive: !self.no_recursive,
            check_metadata: !self.no_meta,
            dedup: !self.no_dedup,
            plan_only: self.plan,
            flatten: self.one_dir,
            ..defaults
        }
    }
}

/// The derived command with `-v` as the version flag
fn command() -> Command {
    Cli::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .help("Print version")
            .action(ArgAction::Version),
    )
}

fn parse_from<I, T>(args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit());

    if cli.is_empty() {
        command().print_help().ok();
        return Ok(());
    }

    media_dedup::init_tracing();

    let output = cli.output;
    let verbose = cli.verbose;
    let factory = cli.metadata_backend.factory();
    let config = cli.into_config();

    run_dedup(config, factory, output, verbose)
}

fn run_dedup(
    config: RunConfig,
    factory: Box<dyn MetadataSourceFactory>,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Media Dedup").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line(&format!(
            "  {} -> {}",
            config.source.display(),
            if config.plan_only {
                "(plan only)".to_string()
            } else {
                config.destination.display().to_string()
            }
        ))
        .ok();
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .config(config)
        .metadata_source(factory)
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        Some(progress_bar())
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || render_events(receiver, progress_clone, verbose));

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = result?;

    match output {
        OutputFormat::Pretty => print_pretty_results(&Term::stdout(), &result),
        OutputFormat::Json => print_json_results(&result),
    }

    Ok(())
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(bar_style);
    pb
}

fn render_events(receiver: EventReceiver, progress: Option<ProgressBar>, verbose: bool) {
    let Some(pb) = progress else {
        // Keep draining so the channel never fills up
        for _ in receiver.iter() {}
        return;
    };

    for event in receiver.iter() {
        match event {
            Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                pb.set_message(format!("{}", phase));
            }
            Event::Scan(ScanEvent::Progress(p)) | Event::Copy(CopyEvent::Progress(p)) => {
                pb.set_length(p.total.max(p.current));
                pb.set_position(p.current);
                if verbose {
                    pb.set_message(
                        p.current_path
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
            }
            Event::Copy(CopyEvent::Started { total }) => {
                pb.set_length(total as u64);
                pb.set_position(0);
            }
            Event::Scan(ScanEvent::Error { path, message })
            | Event::Copy(CopyEvent::Error { path, message }) => {
                pb.println(format!(
                    "{} {}: {}",
                    style("✗").red().bold(),
                    path.display(),
                    message
                ));
            }
            Event::Diagnostic(DiagnosticEvent::MetadataUnavailable { path, message }) => {
                if verbose {
                    pb.println(format!(
                        "{}",
                        style(format!("  no metadata: {}: {}", path.display(), message)).dim()
                    ));
                }
            }
            Event::Pipeline(PipelineEvent::Error { message }) => {
                pb.println(format!("{} {}", style("Error:").red().bold(), message));
            }
            Event::Pipeline(PipelineEvent::Completed { .. }) => {
                pb.finish_and_clear();
            }
            _ => {}
        }
    }
}

fn print_pretty_results(term: &Term, result: &PipelineResult) {
    let summary = &result.summary;
    let mark = if summary.failed() == 0 {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };

    term.write_line("").ok();
    for (i, line) in summary.to_string().lines().enumerate() {
        if i == 0 {
            term.write_line(&format!("{} {}", mark, style(line).bold())).ok();
        } else if line.ends_with(':') && !line.starts_with(' ') {
            term.write_line(&format!("{}", style(line).dim())).ok();
        } else {
            term.write_line(line).ok();
        }
    }

    if summary.is_plan_only() {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Plan only: nothing was copied.").dim()
        ))
        .ok();
    }
}

fn print_json_results(result: &PipelineResult) {
    match serde_json::to_string_pretty(&result.summary) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("could not serialize summary: {}", e),
    }
}
