//! CLI binary for docsift.
//!
//! A thin shim over the library crate that maps CLI flags and run-spec
//! files to `AnalysisConfig`, runs the analysis, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docsift::{
    analyze_folder, write_output_file, AnalysisConfig, AnalysisOutput, RunSpec, ScoringProfile,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Explicit folder, persona, and task (JSON to stdout)
  docsift --pdf-folder guides/ --persona "Travel Planner" \
          --task "Plan a 4-day trip for 10 friends"

  # Write the result to a file
  docsift -p guides/ -r "HR Professional" -t "Prepare onboarding forms" -o result.json

  # Run-spec file (persona/task read from JSON; PDFs/ next to it)
  docsift --config collections/trip/input.json

  # Legacy collection folder (expects input.json and PDFs/ inside)
  docsift collections/trip

  # Lexical vs semantic weighting
  docsift -p docs/ -r Researcher -t "Survey methodology papers" --profile semantic

RUN-SPEC FORMAT:
  {
    "documents":     [{"filename": "guide.pdf", "title": "City Guide"}],
    "persona":       {"role": "Travel Planner"},
    "job_to_be_done": {"task": "Plan a 4-day trip for 10 friends"}
  }

ENVIRONMENT VARIABLES:
  DOCSIFT_PDF_FOLDER      Default --pdf-folder
  DOCSIFT_PERSONA         Default --persona
  DOCSIFT_TASK            Default --task
  DOCSIFT_OUTPUT          Default --output
  PDFIUM_LIB_PATH         Path to an existing libpdfium shared library

SETUP:
  docsift extracts page text through pdfium. Install the pdfium shared
  library (or point PDFIUM_LIB_PATH at an existing copy) before running.
"#;

/// Rank the most relevant PDF sections for a persona and task.
#[derive(Parser, Debug)]
#[command(
    name = "docsift",
    version,
    about = "Rank the most relevant PDF sections for a persona and task",
    long_about = "Scan a folder of PDFs, detect section headers heuristically, score every \
section against a persona and job-to-be-done, and emit a ranked JSON result with \
sentence-bounded excerpts of the top sections.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Legacy collection folder (expects input.json and PDFs/ inside).
    collection: Option<PathBuf>,

    /// Path to a JSON run-spec file (persona, job_to_be_done, documents).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder containing the PDF files to analyze.
    #[arg(short = 'p', long, env = "DOCSIFT_PDF_FOLDER")]
    pdf_folder: Option<PathBuf>,

    /// Persona role, e.g. "Travel Planner".
    #[arg(short = 'r', long, env = "DOCSIFT_PERSONA")]
    persona: Option<String>,

    /// Job-to-be-done, e.g. "Plan a 4-day trip for 10 friends".
    #[arg(short, long, env = "DOCSIFT_TASK")]
    task: Option<String>,

    /// Write the JSON result to this file instead of stdout.
    #[arg(short, long, env = "DOCSIFT_OUTPUT")]
    output: Option<PathBuf>,

    /// Scoring profile: lexical or semantic.
    #[arg(long, env = "DOCSIFT_PROFILE", value_enum, default_value = "lexical")]
    profile: ProfileArg,

    /// Maximum sections in the final ranking.
    #[arg(long, env = "DOCSIFT_MAX_SECTIONS", default_value_t = 15)]
    max_sections: usize,

    /// Maximum subsection excerpts.
    #[arg(long, env = "DOCSIFT_MAX_SUBSECTIONS", default_value_t = 10)]
    max_subsections: usize,

    /// Minimum section content length in characters.
    #[arg(long, env = "DOCSIFT_MIN_CONTENT_LENGTH", default_value_t = 50)]
    min_content_length: usize,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCSIFT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the JSON result.
    #[arg(short, long, env = "DOCSIFT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Lexical,
    Semantic,
}

impl From<ProfileArg> for ScoringProfile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Lexical => ScoringProfile::Lexical,
            ProfileArg::Semantic => ScoringProfile::Semantic,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs duplicate what the summary prints; keep them for
    // --verbose and surface warnings (skipped documents, degraded scoring)
    // by default.
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve inputs (flags → run-spec file → legacy collection) ───────
    let inputs = resolve_inputs(&cli)?;

    if !cli.quiet {
        eprintln!("{} {}", cyan("◆"), bold("docsift"));
        eprintln!("  Persona:    {}", inputs.persona);
        eprintln!("  Task:       {}", inputs.task);
        eprintln!("  PDF folder: {}", inputs.pdf_folder.display());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let config = AnalysisConfig::builder()
        .profile(cli.profile.into())
        .max_sections(cli.max_sections)
        .max_subsections(cli.max_subsections)
        .min_content_length(cli.min_content_length)
        .build()
        .context("Invalid configuration")?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
    let spinner = show_progress.then(make_spinner);
    if let Some(bar) = &spinner {
        bar.set_message("Loading and analyzing PDFs…");
    }

    let result = analyze_folder(&inputs.pdf_folder, &inputs.persona, &inputs.task, &config);

    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }

    let output = result.context("Analysis failed")?;

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        print_summary(&output);
    }

    // ── Emit result ──────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        write_output_file(&output, output_path).context("Failed to write output")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} sections  {}ms  →  {}",
                green("✔"),
                output.stats.sections_selected,
                output.stats.duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    }

    if output.stats.sections_selected == 0 && !cli.quiet {
        eprintln!(
            "{} no sections were extracted; check that the PDFs contain a text layer",
            red("✘")
        );
    }

    Ok(())
}

/// The fully resolved run inputs.
struct RunInputs {
    pdf_folder: PathBuf,
    persona: String,
    task: String,
}

/// Merge CLI flags, a run-spec file, and the legacy collection layout.
///
/// Precedence follows the run-spec when one is given: its persona/task
/// override the flags, and its sibling `PDFs/` folder is the default
/// document location.
fn resolve_inputs(cli: &Cli) -> Result<RunInputs> {
    let mut persona = cli.persona.clone();
    let mut task = cli.task.clone();
    let mut pdf_folder = cli.pdf_folder.clone();
    let mut config_file = cli.config.clone();

    if let Some(collection) = &cli.collection {
        let candidate = collection.join("input.json");
        if candidate.is_file() {
            config_file = Some(candidate);
        }
        if pdf_folder.is_none() {
            pdf_folder = Some(folder_or_pdfs_subdir(collection));
        }
    }

    if let Some(path) = &config_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run spec {}", path.display()))?;
        let spec: RunSpec = serde_json::from_str(&text)
            .with_context(|| format!("Invalid run spec {}", path.display()))?;

        if let Some(role) = spec.persona_role() {
            persona = Some(role.to_string());
        }
        if let Some(t) = spec.task() {
            task = Some(t.to_string());
        }
        if pdf_folder.is_none() {
            let dir = path.parent().unwrap_or(Path::new("."));
            pdf_folder = Some(folder_or_pdfs_subdir(dir));
        }
    }

    Ok(RunInputs {
        pdf_folder: pdf_folder.context(
            "No PDF folder specified: use --pdf-folder, --config, or a collection path",
        )?,
        persona: persona
            .context("No persona specified: use --persona or a run-spec file")?,
        task: task.context("No task specified: use --task or a run-spec file")?,
    })
}

/// Prefer a `PDFs/` subfolder when it exists, else the folder itself.
fn folder_or_pdfs_subdir(dir: &Path) -> PathBuf {
    let pdfs = dir.join("PDFs");
    if pdfs.is_dir() {
        pdfs
    } else {
        dir.to_path_buf()
    }
}

fn make_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Print the run summary and top-5 ranking to stderr.
fn print_summary(output: &AnalysisOutput) {
    let stats = &output.stats;
    eprintln!(
        "{} {} documents, {} pages, {} sections detected, {} selected  {}",
        green("✔"),
        stats.documents,
        stats.pages,
        stats.sections_detected,
        stats.sections_selected,
        dim(&format!("{}ms", stats.duration_ms)),
    );

    for section in output.extracted_sections.iter().take(5) {
        let title: String = section.section_title.chars().take(50).collect();
        eprintln!(
            "  {:>2}. {:<50}  {}  {}",
            section.importance_rank,
            title,
            dim(&format!("score {:.3}", section.relevance_score)),
            dim(&format!("{} p.{}", section.document, section.page_number)),
        );
    }
}
