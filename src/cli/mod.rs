//! Command-line interface
//!
//! `train`, `serve`, `export` and `predict` subcommands.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{OutputConfig, TrainConfig, DEFAULT_CONFIG_PATH};
use crate::export::export_run;
use crate::inference::{load_predictor, score_frame};
use crate::training::{run_training, ClassificationMetrics};
use crate::utils::{load_data, save_csv, write_csv};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    eprint!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    eprintln!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    eprintln!();
    eprintln!("  {}", title.white().bold());
    eprintln!("  {}", dim(&"─".repeat(56)));
}

fn print_metrics(metrics: &ClassificationMetrics) {
    for (name, value) in [
        ("Accuracy", metrics.accuracy),
        ("Recall", metrics.recall),
        ("Precision", metrics.precision),
        ("F1 score", metrics.f1_score),
    ] {
        println!("  {:<16} {}", muted(name), format!("{:.4}", value).white().bold());
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "heart-failure")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heart disease classifier: training and prediction service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model and write a new run directory
    Train {
        /// Configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Config overrides as `section.key=value`
        overrides: Vec<String>,
    },

    /// Start the prediction server
    Serve {
        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "8080")]
        port: u16,

        /// Model artifact to serve
        #[arg(short, long, env = "MODEL_PATH", default_value = crate::server::DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },

    /// Copy a trained run's model to the serving location
    Export {
        /// Run directory; defaults to the most recent run
        #[arg(short, long)]
        run: Option<PathBuf>,

        /// Destination; defaults to `output.model_path` of the config
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file used to locate runs
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Score a CSV file with a trained model
    Predict {
        /// Model artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Input CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config_path: &Path, overrides: &[String]) -> anyhow::Result<()> {
    section("Train");

    step_run(&format!("Loading config {}", config_path.display()));
    let config = TrainConfig::load(config_path, overrides)?;
    step_done(&format!("{} overrides", overrides.len()));

    step_run(&format!("Training on {}", config.raw_data.path.display().to_string().cyan()));
    let run = run_training(&config)?;
    step_done(&format!("{:.3}s", run.elapsed_secs));

    println!();
    println!("  {:<16} {}", muted("Run"), run.run_dir.display().to_string().white());
    println!("  {:<16} {} / {}", muted("Train / test"), run.n_train, run.n_test);
    print_metrics(&run.metrics);
    println!();

    Ok(())
}

/// Output settings from the config file, or defaults when it does not exist
fn output_config(config_path: &Path) -> anyhow::Result<OutputConfig> {
    if config_path.exists() {
        Ok(TrainConfig::from_file(config_path)?.output)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using default output paths");
        Ok(OutputConfig::default())
    }
}

pub fn cmd_export(
    run: Option<&Path>,
    output: Option<&Path>,
    config_path: &Path,
) -> anyhow::Result<()> {
    section("Export");

    let outputs = output_config(config_path)?;
    let destination = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| outputs.model_path.clone());

    step_run("Verifying model");
    let run_dir = export_run(run, &outputs.dir, &destination)?;
    step_done(&destination.display().to_string());

    println!();
    println!("  {:<16} {}", muted("Run"), run_dir.display().to_string().white());
    println!("  {:<16} {}", muted("Model"), destination.display().to_string().white());
    println!();
    Ok(())
}

pub fn cmd_predict(
    model_path: &Path,
    data_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading model");
    let start = Instant::now();
    let predictor = load_predictor(model_path)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run("Scoring");
    let df = load_data(data_path)?;
    let mut scored = score_frame(predictor.as_ref(), &df)?;
    step_done(&format!("{} rows", scored.height()));

    match output {
        Some(path) => {
            save_csv(&mut scored, path)?;
            eprintln!("  {} {}", ok("✓"), path.display());
        }
        None => write_csv(&mut scored, std::io::stdout().lock())?,
    }
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16, model: &Path) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Heart Disease Prediction".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict", &format!("http://{}:{}/predict", host, port)));
    line_box(&kv("Explain", &format!("http://{}:{}/explain", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/health", host, port)));
    line_box(&kv("Model  ", &model.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        model_path: model.to_path_buf(),
        ..Default::default()
    };

    run_server(config).await
}
