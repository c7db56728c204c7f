//! Triage CLI binary
//!
//! Logs go to stderr; stdout only ever carries the written report path.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use triage_cli::{run_annotate, run_report, AnnotateRequest, ReportRequest, TriageConfig};

#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(version, about = "Highlight regions on scans and compose triage reports")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint translucent highlights over regions of a scan
    Annotate {
        /// Source image (PNG, JPEG, ...)
        #[arg(long)]
        image: PathBuf,

        /// Where to write the annotated PNG
        #[arg(long)]
        out: PathBuf,

        /// JSON array of {x, y, width, height} fractions
        #[arg(long, conflicts_with = "preset")]
        regions: Option<PathBuf>,

        /// Use the simulated detector's regions
        #[arg(long)]
        preset: bool,

        /// Clip regions that overhang the image instead of failing
        #[arg(long)]
        clip: bool,
    },
    /// Compose a PDF report from a record manifest
    Report {
        /// Record manifest (JSON)
        #[arg(long)]
        record: PathBuf,

        /// Output path; derived from subject and date when omitted
        #[arg(long)]
        out: Option<PathBuf>,

        /// Generation timestamp shown in the report (default: now)
        #[arg(long)]
        generated_at: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = TriageConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Annotate {
            image,
            out,
            regions,
            preset,
            clip,
        } => run_annotate(
            &AnnotateRequest {
                image,
                out,
                regions,
                preset,
                clip,
            },
            &config,
        ),
        Command::Report {
            record,
            out,
            generated_at,
        } => {
            let generated_at = generated_at
                .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            let path = run_report(
                &ReportRequest {
                    record,
                    out,
                    generated_at,
                },
                &config,
            )?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
