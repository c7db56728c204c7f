//! Subcommand implementations

use crate::config::TriageConfig;
use crate::manifest::{RecordManifest, SIMULATED_REGIONS};
use annotation_core::annotate;
use anyhow::{bail, Context};
use report_core::ReportComposer;
use std::fs;
use std::path::{Path, PathBuf};
use triage_types::Region;

/// Inputs for `triage annotate`
#[derive(Debug, Clone)]
pub struct AnnotateRequest {
    pub image: PathBuf,
    pub out: PathBuf,
    pub regions: Option<PathBuf>,
    pub preset: bool,
    pub clip: bool,
}

/// Inputs for `triage report`
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub record: PathBuf,
    pub out: Option<PathBuf>,
    pub generated_at: String,
}

pub fn run_annotate(request: &AnnotateRequest, config: &TriageConfig) -> anyhow::Result<()> {
    let regions: Vec<Region> = match (&request.regions, request.preset) {
        (_, true) => SIMULATED_REGIONS.to_vec(),
        (Some(path), false) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read regions: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse regions: {}", path.display()))?
        }
        (None, false) => bail!("No regions given; pass --regions <json> or --preset"),
    };

    let source = fs::read(&request.image)
        .with_context(|| format!("Failed to read image: {}", request.image.display()))?;

    let options = config.annotation.clipping(config.annotation.clip_out_of_bounds || request.clip);
    let annotated = annotate(&source, &regions, &options).context("Annotation failed")?;

    fs::write(&request.out, &annotated)
        .with_context(|| format!("Failed to write {}", request.out.display()))?;
    tracing::info!(
        regions = regions.len(),
        bytes = annotated.len(),
        "wrote {}",
        request.out.display()
    );
    Ok(())
}

/// Compose the report and return the path it was written to
pub fn run_report(request: &ReportRequest, config: &TriageConfig) -> anyhow::Result<PathBuf> {
    let manifest = RecordManifest::from_file(&request.record)?;
    let base_dir = request
        .record
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let meta = manifest.metadata(&request.generated_at);
    let record = manifest.into_record(&base_dir, &config.annotation)?;

    let out = match &request.out {
        Some(path) => path.clone(),
        None => PathBuf::from(report_file_name(
            record.subject_id.as_deref(),
            record.date.as_deref(),
            &request.generated_at,
        )),
    };

    let bytes = ReportComposer::new(config.report.clone())
        .compose(&record, &meta)
        .context("Report composition failed")?;
    fs::write(&out, &bytes).with_context(|| format!("Failed to write {}", out.display()))?;

    tracing::info!(bytes = bytes.len(), "wrote {}", out.display());
    Ok(out)
}

/// Default report file name
///
/// `{subject}-analysis-{date}.pdf` when both are known, otherwise
/// `medical-analysis-{timestamp}.pdf` with the timestamp reduced to its
/// alphanumeric characters.
pub fn report_file_name(subject_id: Option<&str>, date: Option<&str>, generated_at: &str) -> String {
    let subject = subject_id.map(sanitize).filter(|s| !s.is_empty());
    let date = date.map(sanitize).filter(|s| !s.is_empty());
    match (subject, date) {
        (Some(subject), Some(date)) => format!("{subject}-analysis-{date}.pdf"),
        _ => {
            let compact: String = generated_at
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            format!("medical-analysis-{compact}.pdf")
        }
    }
}

/// Keep characters that are safe in a file name
fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}
