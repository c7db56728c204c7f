//! Command-line front end for scan annotation and triage reports
//!
//! The binary in `main.rs` parses arguments and installs logging; everything
//! it runs lives here so it can be tested without spawning a process.

pub mod commands;
pub mod config;
pub mod manifest;

pub use commands::{report_file_name, run_annotate, run_report, AnnotateRequest, ReportRequest};
pub use config::TriageConfig;
pub use manifest::{RecordManifest, SIMULATED_REGIONS};
