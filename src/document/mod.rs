//! Minutes document rendering.
//!
//! Sections are rendered in the record's fixed order: a heading built from
//! the section key (underscores to spaces, each word capitalized), the body
//! paragraph, then a blank separator. Existing files are overwritten.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::PipelineResult;
use crate::minutes::MinutesRecord;

/// Serialize a record to `path`, creating parent directories as needed.
pub fn write(record: &MinutesRecord, path: &Path) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, render(record))?;
    info!("Minutes document written: {:?}", path);
    Ok(())
}

fn render(record: &MinutesRecord) -> String {
    let mut out = String::new();
    for (key, body) in record.sections() {
        out.push_str("# ");
        out.push_str(&heading_for(key));
        out.push_str("\n\n");
        out.push_str(body);
        out.push_str("\n\n");
    }
    out
}

/// `complete_transcription` -> `Complete Transcription`.
fn heading_for(key: &str) -> String {
    key.split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
