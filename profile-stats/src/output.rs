// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Writes the rendered artifacts to disk.
//!
//! The README is rewritten only when its generated section changes; the SVG
//! card and the optional JSON snapshot are written on every run.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf}
};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::Settings,
    error::{Error, io_error},
    model::AggregateStats,
    render::RenderedArtifact,
    section::{SECTION_END_MARKER, SECTION_START_MARKER, update_section}
};

/// Files produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// README containing the generated section.
    pub readme: PathBuf,
    /// SVG language card.
    pub svg:    PathBuf,
    /// Optional JSON snapshot of the aggregate.
    pub json:   Option<PathBuf>
}

impl From<&Settings> for OutputPaths {
    fn from(settings: &Settings) -> Self {
        Self {
            readme: settings.readme.clone(),
            svg:    settings.svg.clone(),
            json:   settings.json.clone()
        }
    }
}

/// What [`write_outputs`] changed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputReport {
    /// The README content differed and was rewritten.
    pub readme_updated: bool,
    /// A JSON snapshot was written.
    pub json_written:   bool
}

#[derive(Serialize)]
struct Snapshot<'a> {
    generated_at: String,
    #[serde(flatten)]
    stats:        &'a AggregateStats
}

/// Writes the README section, the SVG card and the optional JSON snapshot.
///
/// A missing README is treated as an empty document. The README is only
/// rewritten when its content changes; the SVG is always written and its
/// parent directories are created as needed.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when a file cannot be read or written
/// and [`Error::Serialize`](Error::Serialize) when the snapshot cannot be
/// encoded.
pub fn write_outputs(
    paths: &OutputPaths,
    artifact: &RenderedArtifact,
    stats: &AggregateStats,
    generated_at: DateTime<Utc>
) -> Result<OutputReport, Error> {
    let readme_updated = update_readme(&paths.readme, &artifact.summary_text)?;

    write_file(&paths.svg, artifact.svg_markup.as_bytes())?;
    info!("Wrote SVG card to {}", paths.svg.display());

    let json_written = match &paths.json {
        Some(path) => {
            write_snapshot(path, stats, generated_at)?;
            info!("Wrote JSON snapshot to {}", path.display());
            true
        }
        None => false
    };

    Ok(OutputReport {
        readme_updated,
        json_written
    })
}

fn update_readme(path: &Path, summary: &str) -> Result<bool, Error> {
    let original = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            debug!("README {} not found, starting from an empty document", path.display());
            String::new()
        }
        Err(source) => return Err(io_error(path, source))
    };

    let content = format!("\n{}\n", summary.trim_end());
    let updated = update_section(&original, SECTION_START_MARKER, SECTION_END_MARKER, &content);

    if updated == original {
        info!("README {} is up to date", path.display());
        return Ok(false);
    }

    write_file(path, updated.as_bytes())?;
    info!("README {} updated", path.display());
    Ok(true)
}

fn write_snapshot(
    path: &Path,
    stats: &AggregateStats,
    generated_at: DateTime<Utc>
) -> Result<(), Error> {
    let snapshot = Snapshot {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        stats
    };
    let mut payload = serde_json::to_vec_pretty(&snapshot)?;
    payload.push(b'\n');
    write_file(path, &payload)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }

    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .map_err(|source| io_error(path, source))?;
    writer.flush().map_err(|source| io_error(path, source))
}
