// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Deterministic rendering of aggregate statistics.
//!
//! The module turns [`AggregateStats`] into an SVG language card and a
//! Markdown summary. Both are pure functions of their inputs: the injected
//! timestamp only appears in the summary, so the SVG is byte-identical for
//! identical statistics.

use std::{borrow::Cow, fmt::Write as _};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::model::AggregateStats;

/// Width of the SVG canvas in pixels.
pub const CARD_WIDTH: u32 = 360;
/// Vertical space reserved above the first language row.
pub const PADDING_TOP: u32 = 60;
/// Vertical space occupied by each language row.
pub const LINE_HEIGHT: u32 = 40;
/// Vertical space reserved below the last language row.
pub const FOOTER_SPACE: u32 = 45;
/// Width of the progress-bar track in pixels.
pub const BAR_MAX_WIDTH: f64 = 300.0;
/// Color used for languages missing from the lookup table.
pub const DEFAULT_COLOR: &str = "#8b949e";

const MARGIN_X: u32 = 30;
const BAR_HEIGHT: u32 = 8;
const OTHER_LABEL: &str = "Other";
const FONT_FAMILY: &str = "'Segoe UI', Ubuntu, 'Helvetica Neue', sans-serif";

const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("C", "#555555"),
    ("C#", "#178600"),
    ("C++", "#f34b7d"),
    ("CSS", "#563d7c"),
    ("Dart", "#00B4AB"),
    ("Dockerfile", "#384d54"),
    ("Go", "#00ADD8"),
    ("HTML", "#e34c26"),
    ("Java", "#b07219"),
    ("JavaScript", "#f1e05a"),
    ("Jupyter Notebook", "#DA5B0B"),
    ("Kotlin", "#A97BFF"),
    ("Lua", "#000080"),
    ("Makefile", "#427819"),
    ("PHP", "#4F5D95"),
    ("Python", "#3572A5"),
    ("Ruby", "#701516"),
    ("Rust", "#dea584"),
    ("SCSS", "#c6538c"),
    ("Shell", "#89e051"),
    ("Swift", "#F05138"),
    ("TypeScript", "#3178c6"),
    ("Vue", "#41b883")
];

/// Rendering knobs that do not change the underlying numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum number of named languages; the remainder is folded into an
    /// "Other" row.
    pub max_languages: Option<usize>,
    /// Image path embedded in the Markdown summary.
    pub svg_link:      Option<String>
}

/// One rendered language row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageRow {
    /// Language label.
    pub language:  String,
    /// Accumulated bytes.
    pub bytes:     u64,
    /// Share of all bytes, in percent.
    pub percent:   f64,
    /// Width of the filled bar in pixels.
    pub bar_width: f64,
    /// Fill color of the bar.
    pub color:     &'static str
}

/// Rendered outputs derived from one aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Complete SVG document.
    pub svg_markup:   String,
    /// Markdown block inserted into the README section.
    pub summary_text: String
}

/// Renders `stats` with default options.
pub fn render(stats: &AggregateStats, generated_at: DateTime<Utc>) -> RenderedArtifact {
    render_with(stats, generated_at, &RenderOptions::default())
}

/// Renders `stats` into an SVG card and a Markdown summary.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use profile_stats::{AggregateStats, RenderOptions, render_with};
///
/// let stats = AggregateStats::default();
/// let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let artifact = render_with(&stats, at, &RenderOptions::default());
/// assert!(artifact.svg_markup.contains("Total commits: 0"));
/// assert!(artifact.summary_text.contains("2025-01-01T00:00:00Z"));
/// ```
pub fn render_with(
    stats: &AggregateStats,
    generated_at: DateTime<Utc>,
    options: &RenderOptions
) -> RenderedArtifact {
    let rows = language_rows(stats, options.max_languages);
    RenderedArtifact {
        svg_markup:   build_svg(&rows, stats.total_commits),
        summary_text: build_summary(&rows, stats.total_commits, generated_at, options)
    }
}

/// Computes sorted language rows with percentages and bar widths.
///
/// Rows are ordered by bytes descending; ties keep first-seen order. A zero
/// byte total yields no rows.
pub fn language_rows(stats: &AggregateStats, max_languages: Option<usize>) -> Vec<LanguageRow> {
    let total = stats.language_bytes.total_bytes();
    if total == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<(&str, u64)> = stats
        .language_bytes
        .iter()
        .map(|entry| (entry.language.as_str(), entry.bytes))
        .collect();
    sorted.sort_by(|left, right| right.1.cmp(&left.1));

    let mut folded: Vec<(Cow<'_, str>, u64)> = Vec::with_capacity(sorted.len());
    match max_languages {
        Some(limit) if sorted.len() > limit => {
            let remainder = sorted[limit..]
                .iter()
                .fold(0u64, |sum, (_, bytes)| sum.saturating_add(*bytes));
            folded.extend(
                sorted[..limit]
                    .iter()
                    .map(|(language, bytes)| (Cow::Borrowed(*language), *bytes))
            );
            folded.push((Cow::Borrowed(OTHER_LABEL), remainder));
        }
        _ => folded.extend(
            sorted
                .iter()
                .map(|(language, bytes)| (Cow::Borrowed(*language), *bytes))
        )
    }

    folded
        .into_iter()
        .map(|(language, bytes)| {
            let percent = 100.0 * bytes as f64 / total as f64;
            LanguageRow {
                color: if language == OTHER_LABEL {
                    DEFAULT_COLOR
                } else {
                    language_color(&language)
                },
                language: language.into_owned(),
                bytes,
                percent,
                bar_width: percent / 100.0 * BAR_MAX_WIDTH
            }
        })
        .collect()
}

/// Looks up the display color of a language.
pub fn language_color(language: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| *name == language)
        .map_or(DEFAULT_COLOR, |(_, color)| *color)
}

/// Height of the canvas for `rows` language rows.
pub fn canvas_height(rows: usize) -> u32 {
    PADDING_TOP + rows as u32 * LINE_HEIGHT + FOOTER_SPACE
}

/// Formats an integer with `,` thousands separators.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

fn build_svg(rows: &[LanguageRow], total_commits: u64) -> String {
    let height = canvas_height(rows.len());
    let mut buffer = String::with_capacity(512 + rows.len() * 320);

    let _ = writeln!(
        buffer,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" role=\"img\" aria-label=\"Most used languages\" width=\"{CARD_WIDTH}\" height=\"{height}\" viewBox=\"0 0 {CARD_WIDTH} {height}\">",
    );
    let _ = writeln!(
        buffer,
        "  <rect x=\"0.5\" y=\"0.5\" width=\"{}\" height=\"{}\" rx=\"10\" fill=\"#0d1117\" stroke=\"#30363d\"/>",
        CARD_WIDTH - 1,
        height - 1
    );
    let _ = writeln!(
        buffer,
        "  <text x=\"{MARGIN_X}\" y=\"36\" font-family=\"{FONT_FAMILY}\" font-size=\"18\" font-weight=\"600\" fill=\"#58a6ff\">Most Used Languages</text>",
    );

    for (index, row) in rows.iter().enumerate() {
        let label_y = PADDING_TOP + index as u32 * LINE_HEIGHT + 12;
        let bar_y = label_y + 8;
        let percent_x = MARGIN_X as f64 + BAR_MAX_WIDTH;
        let _ = writeln!(
            buffer,
            "  <text x=\"{MARGIN_X}\" y=\"{label_y}\" font-family=\"{FONT_FAMILY}\" font-size=\"13\" fill=\"#c9d1d9\">{}</text>",
            escape_xml(&row.language)
        );
        let _ = writeln!(
            buffer,
            "  <text x=\"{percent_x:.0}\" y=\"{label_y}\" text-anchor=\"end\" font-family=\"{FONT_FAMILY}\" font-size=\"13\" fill=\"#8b949e\">{:.1}%</text>",
            row.percent
        );
        let _ = writeln!(
            buffer,
            "  <rect x=\"{MARGIN_X}\" y=\"{bar_y}\" width=\"{BAR_MAX_WIDTH:.0}\" height=\"{BAR_HEIGHT}\" rx=\"4\" fill=\"#21262d\"/>",
        );
        let _ = writeln!(
            buffer,
            "  <rect x=\"{MARGIN_X}\" y=\"{bar_y}\" width=\"{:.2}\" height=\"{BAR_HEIGHT}\" rx=\"4\" fill=\"{}\"/>",
            row.bar_width, row.color
        );
    }

    let _ = writeln!(
        buffer,
        "  <text x=\"{MARGIN_X}\" y=\"{}\" font-family=\"{FONT_FAMILY}\" font-size=\"14\" fill=\"#c9d1d9\">Total commits: {}</text>",
        height - 18,
        format_thousands(total_commits)
    );
    buffer.push_str("</svg>\n");

    buffer
}

fn build_summary(
    rows: &[LanguageRow],
    total_commits: u64,
    generated_at: DateTime<Utc>,
    options: &RenderOptions
) -> String {
    let mut buffer = String::with_capacity(256 + rows.len() * 32);

    let _ = writeln!(
        buffer,
        "- **Total commits**: {}",
        format_thousands(total_commits)
    );
    if rows.is_empty() {
        buffer.push_str("- **Languages**: none\n");
    } else {
        buffer.push_str("- **Languages**:\n");
        for row in rows {
            let _ = writeln!(
                buffer,
                "  - {}: {:.1}%",
                escape_xml(&row.language),
                row.percent
            );
        }
    }

    if let Some(link) = options.svg_link.as_deref() {
        let _ = writeln!(buffer, "\n![Most used languages]({link})");
    }

    let _ = write!(
        buffer,
        "\n> Updated at: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    buffer
}

fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}
