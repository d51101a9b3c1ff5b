// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Replacement of a marker-delimited region inside a text document.
//!
//! The region starts at the first `start` marker and ends at the first `end`
//! marker that follows it. Everything outside that span is preserved byte
//! for byte.

/// Opening marker of the generated README section.
pub const SECTION_START_MARKER: &str = "<!-- profile-stats:start -->";
/// Closing marker of the generated README section.
pub const SECTION_END_MARKER: &str = "<!-- profile-stats:end -->";

/// Replaces the delimited region of `document` with `new_content`.
///
/// When the document has no complete region, one is appended after a `\n`
/// separator (omitted for an empty document). Applying the same update twice
/// yields the same document as applying it once.
///
/// # Example
///
/// ```
/// use profile_stats::update_section;
///
/// let document = "# Hi\n<!-- s -->old<!-- e -->\nbye\n";
/// let updated = update_section(document, "<!-- s -->", "<!-- e -->", "new");
/// assert_eq!(updated, "# Hi\n<!-- s -->new<!-- e -->\nbye\n");
/// ```
pub fn update_section(
    document: &str,
    start_marker: &str,
    end_marker: &str,
    new_content: &str
) -> String {
    let section_len = start_marker.len() + new_content.len() + end_marker.len();

    match find_section(document, start_marker, end_marker) {
        Some((start_idx, end_idx)) => {
            let mut result = String::with_capacity(document.len() + section_len);
            result.push_str(&document[..start_idx]);
            push_section(&mut result, start_marker, end_marker, new_content);
            result.push_str(&document[end_idx..]);
            result
        }
        None => {
            let mut result = String::with_capacity(document.len() + section_len + 1);
            result.push_str(document);
            if !document.is_empty() {
                result.push('\n');
            }
            push_section(&mut result, start_marker, end_marker, new_content);
            result
        }
    }
}

/// Returns the byte range `[start, end)` covering both markers.
fn find_section(document: &str, start_marker: &str, end_marker: &str) -> Option<(usize, usize)> {
    let start_idx = document.find(start_marker)?;
    let search_from = start_idx + start_marker.len();
    let end_idx = document[search_from..].find(end_marker)? + search_from;
    Some((start_idx, end_idx + end_marker.len()))
}

fn push_section(buffer: &mut String, start_marker: &str, end_marker: &str, content: &str) {
    buffer.push_str(start_marker);
    buffer.push_str(content);
    buffer.push_str(end_marker);
}
