use chrono::{DateTime, SecondsFormat, Utc};

use crate::export::exporter::ExportFormat;

/// Common prefix of exported file names.
pub const FILENAME_PREFIX: &str = "caption-art";

/// `caption-art-<timestamp>[-watermarked].<ext>`.
///
/// The timestamp is UTC ISO-8601 with milliseconds, `:` and `.` replaced by `-`
/// (`2026-10-19T08-30-00-123Z`).
pub fn export_filename(at: DateTime<Utc>, watermarked: bool, format: ExportFormat) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let suffix = if watermarked { "-watermarked" } else { "" };
    format!(
        "{FILENAME_PREFIX}-{stamp}{suffix}.{}",
        format.extension()
    )
}

#[cfg(test)]
#[path = "../../tests/unit/export/filename.rs"]
mod tests;
