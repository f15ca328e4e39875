//! Payload reference generation.

use uuid::Uuid;

/// Directory all print payloads are stored under.
pub const PAYLOAD_DIR: &str = "print_jobs";

/// Build a unique storage reference for an uploaded file.
///
/// The original name is kept (sanitized) as a suffix so operators browsing
/// the upload directory can still recognize files.
pub fn payload_key(file_name: &str) -> String {
    format!("{PAYLOAD_DIR}/{}_{}", Uuid::new_v4().simple(), sanitize(file_name))
}

/// Keep only characters that are safe in a file name on every platform.
fn sanitize(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.chars().take(120).collect()
    }
}
