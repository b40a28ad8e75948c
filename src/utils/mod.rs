//! Small shared helpers.

use std::path::Path;

/// Human-readable size of a file, always in megabytes with two decimals,
/// e.g. "2.41 MB". Missing or unreadable files report "0 MB".
pub fn file_size_display(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            let mb = metadata.len() as f64 / (1024.0 * 1024.0);
            format!("{mb:.2} MB")
        }
        Err(_) => "0 MB".to_string(),
    }
}
