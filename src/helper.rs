use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use log::{debug, trace};

/// Returns `path` if nothing exists there yet, otherwise the first sibling
/// `<stem><n>[.<ext>]` (n = 0, 1, 2, ...) that is still free.
pub fn next_free_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_os_string());

    let mut suffix: u64 = 0;
    loop {
        let mut name = OsString::from(&stem);
        name.push(suffix.to_string());
        if let Some(ext) = &extension {
            name.push(".");
            name.push(ext);
        }

        let candidate = path.with_file_name(name);
        trace!("Trying alternate path {}", candidate.display());
        if !candidate.exists() {
            debug!(
                "{} is taken, using {} instead",
                path.display(),
                candidate.display()
            );
            return candidate;
        }
        suffix += 1;
    }
}

/// Escapes text for use inside HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
