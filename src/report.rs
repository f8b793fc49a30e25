//! HTML report of the selected items.
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::{escape_html, Item, Result, SavedError, REDDIT_BASE_URL};

/// Report file written when no `--output` is given.
pub const DEFAULT_REPORT_FILE: &str = "redditsaved.html";

/// One report line: id, community, the post link and its source link.
pub fn render_line(item: &Item) -> String {
    format!(
        "{}: r/{} <a href=\"{}\">{}</a> --- <a href=\"{}\">Source</a><br />",
        item.id(),
        escape_html(item.community()),
        escape_html(&format!("{}{}", REDDIT_BASE_URL, item.permalink())),
        escape_html(item.title()),
        escape_html(item.url()),
    )
}

/// The complete report document.
pub fn render_report(items: &[&Item]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Saved items</title>\n</head>\n<body>\n",
    );
    for item in items {
        html.push_str(&render_line(item));
        html.push('\n');
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Writes the report for `items` to `path`, replacing any previous report.
///
/// An empty selection is refused with [`SavedError::NoMatches`] so that an
/// empty report is never produced.
pub fn write_report(items: &[&Item], path: &Path) -> Result<PathBuf> {
    if items.is_empty() {
        return Err(SavedError::NoMatches);
    }

    let write_failed = |source: io::Error| SavedError::ReportWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    debug!("Rendering {} items into {}", items.len(), path.display());
    let html = render_report(items);

    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_failed)?;
    temp_file.write_all(html.as_bytes()).map_err(write_failed)?;
    temp_file.flush().map_err(write_failed)?;
    temp_file
        .persist(path)
        .map_err(|e| write_failed(e.error))?;

    info!("Report with {} items written to {}", items.len(), path.display());
    Ok(path.to_path_buf())
}

/// Deletes a previously written report.
pub fn remove_report(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| SavedError::ApplicationError {
        message: format!("Could not remove {}: {}", path.display(), e),
    })?;
    info!("Removed report {}", path.display());
    Ok(())
}
