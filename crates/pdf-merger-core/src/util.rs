//! Utility functions shared across the crate.

use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Strip path separators and control characters from a user-supplied filename.
///
/// Upload filenames end up in Content-Disposition headers and on-disk names,
/// so anything that could escape those contexts is replaced with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | '\0'..='\x1f' => '_',
            _ => c,
        })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "document.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive the download filename for a merged document.
///
/// `merged_top.pdf_script.pdf` would be ugly, so the `.pdf` suffixes of the
/// sources are dropped before joining.
pub fn merged_filename(prefix: &str, top_name: &str, script_name: &str) -> String {
    let stem = |name: &str| {
        let name = sanitize_filename(name);
        name.strip_suffix(".pdf")
            .or_else(|| name.strip_suffix(".PDF"))
            .unwrap_or(&name)
            .to_string()
    };

    format!("{}_{}_{}.pdf", prefix, stem(top_name), stem(script_name))
}

/// Human-readable byte size (base 1024).
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
