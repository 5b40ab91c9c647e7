//! File sinks for built trees and rendered graphs.

use crate::error::{PtvizError, PtvizResult};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use std::process::Command;

pub const JSON_EXTENSION: &str = "json";
pub const DOT_EXTENSION: &str = "gv";
pub const PNG_EXTENSION: &str = "png";
pub const CYTOSCAPE_EXTENSION: &str = "cyjs";

/// Serialize with a 4-space indent. Map keys come out in sorted order
/// because every model map is ordered.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> PtvizResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|err| PtvizError::other(err.to_string()))
}

/// `<dir>/<name>.<ext>`, with path separators in `name` flattened.
pub fn artifact_path(dir: &Path, name: &str, ext: &str) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    dir.join(format!("{stem}.{ext}"))
}

fn write_artifact(dir: &Path, name: &str, ext: &str, contents: &str) -> PtvizResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = artifact_path(dir, name, ext);
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "wrote {ext} output");
    Ok(path)
}

pub fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> PtvizResult<PathBuf> {
    let mut text = to_json_string(value)?;
    text.push('\n');
    write_artifact(dir, name, JSON_EXTENSION, &text)
}

pub fn write_cytoscape(dir: &Path, name: &str, doc: &serde_json::Value) -> PtvizResult<PathBuf> {
    let mut text = to_json_string(doc)?;
    text.push('\n');
    write_artifact(dir, name, CYTOSCAPE_EXTENSION, &text)
}

pub fn write_dot(dir: &Path, name: &str, dot: &str) -> PtvizResult<PathBuf> {
    write_artifact(dir, name, DOT_EXTENSION, dot)
}

/// Render a `.gv` file next to itself as PNG with the Graphviz `dot` binary.
pub fn render_png(gv_path: &Path) -> PtvizResult<PathBuf> {
    let png_path = gv_path.with_extension(PNG_EXTENSION);
    let output = Command::new("dot")
        .arg("-Tpng")
        .arg("-o")
        .arg(&png_path)
        .arg(gv_path)
        .output()
        .map_err(|err| PtvizError::other(format!("failed to run `dot`: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PtvizError::other(format!(
            "`dot` exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    tracing::info!(path = %png_path.display(), "rendered png");
    Ok(png_path)
}
