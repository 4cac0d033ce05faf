//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve plain-text input for commands that accept either inline strings or files.
pub fn read_text_arg(text: Option<String>, from: Option<PathBuf>) -> Result<String> {
    if let Some(t) = text {
        return Ok(t);
    }
    if let Some(path) = from {
        if path.as_os_str() == "-" {
            return read_stdin();
        }
        return fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    read_stdin()
}

/// Read the entire stdin stream into memory.
pub fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    ensure_parent(path)?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Create the parent directory of an output file if it is missing.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
    }
    Ok(())
}

/// Identifiers arrive from files and stdin with trailing newlines; strip
/// only line endings so leading or inner spaces stay part of the data.
pub fn trim_line_ending(input: &str) -> &str {
    input.trim_end_matches(['\r', '\n'])
}

/// Clap parser for strictly positive dimensions.
pub fn parse_dimension(input: &str) -> Result<f64, String> {
    let value: f64 = input
        .parse()
        .map_err(|_| format!("'{input}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("dimension must be positive, got {input}"));
    }
    Ok(value)
}
