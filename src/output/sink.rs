use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::error::Result;

/// Write `records` as a single JSON array to `output`, or stdout if `None`.
///
/// The whole array is rendered before anything is written, so a failure never
/// leaves a truncated array behind. Files are written next to the target and
/// renamed into place.
pub fn write_json<T: Serialize>(records: &[T], output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = render(records, pretty)?;

    match output {
        Some(path) => {
            write_atomically(path, &json)?;
            info!("{} records written to: {}", records.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn render<T: Serialize>(records: &[T], pretty: bool) -> serde_json::Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    json.push('\n');
    Ok(json)
}

fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let staging = staging_path(path);
    fs::write(&staging, contents)?;
    fs::rename(&staging, path).inspect_err(|_| {
        let _ = fs::remove_file(&staging);
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_render_compact() {
        let json = render(&[json!({"a": 1}), json!({"a": 2})], false).unwrap();
        assert_eq!(json, "[{\"a\":1},{\"a\":2}]\n");
    }

    #[test]
    fn test_render_empty_array() {
        let records: Vec<Value> = vec![];
        assert_eq!(render(&records, false).unwrap(), "[]\n");
    }

    #[test]
    fn test_render_pretty() {
        let json = render(&[json!({"a": 1})], true).unwrap();
        assert!(json.contains("\n  {"));
        let parsed: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_write_json_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("steps.json");

        write_json(&[json!({"stepNumber": 1})], Some(&path), false).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[{\"stepNumber\":1}]\n");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_write_json_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("steps.json");
        fs::write(&path, "stale").unwrap();

        write_json(&[json!(1), json!(2)], Some(&path), false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[1,2]\n");
    }

    #[test]
    fn test_write_json_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("steps.json");

        assert!(write_json(&[json!(1)], Some(&path), false).is_err());
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let path = Path::new("/tmp/out/steps.json");
        assert_eq!(staging_path(path), PathBuf::from("/tmp/out/.steps.json.partial"));
    }
}
