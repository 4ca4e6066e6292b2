use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde_json::Value;

use crate::error::{CiStepsError, Result};

/// Concatenate arrays, keeping input order and element order within each.
pub fn merge_arrays(arrays: Vec<Vec<Value>>) -> Vec<Value> {
    arrays.into_iter().flatten().collect()
}

/// Read a file whose top-level JSON value must be an array.
pub fn read_array(path: &Path) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path).map_err(|source| CiStepsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&contents).map_err(|source| CiStepsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(CiStepsError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

/// Read every file and merge their arrays in argument order.
///
/// Fails on the first unreadable, unparsable or non-array input; nothing is
/// merged in that case.
pub fn merge_files(paths: &[PathBuf]) -> Result<Vec<Value>> {
    let arrays = paths
        .iter()
        .map(|path| read_array(path))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_arrays(arrays);
    info!("Merged {} records from {} files", merged.len(), paths.len());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_merge_two_files() {
        let a = json_file(r#"[{"a":1}]"#);
        let b = json_file(r#"[{"a":2},{"a":3}]"#);

        let merged = merge_files(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();

        assert_eq!(merged, vec![json!({"a":1}), json!({"a":2}), json!({"a":3})]);
    }

    #[test]
    fn test_merge_single_is_identity() {
        let a = vec![json!({"a":1}), json!("x"), json!(null)];
        assert_eq!(merge_arrays(vec![a.clone()]), a);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = vec![json!(1)];
        let b = vec![json!(2), json!(3)];
        let c = vec![json!(4)];

        let left = merge_arrays(vec![merge_arrays(vec![a.clone(), b.clone()]), c.clone()]);
        let right = merge_arrays(vec![a.clone(), merge_arrays(vec![b.clone(), c.clone()])]);
        let flat = merge_arrays(vec![a, b, c]);

        assert_eq!(left, right);
        assert_eq!(left, flat);
    }

    #[test]
    fn test_merge_keeps_empty_arrays_neutral() {
        let a = json_file("[]");
        let b = json_file(r#"[{"a":1}]"#);

        let merged = merge_files(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();

        assert_eq!(merged, vec![json!({"a":1})]);
    }

    #[test]
    fn test_merge_does_not_deduplicate() {
        let a = json_file(r#"[{"a":1}]"#);

        let merged = merge_files(&[a.path().to_path_buf(), a.path().to_path_buf()]).unwrap();

        assert_eq!(merged, vec![json!({"a":1}), json!({"a":1})]);
    }

    #[test]
    fn test_merge_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");

        let result = merge_files(&[missing.clone()]);

        assert!(matches!(result, Err(CiStepsError::Read { path, .. }) if path == missing));
    }

    #[test]
    fn test_merge_invalid_json() {
        let good = json_file("[1]");
        let bad = json_file("[1,");

        let result = merge_files(&[good.path().to_path_buf(), bad.path().to_path_buf()]);

        assert!(matches!(result, Err(CiStepsError::Parse { path, .. }) if path == bad.path()));
    }

    #[test]
    fn test_merge_rejects_non_array() {
        let object = json_file(r#"{"a":1}"#);

        let result = read_array(object.path());

        assert!(matches!(result, Err(CiStepsError::NotAnArray { .. })));
    }
}
