//! Shared utilities for command handlers

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use wufoo_sync_core::{parse_fields_response, FormFieldDescriptor, RecordData};

/// Whether a path names a YAML file
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
}

/// Read a JSON or YAML file into `T`; anything unreadable as `T` is reported
/// as an invalid format
pub fn read_structured<T: DeserializeOwned>(path: &Path, expected: &str) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let (parsed, format) = if is_yaml(path) {
        (serde_yaml::from_str(&content).map_err(|e| e.to_string()), "YAML")
    } else {
        (serde_json::from_str(&content).map_err(|e| e.to_string()), "JSON")
    };

    parsed.map_err(|reason| {
        tracing::debug!(path = %path.display(), %reason, "Failed to parse file");
        Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format!("{} {}", format, expected),
        }
    })
}

/// Load a record: an object of field name to value, in file order
pub fn load_record(path: &Path) -> Result<RecordData> {
    read_structured(path, "object of record fields")
}

/// Load a saved `fields` response
pub fn load_fields(path: &Path) -> Result<Vec<FormFieldDescriptor>> {
    let body: serde_json::Value = read_structured(path, "fields response")?;
    Ok(parse_fields_response(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_record_keeps_field_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("member.yaml");
        fs::write(&path, "zip: \"02134\"\nName First: Jo\nagree: true\n").unwrap();

        let record = load_record(&path).unwrap();
        let fields: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["zip", "Name First", "agree"]);
        assert_eq!(record["agree"], json!(true));
    }

    #[test]
    fn test_load_record_rejects_non_objects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("member.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = load_record(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
        assert!(err.to_string().contains("JSON object of record fields"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_record(Path::new("/nonexistent/member.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_fields_from_saved_response() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fields.json");
        fs::write(
            &path,
            json!({"Fields": [{"Title": "Email", "ID": "Field6", "Type": "email"}]}).to_string(),
        )
        .unwrap();

        let fields = load_fields(&path).unwrap();
        assert_eq!(fields, vec![FormFieldDescriptor {
            field_type: Some("email".to_string()),
            ..FormFieldDescriptor::new("Email", "Field6")
        }]);
    }
}
