//! Whole-document JSON loading.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Failure to obtain the root JSON node of a Timeline export.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file is missing, unreadable, or not valid UTF-8.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse the entire document at `path`.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value, DocumentError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Read {} bytes from {}", content.len(), path.display());

    parse_unbounded(&content).map_err(|source| DocumentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse without serde_json's nesting limit, growing the stack on demand.
fn parse_unbounded(content: &str) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(content);
    deserializer.disable_recursion_limit();

    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_document() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        write!(temp, r#"{{"semanticSegments": []}}"#).unwrap();

        let doc = load_document(temp.path()).unwrap();
        assert!(doc["semanticSegments"].is_array());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        write!(temp, "{{\"rawSignals\": [").unwrap();

        let err = load_document(temp.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_load_deeply_nested_document() {
        let depth = 600;
        let json = format!(
            "{}{{\"LatLng\": \"1,2\", \"timestamp\": \"2024-01-01T00:00:00Z\"}}{}",
            "{\"a\": ".repeat(depth),
            "}".repeat(depth)
        );
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(json.as_bytes()).unwrap();

        let doc = load_document(temp.path()).unwrap();
        let mut node = &doc;
        for _ in 0..depth {
            node = &node["a"];
        }
        assert_eq!(node["LatLng"], "1,2");
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        write!(temp, "{{}} extra").unwrap();

        let err = load_document(temp.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn test_load_invalid_utf8() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(&[b'"', 0xff, 0xfe, b'"']).unwrap();

        let err = load_document(temp.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }
}
