//! Channel catalog loading
//!
//! The catalog is the authority on channel identity. It is read once at
//! startup from a JSON file, either `{"channels": [...]}` or a bare array of
//! [`ChannelRecord`]s, and never changes afterwards. Any failure here is fatal
//! for the run.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

pub mod index;

pub use index::{CatalogIndex, IndexOptions};

use crate::errors::{CatalogError, CatalogResult};
use crate::models::ChannelRecord;

/// Read and parse the catalog file
pub async fn load_catalog(path: &Path) -> CatalogResult<Vec<ChannelRecord>> {
    debug!("Reading channel catalog from {}", path.display());

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::io(path, e))?;

    let records = parse_catalog(&contents, path)?;
    info!(
        "Loaded {} channel records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parse catalog JSON, `path` is only used for error reporting
pub fn parse_catalog(contents: &str, path: &Path) -> CatalogResult<Vec<ChannelRecord>> {
    let value: Value = serde_json::from_str(contents).map_err(|e| CatalogError::parse(path, e))?;

    let records_value = match value {
        Value::Object(mut map) if map.contains_key("channels") => {
            map.remove("channels").unwrap_or(Value::Null)
        }
        other => other,
    };

    let records: Vec<ChannelRecord> =
        serde_json::from_value(records_value).map_err(|e| CatalogError::parse(path, e))?;

    if records.is_empty() {
        return Err(CatalogError::Empty);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lcn;
    use std::io::Write;

    #[test]
    fn test_parse_wrapped_catalog() {
        let json = r#"{"channels": [
            {"lcn": 101, "name": "Star Plus", "aliases": ["STAR PLUS HD"], "category": "Entertainment", "tvgIds": ["StarPlus.in"]},
            {"lcn": 5, "name": "DD National", "category": "General"}
        ]}"#;

        let records = parse_catalog(json, Path::new("catalog.json")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity, Lcn(101));
        assert_eq!(records[1].canonical_name, "DD National");
    }

    #[test]
    fn test_parse_bare_array_catalog() {
        let json = r#"[{"lcn": 1, "name": "Colors", "category": "Entertainment"}]"#;
        let records = parse_catalog(json, Path::new("catalog.json")).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_malformed_catalog_is_a_parse_error() {
        let err = parse_catalog(r#"{"channels": [{"name": "No Lcn"}]}"#, Path::new("c.json"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));

        let err = parse_catalog("not json", Path::new("c.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let err = parse_catalog(r#"{"channels": []}"#, Path::new("c.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"channels": [{{"lcn": 42, "name": "Zee News", "category": "News"}}]}}"#
        )
        .unwrap();

        let records = tokio_test::block_on(load_catalog(file.path())).unwrap();
        assert_eq!(records[0].identity, Lcn(42));
    }

    #[tokio::test]
    async fn test_missing_catalog_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
