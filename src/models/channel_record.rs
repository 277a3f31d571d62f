use serde::{Deserialize, Serialize};

use super::Lcn;

/// A canonical channel from the catalog
///
/// Field names follow the catalog JSON format:
///
/// ```json
/// { "lcn": 101, "name": "Star Plus", "aliases": ["STAR PLUS HD"],
///   "category": "Entertainment", "logo": "http://...", "tvgIds": ["StarPlus.in"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    #[serde(rename = "lcn")]
    pub identity: Lcn,
    #[serde(rename = "name")]
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub category: String,
    #[serde(default, rename = "logo", alias = "logoUrl")]
    pub logo_url: Option<String>,
    /// Guide identifiers, the first one is the record's broadcast id
    #[serde(default, rename = "tvgIds")]
    pub broadcast_ids: Vec<String>,
}

impl ChannelRecord {
    pub fn new<N: Into<String>, C: Into<String>>(
        identity: u32,
        canonical_name: N,
        category: C,
    ) -> Self {
        Self {
            identity: Lcn(identity),
            canonical_name: canonical_name.into(),
            aliases: Vec::new(),
            category: category.into(),
            logo_url: None,
            broadcast_ids: Vec::new(),
        }
    }

    pub fn with_alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_logo<S: Into<String>>(mut self, logo_url: S) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    pub fn with_broadcast_id<S: Into<String>>(mut self, broadcast_id: S) -> Self {
        self.broadcast_ids.push(broadcast_id.into());
        self
    }

    pub fn broadcast_id(&self) -> Option<&str> {
        self.broadcast_ids
            .iter()
            .map(|id| id.trim())
            .find(|id| !id.is_empty())
    }

    /// Canonical name followed by every alias
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog_record() {
        let json = r#"{
            "lcn": 101,
            "name": "Star Plus",
            "aliases": ["STAR PLUS HD", "Star+"],
            "category": "Entertainment",
            "logo": "http://logos/starplus.png",
            "tvgIds": ["StarPlus.in", "starplus"]
        }"#;

        let record: ChannelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.identity, Lcn(101));
        assert_eq!(record.canonical_name, "Star Plus");
        assert_eq!(record.aliases.len(), 2);
        assert_eq!(record.logo_url.as_deref(), Some("http://logos/starplus.png"));
        assert_eq!(record.broadcast_id(), Some("StarPlus.in"));
    }

    #[test]
    fn test_optional_fields_default() {
        let record: ChannelRecord =
            serde_json::from_str(r#"{"lcn": 7, "name": "DD News", "category": "News"}"#).unwrap();
        assert!(record.aliases.is_empty());
        assert!(record.logo_url.is_none());
        assert!(record.broadcast_id().is_none());
    }

    #[test]
    fn test_missing_category_is_rejected() {
        let result = serde_json::from_str::<ChannelRecord>(r#"{"lcn": 7, "name": "DD News"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_names_yields_canonical_first() {
        let record = ChannelRecord::new(1, "Colors", "Entertainment").with_alias("Colors HD");
        let names: Vec<_> = record.names().collect();
        assert_eq!(names, vec!["Colors", "Colors HD"]);
    }
}
