//! Extended M3U rendering

use crate::models::OutputRecord;

pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// Render the `#EXTINF` line and locator for one channel
pub fn render_entry(record: &OutputRecord) -> String {
    let mut extinf = String::from("#EXTINF:-1");

    extinf.push_str(&format!(
        " tvg-id=\"{}\"",
        attribute_value(record.broadcast_id.as_deref().unwrap_or_default())
    ));
    extinf.push_str(&format!(" tvg-chno=\"{}\"", record.lcn));
    extinf.push_str(&format!(
        " tvg-name=\"{}\"",
        attribute_value(&record.canonical_name)
    ));
    extinf.push_str(&format!(
        " tvg-logo=\"{}\"",
        attribute_value(record.logo_url.as_deref().unwrap_or_default())
    ));
    extinf.push_str(&format!(
        " group-title=\"{}\"",
        attribute_value(&record.category)
    ));
    extinf.push_str(&format!(",{}\n", record.display_label()));

    extinf.push_str(&record.stream_url);
    extinf.push('\n');
    extinf
}

/// Render a whole playlist into memory
pub fn render_playlist(records: &[OutputRecord]) -> String {
    let mut m3u = format!("{PLAYLIST_HEADER}\n");
    for record in records {
        m3u.push_str(&render_entry(record));
    }
    m3u
}

// Quotes would terminate the attribute early
fn attribute_value(value: &str) -> String {
    value.replace('"', "'").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lcn;

    fn record() -> OutputRecord {
        OutputRecord {
            lcn: Lcn(101),
            canonical_name: "Star Plus".to_string(),
            category: "Entertainment".to_string(),
            logo_url: Some("http://logo/star.png".to_string()),
            broadcast_id: Some("StarPlus.in".to_string()),
            stream_url: "http://x/1".to_string(),
        }
    }

    #[test]
    fn test_render_entry() {
        assert_eq!(
            render_entry(&record()),
            "#EXTINF:-1 tvg-id=\"StarPlus.in\" tvg-chno=\"101\" tvg-name=\"Star Plus\" \
             tvg-logo=\"http://logo/star.png\" group-title=\"Entertainment\",101. Star Plus\n\
             http://x/1\n"
        );
    }

    #[test]
    fn test_missing_optional_attributes_render_empty() {
        let record = OutputRecord {
            logo_url: None,
            broadcast_id: None,
            ..record()
        };
        let rendered = render_entry(&record);
        assert!(rendered.starts_with("#EXTINF:-1 tvg-id=\"\" tvg-chno=\"101\""));
        assert!(rendered.contains("tvg-logo=\"\""));
    }

    #[test]
    fn test_quotes_in_values_are_neutralised() {
        let record = OutputRecord {
            canonical_name: "Say \"Hi\"".to_string(),
            ..record()
        };
        assert!(render_entry(&record).contains("tvg-name=\"Say 'Hi'\""));
    }

    #[test]
    fn test_render_playlist_header() {
        let playlist = render_playlist(&[record()]);
        assert!(playlist.starts_with("#EXTM3U\n#EXTINF:-1 "));
        assert_eq!(render_playlist(&[]), "#EXTM3U\n");
    }
}
