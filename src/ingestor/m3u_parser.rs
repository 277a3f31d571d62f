//! Extended M3U playlist parsing
//!
//! Walks the playlist line by line, pairing each `#EXTINF` directive with the
//! locator line that follows it:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1 tvg-id="StarPlus.in" tvg-logo="http://logo/star.png" group-title="GEC",Star Plus HD
//! http://example.com/live/starplus.m3u8
//! ```
//!
//! The display name is everything after the first comma that is not inside a
//! double-quoted attribute value, so labels may themselves contain commas.
//! Malformed entries are skipped, they never abort the playlist.

use std::collections::HashMap;
use std::iter::Enumerate;
use std::str::Lines;
use tracing::debug;

use crate::models::ParsedEntry;
use crate::utils::url::UrlUtils;

/// Prefix of a directive (metadata) line
pub const DIRECTIVE_PREFIX: &str = "#EXTINF";

/// Lazily parse playlist text into entries
///
/// The returned iterator borrows `text` and can be cloned to restart from the
/// current position.
pub fn parse(text: &str) -> PlaylistEntries<'_> {
    PlaylistEntries {
        lines: text.lines().enumerate(),
        state: ParserState::AwaitingMetadata,
        skipped: 0,
    }
}

#[derive(Debug, Clone, Copy)]
enum ParserState<'a> {
    AwaitingMetadata,
    HaveMetadata { directive: &'a str, line_number: usize },
}

/// Iterator over the entries of one playlist
#[derive(Debug, Clone)]
pub struct PlaylistEntries<'a> {
    lines: Enumerate<Lines<'a>>,
    state: ParserState<'a>,
    skipped: usize,
}

impl<'a> PlaylistEntries<'a> {
    /// Locator lines dropped so far because they had no usable directive
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for PlaylistEntries<'a> {
    type Item = ParsedEntry;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, raw_line) in self.lines.by_ref() {
            let line = raw_line.trim();
            let line_number = index + 1;

            if line.is_empty() {
                continue;
            }

            if line.starts_with(DIRECTIVE_PREFIX) {
                if let ParserState::HaveMetadata { line_number: previous, .. } = self.state {
                    debug!(
                        "Directive at line {} has no locator, replaced by line {}",
                        previous, line_number
                    );
                }
                self.state = ParserState::HaveMetadata {
                    directive: line,
                    line_number,
                };
                continue;
            }

            if !UrlUtils::is_stream_locator(line) {
                // Header, comments and other tags
                continue;
            }

            let state = std::mem::replace(&mut self.state, ParserState::AwaitingMetadata);
            match state {
                ParserState::AwaitingMetadata => {
                    debug!("Locator without directive at line {}, skipped", line_number);
                    self.skipped += 1;
                }
                ParserState::HaveMetadata {
                    directive,
                    line_number: directive_line,
                } => match parse_directive(directive) {
                    Some((display_name, attributes)) => {
                        return Some(ParsedEntry {
                            display_name,
                            stream_url: line.to_string(),
                            attributes,
                        });
                    }
                    None => {
                        debug!(
                            "Malformed directive at line {}, entry skipped: {}",
                            directive_line, directive
                        );
                        self.skipped += 1;
                    }
                },
            }
        }
        None
    }
}

/// Split a directive into its display name and attributes
///
/// Returns `None` when there is no label separator or the label is empty.
pub fn parse_directive(directive: &str) -> Option<(String, HashMap<String, String>)> {
    let (attributes_part, label) = split_directive(directive)?;
    if label.is_empty() {
        return None;
    }
    Some((label.to_string(), parse_attributes(attributes_part)))
}

/// Split at the first comma outside a quoted value
///
/// When the quotes never balance, the first comma of any kind separates the
/// label instead.
fn split_directive(directive: &str) -> Option<(&str, &str)> {
    let body = directive.strip_prefix(DIRECTIVE_PREFIX)?;
    let body = body.strip_prefix(':').unwrap_or(body);

    let mut in_quotes = false;
    for (position, ch) in body.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                return Some((&body[..position], body[position + 1..].trim()));
            }
            _ => {}
        }
    }

    if !in_quotes {
        return None;
    }
    let position = body.find(',')?;
    Some((&body[..position], body[position + 1..].trim()))
}

/// Parse `key="value"` pairs; the leading duration token is ignored
fn parse_attributes(attributes_part: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();

    let mut chars = attributes_part.chars().peekable();
    let mut current_key = String::new();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut in_key = false;
    let mut in_value = false;

    while let Some(ch) = chars.next() {
        match ch {
            ' ' | '\t' if !in_quotes => {
                if in_value && !current_key.is_empty() && !current_value.is_empty() {
                    // End of unquoted value
                    attributes.insert(current_key.to_lowercase(), current_value.clone());
                }
                current_key.clear();
                current_value.clear();
                in_key = true;
                in_value = false;
            }
            '=' if !in_quotes && in_key => {
                in_key = false;
                in_value = true;
                if chars.peek() == Some(&'"') {
                    chars.next();
                    in_quotes = true;
                }
            }
            '"' if in_value => {
                in_quotes = false;
                if !current_key.is_empty() {
                    attributes.insert(current_key.to_lowercase(), current_value.trim().to_string());
                }
                current_key.clear();
                current_value.clear();
                in_value = false;
            }
            _ => {
                if in_key {
                    current_key.push(ch);
                } else if in_value {
                    current_value.push(ch);
                }
            }
        }
    }

    if in_value && !in_quotes && !current_key.is_empty() && !current_value.is_empty() {
        attributes.insert(current_key.to_lowercase(), current_value);
    }

    attributes
}
