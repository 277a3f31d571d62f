/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Catalog defaults
pub const DEFAULT_CATALOG_PATH: &str = "./indian-channels.json";
pub const DEFAULT_INDEX_BROADCAST_IDS: bool = true;

// Source defaults
pub const DEFAULT_SOURCE_LIST_FILE: &str = "./playlists.txt";

// Output defaults
pub const DEFAULT_OUTPUT_PATH: &str = "./output/final.m3u";

// HTTP defaults
pub const DEFAULT_USER_AGENT: &str = "OTT Navigator/1.6.5 (Linux;Android 12)";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_ACCEPT_INVALID_CERTS: bool = false;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

// Validation defaults
pub const DEFAULT_VALIDATION_ENABLED: bool = true;
pub const DEFAULT_VALIDATION_CONCURRENCY: usize = 20;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

// Matching defaults
pub const DEFAULT_FUZZY_MATCHING: bool = false;
pub const DEFAULT_MIN_FUZZY_KEY_LEN: usize = 4;
pub const DEFAULT_MATCH_TVG_ID: bool = true;

// Normalizer defaults
/// Leading language/region tags such as `IN: `, `UK | ` or `[HINDI] `
pub const DEFAULT_PREFIX_PATTERNS: &[&str] =
    &[r"^\s*[A-Z]{2,3}\s*[:|]\s*", r"^\s*\[[^\]]*\]\s*"];

/// Applied in order, each one over the whole string before the next
pub const DEFAULT_SUBSTITUTIONS: &[(&str, &str)] = &[("&", " AND "), ("+", " PLUS ")];

/// Quality, format and feed markers removed as whole words
pub const DEFAULT_NOISE_WORDS: &[&str] = &[
    "HD", "FHD", "UHD", "SD", "4K", "8K", "HEVC", "H264", "H265", "720P", "1080P", "2160P", "HDR",
    "BACKUP", "ALT", "VIP", "LIVE", "TV", "CHANNEL",
];
