//! Playlist ingestion
//!
//! Fetching is behind the [`PlaylistFetcher`] trait so the pipeline only sees
//! `fetch(url) -> text | error`. [`HttpPlaylistFetcher`] is the production
//! implementation; tests substitute in-memory fetchers.

use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod m3u_parser;

use crate::config::{HttpConfig, SourcesConfig};
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::utils::url::UrlUtils;

/// A playlist locator and its priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSource {
    /// 0 is the highest priority
    pub rank: usize,
    pub url: String,
}

/// Retrieves raw playlist text
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> SourceResult<String>;
}

/// Fetches `http(s)://` playlists with reqwest and `file://` playlists from disk
pub struct HttpPlaylistFetcher {
    client: Client,
}

impl HttpPlaylistFetcher {
    pub fn new(config: &HttpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_http(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::timeout(safe_url.clone())
            } else {
                SourceError::request(
                    safe_url.clone(),
                    UrlUtils::obfuscate_credentials(&e.to_string()),
                )
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::http(status.as_u16(), safe_url));
        }

        let content = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::timeout(safe_url.clone())
            } else {
                SourceError::body(safe_url.clone(), e.to_string())
            }
        })?;

        debug!("Fetched {} bytes from {}", content.len(), safe_url);
        Ok(content)
    }

    async fn fetch_file(&self, url: &str) -> SourceResult<String> {
        let path = url
            .strip_prefix("file://")
            .ok_or_else(|| SourceError::UnsupportedLocator {
                url: url.to_string(),
            })?;

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::body(url, e.to_string()))
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch(&self, url: &str) -> SourceResult<String> {
        if UrlUtils::is_stream_locator(url) {
            self.fetch_http(url).await
        } else if url.starts_with("file://") {
            self.fetch_file(url).await
        } else {
            Err(SourceError::UnsupportedLocator {
                url: UrlUtils::obfuscate_credentials(url),
            })
        }
    }
}

/// Assemble the ordered source list: inline URLs first, then the list file
pub async fn load_sources(config: &SourcesConfig) -> AppResult<Vec<PlaylistSource>> {
    let mut urls: Vec<String> = config
        .urls
        .iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    if let Some(list_file) = &config.list_file {
        match read_source_list(list_file).await {
            Ok(listed) => urls.extend(listed),
            Err(e) if urls.is_empty() => return Err(e),
            Err(e) => warn!("Ignoring source list {}: {}", list_file.display(), e),
        }
    }

    urls.retain(|url| {
        let valid = UrlUtils::is_valid(url);
        if !valid {
            warn!("Ignoring invalid playlist locator: {}", UrlUtils::obfuscate_credentials(url));
        }
        valid
    });

    if urls.is_empty() {
        return Err(AppError::configuration("No playlist sources configured"));
    }

    let sources: Vec<PlaylistSource> = urls
        .into_iter()
        .enumerate()
        .map(|(rank, url)| PlaylistSource { rank, url })
        .collect();

    info!("Using {} playlist sources", sources.len());
    Ok(sources)
}

/// One locator per line, blank lines and `#` comments ignored
pub async fn read_source_list(path: &Path) -> AppResult<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::configuration(format!(
            "Cannot read source list {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(parse_source_list(&contents))
}

pub fn parse_source_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
