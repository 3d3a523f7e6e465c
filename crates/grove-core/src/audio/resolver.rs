//! The video-resolution service boundary.
//!
//! Turns a watch URL, a free-text search, or a playlist pick into a
//! playable stream reference plus display title. The shipped implementation
//! scrapes the public YouTube endpoints over reqwest; it runs on the
//! resolution worker thread, never on the control loop, and drives its own
//! current-thread runtime.

use rand::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ResolutionError;

/// A named playlist the radio can rotate through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveRequest {
    /// A pasted watch URL.
    Url(String),
    /// Free-text search; the first result wins.
    Query(String),
    /// A random entry out of a playlist.
    PlaylistPick(PlaylistRef),
}

/// What the service hands back: a stream reference the playback backend
/// can open, plus a title for the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub uri: String,
    pub title: String,
}

pub trait StreamResolver: Send + Sync {
    fn resolve(&self, request: &ResolveRequest) -> Result<ResolvedStream, ResolutionError>;
}

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub struct YoutubeResolver {
    base: String,
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    video_id: Regex,
    page_title: Regex,
}

impl YoutubeResolver {
    pub fn new() -> Result<Self, std::io::Error> {
        Self::with_base("https://www.youtube.com")
    }

    /// Point at a different host (tests use a local mock server).
    pub fn with_base(base: &str) -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            runtime,
            client,
            video_id: Regex::new(r"watch\?v=([A-Za-z0-9_-]{11})").unwrap(),
            page_title: Regex::new(r"<title>([^<]*)</title>").unwrap(),
        })
    }

    fn get_text(&self, url: &str) -> Result<String, ResolutionError> {
        self.runtime.block_on(async {
            let resp = self.client.get(url).send().await?.error_for_status()?;
            Ok(resp.text().await?)
        })
    }

    fn watch_url(&self, id: &str) -> String {
        format!("{}/watch?v={id}", self.base)
    }

    /// Best-effort page title; falls back to the id when the page gives
    /// nothing usable.
    fn title_for(&self, watch_url: &str, id: &str) -> String {
        let Ok(body) = self.get_text(watch_url) else {
            return id.to_string();
        };
        let Some(cap) = self.page_title.captures(&body) else {
            return id.to_string();
        };
        let raw = cap[1].trim().trim_end_matches(" - YouTube").trim();
        let title = raw
            .replace("&amp;", "&")
            .replace("&#39;", "'")
            .replace("&quot;", "\"");
        if title.is_empty() {
            id.to_string()
        } else {
            title
        }
    }

    fn resolve_id(&self, id: &str) -> ResolvedStream {
        let uri = self.watch_url(id);
        let title = self.title_for(&uri, id);
        ResolvedStream { uri, title }
    }
}

impl StreamResolver for YoutubeResolver {
    fn resolve(&self, request: &ResolveRequest) -> Result<ResolvedStream, ResolutionError> {
        match request {
            ResolveRequest::Url(input) => {
                let id = self
                    .video_id
                    .captures(input)
                    .map(|c| c[1].to_string())
                    .ok_or_else(|| ResolutionError::BadUrl(input.clone()))?;
                Ok(self.resolve_id(&id))
            }
            ResolveRequest::Query(query) => {
                let url = format!(
                    "{}/results?search_query={}",
                    self.base,
                    urlencoding::encode(query)
                );
                let body = self.get_text(&url)?;
                let id = self
                    .video_id
                    .captures(&body)
                    .map(|c| c[1].to_string())
                    .ok_or_else(|| ResolutionError::NoResults(query.clone()))?;
                Ok(self.resolve_id(&id))
            }
            ResolveRequest::PlaylistPick(playlist) => {
                let body = self.get_text(&playlist.url)?;
                let mut ids: Vec<String> = Vec::new();
                for cap in self.video_id.captures_iter(&body) {
                    let id = cap[1].to_string();
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                let id = ids
                    .choose(&mut rand::thread_rng())
                    .cloned()
                    .ok_or_else(|| ResolutionError::EmptyPlaylist(playlist.name.clone()))?;
                Ok(self.resolve_id(&id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn resolver(server: &mockito::ServerGuard) -> YoutubeResolver {
        YoutubeResolver::with_base(&server.url()).unwrap()
    }

    #[test]
    fn query_resolves_first_search_hit() {
        let mut server = mockito::Server::new();
        let _results = server
            .mock("GET", "/results")
            .match_query(Matcher::UrlEncoded("search_query".into(), "lofi beats".into()))
            .with_body(r#"... "url":"/watch?v=abcDEF12345" ... watch?v=otherVID000 ..."#)
            .create();
        let _watch = server
            .mock("GET", "/watch")
            .match_query(Matcher::UrlEncoded("v".into(), "abcDEF12345".into()))
            .with_body("<html><title>Lofi Beats To Focus - YouTube</title></html>")
            .create();

        let r = resolver(&server);
        let stream = r
            .resolve(&ResolveRequest::Query("lofi beats".into()))
            .unwrap();
        assert!(stream.uri.ends_with("/watch?v=abcDEF12345"));
        assert_eq!(stream.title, "Lofi Beats To Focus");
    }

    #[test]
    fn url_with_no_video_id_is_rejected() {
        let server = mockito::Server::new();
        let r = resolver(&server);
        let err = r
            .resolve(&ResolveRequest::Url("https://example.com/nothing".into()))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::BadUrl(_)));
    }

    #[test]
    fn empty_search_results_report_no_results() {
        let mut server = mockito::Server::new();
        let _results = server
            .mock("GET", "/results")
            .match_query(Matcher::Any)
            .with_body("<html>no videos here</html>")
            .create();
        let r = resolver(&server);
        let err = r
            .resolve(&ResolveRequest::Query("xyzzy".into()))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NoResults(_)));
    }

    #[test]
    fn playlist_pick_draws_from_page_ids() {
        let mut server = mockito::Server::new();
        let _playlist = server
            .mock("GET", "/playlist")
            .match_query(Matcher::Any)
            .with_body("watch?v=aaaaaaaaaaa watch?v=bbbbbbbbbbb watch?v=aaaaaaaaaaa")
            .expect_at_least(1)
            .create();
        let _watch = server
            .mock("GET", "/watch")
            .match_query(Matcher::Any)
            .with_body("<title>Track - YouTube</title>")
            .create();

        let r = resolver(&server);
        let playlist = PlaylistRef {
            name: "test".into(),
            url: format!("{}/playlist?list=PL123", server.url()),
        };
        let stream = r
            .resolve(&ResolveRequest::PlaylistPick(playlist))
            .unwrap();
        assert!(
            stream.uri.ends_with("watch?v=aaaaaaaaaaa")
                || stream.uri.ends_with("watch?v=bbbbbbbbbbb")
        );
    }

    #[test]
    fn empty_playlist_is_an_error() {
        let mut server = mockito::Server::new();
        let _playlist = server
            .mock("GET", "/playlist")
            .match_query(Matcher::Any)
            .with_body("<html>nothing</html>")
            .create();
        let r = resolver(&server);
        let playlist = PlaylistRef {
            name: "empty".into(),
            url: format!("{}/playlist?list=PL000", server.url()),
        };
        let err = r
            .resolve(&ResolveRequest::PlaylistPick(playlist))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::EmptyPlaylist(_)));
    }

    #[test]
    fn network_failure_surfaces_as_network_error() {
        // Point at a closed port.
        let r = YoutubeResolver::with_base("http://127.0.0.1:1").unwrap();
        let err = r
            .resolve(&ResolveRequest::Query("anything".into()))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Network(_)));
    }
}
