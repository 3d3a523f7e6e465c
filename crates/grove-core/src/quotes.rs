//! Decorative quote provider.
//!
//! One quote per line in a UTF-8 text file; a user file under the config
//! directory overrides the built-in set. Purely decorative -- never
//! mutates session state, never fails the caller.

use std::path::{Path, PathBuf};

use rand::prelude::*;
use tracing::debug;

const BUILTIN_QUOTES: &str = include_str!("quotes.txt");

#[derive(Debug, Clone)]
pub struct QuoteSource {
    quotes: Vec<String>,
}

impl QuoteSource {
    /// Load from `path` if it has any usable lines, else fall back to the
    /// built-in set.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(p) = path {
            match std::fs::read_to_string(p) {
                Ok(content) => {
                    let quotes: Vec<String> = content
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(String::from)
                        .collect();
                    if !quotes.is_empty() {
                        return Self { quotes };
                    }
                    debug!(path = %p.display(), "quote file has no usable lines");
                }
                Err(err) => {
                    debug!(path = %p.display(), %err, "quote file unreadable");
                }
            }
        }
        Self::builtin()
    }

    pub fn builtin() -> Self {
        Self {
            quotes: BUILTIN_QUOTES
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn random_quote(&self) -> String {
        self.quotes
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }

    /// Default user override location: `<data_dir>/qts.txt`.
    pub fn user_file(data_dir: &Path) -> PathBuf {
        data_dir.join("qts.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_set_is_nonempty() {
        let src = QuoteSource::builtin();
        assert!(!src.random_quote().is_empty());
    }

    #[test]
    fn user_file_overrides_builtin() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "only quote").unwrap();
        let src = QuoteSource::load(Some(f.path()));
        assert_eq!(src.random_quote(), "only quote");
    }

    #[test]
    fn empty_user_file_falls_back() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let src = QuoteSource::load(Some(f.path()));
        assert!(!src.random_quote().is_empty());
    }

    #[test]
    fn missing_user_file_falls_back() {
        let src = QuoteSource::load(Some(Path::new("/nonexistent/qts.txt")));
        assert!(!src.random_quote().is_empty());
    }
}
