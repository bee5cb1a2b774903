//! Development sidecar caches for generated Markdown and HTML.
//!
//! When enabled, a cached file short-circuits the expensive stage that would
//! have produced it. Cache failures never fail an item.

use crate::config::Settings;
use crate::render::sanitize_component;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
enum Kind {
    Markdown,
    Html,
}

impl Kind {
    fn extension(self) -> &'static str {
        match self {
            Kind::Markdown => "md",
            Kind::Html => "html",
        }
    }
}

/// Per-identifier cache of intermediate documents.
#[derive(Debug, Clone)]
pub struct GuideCache {
    dir: PathBuf,
    markdown: bool,
    html: bool,
}

impl GuideCache {
    pub fn new(dir: PathBuf, markdown: bool, html: bool) -> Self {
        Self {
            dir,
            markdown,
            html,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.cache_dir(),
            settings.cache.enable_markdown_cache,
            settings.cache.enable_html_cache,
        )
    }

    pub fn path_for_markdown(&self, identifier: &str) -> PathBuf {
        self.path(identifier, Kind::Markdown)
    }

    pub fn path_for_html(&self, identifier: &str) -> PathBuf {
        self.path(identifier, Kind::Html)
    }

    pub fn load_markdown(&self, identifier: &str) -> Option<String> {
        self.markdown
            .then(|| self.load(identifier, Kind::Markdown))
            .flatten()
    }

    pub fn store_markdown(&self, identifier: &str, markdown: &str) {
        if self.markdown {
            self.store(identifier, Kind::Markdown, markdown);
        }
    }

    pub fn load_html(&self, identifier: &str) -> Option<String> {
        self.html.then(|| self.load(identifier, Kind::Html)).flatten()
    }

    pub fn store_html(&self, identifier: &str, html: &str) {
        if self.html {
            self.store(identifier, Kind::Html, html);
        }
    }

    fn path(&self, identifier: &str, kind: Kind) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_component(identifier), kind.extension()))
    }

    fn load(&self, identifier: &str, kind: Kind) -> Option<String> {
        let path = self.path(identifier, kind);
        match std::fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => {
                debug!("Cache hit: {}", path.display());
                Some(content)
            }
            Ok(_) => None,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn store(&self, identifier: &str, kind: Kind, content: &str) {
        let path = self.path(identifier, kind);
        let result = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, content));
        match result {
            Ok(()) => debug!("Cached {}", path.display()),
            Err(e) => warn!("Failed to write cache file {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_cache_never_hits() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GuideCache::new(dir.path().to_path_buf(), false, false);
        cache.store_markdown("abc", "# Guide");
        assert!(!cache.path_for_markdown("abc").exists());
        assert!(cache.load_markdown("abc").is_none());
    }

    #[test]
    fn test_markdown_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GuideCache::new(dir.path().join("cache"), true, false);

        assert!(cache.load_markdown("dQw4w9WgXcQ").is_none());
        cache.store_markdown("dQw4w9WgXcQ", "# Guide");
        assert_eq!(cache.load_markdown("dQw4w9WgXcQ").as_deref(), Some("# Guide"));
        assert!(dir.path().join("cache/dQw4w9WgXcQ.md").exists());

        // HTML cache is independent.
        cache.store_html("dQw4w9WgXcQ", "<html>");
        assert!(cache.load_html("dQw4w9WgXcQ").is_none());
    }

    #[test]
    fn test_blank_cache_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GuideCache::new(dir.path().to_path_buf(), false, true);
        std::fs::write(cache.path_for_html("sermon"), "  \n").unwrap();
        assert!(cache.load_html("sermon").is_none());
    }
}
