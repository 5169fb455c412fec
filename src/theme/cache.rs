use crate::foundation::core::ThemeKey;
use crate::theme::model::RuntimeTheme;
use std::collections::HashMap;

/// Hit/miss counters, handy for asserting cache coherency in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Resolution caches: runtime theme by key, and page id to theme key.
///
/// Entries never expire; they are dropped only through [`ThemeCache::invalidate_page`],
/// [`ThemeCache::invalidate_theme`], or [`ThemeCache::clear`].
#[derive(Debug, Default)]
pub struct ThemeCache {
    themes: HashMap<ThemeKey, RuntimeTheme>,
    pages: HashMap<String, ThemeKey>,
    stats: CacheStats,
}

impl ThemeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to a pristine state, counters included.
    pub fn init(&mut self) {
        *self = Self::default();
    }

    /// Drop every entry but keep counters.
    pub fn clear(&mut self) {
        self.themes.clear();
        self.pages.clear();
    }

    /// Runtime theme currently cached for `page_id`, if both halves are present.
    pub fn page_theme(&mut self, page_id: &str) -> Option<&RuntimeTheme> {
        let hit = self
            .pages
            .get(page_id)
            .and_then(|key| self.themes.get(key));
        match hit {
            Some(theme) => {
                self.stats.hits += 1;
                Some(theme)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn theme(&self, key: &ThemeKey) -> Option<&RuntimeTheme> {
        self.themes.get(key)
    }

    pub fn page_key(&self, page_id: &str) -> Option<&ThemeKey> {
        self.pages.get(page_id)
    }

    pub fn put_theme(&mut self, key: ThemeKey, theme: RuntimeTheme) {
        self.themes.insert(key, theme);
    }

    /// Record `page_id -> key` and the theme itself.
    pub fn bind_page(&mut self, page_id: &str, key: ThemeKey, theme: RuntimeTheme) {
        self.themes.insert(key.clone(), theme);
        self.pages.insert(page_id.to_string(), key);
    }

    pub fn invalidate_page(&mut self, page_id: &str) {
        self.pages.remove(page_id);
    }

    /// Drop a theme and every page bound to it.
    pub fn invalidate_theme(&mut self, key: &ThemeKey) {
        self.themes.remove(key);
        self.pages.retain(|_, k| k != key);
    }

    /// Drop a base theme, every cached variation derived from it, and their page bindings.
    ///
    /// Variation entries carry the parent's category, so they go stale with the parent.
    pub fn invalidate_theme_family(&mut self, theme_id: &str) {
        let stale = self
            .themes
            .iter()
            .filter(|(key, theme)| match key {
                ThemeKey::Theme(id) => id == theme_id,
                ThemeKey::Variation(_) => theme.parent_theme_id.as_deref() == Some(theme_id),
            })
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        for key in &stale {
            self.invalidate_theme(key);
        }
    }

    /// Pages currently bound to a cached theme.
    pub fn cached_pages(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/cache.rs"]
mod tests;
