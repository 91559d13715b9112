//! Host page detection.

use crate::tracker::constants::FALLBACK_PAGE_PATH;

/// The page a tracker reports on: its full URL and its path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLocation {
    href: String,
    pathname: String,
}

impl PageLocation {
    pub fn new(href: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            pathname: pathname.into(),
        }
    }

    /// Derives the path from an absolute URL. Returns `None` when `href` does not parse.
    pub fn from_href(href: &str) -> Option<Self> {
        let parsed = url::Url::parse(href).ok()?;
        let pathname = match parsed.path() {
            "" => FALLBACK_PAGE_PATH.to_string(),
            path => path.to_string(),
        };
        Some(Self::new(href, pathname))
    }

    /// Resolves `url` against this page the way a browser resolves a `fetch` argument.
    /// Absolute URLs come back unchanged; `None` when either side does not parse.
    pub fn resolve(&self, url: &str) -> Option<String> {
        if url::Url::parse(url).is_ok() {
            return Some(url.to_string());
        }
        let base = url::Url::parse(&self.href).ok()?;
        base.join(url).ok().map(String::from)
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }
}

/// Returns the location of the current document when running in a browser window.
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub fn current_page_location() -> Option<PageLocation> {
    let location = web_sys::window()?.location();
    let href = location.href().ok()?;
    let pathname = location
        .pathname()
        .unwrap_or_else(|_| FALLBACK_PAGE_PATH.to_string());
    Some(PageLocation::new(href, pathname))
}

/// Native targets have no current document.
#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
pub fn current_page_location() -> Option<PageLocation> {
    None
}
