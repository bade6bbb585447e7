//! Static asset paths that never consume rate limit quota.

/// Framework-reserved prefixes served straight from the asset pipeline.
pub const DEFAULT_EXEMPT_PREFIXES: &[&str] = &["/_next/static", "/_next/image", "/favicon.ico"];

/// Image, font, style and script extensions.
pub const DEFAULT_EXEMPT_EXTENSIONS: &[&str] = &[
    "svg", "png", "jpg", "jpeg", "gif", "webp", "avif", "ico", "bmp", "woff", "woff2", "ttf",
    "otf", "eot", "css", "js", "mjs", "map",
];

/// Path exemption rules for the edge gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExemptions {
    prefixes: Vec<String>,
    extensions: Vec<String>,
}

impl PathExemptions {
    /// Creates exemption rules from explicit prefixes and extensions.
    ///
    /// Extensions are matched case-insensitively and may be given with or
    /// without a leading dot.
    #[must_use]
    pub fn new(
        prefixes: impl IntoIterator<Item = impl Into<String>>,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|prefix: &String| !prefix.trim().is_empty())
                .collect(),
            extensions: extensions
                .into_iter()
                .map(Into::into)
                .map(|extension: String| extension.trim_start_matches('.').to_ascii_lowercase())
                .filter(|extension| !extension.is_empty())
                .collect(),
        }
    }

    /// Returns whether a request path bypasses rate limiting.
    #[must_use]
    pub fn is_exempt(&self, path: &str) -> bool {
        if self
            .prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return true;
        }

        let last_segment = path.rsplit('/').next().unwrap_or(path);
        let Some((stem, extension)) = last_segment.rsplit_once('.') else {
            return false;
        };
        if stem.is_empty() {
            return false;
        }

        self.extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Returns the configured prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for PathExemptions {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXEMPT_PREFIXES.iter().copied(),
            DEFAULT_EXEMPT_EXTENSIONS.iter().copied(),
        )
    }
}
