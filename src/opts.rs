/// Duration given to segments whose header carries no usable annotation.
pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Options that control how script markup is parsed.
///
/// This is library-level configuration. The CLI and the TOML config layer map user input
/// into this type; historical markup dialects differ only in these values, never in code
/// paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Duration (seconds) used when a header has no annotation or a malformed one.
    ///
    /// Always at least one second.
    pub default_duration_secs: u32,

    /// Line prefix that starts a new segment (default `"## "`).
    pub header_marker: String,

    /// Prefixes that mark a bullet line (default `"- "` and `"• "`).
    pub bullet_markers: Vec<String>,

    /// Prefix that marks a sub-heading line (default `"### "`).
    pub heading_marker: String,

    /// Literal prefix that marks a callout line (default `"**Query"`).
    pub callout_prefix: String,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_DURATION_SECS,
            header_marker: "## ".to_owned(),
            bullet_markers: vec!["- ".to_owned(), "• ".to_owned()],
            heading_marker: "### ".to_owned(),
            callout_prefix: "**Query".to_owned(),
        }
    }
}

impl Opts {
    /// Set the fallback duration; zero is clamped to one second.
    pub fn with_default_duration(mut self, secs: u32) -> Self {
        self.default_duration_secs = secs.max(1);
        self
    }

    pub fn with_header_marker(mut self, marker: impl Into<String>) -> Self {
        self.header_marker = marker.into();
        self
    }

    pub fn with_bullet_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullet_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_heading_marker(mut self, marker: impl Into<String>) -> Self {
        self.heading_marker = marker.into();
        self
    }

    pub fn with_callout_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.callout_prefix = prefix.into();
        self
    }

    /// Stable text form of every field, used to key cached parse results.
    pub(crate) fn fingerprint(&self) -> String {
        format!(
            "d={};h={:?};b={:?};s={:?};c={:?}",
            self.default_duration_secs,
            self.header_marker,
            self.bullet_markers,
            self.heading_marker,
            self.callout_prefix
        )
    }
}
