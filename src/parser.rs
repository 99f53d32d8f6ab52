//! Script markup → [`ScriptDocument`].
//!
//! The grammar is line based:
//! - a header line (`## ...`) opens a segment; text before the first header is discarded
//! - body lines are classified as bullet, sub-heading or callout; anything else is dropped
//!
//! Parsing never fails. Unusable input produces the placeholder document and the
//! problems found along the way are reported as [`ParseIssue`]s.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::opts::Opts;
use crate::segments::{ContentItem, ScriptDocument, Segment};

// The value may not end in a letter, so `(500 milliseconds)` is not an annotation.
static RE_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(\s*((?:[^()]*?[^()\p{L}])?)\s*seconds?\s*\)").unwrap()
});
static RE_NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\s*[:.)]\s*").unwrap());

const RULE_GLYPHS: &[char] = &['-', '*', '_', '=', '─', '━', '═', '—', '–'];

/// A recoverable problem found while parsing. None of these abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
    #[error("script text is empty")]
    EmptyInput,

    #[error("no segment header found")]
    NoSegmentsFound,

    #[error("malformed segment header on line {line} ({header:?}): {reason}")]
    MalformedHeader {
        /// 1-based source line.
        line: usize,
        header: String,
        reason: String,
    },
}

/// Result of [`SegmentParser::parse_with_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub document: ScriptDocument,
    pub issues: Vec<ParseIssue>,
}

/// Stateless parser over a fixed set of [`Opts`].
#[derive(Debug, Clone, Default)]
pub struct SegmentParser {
    opts: Opts,
}

impl SegmentParser {
    pub fn new(opts: Opts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Parse raw script text into a document.
    pub fn parse(&self, text: &str) -> ScriptDocument {
        self.parse_with_report(text).document
    }

    /// Parse and also return the issues that were absorbed.
    pub fn parse_with_report(&self, text: &str) -> ParseReport {
        let default_duration = self.opts.default_duration_secs.max(1);
        let mut issues = Vec::new();

        if text.trim().is_empty() {
            warn!("script text is empty; using placeholder document");
            issues.push(ParseIssue::EmptyInput);
            return ParseReport {
                document: ScriptDocument::placeholder(default_duration),
                issues,
            };
        }

        let mut segments: Vec<Segment> = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if let Some(header) = self.header_text(line) {
                let id = segments.len() as u32 + 1;
                let (segment, issue) = self.parse_header(id, idx + 1, header);
                if let Some(issue) = issue {
                    warn!(%issue, "recovered from malformed header");
                    issues.push(issue);
                }
                segments.push(segment);
                continue;
            }

            // Preamble lines have no segment to land in.
            let Some(current) = segments.last_mut() else {
                continue;
            };
            if let Some(item) = self.classify(line) {
                current.bullets.push(item);
            }
        }

        if segments.is_empty() {
            warn!("no segment header found; using placeholder document");
            issues.push(ParseIssue::NoSegmentsFound);
        }

        let document = ScriptDocument::new(segments, default_duration);
        debug!(
            segments = document.len(),
            total_secs = document.total_duration_secs(),
            issues = issues.len(),
            "parsed script"
        );

        ParseReport { document, issues }
    }

    /// Returns the header text (marker removed) if `line` opens a segment.
    fn header_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(self.opts.header_marker.as_str()) {
            return Some(rest);
        }
        // A bare marker (`##`) with nothing after it still opens a segment.
        let bare = self.opts.header_marker.trim_end();
        if !bare.is_empty() && trimmed.trim_end() == bare {
            return Some("");
        }
        None
    }

    fn parse_header(&self, id: u32, line: usize, header: &str) -> (Segment, Option<ParseIssue>) {
        let default_duration = self.opts.default_duration_secs.max(1);
        let raw = header.trim();
        let mut problems: Vec<String> = Vec::new();

        // The trailing annotation wins; earlier ones stay in the title.
        let (duration, without_duration) = match RE_DURATION.captures_iter(raw).last() {
            Some(caps) => {
                let value = caps.get(1).map_or("", |m| m.as_str().trim());
                let duration = match value.parse::<u32>() {
                    Ok(0) => {
                        problems.push("duration must be positive".to_owned());
                        default_duration
                    }
                    Ok(secs) => secs,
                    Err(_) => {
                        problems.push(format!("unparsable duration {value:?}"));
                        default_duration
                    }
                };
                let whole = caps.get_match();
                let rest = format!("{} {}", &raw[..whole.start()], &raw[whole.end()..]);
                (duration, rest)
            }
            None => (default_duration, raw.to_owned()),
        };

        let stripped = RE_NUMERIC_PREFIX.replace(&without_duration, "");
        let mut title = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            problems.push("empty title".to_owned());
            title = if raw.is_empty() {
                format!("Segment {id}")
            } else {
                raw.split_whitespace().collect::<Vec<_>>().join(" ")
            };
        }

        let issue = (!problems.is_empty()).then(|| ParseIssue::MalformedHeader {
            line,
            header: raw.to_owned(),
            reason: problems.join("; "),
        });

        let segment = Segment {
            id,
            title,
            duration,
            bullets: Vec::new(),
        };
        (segment, issue)
    }

    /// Classify one body line. First matching rule wins; `None` drops the line.
    fn classify(&self, line: &str) -> Option<ContentItem> {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_rule(trimmed) {
            return None;
        }

        let lead = line.trim_start();
        if let Some(rest) = self
            .opts
            .bullet_markers
            .iter()
            .find_map(|marker| lead.strip_prefix(marker.as_str()))
        {
            let text = rest.trim();
            return (!text.is_empty()).then(|| ContentItem::bullet(text));
        }

        if let Some(rest) = lead.strip_prefix(self.opts.heading_marker.as_str()) {
            let text = rest.trim();
            return (!text.is_empty()).then(|| ContentItem::heading(text.to_uppercase()));
        }

        if !self.opts.callout_prefix.is_empty() && trimmed.starts_with(&self.opts.callout_prefix) {
            return Some(ContentItem::callout(trimmed));
        }

        None
    }
}

/// A line made only of rule glyphs (at least three), optionally spaced.
fn is_rule(trimmed: &str) -> bool {
    let mut glyphs = 0usize;
    for ch in trimmed.chars() {
        if RULE_GLYPHS.contains(&ch) {
            glyphs += 1;
        } else if !ch.is_whitespace() {
            return false;
        }
    }
    glyphs >= 3
}

/// Parse with default [`Opts`].
pub fn parse(text: &str) -> ScriptDocument {
    SegmentParser::default().parse(text)
}
