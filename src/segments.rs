//! Script data model: segments, their content items, and the immutable document.
//!
//! The serde shape of these types is the record format persistence layers use:
//!
//! ```json
//! [
//!   { "id": 1, "title": "HOOK", "duration": 30,
//!     "bullets": [ { "kind": "Bullet", "text": "Open with a question" } ] }
//! ]
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use crate::opts::DEFAULT_DURATION_SECS;

/// Canonical glyph used when a bullet item is displayed.
pub const BULLET_GLYPH: char = '•';

/// Title of the segment substituted when a script yields nothing usable.
pub const PLACEHOLDER_TITLE: &str = "No script loaded";

const PLACEHOLDER_HINT: &str =
    "Supply a script whose segments start with `## ` header lines, then reload.";

/// The kind of a single body line inside a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Bullet,
    Heading,
    Callout,
}

/// One classified body line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub text: String,
}

impl ContentItem {
    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Bullet,
            text: text.into(),
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Heading,
            text: text.into(),
        }
    }

    pub fn callout(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Callout,
            text: text.into(),
        }
    }

    /// Display-ready text; bullets are prefixed with [`BULLET_GLYPH`].
    pub fn display_text(&self) -> String {
        match self.kind {
            ContentKind::Bullet => format!("{BULLET_GLYPH} {}", self.text),
            ContentKind::Heading | ContentKind::Callout => self.text.clone(),
        }
    }
}

/// One timed block of a presentation script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based position in the document.
    pub id: u32,
    pub title: String,
    /// Target duration in whole seconds.
    pub duration: u32,
    #[serde(default)]
    pub bullets: Vec<ContentItem>,
}

impl Segment {
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.duration)
    }
}

/// An ordered, non-empty, immutable sequence of segments.
///
/// Every constructor funnels through [`ScriptDocument::new`], which renumbers ids by
/// position and substitutes the placeholder segment for an empty list. Deserializing
/// additionally rejects records with a zero duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct ScriptDocument {
    segments: Vec<Segment>,
}

impl ScriptDocument {
    /// Build a document, assigning ids `1..=N` in order.
    ///
    /// `default_duration` is only used when `segments` is empty and the placeholder
    /// has to be created.
    pub fn new(segments: Vec<Segment>, default_duration: u32) -> Self {
        if segments.is_empty() {
            return Self::placeholder(default_duration);
        }

        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(idx, mut seg)| {
                seg.id = idx as u32 + 1;
                seg
            })
            .collect();

        Self { segments }
    }

    /// The single-segment fallback document shown when no script could be parsed.
    pub fn placeholder(default_duration: u32) -> Self {
        Self {
            segments: vec![Segment {
                id: 1,
                title: PLACEHOLDER_TITLE.to_owned(),
                duration: default_duration,
                bullets: vec![ContentItem::bullet(PLACEHOLDER_HINT)],
            }],
        }
    }

    /// Whether this document is the fallback produced for unusable input.
    pub fn is_placeholder(&self) -> bool {
        self.segments.len() == 1
            && self.segments[0].title == PLACEHOLDER_TITLE
            && self.segments[0].bullets == [ContentItem::bullet(PLACEHOLDER_HINT)]
    }

    /// Decode the JSON record format.
    ///
    /// Unlike the markup parser this is strict: a record with a zero duration is
    /// rejected because it cannot have come from a valid document.
    pub fn from_json_reader<R: Read>(r: R) -> Result<Self> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn first(&self) -> &Segment {
        // Non-empty by construction.
        &self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.segments.iter().map(|seg| u64::from(seg.duration)).sum()
    }
}

impl TryFrom<Vec<Segment>> for ScriptDocument {
    type Error = Error;

    fn try_from(segments: Vec<Segment>) -> Result<Self> {
        if let Some(seg) = segments.iter().find(|seg| seg.duration == 0) {
            return Err(Error::ZeroDuration {
                id: seg.id,
                title: seg.title.clone(),
            });
        }
        Ok(Self::new(segments, DEFAULT_DURATION_SECS))
    }
}

impl From<ScriptDocument> for Vec<Segment> {
    fn from(doc: ScriptDocument) -> Self {
        doc.segments
    }
}

impl<'a> IntoIterator for &'a ScriptDocument {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
