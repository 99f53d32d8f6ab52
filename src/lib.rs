//! `prompter`: a teleprompter engine.
//!
//! This crate provides:
//! - A segment parser turning loosely structured script text into a typed document
//! - A deterministic countdown/navigation controller driven by external ticks
//! - Progress projections (ratio, urgency threshold, clock text) for renderers
//! - Pluggable output encoders (JSON records, script markup) and a document cache
//!
//! Rendering, input handling and file watching belong to the caller. The engine performs
//! no IO of its own except where a caller asks for it (`Prompter::load_path`, the cache).

// High-level API (most consumers should start here).
pub mod opts;
pub mod prompter;

// Script data model and parsing.
pub mod parser;
pub mod segments;

// Playback state machine and its read-only projections.
pub mod playback;
pub mod progress;

// Output selection and encoder interfaces.
pub mod output_type;
pub mod segment_encoder;

// Output encoders that serialize segments into various formats.
pub mod json_array_encoder;
pub mod markup_encoder;

// Persistence and configuration.
pub mod cache;
pub mod config;

// Async host for the controller.
#[cfg(feature = "runtime")]
pub mod driver;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use error::{Error, Result};
pub use opts::{DEFAULT_DURATION_SECS, Opts};
pub use output_type::OutputType;
pub use parser::{ParseIssue, ParseReport, SegmentParser, parse};
pub use playback::{
    Direction, PlaybackController, PlaybackEvent, PlaybackSnapshot, PlaybackState, PlaybackStatus,
    TickOutcome,
};
pub use progress::{ProgressReport, ProgressReporter, Threshold};
pub use prompter::Prompter;
pub use segments::{BULLET_GLYPH, ContentItem, ContentKind, ScriptDocument, Segment};

#[cfg(feature = "runtime")]
pub use driver::{DriverCommand, PlaybackDriver};

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
