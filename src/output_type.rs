/// The supported serialization formats for a parsed script.
///
/// Each variant maps to a concrete `SegmentEncoder`. With the `cli` feature the enum
/// doubles as a `clap` value so the flag and the library share one definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Segment records as a JSON array.
    #[default]
    Json,

    /// Script markup that parses back into an equivalent document.
    Markup,
}
