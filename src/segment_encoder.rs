use crate::Result;
use crate::segments::{ScriptDocument, Segment};

/// A sink that serializes segments one at a time.
///
/// Implementations must make `close` idempotent and reject writes after it.
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &Segment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Write every segment of `doc` in order. Does not close the encoder.
pub fn write_document(encoder: &mut dyn SegmentEncoder, doc: &ScriptDocument) -> Result<()> {
    for seg in doc {
        encoder.write_segment(seg)?;
    }
    Ok(())
}
