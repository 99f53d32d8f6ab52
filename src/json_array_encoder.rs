use std::io::Write;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that streams segment records as one JSON array.
///
/// The opening bracket is written lazily so that closing an encoder that never saw a
/// segment still produces `[]`.
pub struct JsonArrayEncoder<W: Write> {
    w: W,
    /// Segments written so far; drives comma placement.
    written: usize,
    opened: bool,
    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            written: 0,
            opened: false,
            closed: false,
        }
    }

    fn open_if_needed(&mut self) -> Result<()> {
        if !self.opened {
            self.w.write_all(b"[")?;
            self.opened = true;
        }
        Ok(())
    }
}

impl<W: Write> SegmentEncoder for JsonArrayEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        self.open_if_needed()?;
        if self.written > 0 {
            self.w.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.w, seg)?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.open_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}
