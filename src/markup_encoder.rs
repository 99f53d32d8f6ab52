use std::io::Write;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::{BULLET_GLYPH, ContentKind, Segment};

/// A `SegmentEncoder` that writes script markup.
///
/// Output uses the default grammar (`## ` headers, `• ` bullets, `### ` headings), so
/// feeding it back through a default `SegmentParser` yields the same titles, durations
/// and items. Each segment header is written as `## <id>: <title> (<n> seconds)`; the
/// id prefix is stripped again on parse.
pub struct MarkupEncoder<W: Write> {
    w: W,
    written: usize,
    closed: bool,
}

impl<W: Write> MarkupEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            written: 0,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for MarkupEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        // Blank line between segments.
        if self.written > 0 {
            writeln!(&mut self.w)?;
        }

        let unit = if seg.duration == 1 { "second" } else { "seconds" };
        writeln!(
            &mut self.w,
            "## {}: {} ({} {unit})",
            seg.id, seg.title, seg.duration
        )?;

        for item in &seg.bullets {
            match item.kind {
                ContentKind::Bullet => writeln!(&mut self.w, "{BULLET_GLYPH} {}", item.text)?,
                ContentKind::Heading => writeln!(&mut self.w, "### {}", item.text)?,
                ContentKind::Callout => writeln!(&mut self.w, "{}", item.text)?,
            }
        }

        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}
