//! High-level API tying the parser, cache, encoders and controller together.
//!
//! `Prompter` is cheap to build and holds no per-script state, so one instance can load
//! and export any number of scripts. Loading never fails: a source that cannot be read
//! is treated as empty text, which yields the placeholder document.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::Result;
use crate::cache::DocumentCache;
use crate::config::PrompterConfig;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::markup_encoder::MarkupEncoder;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::parser::SegmentParser;
use crate::playback::PlaybackController;
use crate::segment_encoder::{SegmentEncoder, write_document};
use crate::segments::ScriptDocument;

#[derive(Debug, Clone, Default)]
pub struct Prompter {
    parser: SegmentParser,
    cache: Option<DocumentCache>,
}

impl Prompter {
    pub fn new(opts: Opts) -> Self {
        Self {
            parser: SegmentParser::new(opts),
            cache: None,
        }
    }

    pub fn from_config(config: &PrompterConfig) -> Self {
        let prompter = Self::new(config.opts());
        if config.cache.enabled {
            prompter.with_cache(DocumentCache::new(&config.cache.dir))
        } else {
            prompter
        }
    }

    pub fn with_cache(mut self, cache: DocumentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn parser(&self) -> &SegmentParser {
        &self.parser
    }

    pub fn cache(&self) -> Option<&DocumentCache> {
        self.cache.as_ref()
    }

    /// Parse `text`, consulting the cache first when one is configured.
    pub fn load_text(&self, text: &str) -> ScriptDocument {
        let opts = self.parser.opts();
        if let Some(doc) = self.cache.as_ref().and_then(|cache| cache.load(text, opts)) {
            return doc;
        }

        let doc = self.parser.parse(text);
        if let Some(cache) = &self.cache {
            cache.store(text, opts, &doc);
        }
        doc
    }

    /// Read a script from any byte source.
    pub fn load<R: Read>(&self, mut r: R) -> ScriptDocument {
        let mut text = String::new();
        if let Err(err) = r.read_to_string(&mut text) {
            warn!(error = %err, "failed to read script; substituting empty text");
            text.clear();
        }
        self.load_text(&text)
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> ScriptDocument {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => {
                info!(path = %path.display(), "loading script");
                self.load(file)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open script; substituting empty text");
                self.load_text("")
            }
        }
    }

    /// Serialize `doc` to `w` in the requested format.
    pub fn export<W: Write>(&self, doc: &ScriptDocument, w: W, output_type: OutputType) -> Result<()> {
        let writer = BufWriter::new(w);

        match output_type {
            OutputType::Json => {
                let mut encoder = JsonArrayEncoder::new(writer);
                let run_res = write_document(&mut encoder, doc);
                merge_run_and_close(run_res, encoder.close())
            }
            OutputType::Markup => {
                let mut encoder = MarkupEncoder::new(writer);
                let run_res = write_document(&mut encoder, doc);
                merge_run_and_close(run_res, encoder.close())
            }
        }
    }

    pub fn controller(&self, doc: ScriptDocument) -> PlaybackController {
        PlaybackController::new(doc)
    }
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), _) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn unreadable_source_yields_placeholder() {
        let doc = Prompter::default().load(FailingReader);
        assert!(doc.is_placeholder());
    }

    #[test]
    fn missing_file_yields_placeholder() {
        let doc = Prompter::default().load_path("/definitely/not/here.md");
        assert!(doc.is_placeholder());
    }

    #[test]
    fn cache_is_populated_on_first_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let prompter = Prompter::default().with_cache(DocumentCache::new(dir.path()));
        let text = "## Intro (10 seconds)\n- hi\n";

        let first = prompter.load_text(text);
        let cached = prompter
            .cache()
            .and_then(|cache| cache.load(text, prompter.parser().opts()));
        assert_eq!(cached, Some(first.clone()));
        assert_eq!(prompter.load_text(text), first);
        Ok(())
    }

    #[test]
    fn load_path_consults_the_cache() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("talk.md");
        let text = "## Opening (12 seconds)\n- welcome\n";
        std::fs::write(&script, text)?;

        let prompter = Prompter::default().with_cache(DocumentCache::new(dir.path().join("cache")));
        let doc = prompter.load_path(&script);
        assert_eq!(doc.first().duration, 12);

        let cached = prompter
            .cache()
            .and_then(|cache| cache.load(text, prompter.parser().opts()));
        assert_eq!(cached, Some(doc));
        Ok(())
    }

    #[test]
    fn export_json_and_markup() -> anyhow::Result<()> {
        let prompter = Prompter::default();
        let doc = prompter.load_text("## 1: HOOK (30 seconds)\n- Ask why\n");

        let mut json = Vec::new();
        prompter.export(&doc, &mut json, OutputType::Json)?;
        assert_eq!(ScriptDocument::from_json_reader(json.as_slice())?, doc);

        let mut markup = Vec::new();
        prompter.export(&doc, &mut markup, OutputType::Markup)?;
        assert_eq!(
            String::from_utf8(markup)?,
            "## 1: HOOK (30 seconds)\n• Ask why\n"
        );
        Ok(())
    }
}
