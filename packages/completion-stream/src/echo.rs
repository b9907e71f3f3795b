//! Live observers for fragments as they are extracted.
//!
//! Echoing is best-effort: a sink never fails the ingestion and sees
//! fragments in exactly the order they are accumulated.

use std::io::Write;

/// Receives each non-empty fragment as soon as it is extracted.
pub trait FragmentSink {
    fn on_fragment(&mut self, fragment: &str);
}

impl<F> FragmentSink for F
where
    F: FnMut(&str),
{
    fn on_fragment(&mut self, fragment: &str) {
        self(fragment)
    }
}

/// Discards fragments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEcho;

impl FragmentSink for NoEcho {
    fn on_fragment(&mut self, _fragment: &str) {}
}

/// Writes fragments to any `Write` (stdout by default), ignoring I/O errors.
///
/// The writer is flushed only after a fragment that ends a line; the
/// remainder goes out with the next newline or when the writer flushes.
#[derive(Debug)]
pub struct WriterEcho<W: Write> {
    writer: W,
}

impl WriterEcho<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: std::io::stdout(),
        }
    }
}

impl<W: Write> WriterEcho<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FragmentSink for WriterEcho<W> {
    fn on_fragment(&mut self, fragment: &str) {
        let _ = self.writer.write_all(fragment.as_bytes());
        if fragment.contains('\n') {
            let _ = self.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink_collects() {
        let mut seen = Vec::new();
        {
            let mut sink = |f: &str| seen.push(f.to_string());
            sink.on_fragment("a");
            sink.on_fragment("b");
        }
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_writer_echo() {
        let mut echo = WriterEcho::new(Vec::new());
        echo.on_fragment("Hel");
        echo.on_fragment("lo");
        assert_eq!(echo.into_inner(), b"Hello");
    }

    #[derive(Default)]
    struct CountingWriter {
        bytes: Vec<u8>,
        flushes: usize,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_writer_echo_flushes_at_line_ends() {
        let mut echo = WriterEcho::new(CountingWriter::default());
        for fragment in ["Con", "sider ", "this.\n", "- a", "\n- b"] {
            echo.on_fragment(fragment);
        }
        let writer = echo.into_inner();
        assert_eq!(writer.bytes, b"Consider this.\n- a\n- b");
        assert_eq!(writer.flushes, 2);
    }
}
