//! Newline-delimited JSON intake.
//!
//! [`NdjsonWriter`] lets a host pipe a stream of JSON log lines (for example
//! the stdout of another process) straight into a [`LogSink`]. Bytes are
//! buffered until a newline arrives; each complete line is decoded into a
//! [`RawRecord`] and handed to the sink.

use std::io::{self, Write};

use log::warn;

use crate::handler::{LogSink, TransportError};
use crate::log_record::RawRecord;

/// [`io::Write`] adapter feeding NDJSON lines into a sink.
///
/// Blank lines are ignored. Lines that are not UTF-8 JSON objects are logged
/// and skipped, so one corrupt line never stops the stream.
#[derive(Debug)]
pub struct NdjsonWriter<S> {
    sink: S,
    partial: Vec<u8>,
}

impl<S: LogSink> NdjsonWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            partial: Vec::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Process any unterminated trailing line and return the sink.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::BrokenPipe`] when the sink is closed.
    pub fn finish(mut self) -> io::Result<S> {
        let line = std::mem::take(&mut self.partial);
        self.process_line(&line)?;
        Ok(self.sink)
    }

    fn process_line(&self, line: &[u8]) -> io::Result<()> {
        let Ok(text) = std::str::from_utf8(line) else {
            warn!("ndjson intake: skipping line that is not valid UTF-8");
            return Ok(());
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        match RawRecord::from_json_line(text) {
            Ok(record) => self.sink.handle(record).map_err(closed_pipe),
            Err(err) => {
                warn!("ndjson intake: skipping unparseable line: {err}");
                Ok(())
            }
        }
    }
}

fn closed_pipe(err: TransportError) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, err)
}

impl<S: LogSink> Write for NdjsonWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            if self.partial.is_empty() {
                self.process_line(head)?;
            } else {
                self.partial.extend_from_slice(head);
                let line = std::mem::take(&mut self.partial);
                self.process_line(&line)?;
            }
            rest = &tail[1..];
        }
        self.partial.extend_from_slice(rest);
        Ok(buf.len())
    }

    /// Ask the sink to flush its pending batch.
    ///
    /// A partial line stays buffered until its newline or [`finish`] arrives.
    ///
    /// [`finish`]: NdjsonWriter::finish
    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CollectingSink, install_test_logger, take_logged_at};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use serial_test::serial;
    use std::sync::Arc;

    #[fixture]
    fn sink() -> Arc<CollectingSink> {
        Arc::new(CollectingSink::default())
    }

    #[rstest]
    fn splits_lines_across_writes(sink: Arc<CollectingSink>) {
        let mut writer = NdjsonWriter::new(Arc::clone(&sink));
        writer.write_all(br#"{"msg":"a"}"#).expect("write");
        writer.write_all(b"\n{\"msg\":").expect("write");
        writer.write_all(b"\"b\"}\n{\"msg\":\"c\"}\n").expect("write");
        assert_eq!(sink.messages(), vec![json!("a"), json!("b"), json!("c")]);
    }

    #[rstest]
    fn ignores_blank_lines(sink: Arc<CollectingSink>) {
        let mut writer = NdjsonWriter::new(Arc::clone(&sink));
        writer
            .write_all(b"\n  \r\n{\"msg\":\"only\"}\r\n\n")
            .expect("write");
        assert_eq!(sink.messages(), vec![json!("only")]);
    }

    #[rstest]
    fn finish_processes_trailing_line(sink: Arc<CollectingSink>) {
        let mut writer = NdjsonWriter::new(Arc::clone(&sink));
        writer.write_all(br#"{"msg":"tail"}"#).expect("write");
        assert!(sink.messages().is_empty());
        writer.finish().expect("finish");
        assert_eq!(sink.messages(), vec![json!("tail")]);
    }

    #[rstest]
    #[serial]
    fn skips_invalid_lines_with_warning(sink: Arc<CollectingSink>) {
        install_test_logger();
        let mut writer = NdjsonWriter::new(Arc::clone(&sink));
        writer
            .write_all(b"not json\n[1,2]\n\xff\xfe\n{\"msg\":\"ok\"}\n")
            .expect("write");
        assert_eq!(sink.messages(), vec![json!("ok")]);
        assert_eq!(take_logged_at(log::Level::Warn).len(), 3);
    }

    #[rstest]
    fn closed_sink_breaks_the_pipe(sink: Arc<CollectingSink>) {
        sink.close();
        let mut writer = NdjsonWriter::new(Arc::clone(&sink));
        let err = writer
            .write_all(b"{\"msg\":\"late\"}\n")
            .expect_err("closed sink must fail");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
