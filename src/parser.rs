use crate::file_discovery::FileDiscovery;
use crate::models::{TokenUsage, UsageEvent};
use crate::timestamp_parser::TimestampParser;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Lines up to this many bytes are always accepted.
pub const DEFAULT_MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

const READ_BUFFER_BYTES: usize = 64 * 1024;

// Raw shape of one log line. Unknown fields are ignored; anything that does
// not fit this shape is treated as noise and skipped. Scalar fields are
// optional so that an explicit `null` reads as the zero value.
#[derive(Debug, Deserialize)]
struct LogRecord {
    #[serde(rename = "type")]
    record_type: Option<String>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    timestamp: Option<String>,
    message: Option<LogMessage>,
}

#[derive(Debug, Deserialize)]
struct LogMessage {
    role: Option<String>,
    model: Option<String>,
    usage: Option<LogUsage>,
}

#[derive(Debug, Deserialize)]
struct LogUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

impl LogRecord {
    fn into_event(self) -> Option<UsageEvent> {
        if self.record_type.as_deref() != Some("assistant") {
            return None;
        }
        let message = self.message?;
        if message.role.as_deref() != Some("assistant") {
            return None;
        }
        let usage = message.usage?;
        let timestamp = TimestampParser::parse(self.timestamp.as_deref()?).ok()?;

        Some(UsageEvent {
            session_id: self.session_id.unwrap_or_default(),
            timestamp,
            model: message.model.unwrap_or_default(),
            tokens: TokenUsage::new(
                usage.input_tokens.unwrap_or_default(),
                usage.output_tokens.unwrap_or_default(),
                usage.cache_creation_input_tokens.unwrap_or_default(),
                usage.cache_read_input_tokens.unwrap_or_default(),
            ),
        })
    }
}

// Trait for custom JSONL processing
pub trait JsonlProcessor {
    type Output;

    fn process_event(&mut self, event: UsageEvent) -> Result<()>;
    fn finalize(self) -> Result<Self::Output>;
}

// Default processor that collects all events into a Vec
#[derive(Default)]
pub struct CollectorProcessor {
    events: Vec<UsageEvent>,
}

impl CollectorProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JsonlProcessor for CollectorProcessor {
    type Output = Vec<UsageEvent>;

    fn process_event(&mut self, event: UsageEvent) -> Result<()> {
        self.events.push(event);
        Ok(())
    }

    fn finalize(self) -> Result<Self::Output> {
        Ok(self.events)
    }
}

/// Streams usage logs into [`UsageEvent`]s.
#[derive(Debug, Clone)]
pub struct FileParser {
    max_line_bytes: usize,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel: bool,
}

impl Default for FileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser {
    pub fn new() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            parallel: false,
        }
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Parse files concurrently. Only takes effect with the `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Decode one log line. Returns `None` for malformed JSON and for records
    /// that are not billable assistant turns.
    pub fn decode_line(&self, line: &[u8]) -> Option<UsageEvent> {
        serde_json::from_slice::<LogRecord>(line)
            .ok()
            .and_then(LogRecord::into_event)
    }

    /// Discover and parse every log file under `root`.
    pub fn parse_directory(&self, root: &Path, discovery: &FileDiscovery) -> Result<Vec<UsageEvent>> {
        let files = discovery.find_log_files(root)?;
        self.parse_files(&files)
    }

    /// Parse `files` in order and concatenate their events.
    pub fn parse_files(&self, files: &[PathBuf]) -> Result<Vec<UsageEvent>> {
        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                use rayon::prelude::*;

                let per_file = files
                    .par_iter()
                    .map(|path| self.parse_jsonl_file(path))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(per_file.into_iter().flatten().collect());
            }
        }

        let mut events = Vec::new();
        for path in files {
            events.extend(self.parse_jsonl_file(path)?);
        }
        Ok(events)
    }

    pub fn parse_jsonl_file(&self, file_path: &Path) -> Result<Vec<UsageEvent>> {
        self.process_jsonl_file(file_path, CollectorProcessor::new())
    }

    // Generic method that accepts any processor
    pub fn process_jsonl_file<P: JsonlProcessor>(
        &self,
        file_path: &Path,
        processor: P,
    ) -> Result<P::Output> {
        let file = File::open(file_path)
            .with_context(|| format!("Failed to open log file: {}", file_path.display()))?;
        let reader = BufReader::with_capacity(READ_BUFFER_BYTES, file);

        self.process_reader(reader, processor)
            .with_context(|| format!("Failed to read log file: {}", file_path.display()))
    }

    /// Run a processor over every accepted record in `reader`.
    pub fn process_reader<R: BufRead, P: JsonlProcessor>(
        &self,
        mut reader: R,
        mut processor: P,
    ) -> Result<P::Output> {
        let mut buf = Vec::new();
        let mut line_number = 0;
        let mut accepted = 0usize;
        let mut skipped = 0usize;

        while let Some(line) = read_bounded_line(&mut reader, &mut buf, self.max_line_bytes)
            .with_context(|| format!("line {}", line_number + 1))?
        {
            line_number += 1;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match self.decode_line(line) {
                Some(event) => {
                    accepted += 1;
                    processor.process_event(event)?;
                }
                None => {
                    skipped += 1;
                    trace!(line_number, "Skipped non-billable or malformed line");
                }
            }
        }

        debug!(lines = line_number, accepted, skipped, "Finished reading log stream");
        processor.finalize()
    }
}

/// Read one newline-terminated line into `buf`, without the line terminator.
///
/// Returns `Ok(None)` at end of input. A line longer than `max_len` bytes is
/// an error; it is never truncated or split.
fn read_bounded_line<'b, R: BufRead>(
    reader: &mut R,
    buf: &'b mut Vec<u8>,
    max_len: usize,
) -> Result<Option<&'b [u8]>> {
    buf.clear();
    // Room for the content, a '\r' and the '\n'.
    let limit = max_len as u64 + 2;
    let read = reader.by_ref().take(limit).read_until(b'\n', buf)?;
    if read == 0 {
        return Ok(None);
    }

    let mut content = buf.as_slice();
    let terminated = content.last() == Some(&b'\n');
    if terminated {
        content = &content[..content.len() - 1];
        if content.last() == Some(&b'\r') {
            content = &content[..content.len() - 1];
        }
    }

    if content.len() > max_len {
        anyhow::bail!(
            "line exceeds maximum supported length of {} bytes",
            max_len
        );
    }

    Ok(Some(content))
}
