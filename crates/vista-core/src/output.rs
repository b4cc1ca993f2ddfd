//! Streaming report output in JSON or JSON Lines.
//!
//! Reports are written as soon as each image finishes. In JSON mode the
//! writer emits one array incrementally, so `finish` must be called to close
//! it.

use serde::Serialize;
use std::io::{self, Write};

use crate::config::OutputConfig;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array holding every report
    Json,
    /// One JSON object per line
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Incremental writer for serializable records.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON; JSON Lines is always compact.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Build from the `[output]` config section, defaulting to JSON.
    pub fn from_config(writer: W, config: &OutputConfig) -> Self {
        let format = OutputFormat::parse(&config.format).unwrap_or(OutputFormat::Json);
        Self::new(writer, format, config.pretty)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Append one record.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let separator = if self.items_written == 0 { "[" } else { "," };
                if self.pretty {
                    writeln!(self.writer, "{separator}")?;
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    write!(self.writer, "{separator}")?;
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Close the JSON array (if any), flush, and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            if self.items_written == 0 {
                writeln!(self.writer, "[]")?;
            } else if self.pretty {
                writeln!(self.writer, "\n]")?;
            } else {
                writeln!(self.writer, "]")?;
            }
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Serialize a single value as a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}
