//! Event Logger
//!
//! Append-only JSONL event log for offline consumers.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use sim_events::Event;
use tracing::warn;

/// Writes one event per line to a JSONL file.
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that discards events
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    /// Number of events logged so far
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &Event) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = event.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[Event]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to flush event log");
        }
    }
}
