//! Event Logger
//!
//! Append-only JSONL event logging.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

use super::types::{EventKind, PlannerEvent};

/// Writes planner events to a JSONL file
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    session_id: Uuid,
    event_count: u64,
    next_event_id: u64,
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
            session_id: Uuid::new_v4(),
            event_count: 0,
            next_event_id: 1,
        })
    }

    /// Create a logger that discards events (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            session_id: Uuid::new_v4(),
            event_count: 0,
            next_event_id: 1,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Generate the next event ID
    pub fn next_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    /// Get the current event count
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Wrap a payload in an envelope carrying a fresh ID and this session
    pub fn stamp(&mut self, tick: u64, kind: EventKind) -> PlannerEvent {
        let id = self.next_id();
        PlannerEvent::new(id, self.session_id, tick, kind)
    }

    /// Log an event to the file
    pub fn log(&mut self, event: &PlannerEvent) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log multiple events
    pub fn log_batch(&mut self, events: &[PlannerEvent]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Stamp and log every payload recorded during `tick`
    pub fn record(&mut self, tick: u64, kinds: Vec<EventKind>) -> std::io::Result<()> {
        for kind in kinds {
            let event = self.stamp(tick, kind);
            self.log(&event)?;
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
        if let Err(error) = self.flush() {
            warn!(%error, "failed to flush event log");
        }
    }
}

/// Payloads recorded by a planner component, waiting to be stamped
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: Vec<EventKind>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EventKind) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = EventKind>) {
        self.events.extend(events);
    }

    pub fn drain(&mut self) -> Vec<EventKind> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    fn unsatisfiable(item: &str) -> EventKind {
        EventKind::GoalUnsatisfiable {
            item: item.to_string(),
        }
    }

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut logger = EventLogger::new(&path).unwrap();
        let session = logger.session_id();
        let event = logger.stamp(7, unsatisfiable("loop_a"));
        logger.log(&event).unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let reader = std::io::BufReader::new(file);
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 1);

        let parsed: PlannerEvent = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed.event_id, "evt_00000001");
        assert_eq!(parsed.session_id, session);
        assert_eq!(parsed.tick, 7);
        assert_eq!(parsed.kind, unsatisfiable("loop_a"));
    }

    #[test]
    fn test_null_logger() {
        let mut logger = EventLogger::null();
        logger
            .record(1, vec![unsatisfiable("a"), unsatisfiable("b")])
            .unwrap();
        assert_eq!(logger.event_count(), 2);
    }

    #[test]
    fn test_event_id_generation() {
        let mut logger = EventLogger::null();

        assert_eq!(logger.next_id(), "evt_00000001");
        assert_eq!(logger.next_id(), "evt_00000002");
        assert_eq!(logger.next_id(), "evt_00000003");
    }

    #[test]
    fn test_pending_events() {
        let mut pending = PendingEvents::new();
        assert!(pending.is_empty());

        pending.push(unsatisfiable("a"));
        pending.extend(vec![unsatisfiable("b")]);
        assert_eq!(pending.len(), 2);

        let drained = pending.drain();
        assert_eq!(drained.len(), 2);
        assert!(pending.is_empty());
    }
}
