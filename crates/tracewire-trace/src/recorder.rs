//! Tracer sinks: structured log output and an in-memory recorder.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use tracewire_core::{Annotation, HexId, TraceIdentifier, Tracer};
use tracing::info;

/// Reports every annotation as a `tracing` event.
///
/// Spans explicitly marked unsampled are dropped unless the debug flag is
/// set.
#[derive(Debug, Clone)]
pub struct LogTracer {
    sampled: Option<bool>,
}

impl Default for LogTracer {
    fn default() -> Self {
        Self {
            sampled: Some(true),
        }
    }
}

impl LogTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sampling decision given to new root identifiers.
    pub fn with_sampled(mut self, sampled: Option<bool>) -> Self {
        self.sampled = sampled;
        self
    }
}

impl Tracer for LogTracer {
    fn create_root_id(&self) -> TraceIdentifier {
        TraceIdentifier::root(HexId::random64()).with_sampled(self.sampled)
    }

    fn create_child_id(&self, parent: &TraceIdentifier) -> TraceIdentifier {
        TraceIdentifier::child_of(parent, HexId::random64())
    }

    fn record(&self, id: &TraceIdentifier, annotation: Annotation) {
        if id.sampled == Some(false) && !id.is_debug() {
            return;
        }
        info!(
            target: "tracewire::annotation",
            trace_id = %id.trace_id,
            span_id = %id.span_id,
            parent_id = id.parent_id.as_ref().map(HexId::as_str).unwrap_or(""),
            %annotation,
            "annotation recorded"
        );
    }
}

/// One annotation captured by [`MemoryTracer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: TraceIdentifier,
    pub annotation: Annotation,
    pub timestamp: DateTime<Utc>,
}

/// Keeps every record in memory, in recording order.
#[derive(Debug)]
pub struct MemoryTracer {
    sampled: Option<bool>,
    records: Mutex<Vec<Record>>,
}

impl Default for MemoryTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTracer {
    pub fn new() -> Self {
        Self {
            sampled: Some(true),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn with_sampled(mut self, sampled: Option<bool>) -> Self {
        self.sampled = sampled;
        self
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Annotations recorded for one span, in order.
    pub fn annotations_for(&self, span_id: &HexId) -> Vec<Annotation> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| &r.id.span_id == span_id)
            .map(|r| r.annotation.clone())
            .collect()
    }

    /// Distinct span ids in order of first record.
    pub fn span_ids(&self) -> Vec<HexId> {
        let mut ids: Vec<HexId> = Vec::new();
        for record in self.records() {
            if !ids.contains(&record.id.span_id) {
                ids.push(record.id.span_id);
            }
        }
        ids
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Tracer for MemoryTracer {
    fn create_root_id(&self) -> TraceIdentifier {
        TraceIdentifier::root(HexId::random64()).with_sampled(self.sampled)
    }

    fn create_child_id(&self, parent: &TraceIdentifier) -> TraceIdentifier {
        TraceIdentifier::child_of(parent, HexId::random64())
    }

    fn record(&self, id: &TraceIdentifier, annotation: Annotation) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Record {
                id: id.clone(),
                annotation,
                timestamp: Utc::now(),
            });
    }
}
