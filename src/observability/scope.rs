//! Begin/complete logging around one unit of work
//!
//! - `{name}_BEGIN` on creation
//! - `{name}_COMPLETE` with `elapsed_ms` on `complete`
//! - `{name}_FAILED` on `fail`
//! - `{name}_INCOMPLETE` when dropped without either

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs its own lifecycle
///
/// ```ignore
/// let scope = ObservationScope::with_fields("DATASET_LOAD", &[("input", path)]);
/// // ... do work ...
/// scope.complete_with_fields(&[("videos", "120")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    started: Instant,
    finished: bool,
    fields: Vec<(&'a str, String)>,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Fields given here are repeated on every event of the scope
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            started: Instant::now(),
            finished: false,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.finished = true;
        let elapsed = self.elapsed_ms().to_string();
        let mut fields = self.field_refs();
        fields.extend_from_slice(extra);
        fields.push(("elapsed_ms", elapsed.as_str()));
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        let mut fields = self.field_refs();
        fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let mut fields = self.field_refs();
            fields.push(("reason", "scope dropped without completion"));
            Logger::warn(&format!("{}_INCOMPLETE", self.name), &fields);
        }
    }
}
