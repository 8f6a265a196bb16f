//! Result sink: where outcomes are recorded against their row.

use std::collections::BTreeMap;

use crate::outcome::{Highlight, NoteColumn, Outcome};
use crate::result::MarkcheckResult;

/// Separator placed between an existing note and an appended one
pub const NOTE_SEPARATOR: &str = "\n---\n";

/// One write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Target column
    pub column: NoteColumn,
    /// Message appended to the cell
    pub message: String,
    /// Price-cell highlight; `None` leaves the highlight cell untouched
    pub highlight: Option<Highlight>,
}

impl Note {
    /// Plain note
    #[must_use]
    pub fn new(column: NoteColumn, message: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
            highlight: None,
        }
    }

    /// Note for an outcome; `None` for outcomes that are not written
    #[must_use]
    pub fn from_outcome(outcome: &Outcome) -> Option<Self> {
        outcome.column().map(|column| Self {
            column,
            message: outcome.message.clone(),
            highlight: outcome.highlight,
        })
    }
}

/// Append `message` to an existing cell text
#[must_use]
pub fn merge_note(existing: &str, message: &str) -> String {
    if existing.trim().is_empty() {
        message.to_string()
    } else {
        format!("{existing}{NOTE_SEPARATOR}{message}")
    }
}

/// Destination for row notes.
///
/// Writers are not concurrent: every call is a complete read-modify-write.
pub trait ResultSink: Send {
    /// Record `note` against worksheet row `sheet_row`
    fn record(&mut self, sheet_row: u32, note: &Note) -> MarkcheckResult<()>;
}

/// In-memory sink with the same merge and highlight rules as the workbook
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    notes: Vec<(u32, Note)>,
    cells: BTreeMap<(u32, NoteColumn), String>,
    highlights: BTreeMap<u32, Highlight>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded note in order
    #[must_use]
    pub fn notes(&self) -> &[(u32, Note)] {
        &self.notes
    }

    /// Notes recorded against `sheet_row`
    #[must_use]
    pub fn notes_for(&self, sheet_row: u32) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|(row, _)| *row == sheet_row)
            .map(|(_, note)| note)
            .collect()
    }

    /// Merged cell text
    #[must_use]
    pub fn cell(&self, sheet_row: u32, column: NoteColumn) -> Option<&str> {
        self.cells.get(&(sheet_row, column)).map(String::as_str)
    }

    /// Current price-cell highlight
    #[must_use]
    pub fn highlight(&self, sheet_row: u32) -> Option<Highlight> {
        self.highlights.get(&sheet_row).copied()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl ResultSink for MemorySink {
    fn record(&mut self, sheet_row: u32, note: &Note) -> MarkcheckResult<()> {
        let cell = self.cells.entry((sheet_row, note.column)).or_default();
        *cell = merge_note(cell, &note.message);
        if let Some(highlight) = note.highlight {
            self.highlights.insert(sheet_row, highlight);
        }
        self.notes.push((sheet_row, note.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Finding;

    #[test]
    fn test_merge_into_empty() {
        assert_eq!(merge_note("", "first"), "first");
        assert_eq!(merge_note("   \n", "first"), "first");
    }

    #[test]
    fn test_merge_appends_with_separator() {
        assert_eq!(merge_note("first", "second"), "first\n---\nsecond");
    }

    #[test]
    fn test_memory_sink_appends() {
        let mut sink = MemorySink::new();
        sink.record(3, &Note::new(NoteColumn::Comment, "a")).unwrap();
        sink.record(3, &Note::new(NoteColumn::Comment, "b")).unwrap();
        sink.record(4, &Note::new(NoteColumn::Comment, "c")).unwrap();
        assert_eq!(sink.cell(3, NoteColumn::Comment), Some("a\n---\nb"));
        assert_eq!(sink.cell(4, NoteColumn::Comment), Some("c"));
        assert_eq!(sink.notes_for(3).len(), 2);
    }

    #[test]
    fn test_highlight_replaced_not_merged() {
        let mut sink = MemorySink::new();
        let mut note = Note::new(NoteColumn::PriceNotes, "ok");
        note.highlight = Some(Highlight::Good);
        sink.record(5, &note).unwrap();
        note.highlight = Some(Highlight::Cleared);
        sink.record(5, &note).unwrap();
        assert_eq!(sink.highlight(5), Some(Highlight::Cleared));
        sink.record(5, &Note::new(NoteColumn::Comment, "x")).unwrap();
        assert_eq!(sink.highlight(5), Some(Highlight::Cleared));
    }

    #[test]
    fn test_note_from_quiet_outcome() {
        assert!(Note::from_outcome(&Outcome::pass(Finding::Image, "fine")).is_none());
        let note = Note::from_outcome(&Outcome::fail(Finding::Image, "broken")).unwrap();
        assert_eq!(note.column, NoteColumn::PhotoNotes);
    }
}
