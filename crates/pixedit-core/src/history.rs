//! Linear undo/redo history of committed buffers.
//!
//! The history starts empty. Loading an image makes it active with a single
//! entry; every commit truncates the redo branch and appends. The cursor
//! always points at the committed buffer.
//!
//! # Examples
//!
//! ```ignore
//! use pixedit_core::history::History;
//!
//! let mut history = History::new();
//! history.load(original);
//! history.commit(cropped)?;
//! history.undo()?;
//! assert_eq!(history.current(), Some(&original));
//! ```

use crate::raster::RasterBuffer;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("No image has been loaded")]
    Empty,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Committed buffer states plus a cursor.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<RasterBuffer>,
    cursor: usize,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` entries. A limit of zero
    /// is treated as one.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.map(|l| l.max(1)),
            ..Self::default()
        }
    }

    /// Reset to a single entry holding `buffer`.
    pub fn load(&mut self, buffer: RasterBuffer) {
        log::debug!(
            "history: load {}x{}, dropping {} entries",
            buffer.width(),
            buffer.height(),
            self.entries.len()
        );
        self.entries.clear();
        self.entries.push(buffer);
        self.cursor = 0;
    }

    /// Discard everything after the cursor and append `buffer`.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Empty` before the first load.
    pub fn commit(&mut self, buffer: RasterBuffer) -> Result<(), HistoryError> {
        if self.entries.is_empty() {
            return Err(HistoryError::Empty);
        }

        self.entries.truncate(self.cursor + 1);
        self.entries.push(buffer);
        self.cursor = self.entries.len() - 1;

        if let Some(limit) = self.limit {
            let excess = self.entries.len().saturating_sub(limit);
            if excess > 0 {
                self.entries.drain(..excess);
                self.cursor -= excess;
            }
        }

        log::debug!("history: commit, cursor {} of {}", self.cursor, self.entries.len());
        Ok(())
    }

    /// Step back one entry and return the new current buffer.
    pub fn undo(&mut self) -> Result<&RasterBuffer, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        self.cursor -= 1;
        log::debug!("history: undo, cursor {} of {}", self.cursor, self.entries.len());
        Ok(&self.entries[self.cursor])
    }

    /// Step forward one entry and return the new current buffer.
    pub fn redo(&mut self) -> Result<&RasterBuffer, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        self.cursor += 1;
        log::debug!("history: redo, cursor {} of {}", self.cursor, self.entries.len());
        Ok(&self.entries[self.cursor])
    }

    /// The committed buffer, or `None` before the first load.
    pub fn current(&self) -> Option<&RasterBuffer> {
        self.entries.get(self.cursor)
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
