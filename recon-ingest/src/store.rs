//! Staging store
//!
//! Holds the current snapshot of fills per reconciliation window. Loading is
//! wipe-and-reload: replacing a window's snapshot is idempotent, and the
//! reconciliation core only ever sees the current snapshot, never an
//! append-only history. The store is deliberately dumb: whether fills live
//! here or in a relational staging schema is invisible to the core.

use crate::error::{IngestError, Result};
use chrono::NaiveDate;
use parking_lot::RwLock;
use recon_core::{ClearingFill, ExecutionFill};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Reconciliation window: an inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    /// First business date, inclusive
    pub from: NaiveDate,
    /// Last business date, inclusive
    pub to: NaiveDate,
}

impl Window {
    /// Create a window, rejecting inverted bounds
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(IngestError::InvalidWindow { from, to });
        }
        Ok(Self { from, to })
    }

    /// Single-day window
    pub fn single_day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// Whether a business date falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// In-memory staging store with per-window snapshot replacement
#[derive(Debug, Default)]
pub struct StagingStore {
    clearing: RwLock<HashMap<Window, Vec<ClearingFill>>>,
    executions: RwLock<HashMap<Window, Vec<ExecutionFill>>>,
}

impl StagingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clearing snapshot for a window
    pub fn replace_clearing(&self, window: Window, fills: Vec<ClearingFill>) {
        info!(
            "Replacing clearing snapshot for window {} ({} fills)",
            window,
            fills.len()
        );
        self.clearing.write().insert(window, fills);
    }

    /// Replace the execution snapshot for a window
    pub fn replace_executions(&self, window: Window, fills: Vec<ExecutionFill>) {
        info!(
            "Replacing execution snapshot for window {} ({} fills)",
            window,
            fills.len()
        );
        self.executions.write().insert(window, fills);
    }

    /// Clearing fills for a window; empty when nothing was loaded
    pub fn clearing_for(&self, window: Window) -> Vec<ClearingFill> {
        self.clearing.read().get(&window).cloned().unwrap_or_default()
    }

    /// Execution fills for a window; empty when nothing was loaded
    pub fn executions_for(&self, window: Window) -> Vec<ExecutionFill> {
        self.executions.read().get(&window).cloned().unwrap_or_default()
    }

    /// Total clearing fills staged across all windows
    pub fn clearing_count(&self) -> usize {
        self.clearing.read().values().map(Vec::len).sum()
    }

    /// Total execution fills staged across all windows
    pub fn execution_count(&self) -> usize {
        self.executions.read().values().map(Vec::len).sum()
    }

    /// Drop every snapshot
    pub fn clear(&self) {
        self.clearing.write().clear();
        self.executions.write().clear();
    }
}
