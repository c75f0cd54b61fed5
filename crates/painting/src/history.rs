//! Gesture-granular undo over vertex colours.
//!
//! One snapshot per stroke that actually changed colours. Each snapshot also
//! remembers which vertices its stroke added to the touched set, so undo can
//! retract them and framing keeps matching the visible paint.

use std::collections::VecDeque;

use tracing::debug;

use crate::types::{Rgb, SurfaceId};

/// Immutable copy of a surface's colour buffer taken before a stroke.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    pub surface: SurfaceId,
    pub stroke_id: u64,
    pub colors: Box<[Rgb]>,
    /// Vertices first touched by this stroke
    pub newly_touched: Vec<u32>,
}

/// Bounded LIFO of snapshots (most recent at the back).
#[derive(Debug)]
pub struct HistoryStack {
    entries: VecDeque<HistorySnapshot>,
    max_levels: usize,
}

impl HistoryStack {
    pub fn new(max_levels: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_levels: max_levels.max(1),
        }
    }

    /// Push a copy of `colors`, dropping the oldest entry beyond the limit.
    pub fn snapshot(&mut self, surface: SurfaceId, stroke_id: u64, colors: &[Rgb]) {
        self.entries.push_back(HistorySnapshot {
            surface,
            stroke_id,
            colors: colors.into(),
            newly_touched: Vec::new(),
        });
        while self.entries.len() > self.max_levels {
            if let Some(dropped) = self.entries.pop_front() {
                debug!("History full, dropping snapshot of stroke {}", dropped.stroke_id);
            }
        }
    }

    /// Attribute a newly touched vertex to the most recent snapshot.
    pub fn record_touched(&mut self, index: u32) {
        if let Some(top) = self.entries.back_mut() {
            top.newly_touched.push(index);
        }
    }

    pub fn top(&self) -> Option<&HistorySnapshot> {
        self.entries.back()
    }

    pub fn pop(&mut self) -> Option<HistorySnapshot> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }
}
