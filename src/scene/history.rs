/// Position of the history cursor relative to the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryState {
    /// No snapshot has been captured yet.
    Empty,
    /// The cursor sits below the newest snapshot; redo is possible.
    MidStack,
    /// The cursor is on the newest snapshot.
    AtHead,
}

/// Linear snapshot stack with a cursor.
///
/// Pushing while the cursor is not at the head discards every snapshot above it. With a limit set,
/// the oldest snapshot is dropped once the stack grows past it.
#[derive(Clone, Debug)]
pub struct History<T> {
    snapshots: Vec<T>,
    index: usize,
    limit: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> History<T> {
    /// `limit` of `Some(0)` is treated as `Some(1)`; at least the current state is kept.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            snapshots: Vec::new(),
            index: 0,
            limit: limit.map(|l| l.max(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.index)
    }

    pub fn push(&mut self, snapshot: T) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(snapshot);

        if let Some(limit) = self.limit
            && self.snapshots.len() > limit
        {
            let excess = self.snapshots.len() - limit;
            self.snapshots.drain(..excess);
        }
        self.index = self.snapshots.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.index + 1 < self.snapshots.len()
    }

    /// Move the cursor back one step and return the snapshot now current.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Move the cursor forward one step and return the snapshot now current.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    pub fn state(&self) -> HistoryState {
        if self.snapshots.is_empty() {
            HistoryState::Empty
        } else if self.index + 1 < self.snapshots.len() {
            HistoryState::MidStack
        } else {
            HistoryState::AtHead
        }
    }
}
