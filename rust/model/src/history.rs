// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot-based undo/redo
//!
//! Committed states are pushed as full immutable copies; transient edits
//! (drag deltas) are never recorded, so only committed end states are
//! undoable.

/// Generic stack-based undo/redo over cloned snapshots
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    current: T,
    /// Set while a restore is in flight so the state-change path that calls
    /// back into `update_state` does not record the restore as a new entry
    restoring: bool,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current: initial,
            restoring: false,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Commit a new state
    ///
    /// Pushes the current state onto the undo stack and clears the redo
    /// stack. If the commit was triggered by an undo/redo restore, the
    /// guard flag swallows it instead.
    pub fn update_state(&mut self, next: T) {
        if self.restoring {
            self.restoring = false;
            self.current = next;
            return;
        }
        self.undo_stack.push(self.current.clone());
        self.redo_stack.clear();
        self.current = next;
    }

    /// Restore the previous committed state, if any
    ///
    /// Arms the restore guard: the next `update_state` is treated as the
    /// echo of this restore and not recorded. Callers that apply the
    /// returned state without echoing it through `update_state` must call
    /// `finish_restore`, or their next genuine commit is swallowed.
    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(self.current.clone());
        self.current = previous;
        self.restoring = true;
        Some(&self.current)
    }

    /// Re-apply the most recently undone state, if any
    ///
    /// Arms the restore guard exactly like `undo`; see there for the
    /// `finish_restore` obligation.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(self.current.clone());
        self.current = next;
        self.restoring = true;
        Some(&self.current)
    }

    /// Clear the restore guard without committing (for callers that apply
    /// restored state through a path that never reaches `update_state`)
    pub fn finish_restore(&mut self) {
        self.restoring = false;
    }
}
