//! Linear undo/redo history.
//!
//! Each undo entry is a group of applied commands that are undone together,
//! last first. Redo entries keep the same grouping so a redo reapplies what
//! the matching undo reverted.

use crate::config::UndoGrouping;

use super::command::AppliedCommand;

pub type Group = Vec<AppliedCommand>;

#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Group>,
    redo: Vec<Group>,
    grouping: UndoGrouping,
    /// Cleared by anything that must end the current word group: undo, redo,
    /// cursor movement and no-op edits.
    coalesce_open: bool,
}

impl History {
    pub fn new(grouping: UndoGrouping) -> Self {
        Self {
            grouping,
            ..Self::default()
        }
    }

    pub fn grouping(&self) -> UndoGrouping {
        self.grouping
    }

    /// Whether `applied` starts a new undo group instead of joining the top one.
    pub fn is_undo_checkpoint(&self, applied: &AppliedCommand) -> bool {
        if self.grouping == UndoGrouping::None || !self.coalesce_open {
            return true;
        }
        if !applied.is_word_char() {
            return true;
        }
        match self.undo.last().and_then(|group| group.last()) {
            Some(prev) => !(prev.is_word_char() && prev.after() == applied.before()),
            None => true,
        }
    }

    /// Records a fresh edit. Clears the redo stack.
    pub fn push(&mut self, applied: AppliedCommand) {
        self.redo.clear();
        let checkpoint = self.is_undo_checkpoint(&applied);
        self.coalesce_open = applied.is_word_char();
        match self.undo.last_mut() {
            Some(group) if !checkpoint => group.push(applied),
            _ => self.undo.push(vec![applied]),
        }
    }

    pub fn break_coalescing(&mut self) {
        self.coalesce_open = false;
    }

    pub fn pop_undo(&mut self) -> Option<Group> {
        self.coalesce_open = false;
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<Group> {
        self.coalesce_open = false;
        self.redo.pop()
    }

    pub fn push_redo(&mut self, group: Group) {
        self.redo.push(group);
    }

    /// Puts a group back on the undo stack without touching redo.
    pub fn push_undo_group(&mut self, group: Group) {
        self.undo.push(group);
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.coalesce_open = false;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/history.rs"]
mod tests;
