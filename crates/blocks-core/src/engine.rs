use std::fmt;

use crate::block::BlockId;
use crate::geometry::DropSide;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

/// The document engine as seen by the interaction layer.
///
/// The engine owns block storage and structural correctness. The interaction layer only reads
/// block identity in document order and requests reorders or named structural commands.
pub trait BlockEngine {
    /// Block identifiers in document order.
    fn block_ids(&self) -> Vec<BlockId>;

    fn block_count(&self) -> usize {
        self.block_ids().len()
    }

    fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.block_ids().iter().position(|candidate| candidate == id)
    }

    /// Moves the block at `from` so it ends up at index `to`. Returns whether the document changed.
    fn move_block(&mut self, from: usize, to: usize) -> bool;

    /// Moves `source` next to `target`. Returns whether the document changed.
    fn drop_block(&mut self, source: &BlockId, target: &BlockId, side: DropSide) -> bool;

    /// Runs a named structural command, e.g. `block.set_heading` with `{"level": 1}`.
    fn run_command(
        &mut self,
        id: &str,
        args: Option<serde_json::Value>,
    ) -> Result<(), CommandError>;
}

/// Final index of a block moved from `from` into the gap beside `target_ix`.
pub fn reorder_to_index(from: usize, target_ix: usize, side: DropSide, item_count: usize) -> usize {
    let gap_index = match side {
        DropSide::Before => target_ix,
        DropSide::After => target_ix.saturating_add(1),
    };
    let mut to = gap_index;
    if to > from {
        to = to.saturating_sub(1);
    }
    to.min(item_count.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_index_moving_down() {
        // [A B C D], drag A after C -> [B C A D]
        assert_eq!(reorder_to_index(0, 2, DropSide::After, 4), 2);
        // drag A before C -> [B A C D]
        assert_eq!(reorder_to_index(0, 2, DropSide::Before, 4), 1);
        // drag B after last
        assert_eq!(reorder_to_index(1, 3, DropSide::After, 4), 3);
    }

    #[test]
    fn reorder_index_moving_up() {
        // [A B C D], drag D before B -> [A D B C]
        assert_eq!(reorder_to_index(3, 1, DropSide::Before, 4), 1);
        assert_eq!(reorder_to_index(3, 1, DropSide::After, 4), 2);
        assert_eq!(reorder_to_index(3, 0, DropSide::Before, 4), 0);
    }

    #[test]
    fn reorder_index_around_self_is_identity() {
        assert_eq!(reorder_to_index(1, 0, DropSide::After, 3), 1);
        assert_eq!(reorder_to_index(1, 2, DropSide::Before, 3), 1);
    }
}
