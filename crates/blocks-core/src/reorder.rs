use crate::block::BlockId;
use crate::drag::MoveRequest;
use crate::engine::BlockEngine;
use crate::geometry::DropSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Up,
    Down,
}

/// Asks the engine to move `source` beside `target`.
///
/// Empty or identical ids are ignored. The engine is called at most once, and a move it declines
/// is not retried; the return value only says whether the document changed.
pub fn request_move(
    engine: &mut dyn BlockEngine,
    source: &BlockId,
    target: &BlockId,
    side: DropSide,
) -> bool {
    let Some(request) = MoveRequest::new(source.clone(), target.clone(), side) else {
        tracing::debug!(%source, %target, "invalid move request ignored");
        return false;
    };
    apply_move_request(engine, &request)
}

pub fn apply_move_request(engine: &mut dyn BlockEngine, request: &MoveRequest) -> bool {
    let moved = engine.drop_block(&request.source, &request.target, request.side);
    if !moved {
        tracing::trace!(?request, "engine declined block move");
    }
    moved
}

/// Index-based reorder for keyboard and programmatic callers. Out-of-range indices do nothing.
pub fn move_block(engine: &mut dyn BlockEngine, from: usize, to: usize) -> bool {
    let count = engine.block_count();
    if from >= count || to >= count {
        tracing::debug!(from, to, count, "out-of-range block move ignored");
        return false;
    }
    if from == to {
        return false;
    }
    engine.move_block(from, to)
}

/// Moves a block one slot up or down. No-op at either end of the document.
pub fn nudge_block(engine: &mut dyn BlockEngine, id: &BlockId, direction: NudgeDirection) -> bool {
    let Some(from) = engine.index_of(id) else {
        return false;
    };
    let to = match direction {
        NudgeDirection::Up => match from.checked_sub(1) {
            Some(to) => to,
            None => return false,
        },
        NudgeDirection::Down => from + 1,
    };
    move_block(engine, from, to)
}
