use std::collections::BTreeSet;

use crate::block::BlockId;
use crate::geometry::{DropSide, GeometryProvider, resolve_side};
use crate::transfer::{DataTransfer, DropEffect};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: BlockId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    /// Primary pointer-down on a handle turned into a drag.
    Start { source: BlockId },
    /// A drop target accepted the payload. The gesture has not ended yet.
    Drop,
    /// End of the gesture, with or without a drop. `origin` is the handle's own block.
    End { origin: BlockId },
}

/// Visual side effects of a drag session, applied by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEffect {
    Dim(BlockId),
    Undim(BlockId),
}

/// Pure drag-session transition.
///
/// Starting while already dragging replaces the session: a new primary pointer-down implicitly
/// ends the previous gesture. `End` always undims its origin, whatever state it finds.
pub fn drag_transition(state: DragState, event: DragEvent) -> (DragState, Vec<DragEffect>) {
    match (state, event) {
        (DragState::Idle, DragEvent::Start { source }) => (
            DragState::Dragging {
                source: source.clone(),
            },
            vec![DragEffect::Dim(source)],
        ),
        (DragState::Dragging { source: previous }, DragEvent::Start { source }) => {
            let mut effects = Vec::with_capacity(2);
            if previous != source {
                effects.push(DragEffect::Undim(previous));
            }
            effects.push(DragEffect::Dim(source.clone()));
            (DragState::Dragging { source }, effects)
        }
        (_, DragEvent::Drop) => (DragState::Idle, Vec::new()),
        (state, DragEvent::End { origin }) => {
            let mut effects = vec![DragEffect::Undim(origin.clone())];
            match state {
                DragState::Dragging { source } if source != origin => {
                    effects.push(DragEffect::Undim(source));
                }
                _ => {}
            }
            (DragState::Idle, effects)
        }
    }
}

/// The single drag session of an editor surface.
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn source(&self) -> Option<&BlockId> {
        match &self.state {
            DragState::Dragging { source } => Some(source),
            DragState::Idle => None,
        }
    }

    pub fn handle(&mut self, event: DragEvent) -> Vec<DragEffect> {
        let state = std::mem::take(&mut self.state);
        tracing::trace!(?state, ?event, "drag session transition");
        let (next, effects) = drag_transition(state, event);
        self.state = next;
        effects
    }
}

/// Per-block grab affordance that originates drag sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragHandle {
    block: BlockId,
}

impl DragHandle {
    pub fn new(block: impl Into<BlockId>) -> Self {
        Self {
            block: block.into(),
        }
    }

    pub fn block(&self) -> &BlockId {
        &self.block
    }

    /// Tags `transfer` with the owning block and opens the session.
    pub fn drag_start(
        &self,
        session: &mut DragSession,
        transfer: &mut DataTransfer,
    ) -> Vec<DragEffect> {
        transfer.set_block(&self.block);
        session.handle(DragEvent::Start {
            source: self.block.clone(),
        })
    }

    /// Closes the session and clears this block's affectation, dropped or not.
    pub fn drag_end(&self, session: &mut DragSession) -> Vec<DragEffect> {
        session.handle(DragEvent::End {
            origin: self.block.clone(),
        })
    }
}

/// A drag in flight: the originating handle and the payload its `drag_start` wrote.
#[derive(Debug, Clone)]
pub struct DragGesture {
    origin: DragHandle,
    transfer: DataTransfer,
}

impl DragGesture {
    pub fn start(origin: DragHandle, session: &mut DragSession) -> (Self, Vec<DragEffect>) {
        let mut transfer = DataTransfer::new();
        let effects = origin.drag_start(session, &mut transfer);
        (Self { origin, transfer }, effects)
    }

    pub fn origin(&self) -> &DragHandle {
        &self.origin
    }

    pub fn transfer(&self) -> &DataTransfer {
        &self.transfer
    }

    pub fn end(self, session: &mut DragSession) -> Vec<DragEffect> {
        self.origin.drag_end(session)
    }
}

/// Blocks currently rendered with reduced opacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockVisuals {
    dimmed: BTreeSet<BlockId>,
}

impl BlockVisuals {
    pub fn apply(&mut self, effects: impl IntoIterator<Item = DragEffect>) {
        for effect in effects {
            match effect {
                DragEffect::Dim(id) => {
                    self.dimmed.insert(id);
                }
                DragEffect::Undim(id) => {
                    self.dimmed.remove(&id);
                }
            }
        }
    }

    pub fn is_dimmed(&self, id: &BlockId) -> bool {
        self.dimmed.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.dimmed.is_empty()
    }

    pub fn clear(&mut self) {
        self.dimmed.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverState {
    pub is_over: bool,
    pub side: Option<DropSide>,
}

/// The line drawn on the hovered edge of a drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionIndicator {
    pub side: DropSide,
    pub label: &'static str,
}

impl From<DropSide> for InsertionIndicator {
    fn from(side: DropSide) -> Self {
        Self {
            side,
            label: side.label(),
        }
    }
}

/// What a pointer-over tells the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOver {
    /// Always set: every block accepts drops.
    pub prevent_default: bool,
    pub drop_effect: DropEffect,
    pub indicator: Option<InsertionIndicator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub source: BlockId,
    pub target: BlockId,
    pub side: DropSide,
}

impl MoveRequest {
    /// `None` for empty ids and for self-moves.
    pub fn new(source: BlockId, target: BlockId, side: DropSide) -> Option<Self> {
        if source.is_empty() || target.is_empty() || source == target {
            return None;
        }
        Some(Self {
            source,
            target,
            side,
        })
    }
}

/// Drop-zone behavior of a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    block: BlockId,
    hover: HoverState,
}

impl DropTarget {
    pub fn new(block: impl Into<BlockId>) -> Self {
        Self {
            block: block.into(),
            hover: HoverState::default(),
        }
    }

    pub fn block(&self) -> &BlockId {
        &self.block
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn indicator(&self) -> Option<InsertionIndicator> {
        self.hover
            .is_over
            .then_some(self.hover.side)
            .flatten()
            .map(InsertionIndicator::from)
    }

    /// Recomputes the hover side from the latest pointer position.
    pub fn drag_over(&mut self, pointer_y: f32, geometry: &dyn GeometryProvider) -> DragOver {
        let indicator = match geometry.bounds_of(&self.block) {
            Some(bounds) => {
                let side = resolve_side(pointer_y, bounds);
                self.hover = HoverState {
                    is_over: true,
                    side: Some(side),
                };
                Some(InsertionIndicator::from(side))
            }
            None => {
                self.hover = HoverState::default();
                None
            }
        };
        DragOver {
            prevent_default: true,
            drop_effect: DropEffect::Move,
            indicator,
        }
    }

    pub fn drag_leave(&mut self) {
        self.hover = HoverState::default();
    }

    /// Turns a drop into a move request. Mis-drops (no payload, or onto itself) yield `None`.
    pub fn drop(&mut self, transfer: &DataTransfer) -> Option<MoveRequest> {
        let side = self.hover.side.unwrap_or(DropSide::After);
        self.hover = HoverState::default();

        let Some(source) = transfer.block_id() else {
            tracing::debug!(target_block = %self.block, "drop without a block payload ignored");
            return None;
        };
        if source == self.block {
            tracing::debug!(block = %source, "block dropped onto itself ignored");
            return None;
        }
        MoveRequest::new(source, self.block.clone(), side)
    }

    /// Same as [`DropTarget::drop`], handing an accepted request to `on_drop`.
    pub fn drop_with(
        &mut self,
        transfer: &DataTransfer,
        on_drop: impl FnOnce(&BlockId, &BlockId, DropSide),
    ) -> bool {
        match self.drop(transfer) {
            Some(request) => {
                on_drop(&request.source, &request.target, request.side);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::geometry::Rect;

    fn geometry() -> HashMap<BlockId, Rect> {
        let mut map = HashMap::new();
        map.insert(BlockId::new("b1"), Rect::new(0., 0., 300., 40.));
        map.insert(BlockId::new("b2"), Rect::new(0., 40., 300., 40.));
        map
    }

    #[test]
    fn drag_end_without_drop_clears_affectation() {
        let mut session = DragSession::new();
        let mut visuals = BlockVisuals::default();
        let mut transfer = DataTransfer::new();
        let handle = DragHandle::new("b1");

        visuals.apply(handle.drag_start(&mut session, &mut transfer));
        assert!(visuals.is_dimmed(&BlockId::new("b1")));
        assert_eq!(session.source(), Some(&BlockId::new("b1")));

        visuals.apply(handle.drag_end(&mut session));
        assert!(visuals.is_empty());
        assert!(!session.is_dragging());
    }

    #[test]
    fn drag_end_after_drop_still_clears_affectation() {
        let mut session = DragSession::new();
        let mut visuals = BlockVisuals::default();
        let mut transfer = DataTransfer::new();
        let handle = DragHandle::new("b1");

        visuals.apply(handle.drag_start(&mut session, &mut transfer));
        visuals.apply(session.handle(DragEvent::Drop));
        assert!(visuals.is_dimmed(&BlockId::new("b1")));

        visuals.apply(handle.drag_end(&mut session));
        assert!(visuals.is_empty());

        // Idempotent.
        visuals.apply(handle.drag_end(&mut session));
        assert!(visuals.is_empty());
    }

    #[test]
    fn restarting_a_drag_replaces_the_session() {
        let mut session = DragSession::new();
        let mut visuals = BlockVisuals::default();
        let mut transfer = DataTransfer::new();

        visuals.apply(DragHandle::new("b1").drag_start(&mut session, &mut transfer));
        visuals.apply(DragHandle::new("b2").drag_start(&mut session, &mut transfer));
        assert!(!visuals.is_dimmed(&BlockId::new("b1")));
        assert!(visuals.is_dimmed(&BlockId::new("b2")));
        assert_eq!(session.source(), Some(&BlockId::new("b2")));
        assert_eq!(transfer.block_id(), Some(BlockId::new("b2")));
    }

    #[test]
    fn drag_over_tracks_latest_pointer() {
        let geometry = geometry();
        let mut target = DropTarget::new("b2");

        let over = target.drag_over(45., &geometry);
        assert!(over.prevent_default);
        assert_eq!(over.drop_effect, DropEffect::Move);
        assert_eq!(over.indicator.map(|i| i.side), Some(DropSide::Before));
        assert_eq!(over.indicator.map(|i| i.label), Some("insert before"));

        let over = target.drag_over(60., &geometry);
        assert_eq!(over.indicator.map(|i| i.side), Some(DropSide::After));
        assert_eq!(target.indicator().map(|i| i.label), Some("insert after"));

        target.drag_leave();
        assert_eq!(target.hover(), HoverState::default());
        assert_eq!(target.indicator(), None);
    }

    #[test]
    fn drag_over_without_bounds_shows_nothing() {
        let mut target = DropTarget::new("missing");
        let over = target.drag_over(10., &geometry());
        assert_eq!(over.indicator, None);
        assert!(!target.hover().is_over);
    }

    #[test]
    fn drop_uses_last_side_and_clears_hover() {
        let mut target = DropTarget::new("b2");
        target.drag_over(41., &geometry());

        let mut transfer = DataTransfer::new();
        transfer.set_block(&BlockId::new("b1"));
        let request = target.drop(&transfer).unwrap();
        assert_eq!(request.side, DropSide::Before);
        assert_eq!(target.hover(), HoverState::default());
    }

    #[test]
    fn drop_defaults_to_after_when_hover_was_cleared() {
        let mut target = DropTarget::new("b2");
        target.drag_over(41., &geometry());
        target.drag_leave();

        let mut transfer = DataTransfer::new();
        transfer.set_block(&BlockId::new("b1"));
        assert_eq!(target.drop(&transfer).unwrap().side, DropSide::After);
    }

    #[test]
    fn mis_drops_are_silent() {
        let mut target = DropTarget::new("b2");
        target.drag_over(41., &geometry());
        assert_eq!(target.drop(&DataTransfer::new()), None);
        assert_eq!(target.hover(), HoverState::default());

        let mut transfer = DataTransfer::new();
        transfer.set_block(&BlockId::new("b2"));
        let mut called = false;
        assert!(!target.drop_with(&transfer, |_, _, _| called = true));
        assert!(!called);
    }

    #[test]
    fn move_request_rejects_self_and_empty() {
        assert!(MoveRequest::new("a".into(), "a".into(), DropSide::After).is_none());
        assert!(MoveRequest::new("".into(), "a".into(), DropSide::After).is_none());
        assert!(MoveRequest::new("a".into(), "".into(), DropSide::After).is_none());
        assert!(MoveRequest::new("a".into(), "b".into(), DropSide::Before).is_some());
    }
}
