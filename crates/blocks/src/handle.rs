use gpui::{
    App, AppContext as _, CursorStyle, ElementId, Entity, InteractiveElement as _, IntoElement,
    ParentElement as _, RenderOnce, SharedString, StatefulInteractiveElement as _, Styled as _,
    Window, div, px,
};
use gpui_component::{ActiveTheme as _, Icon, IconName, Sizable as _};
use gpui_manos_blocks_core::{BlockId, DragHandle};

use crate::drag::{BlockDrag, DragGhost};
use crate::editor::BlockEditorState;

/// Grab affordance rendered next to a block. Dragging it starts a block drag session.
#[derive(IntoElement)]
pub struct BlockDragHandle {
    editor: Entity<BlockEditorState>,
    block: BlockId,
    label: SharedString,
}

impl BlockDragHandle {
    pub fn new(
        editor: &Entity<BlockEditorState>,
        block: impl Into<BlockId>,
        label: impl Into<SharedString>,
    ) -> Self {
        Self {
            editor: editor.clone(),
            block: block.into(),
            label: label.into(),
        }
    }
}

impl RenderOnce for BlockDragHandle {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();
        let editor = self.editor.clone();
        let drag_value = BlockDrag::new(
            self.editor.entity_id(),
            DragHandle::new(self.block.clone()),
            self.label,
        );

        div()
            .id(ElementId::Name(format!("block-handle-{}", self.block).into()))
            .flex_none()
            .flex()
            .items_center()
            .justify_center()
            .w(px(18.))
            .h(px(24.))
            .rounded(px(4.))
            .cursor(CursorStyle::OpenHand)
            .text_color(theme.muted_foreground)
            .hover(|this| this.bg(theme.accent.alpha(0.4)))
            .child(Icon::new(IconName::Menu).xsmall())
            .on_drag(drag_value, move |drag, _offset, _window, cx| {
                editor.update(cx, |state, cx| {
                    state.begin_drag(&drag.handle, cx);
                });
                let label = drag.label.clone();
                cx.new(|_| DragGhost::new(label))
            })
    }
}
