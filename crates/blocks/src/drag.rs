use gpui::{
    Bounds, Context, EntityId, IntoElement, ParentElement as _, Pixels, Render, SharedString,
    Styled as _, Window, div, px,
};
use gpui_component::ActiveTheme as _;
use gpui_manos_blocks_core::{DragHandle, Rect};

/// Value carried by an active block drag.
#[derive(Clone)]
pub(crate) struct BlockDrag {
    pub editor_id: EntityId,
    pub handle: DragHandle,
    pub label: SharedString,
}

impl BlockDrag {
    pub fn new(editor_id: EntityId, handle: DragHandle, label: SharedString) -> Self {
        Self {
            editor_id,
            handle,
            label,
        }
    }
}

pub(crate) struct DragGhost {
    label: SharedString,
}

impl DragGhost {
    pub fn new(label: SharedString) -> Self {
        Self { label }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        div()
            .max_w(px(280.))
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .truncate()
            .child(self.label.clone())
    }
}

pub(crate) fn rect_from_bounds(bounds: Bounds<Pixels>) -> Rect {
    Rect::new(
        bounds.origin.x.into(),
        bounds.origin.y.into(),
        bounds.size.width.into(),
        bounds.size.height.into(),
    )
}
