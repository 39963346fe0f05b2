use std::rc::Rc;

use gpui::{
    AnyElement, App, ElementId, Entity, InteractiveElement as _, IntoElement, ParentElement,
    RenderOnce, Styled as _, Window, div, prelude::FluentBuilder as _, px,
};
use gpui_component::ActiveTheme as _;
use gpui_manos_blocks_core::{BlockId, DropSide};

use crate::drag::{BlockDrag, rect_from_bounds};
use crate::editor::BlockEditorState;

type DropCallback = Rc<dyn Fn(&BlockId, &BlockId, DropSide, &mut Window, &mut App)>;

/// Wraps a block's content and turns it into a drop zone for other blocks.
///
/// While a drag hovers, the half under the pointer decides whether the insertion line
/// is drawn above or below. Without an `on_drop` callback an accepted drop is applied
/// to the editor's document directly.
#[derive(IntoElement)]
pub struct BlockDropTarget {
    editor: Entity<BlockEditorState>,
    block: BlockId,
    on_drop: Option<DropCallback>,
    children: Vec<AnyElement>,
}

impl BlockDropTarget {
    pub fn new(editor: &Entity<BlockEditorState>, block: impl Into<BlockId>) -> Self {
        Self {
            editor: editor.clone(),
            block: block.into(),
            on_drop: None,
            children: Vec::new(),
        }
    }

    /// Called with `(source, target, side)` once per accepted drop.
    pub fn on_drop(
        mut self,
        on_drop: impl Fn(&BlockId, &BlockId, DropSide, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_drop = Some(Rc::new(on_drop));
        self
    }
}

impl ParentElement for BlockDropTarget {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl RenderOnce for BlockDropTarget {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let editor_id = self.editor.entity_id();
        let state = self.editor.read(cx);
        let indicator = state.indicator(&self.block);
        let dimmed = state.is_dimmed(&self.block);
        let opacity = state.config().drag_opacity;
        let thickness = state.config().indicator_thickness;

        let theme = cx.theme();
        let drag_border = theme.drag_border;
        let drop_target_bg = theme.drop_target;
        let badge_fg = theme.background;

        div()
            .id(ElementId::Name(format!("block-{}", self.block).into()))
            .relative()
            .w_full()
            .when(dimmed, |this| this.opacity(opacity))
            .children(self.children)
            .on_drag_move::<BlockDrag>({
                let editor = self.editor.clone();
                let block = self.block.clone();
                move |event, _window, cx| {
                    if event.drag(cx).editor_id != editor_id {
                        return;
                    }
                    let bounds = rect_from_bounds(event.bounds);
                    let position = event.event.position;
                    editor.update(cx, |state, cx| {
                        state.drag_move_over(
                            &block,
                            bounds,
                            position.x.into(),
                            position.y.into(),
                            cx,
                        );
                    });
                }
            })
            .on_drop::<BlockDrag>({
                let editor = self.editor.clone();
                let block = self.block.clone();
                let on_drop = self.on_drop.clone();
                move |drag, window, cx| {
                    if drag.editor_id != editor_id {
                        return;
                    }
                    let request = editor.update(cx, |state, cx| {
                        state.drop_on_block(&block, cx)
                    });
                    let Some(request) = request else {
                        return;
                    };
                    match on_drop.as_ref() {
                        Some(on_drop) => {
                            on_drop(&request.source, &request.target, request.side, window, cx)
                        }
                        None => {
                            editor.update(cx, |state, cx| {
                                state.request_move(
                                    &request.source,
                                    &request.target,
                                    request.side,
                                    cx,
                                );
                            });
                        }
                    }
                }
            })
            .when_some(indicator, |this, indicator| {
                let line = div()
                    .absolute()
                    .left_0()
                    .right_0()
                    .h(px(thickness))
                    .bg(drag_border);
                let line = match indicator.side {
                    DropSide::Before => line.top(px(-thickness / 2.)),
                    DropSide::After => line.bottom(px(-thickness / 2.)),
                };
                let badge = div()
                    .absolute()
                    .right(px(4.))
                    .px(px(4.))
                    .rounded(px(4.))
                    .bg(drag_border)
                    .text_xs()
                    .text_color(badge_fg)
                    .child(indicator.label);
                let badge = match indicator.side {
                    DropSide::Before => badge.top(px(-8.)),
                    DropSide::After => badge.bottom(px(-8.)),
                };
                this.bg(drop_target_bg.alpha(drop_target_bg.a.max(0.2)))
                    .child(line)
                    .child(badge)
            })
    }
}
