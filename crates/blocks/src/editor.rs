use std::collections::HashMap;
use std::rc::Rc;

use gpui::prelude::FluentBuilder as _;
use gpui::{
    AnyElement, App, Context, ElementId, Entity, EventEmitter, FocusHandle,
    Focusable, FontWeight, Hsla, InteractiveElement as _, IntoElement, KeyBinding, KeyDownEvent,
    MouseButton, MouseDownEvent, ParentElement as _, Pixels, Point, Render,
    StatefulInteractiveElement as _, Styled as _, Window, actions, div, px,
};
use gpui_component::{ActiveTheme as _, Icon, IconName, Sizable as _, h_flex, v_flex};
use gpui_manos_blocks_core::{
    AnchorPosition, Block, BlockDocument, BlockEngine as _, BlockId, BlockVisuals, BlocksConfig,
    CommandPalette, DataTransfer, DragEvent, DragGesture, DragHandle, DragSession, DropSide,
    DropTarget, InsertionIndicator, MoveRequest, NudgeDirection, Rect, default_catalog,
    nudge_block,
};

use crate::drop_target::BlockDropTarget;
use crate::handle::BlockDragHandle;
use crate::palette::{CommandPaletteView, PaletteOverlay};
use crate::prompt::PromptOverlay;

const CONTEXT: &str = "BlockEditor";

actions!(manos_blocks, [NudgeUp, NudgeDown, OpenCommandPalette]);

pub(crate) fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("alt-up", NudgeUp, Some(CONTEXT)),
        KeyBinding::new("alt-down", NudgeDown, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-k", OpenCommandPalette, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-k", OpenCommandPalette, Some(CONTEXT)),
    ]);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockEditorEvent {
    /// The document's blocks changed (reorder, conversion or insertion).
    Changed,
    PaletteClosed,
}

/// A column of blocks with drag handles, drop zones and the insertion palette.
pub struct BlockEditorState {
    focus_handle: FocusHandle,
    document: BlockDocument,
    config: BlocksConfig,
    session: DragSession,
    drag: Option<DragGesture>,
    visuals: BlockVisuals,
    drop_targets: HashMap<BlockId, DropTarget>,
    block_bounds: HashMap<BlockId, Rect>,
    last_pointer: Option<Point<Pixels>>,
    pub(crate) palette: CommandPalette,
    pub(crate) palette_overlay: Option<PaletteOverlay>,
    pub(crate) prompt_overlay: Option<PromptOverlay>,
    pub(crate) palette_on_close: Option<Rc<dyn Fn(&mut Window, &mut App)>>,
}

impl EventEmitter<BlockEditorEvent> for BlockEditorState {}

impl Focusable for BlockEditorState {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl BlockEditorState {
    pub fn new(document: BlockDocument, config: BlocksConfig, cx: &mut Context<Self>) -> Self {
        let config = config.with_defaults();
        let palette = CommandPalette::new(default_catalog(&config));
        Self {
            focus_handle: cx.focus_handle(),
            document,
            config,
            session: DragSession::new(),
            drag: None,
            visuals: BlockVisuals::default(),
            drop_targets: HashMap::new(),
            block_bounds: HashMap::new(),
            last_pointer: None,
            palette,
            palette_overlay: None,
            prompt_overlay: None,
            palette_on_close: None,
        }
    }

    pub fn document(&self) -> &BlockDocument {
        &self.document
    }

    pub fn config(&self) -> &BlocksConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    pub fn is_dimmed(&self, block: &BlockId) -> bool {
        self.visuals.is_dimmed(block)
    }

    pub fn indicator(&self, block: &BlockId) -> Option<InsertionIndicator> {
        self.drop_targets
            .get(block)
            .and_then(DropTarget::indicator)
    }

    pub fn is_palette_open(&self) -> bool {
        self.palette.is_open()
    }

    /// Called after the palette closes, whether confirmed or dismissed.
    pub fn set_palette_on_close(&mut self, on_close: impl Fn(&mut Window, &mut App) + 'static) {
        self.palette_on_close = Some(Rc::new(on_close));
    }

    pub fn focus_block(&mut self, block: Option<BlockId>, cx: &mut Context<Self>) {
        if self.document.focused() != block.as_ref() {
            self.document.set_focus(block);
            cx.notify();
        }
    }

    /// Moves `source` next to `target`. Returns whether the document changed.
    pub fn request_move(
        &mut self,
        source: &BlockId,
        target: &BlockId,
        side: DropSide,
        cx: &mut Context<Self>,
    ) -> bool {
        let moved = gpui_manos_blocks_core::request_move(&mut self.document, source, target, side);
        if moved {
            cx.emit(BlockEditorEvent::Changed);
            cx.notify();
        }
        moved
    }

    pub fn nudge_focused(&mut self, direction: NudgeDirection, cx: &mut Context<Self>) -> bool {
        let Some(block) = self.document.focused().cloned() else {
            return false;
        };
        let moved = nudge_block(&mut self.document, &block, direction);
        if moved {
            cx.emit(BlockEditorEvent::Changed);
            cx.notify();
        }
        moved
    }

    pub(crate) fn begin_drag(&mut self, handle: &DragHandle, cx: &mut Context<Self>) {
        let (gesture, effects) = DragGesture::start(handle.clone(), &mut self.session);
        self.visuals.apply(effects);
        self.drag = Some(gesture);
        cx.notify();
    }

    pub(crate) fn drag_move_over(
        &mut self,
        block: &BlockId,
        bounds: Rect,
        x: f32,
        y: f32,
        cx: &mut Context<Self>,
    ) {
        self.block_bounds.insert(block.clone(), bounds);
        let target = self
            .drop_targets
            .entry(block.clone())
            .or_insert_with(|| DropTarget::new(block.clone()));
        let before = target.hover();
        if bounds.contains(x, y) {
            target.drag_over(y, &self.block_bounds);
        } else {
            target.drag_leave();
        }
        if target.hover() != before {
            cx.notify();
        }
    }

    pub(crate) fn drop_on_block(
        &mut self,
        block: &BlockId,
        cx: &mut Context<Self>,
    ) -> Option<MoveRequest> {
        self.visuals.apply(self.session.handle(DragEvent::Drop));
        let empty = DataTransfer::new();
        let transfer = self.drag.as_ref().map_or(&empty, DragGesture::transfer);
        let request = self
            .drop_targets
            .entry(block.clone())
            .or_insert_with(|| DropTarget::new(block.clone()))
            .drop(transfer);
        for target in self.drop_targets.values_mut() {
            target.drag_leave();
        }
        cx.notify();
        request
    }

    /// Ends the gesture whether or not it was dropped.
    fn finish_drag(&mut self) {
        let Some(gesture) = self.drag.take() else {
            return;
        };
        self.visuals.apply(gesture.end(&mut self.session));
        for target in self.drop_targets.values_mut() {
            target.drag_leave();
        }
    }

    pub(crate) fn document_mut(&mut self) -> &mut BlockDocument {
        &mut self.document
    }

    pub(crate) fn refocus(&self, window: &mut Window) {
        window.focus(&self.focus_handle);
    }

    fn open_palette_at_focus(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let block = self
            .document
            .focused()
            .cloned()
            .or_else(|| self.document.block_ids().last().cloned());
        let anchor = self
            .last_pointer
            .map(anchor_below)
            .unwrap_or_else(|| AnchorPosition::new(24., 24.));
        self.open_palette(block, anchor, window, cx);
    }

    fn on_key_down(&mut self, event: &KeyDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        if self.palette.is_open() || self.prompt_overlay.is_some() {
            return;
        }
        let keystroke = &event.keystroke;
        let modifiers = keystroke.modifiers;
        if modifiers.control || modifiers.alt || modifiers.platform {
            return;
        }
        let typed = keystroke
            .key_char
            .as_deref()
            .unwrap_or(keystroke.key.as_str());
        let mut chars = typed.chars();
        if chars.next() == Some(self.config.trigger()) && chars.next().is_none() {
            self.open_palette_at_focus(window, cx);
            cx.stop_propagation();
        }
    }

    fn on_block_mouse_down(
        &mut self,
        block: &BlockId,
        event: &MouseDownEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.last_pointer = Some(event.position);
        self.focus_block(Some(block.clone()), cx);
        if self.palette_overlay.is_none() && self.prompt_overlay.is_none() {
            window.focus(&self.focus_handle);
        }
    }

    fn render_rows(&self, editor: &Entity<Self>, cx: &Context<Self>) -> Vec<AnyElement> {
        let theme = cx.theme();
        let focused = self.document.focused();
        let blocks = self.document.blocks();

        blocks
            .iter()
            .enumerate()
            .map(|(ix, block)| {
                let is_focused = focused == Some(&block.id);
                let number = list_number(blocks, ix);
                let row_block = block.id.clone();
                let plus_block = block.id.clone();

                let insert_button = div()
                    .id(ElementId::Name(format!("block-insert-{}", block.id).into()))
                    .flex_none()
                    .flex()
                    .items_center()
                    .justify_center()
                    .w(px(18.))
                    .h(px(24.))
                    .rounded(px(4.))
                    .cursor_pointer()
                    .text_color(theme.muted_foreground)
                    .hover(|this| this.bg(theme.accent.alpha(0.4)))
                    .child(Icon::new(IconName::Plus).xsmall())
                    .on_mouse_down(
                        MouseButton::Left,
                        cx.listener(move |this, event: &MouseDownEvent, window, cx| {
                            window.prevent_default();
                            cx.stop_propagation();
                            this.last_pointer = Some(event.position);
                            this.focus_block(Some(plus_block.clone()), cx);
                            this.open_palette(
                                Some(plus_block.clone()),
                                anchor_below(event.position),
                                window,
                                cx,
                            );
                        }),
                    );

                BlockDropTarget::new(editor, block.id.clone())
                    .child(
                        h_flex()
                            .id(ElementId::Name(format!("block-row-{}", block.id).into()))
                            .w_full()
                            .items_start()
                            .gap_x_1()
                            .px(px(4.))
                            .py(px(2.))
                            .rounded(px(6.))
                            .when(is_focused, |this| this.bg(theme.accent.alpha(0.15)))
                            .on_mouse_down(
                                MouseButton::Left,
                                cx.listener(move |this, event: &MouseDownEvent, window, cx| {
                                    this.on_block_mouse_down(&row_block, event, window, cx);
                                }),
                            )
                            .child(insert_button)
                            .child(BlockDragHandle::new(editor, block.id.clone(), block.label()))
                            .child(
                                div()
                                    .flex_1()
                                    .min_w(px(0.))
                                    .child(render_block_content(
                                        block,
                                        number,
                                        theme.foreground,
                                        theme.muted_foreground,
                                        theme.border,
                                    )),
                            ),
                    )
                    .into_any_element()
            })
            .collect()
    }
}

impl Render for BlockEditorState {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !cx.has_active_drag() {
            self.finish_drag();
        }

        let editor = cx.entity();
        let prompt = self.render_prompt(window, cx);
        let palette = self
            .palette
            .is_open()
            .then(|| CommandPaletteView::new(&editor));
        let rows = self.render_rows(&editor, cx);

        v_flex()
            .id("block-editor")
            .key_context(CONTEXT)
            .track_focus(&self.focus_handle)
            .size_full()
            .relative()
            .gap_y_1()
            .on_action(cx.listener(|this, _: &NudgeUp, _window, cx| {
                if !this.palette.is_open() {
                    this.nudge_focused(NudgeDirection::Up, cx);
                }
            }))
            .on_action(cx.listener(|this, _: &NudgeDown, _window, cx| {
                if !this.palette.is_open() {
                    this.nudge_focused(NudgeDirection::Down, cx);
                }
            }))
            .on_action(cx.listener(|this, _: &OpenCommandPalette, window, cx| {
                if !this.palette.is_open() {
                    this.open_palette_at_focus(window, cx);
                }
            }))
            .on_key_down(cx.listener(Self::on_key_down))
            .children(rows)
            .children(palette)
            .children(prompt)
    }
}

/// Palette anchor just under a pointer position, in window coordinates.
fn anchor_below(position: Point<Pixels>) -> AnchorPosition {
    AnchorPosition::new(position.x.into(), f32::from(position.y) + 12.)
}

/// 1-based position of a numbered list item within its run of numbered siblings.
fn list_number(blocks: &[Block], ix: usize) -> Option<usize> {
    let is_numbered = |block: &Block| {
        block.kind == "list_item"
            && block.attrs.get("list_type").and_then(|v| v.as_str()) == Some("numbered")
    };
    if !blocks.get(ix).is_some_and(is_numbered) {
        return None;
    }
    let run = blocks[..ix]
        .iter()
        .rev()
        .take_while(|block| is_numbered(block))
        .count();
    Some(run + 1)
}

fn render_block_content(
    block: &Block,
    number: Option<usize>,
    foreground: Hsla,
    muted: Hsla,
    border: Hsla,
) -> AnyElement {
    let text = block.text.clone();
    match block.kind.as_str() {
        "heading" => {
            let level = block
                .attrs
                .get("level")
                .and_then(|v| v.as_u64())
                .unwrap_or(1);
            let base = div().font_weight(FontWeight::BOLD).child(text);
            let heading = match level {
                1 => base.text_2xl(),
                2 => base.text_xl(),
                3 => base.text_lg(),
                _ => base.text_base(),
            };
            heading.into_any_element()
        }
        "list_item" => {
            let marker = match block.attrs.get("list_type").and_then(|v| v.as_str()) {
                Some("numbered") => format!("{}.", number.unwrap_or(1)),
                Some("todo") => {
                    let checked = block
                        .attrs
                        .get("checked")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    let marker = if checked { "☑" } else { "☐" };
                    marker.to_string()
                }
                _ => "•".to_string(),
            };
            h_flex()
                .gap_x_2()
                .child(div().flex_none().text_color(muted).child(marker))
                .child(div().flex_1().child(text))
                .into_any_element()
        }
        "blockquote" => div()
            .border_l_2()
            .border_color(border)
            .pl(px(10.))
            .italic()
            .text_color(muted)
            .child(text)
            .into_any_element(),
        "code_block" => div()
            .px(px(8.))
            .py(px(6.))
            .rounded(px(6.))
            .border_1()
            .border_color(border)
            .font_family("monospace")
            .text_sm()
            .child(text)
            .into_any_element(),
        "divider" => div()
            .py(px(11.))
            .child(div().h(px(1.)).w_full().bg(border))
            .into_any_element(),
        "table" => {
            let rows = block.attrs.get("rows").and_then(|v| v.as_u64()).unwrap_or(1);
            let cols = block.attrs.get("cols").and_then(|v| v.as_u64()).unwrap_or(1);
            v_flex()
                .border_1()
                .border_color(border)
                .children((0..rows).map(|_| {
                    h_flex().children((0..cols).map(|_| {
                        div()
                            .flex_1()
                            .h(px(24.))
                            .border_1()
                            .border_color(border)
                    }))
                }))
                .into_any_element()
        }
        "image" => {
            let src = block
                .attrs
                .get("src")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let alt = block
                .attrs
                .get("alt")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            v_flex()
                .p(px(8.))
                .gap_y_1()
                .rounded(px(6.))
                .border_1()
                .border_color(border)
                .child(div().text_sm().text_color(foreground).child(src))
                .when_some(alt, |this, alt| {
                    this.child(div().text_xs().text_color(muted).child(alt))
                })
                .into_any_element()
        }
        _ => {
            let links: Vec<String> = block
                .attrs
                .get("links")
                .and_then(|v| v.as_array())
                .map(|links| {
                    links
                        .iter()
                        .filter_map(|link| link.get("url").and_then(|url| url.as_str()))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            v_flex()
                .min_h(px(24.))
                .child(div().text_color(foreground).child(text))
                .children(links.into_iter().map(|url| {
                    div().text_xs().text_color(muted).underline().child(url)
                }))
                .into_any_element()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(id: &str) -> Block {
        Block::new(id, "list_item", id).attr("list_type", serde_json::json!("numbered"))
    }

    #[test]
    fn numbered_items_count_within_their_run() {
        let blocks = vec![
            numbered("a"),
            numbered("b"),
            Block::paragraph("p", "break"),
            numbered("c"),
        ];
        assert_eq!(list_number(&blocks, 0), Some(1));
        assert_eq!(list_number(&blocks, 1), Some(2));
        assert_eq!(list_number(&blocks, 2), None);
        assert_eq!(list_number(&blocks, 3), Some(1));
    }

    #[test]
    fn bulleted_items_have_no_number() {
        let blocks = vec![
            Block::new("a", "list_item", "a").attr("list_type", serde_json::json!("bulleted")),
        ];
        assert_eq!(list_number(&blocks, 0), None);
    }
}
