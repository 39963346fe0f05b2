use gpui::prelude::FluentBuilder as _;
use gpui::{
    App, AppContext as _, Context, ElementId, Entity, InteractiveElement as _, IntoElement,
    MouseButton, ParentElement as _, RenderOnce, SharedString, StatefulInteractiveElement as _,
    Styled as _, Subscription, Window, anchored, deferred, div, point, px,
};
use gpui_component::input::{Input, InputEvent, InputState};
use gpui_component::{ActiveTheme as _, v_flex};
use gpui_manos_blocks_core::{AnchorPosition, BlockId, CommandContext, PaletteEvent};

use crate::editor::{BlockEditorEvent, BlockEditorState};

/// Live widgets of an open palette. Dropping it releases the input and its listeners.
pub(crate) struct PaletteOverlay {
    input: Entity<InputState>,
    block: Option<BlockId>,
    _subscriptions: Vec<Subscription>,
}

impl BlockEditorState {
    /// Opens (or re-opens) the palette at `anchor`; commands target `block`.
    pub fn open_palette(
        &mut self,
        block: Option<BlockId>,
        anchor: AnchorPosition,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.palette.handle(PaletteEvent::Open { anchor });

        let input = cx.new(|cx| InputState::new(window, cx).placeholder("Поиск блока…"));
        input.update(cx, |state, cx| state.focus(window, cx));

        let subscriptions = vec![cx.subscribe_in(
            &input,
            window,
            |this, input, event: &InputEvent, window, cx| match event {
                InputEvent::Change { .. } => {
                    let query = input.read(cx).value().to_string();
                    this.dispatch_palette(PaletteEvent::SetQuery(query), window, cx);
                }
                InputEvent::PressEnter { .. } => {
                    this.dispatch_palette(PaletteEvent::Confirm, window, cx);
                }
                InputEvent::Blur => {
                    this.dispatch_palette(PaletteEvent::FocusLost, window, cx);
                }
                _ => {}
            },
        )];

        self.palette_overlay = Some(PaletteOverlay {
            input,
            block,
            _subscriptions: subscriptions,
        });
        cx.notify();
    }

    pub fn close_palette(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_palette(PaletteEvent::Dismiss, window, cx);
    }

    pub(crate) fn dispatch_palette(
        &mut self,
        event: PaletteEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let anchor = self.palette.anchor().unwrap_or_default();
        let block = self
            .palette_overlay
            .as_ref()
            .and_then(|overlay| overlay.block.clone());

        let outcome = {
            let mut palette = std::mem::take(&mut self.palette);
            let mut command_cx = CommandContext::new(self.document_mut(), block);
            let outcome = palette.dispatch(event, &mut command_cx);
            self.palette = palette;
            outcome
        };

        if outcome.invoked.is_some() {
            cx.emit(BlockEditorEvent::Changed);
        }
        for prompt in outcome.prompts {
            self.open_prompt(prompt, anchor, window, cx);
        }
        if outcome.closed {
            self.palette_overlay = None;
            if self.prompt_overlay.is_none() {
                self.refocus(window);
            }
            cx.emit(BlockEditorEvent::PaletteClosed);
            if let Some(on_close) = self.palette_on_close.clone() {
                window.defer(cx, move |window, cx| on_close(window, cx));
            }
        }
        cx.notify();
    }
}

/// The floating command list, positioned at the palette's anchor.
///
/// Rendered by the editor itself and empty while the palette is closed. Hosts open it with
/// [`BlockEditorState::open_palette`] and observe closing through
/// [`BlockEditorState::set_palette_on_close`].
#[derive(IntoElement)]
pub(crate) struct CommandPaletteView {
    editor: Entity<BlockEditorState>,
}

impl CommandPaletteView {
    pub(crate) fn new(editor: &Entity<BlockEditorState>) -> Self {
        Self {
            editor: editor.clone(),
        }
    }
}

impl RenderOnce for CommandPaletteView {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let state = self.editor.read(cx);
        let (Some(overlay), Some(anchor)) = (state.palette_overlay.as_ref(), state.palette.anchor())
        else {
            return div().into_any_element();
        };

        let input = overlay.input.clone();
        let width = state.config().palette_width;
        let selected = state.palette.selected_index();
        let entries: Vec<(SharedString, SharedString)> = state
            .palette
            .filtered()
            .into_iter()
            .take(state.config().max_visible_commands)
            .map(|command| {
                (
                    command.title.clone().into(),
                    command.description.clone().into(),
                )
            })
            .collect();

        let theme = cx.theme();
        let editor = self.editor.clone();

        let list = if entries.is_empty() {
            vec![
                div()
                    .px(px(10.))
                    .py(px(8.))
                    .text_sm()
                    .text_color(theme.muted_foreground)
                    .child("Ничего не найдено")
                    .into_any_element(),
            ]
        } else {
            entries
                .into_iter()
                .enumerate()
                .map(|(index, (title, description))| {
                    let is_selected = Some(index) == selected;
                    let editor = editor.clone();
                    div()
                        .id(("block-palette-item", index))
                        .flex()
                        .flex_col()
                        .px(px(10.))
                        .py(px(4.))
                        .rounded(px(6.))
                        .cursor_pointer()
                        .when(is_selected, |this| {
                            this.bg(theme.accent).text_color(theme.accent_foreground)
                        })
                        .when(!is_selected, |this| {
                            this.text_color(theme.popover_foreground)
                                .hover(|this| this.bg(theme.accent.alpha(0.4)))
                        })
                        .child(div().text_sm().child(title))
                        .when(!description.is_empty(), |this| {
                            this.child(
                                div()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(description),
                            )
                        })
                        .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                            window.prevent_default();
                            cx.stop_propagation();
                            editor.update(cx, |this, cx| {
                                this.dispatch_palette(PaletteEvent::Activate(index), window, cx);
                            });
                        })
                        .into_any_element()
                })
                .collect()
        };

        let container = v_flex()
            .id(ElementId::Name(
                format!("block-palette-{}", self.editor.entity_id()).into(),
            ))
            .w(px(width))
            .gap(px(6.))
            .p(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .rounded(theme.radius)
            .shadow_lg()
            .on_mouse_down(MouseButton::Left, |_, window, cx| {
                window.prevent_default();
                cx.stop_propagation();
            })
            .on_mouse_down_out({
                let editor = editor.clone();
                move |_, window, cx| {
                    editor.update(cx, |this, cx| {
                        this.dispatch_palette(PaletteEvent::PointerDownOutside, window, cx);
                    });
                }
            })
            .on_key_down({
                let editor = editor.clone();
                move |event, window, cx| {
                    let Some(palette_event) = PaletteEvent::from_key(event.keystroke.key.as_str())
                    else {
                        return;
                    };
                    editor.update(cx, |this, cx| {
                        this.dispatch_palette(palette_event, window, cx);
                    });
                    window.prevent_default();
                    cx.stop_propagation();
                }
            })
            .child(Input::new(&input).w_full())
            .child(
                div()
                    .id("block-palette-list")
                    .flex()
                    .flex_col()
                    .gap(px(2.))
                    .max_h(px(320.))
                    .overflow_y_scroll()
                    .children(list),
            );

        deferred(
            anchored()
                .position(point(px(anchor.x), px(anchor.y)))
                .snap_to_window()
                .child(container),
        )
        .with_priority(1)
        .into_any_element()
    }
}
