use gpui::{
    AnyElement, AppContext as _, Context, Entity, InteractiveElement as _, IntoElement,
    MouseButton, ParentElement as _, Styled as _, Subscription, Window, anchored, deferred, div,
    point, px,
};
use gpui_component::input::{Input, InputEvent, InputState};
use gpui_component::notification::Notification;
use gpui_component::{ActiveTheme as _, WindowExt as _, v_flex};
use gpui_manos_blocks_core::{AnchorPosition, BlockEngine as _, PromptRequest};
use serde_json::{Map, Value};

use crate::editor::{BlockEditorEvent, BlockEditorState};

/// Single-field dialog collecting the address a link or image command needs.
pub(crate) struct PromptOverlay {
    request: PromptRequest,
    anchor: AnchorPosition,
    input: Entity<InputState>,
    _subscriptions: Vec<Subscription>,
}

impl BlockEditorState {
    pub(crate) fn open_prompt(
        &mut self,
        request: PromptRequest,
        anchor: AnchorPosition,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let placeholder = match &request {
            PromptRequest::Link { .. } => "https://…",
            PromptRequest::Image { .. } => "Адрес изображения",
        };
        let input = cx.new(|cx| InputState::new(window, cx).placeholder(placeholder));
        input.update(cx, |state, cx| state.focus(window, cx));

        let subscriptions = vec![cx.subscribe_in(
            &input,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if matches!(event, InputEvent::PressEnter { .. }) {
                    this.submit_prompt(window, cx);
                }
            },
        )];

        self.prompt_overlay = Some(PromptOverlay {
            request,
            anchor,
            input,
            _subscriptions: subscriptions,
        });
        cx.notify();
    }

    pub(crate) fn cancel_prompt(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.prompt_overlay.take().is_some() {
            self.refocus(window);
            cx.notify();
        }
    }

    fn submit_prompt(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let Some(overlay) = self.prompt_overlay.take() else {
            return;
        };
        let value = overlay.input.read(cx).value().trim().to_string();
        self.refocus(window);
        cx.notify();
        if value.is_empty() {
            return;
        }

        let (command, block, field) = match overlay.request {
            PromptRequest::Link { block } => ("link.insert", block, "url"),
            PromptRequest::Image { block } => ("image.insert", block, "src"),
        };
        let mut args = Map::new();
        args.insert(field.to_string(), Value::from(value));
        if let Some(block) = block {
            args.insert("block_id".to_string(), Value::from(block.as_str()));
        }

        match self.document_mut().run_command(command, Some(Value::Object(args))) {
            Ok(()) => cx.emit(BlockEditorEvent::Changed),
            Err(err) => {
                tracing::warn!(command, error = %err, "prompted command failed");
                window.push_notification(
                    Notification::new().message(err.message().to_string()),
                    cx,
                );
            }
        }
    }

    pub(crate) fn render_prompt(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Option<AnyElement> {
        let overlay = self.prompt_overlay.as_ref()?;
        let theme = cx.theme();
        let editor = cx.entity();
        let title = match overlay.request {
            PromptRequest::Link { .. } => "Ссылка",
            PromptRequest::Image { .. } => "Изображение",
        };

        let dialog = v_flex()
            .id("block-prompt")
            .w(px(self.config().palette_width))
            .gap(px(8.))
            .p(px(12.))
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
                    editor.update(cx, |this, cx| this.cancel_prompt(window, cx));
                }
            })
            .on_key_down(move |event, window, cx| {
                if event.keystroke.key.as_str() == "escape" {
                    editor.update(cx, |this, cx| this.cancel_prompt(window, cx));
                    window.prevent_default();
                    cx.stop_propagation();
                }
            })
            .child(div().text_sm().text_color(theme.popover_foreground).child(title))
            .child(Input::new(&overlay.input).w_full())
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child("Enter вставить · Esc отмена"),
            );

        Some(
            deferred(
                anchored()
                    .position(point(px(overlay.anchor.x), px(overlay.anchor.y)))
                    .snap_to_window()
                    .child(dialog),
            )
            .with_priority(2)
            .into_any_element(),
        )
    }
}
