use gpui::*;
use gpui_component::{ActiveTheme as _, h_flex, v_flex};
use gpui_manos_blocks::{BlockEditorEvent, BlockEditorState};
use gpui_manos_blocks_core::{Block, BlockDocument, BlocksConfig};
use serde_json::json;

const MAX_LOG_LINES: usize = 8;

pub struct BlocksStory {
    editor: Entity<BlockEditorState>,
    log: Vec<String>,
    _subscriptions: Vec<Subscription>,
}

impl BlocksStory {
    pub fn view(config: BlocksConfig, window: &mut Window, cx: &mut App) -> Entity<Self> {
        cx.new(|cx| Self::new(config, window, cx))
    }

    fn new(config: BlocksConfig, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let editor = cx.new(|cx| {
            let mut editor = BlockEditorState::new(demo_document(), config, cx);
            editor.set_palette_on_close(|_, _| tracing::debug!("block palette closed"));
            editor
        });

        let subscriptions = vec![cx.subscribe(
            &editor,
            |this, editor, event: &BlockEditorEvent, cx| {
                let line = match event {
                    BlockEditorEvent::Changed => {
                        let order = editor
                            .read(cx)
                            .document()
                            .blocks()
                            .iter()
                            .map(|block| block.id.to_string())
                            .collect::<Vec<_>>()
                            .join(", ");
                        tracing::info!(%order, "document changed");
                        format!("изменено: {order}")
                    }
                    BlockEditorEvent::PaletteClosed => "палитра закрыта".to_string(),
                };
                this.push_log(line);
                cx.notify();
            },
        )];

        window.focus(&editor.focus_handle(cx));

        Self {
            editor,
            log: Vec::new(),
            _subscriptions: subscriptions,
        }
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > MAX_LOG_LINES {
            let overflow = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..overflow);
        }
    }
}

impl Render for BlocksStory {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let state = self.editor.read(cx);
        let trigger = state.config().trigger();
        let dump = serde_json::to_string_pretty(state.document().blocks())
            .unwrap_or_else(|err| format!("<{err}>"));

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("Blocks"),
                    )
                    .child(div().text_sm().text_color(theme.muted_foreground).child(format!(
                        "Перетаскивайте блоки за ручку; линия показывает, куда встанет блок. \
                         «{trigger}» или «+» открывает палитру вставки, Alt+↑/↓ двигает выбранный блок."
                    ))),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .items_start()
                    .child(
                        div()
                            .id("blocks-story-editor")
                            .w(px(560.))
                            .h_full()
                            .p(px(12.))
                            .rounded(px(12.))
                            .border_1()
                            .border_color(theme.border)
                            .overflow_y_scroll()
                            .child(self.editor.clone()),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("События"),
                            )
                            .child(
                                v_flex()
                                    .gap_y_1()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .children(self.log.iter().cloned()),
                            )
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Документ"),
                            )
                            .child(
                                div()
                                    .id("blocks-story-dump")
                                    .flex_1()
                                    .min_h(px(0.))
                                    .p(px(8.))
                                    .rounded(px(8.))
                                    .bg(theme.muted)
                                    .overflow_y_scroll()
                                    .font_family("monospace")
                                    .text_xs()
                                    .child(dump),
                            ),
                    ),
            )
    }
}

pub fn demo_document() -> BlockDocument {
    BlockDocument::new(vec![
        Block::new("intro", "heading", "Планы на неделю").attr("level", json!(1)),
        Block::paragraph("note", "Перетащите любой блок, чтобы поменять порядок."),
        Block::new("task-1", "list_item", "Разобрать входящие")
            .attr("list_type", json!("todo"))
            .attr("checked", json!(true)),
        Block::new("task-2", "list_item", "Подготовить демо")
            .attr("list_type", json!("todo"))
            .attr("checked", json!(false)),
        Block::new("quote", "blockquote", "Сначала сделай, потом сделай красиво."),
        Block::new("snippet", "code_block", "cargo run -p gpui-manos-blocks-story"),
        Block::paragraph("outro", "Наберите «/» в выбранном блоке."),
    ])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[::core::prelude::v1::test]
    fn demo_document_has_unique_ids() {
        let doc = demo_document();
        let ids: HashSet<&str> = doc.blocks().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), doc.blocks().len());
    }
}
