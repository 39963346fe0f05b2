use serde_json::json;

use crate::config::BlocksConfig;
use crate::palette::{CommandCatalog, PaletteCommand, PromptRequest};

/// The built-in structural-insertion commands, in menu order.
///
/// Unset config values take their [`BlocksConfig::with_defaults`] values.
pub fn default_catalog(config: &BlocksConfig) -> CommandCatalog {
    let BlocksConfig {
        table_rows: rows,
        table_cols: cols,
        ..
    } = config.clone().with_defaults();

    CommandCatalog::new(vec![
        PaletteCommand::new("text", "Текст", |cx| cx.run("block.set_paragraph", None))
            .description("Обычный абзац")
            .keywords(["text", "paragraph", "plain", "текст", "абзац"]),
        PaletteCommand::new("heading_1", "Заголовок 1", |cx| {
            cx.run("block.set_heading", Some(json!({ "level": 1 })))
        })
        .description("Крупный заголовок раздела")
        .keywords(["heading", "h1", "title", "заголовок"]),
        PaletteCommand::new("heading_2", "Заголовок 2", |cx| {
            cx.run("block.set_heading", Some(json!({ "level": 2 })))
        })
        .description("Средний заголовок")
        .keywords(["heading", "h2", "subtitle", "заголовок"]),
        PaletteCommand::new("heading_3", "Заголовок 3", |cx| {
            cx.run("block.set_heading", Some(json!({ "level": 3 })))
        })
        .description("Небольшой заголовок")
        .keywords(["heading", "h3", "заголовок"]),
        PaletteCommand::new("bulleted_list", "Маркированный список", |cx| {
            cx.run("list.toggle_bulleted", None)
        })
        .description("Простой список с маркерами")
        .keywords(["bullet", "list", "ul", "список"]),
        PaletteCommand::new("numbered_list", "Нумерованный список", |cx| {
            cx.run("list.toggle_numbered", None)
        })
        .description("Список с нумерацией")
        .keywords(["numbered", "ordered", "list", "ol", "список"]),
        PaletteCommand::new("todo_list", "Список задач", |cx| cx.run("todo.toggle", None))
            .description("Задачи с флажками")
            .keywords(["todo", "task", "checkbox", "list", "задачи", "список"]),
        PaletteCommand::new("quote", "Цитата", |cx| cx.run("blockquote.toggle", None))
            .description("Выделенная цитата")
            .keywords(["quote", "blockquote", "цитата"]),
        PaletteCommand::new("code_block", "Блок кода", |cx| cx.run("code_block.toggle", None))
            .description("Фрагмент кода")
            .keywords(["code", "snippet", "pre", "код"]),
        PaletteCommand::new("divider", "Разделитель", |cx| cx.run("core.insert_divider", None))
            .description("Горизонтальная линия")
            .keywords(["divider", "separator", "hr", "line", "разделитель", "линия"]),
        PaletteCommand::new("table", "Таблица", move |cx| {
            cx.run("table.insert", Some(json!({ "rows": rows, "cols": cols })))
        })
        .description(format!("Таблица {rows}×{cols}"))
        .keywords(["table", "grid", "таблица"]),
        PaletteCommand::new("link", "Ссылка", |cx| {
            let block = cx.block().cloned();
            cx.request_prompt(PromptRequest::Link { block });
            Ok(())
        })
        .description("Вставить ссылку")
        .keywords(["link", "url", "href", "ссылка"]),
        PaletteCommand::new("image", "Изображение", |cx| {
            let block = cx.block().cloned();
            cx.request_prompt(PromptRequest::Image { block });
            Ok(())
        })
        .description("Вставить изображение по адресу")
        .keywords(["image", "picture", "img", "photo", "картинка", "изображение"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(query: &str) -> Vec<String> {
        let catalog = default_catalog(&BlocksConfig::default().with_defaults());
        catalog
            .filter_indices(query)
            .into_iter()
            .map(|ix| catalog.commands()[ix].id.clone())
            .collect()
    }

    #[test]
    fn catalog_ids_are_unique() {
        let catalog = default_catalog(&BlocksConfig::default());
        let mut ids: Vec<&str> = catalog.commands().iter().map(|c| c.id.as_str()).collect();
        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn head_matches_only_headings() {
        assert_eq!(ids("head"), ["heading_1", "heading_2", "heading_3"]);
    }

    #[test]
    fn russian_queries_match_titles_and_keywords() {
        assert_eq!(ids("табл"), ["table"]);
        assert_eq!(ids("СПИСОК"), ["bulleted_list", "numbered_list", "todo_list"]);
    }

    #[test]
    fn table_description_reflects_config() {
        let config = BlocksConfig {
            table_rows: 2,
            table_cols: 5,
            ..BlocksConfig::default()
        };
        let catalog = default_catalog(&config);
        let table = catalog.commands().iter().find(|c| c.id == "table").unwrap();
        assert_eq!(table.description, "Таблица 2×5");
    }

    #[test]
    fn unset_table_size_uses_config_defaults() {
        let catalog = default_catalog(&BlocksConfig::default());
        let table = catalog.commands().iter().find(|c| c.id == "table").unwrap();
        assert_eq!(table.description, "Таблица 3×3");
    }
}
