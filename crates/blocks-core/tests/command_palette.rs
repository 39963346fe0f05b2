use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gpui_manos_blocks_core::{
    AnchorPosition, Block, BlockDocument, BlocksConfig, CommandCatalog, CommandContext,
    CommandPalette, PaletteCommand, PaletteEvent, PromptRequest, default_catalog,
};

fn document() -> BlockDocument {
    BlockDocument::new(vec![
        Block::paragraph("b1", "Заметки"),
        Block::paragraph("b2", "Планы"),
    ])
}

fn open_palette(config: &BlocksConfig) -> CommandPalette {
    let mut palette = CommandPalette::new(default_catalog(config));
    palette.handle(PaletteEvent::Open {
        anchor: AnchorPosition::new(120., 48.),
    });
    palette
}

#[test]
fn typing_table_and_enter_inserts_one_table_and_closes() {
    let config = BlocksConfig::default().with_defaults();
    let mut doc = document();
    let mut palette = open_palette(&config);

    palette.handle(PaletteEvent::SetQuery("табл".into()));
    assert_eq!(
        palette.selected_command().map(|c| c.title.as_str()),
        Some("Таблица")
    );

    let outcome = {
        let mut cx = CommandContext::new(&mut doc, Some("b1".into()));
        palette.dispatch(PaletteEvent::Confirm, &mut cx)
    };

    assert_eq!(outcome.invoked.as_deref(), Some("table"));
    assert!(outcome.closed);
    assert!(!palette.is_open());

    let tables: Vec<&Block> = doc.blocks().iter().filter(|b| b.kind == "table").collect();
    assert_eq!(tables.len(), 1);
    assert_eq!(doc.blocks()[1].kind, "table");
    assert_eq!(doc.blocks()[1].attrs.get("rows"), Some(&serde_json::json!(3)));
}

#[test]
fn table_invoke_fires_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let catalog = CommandCatalog::new(vec![
        PaletteCommand::new("h1", "Заголовок 1", |_| Ok(())).keywords(["heading"]),
        PaletteCommand::new("table", "Таблица", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .keywords(["table"]),
    ]);
    let mut doc = document();
    let mut palette = CommandPalette::new(catalog);
    palette.handle(PaletteEvent::Open {
        anchor: AnchorPosition::default(),
    });
    palette.handle(PaletteEvent::SetQuery("табл".into()));

    let mut cx = CommandContext::new(&mut doc, None);
    palette.dispatch(PaletteEvent::Confirm, &mut cx);
    // Confirming again after close must not re-invoke.
    palette.dispatch(PaletteEvent::Confirm, &mut cx);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn space_matches_only_multi_word_titles() {
    let config = BlocksConfig::default().with_defaults();
    let mut palette = open_palette(&config);

    palette.handle(PaletteEvent::SetQuery(" ".into()));
    let ids: Vec<&str> = palette
        .filtered()
        .into_iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(
        ids,
        [
            "heading_1",
            "heading_2",
            "heading_3",
            "bulleted_list",
            "numbered_list",
            "todo_list",
            "code_block",
        ]
    );

    palette.handle(PaletteEvent::SetQuery("  ".into()));
    assert!(palette.filtered().is_empty());
}

#[test]
fn every_way_of_closing_reports_a_single_close() {
    let config = BlocksConfig::default().with_defaults();
    let mut doc = document();

    for event in [
        PaletteEvent::Dismiss,
        PaletteEvent::PointerDownOutside,
        PaletteEvent::FocusLost,
        PaletteEvent::Confirm,
        PaletteEvent::Activate(0),
    ] {
        let mut palette = open_palette(&config);
        let mut cx = CommandContext::new(&mut doc, Some("b1".into()));

        let outcome = palette.dispatch(event.clone(), &mut cx);
        assert!(outcome.closed, "{event:?} should close the palette");
        assert!(!palette.is_open());

        let again = palette.dispatch(event.clone(), &mut cx);
        assert!(!again.closed, "{event:?} on a closed palette should not close again");
    }
}

#[test]
fn confirm_with_no_matches_does_nothing() {
    let config = BlocksConfig::default().with_defaults();
    let mut doc = document();
    let before = doc.blocks().to_vec();
    let mut palette = open_palette(&config);

    palette.handle(PaletteEvent::SetQuery("zzz_no_match".into()));
    assert!(palette.filtered().is_empty());

    let mut cx = CommandContext::new(&mut doc, None);
    let outcome = palette.dispatch(PaletteEvent::Confirm, &mut cx);
    assert_eq!(outcome.invoked, None);
    assert!(!outcome.closed);
    assert!(palette.is_open());
    assert_eq!(doc.blocks(), before.as_slice());
}

#[test]
fn arrow_keys_wrap_over_three_results() {
    let config = BlocksConfig::default().with_defaults();
    let mut palette = open_palette(&config);
    palette.handle(PaletteEvent::SetQuery("head".into()));
    assert_eq!(palette.filtered().len(), 3);

    palette.handle(PaletteEvent::SelectNext);
    palette.handle(PaletteEvent::SelectNext);
    assert_eq!(palette.selected_index(), Some(2));
    palette.handle(PaletteEvent::from_key("down").unwrap());
    assert_eq!(palette.selected_index(), Some(0));
    palette.handle(PaletteEvent::from_key("up").unwrap());
    assert_eq!(palette.selected_index(), Some(2));
}

#[test]
fn query_change_resets_selection_even_if_still_listed() {
    let config = BlocksConfig::default().with_defaults();
    let mut palette = open_palette(&config);
    palette.handle(PaletteEvent::SetQuery("заголовок".into()));
    palette.handle(PaletteEvent::SelectNext);
    assert_eq!(
        palette.selected_command().map(|c| c.id.as_str()),
        Some("heading_2")
    );

    palette.handle(PaletteEvent::SetQuery("heading".into()));
    assert_eq!(palette.selected_index(), Some(0));
}

#[test]
fn escape_closes_without_touching_document() {
    let config = BlocksConfig::default().with_defaults();
    let mut doc = document();
    let before = doc.blocks().to_vec();
    let mut palette = open_palette(&config);

    let mut cx = CommandContext::new(&mut doc, Some("b1".into()));
    let outcome = palette.dispatch(PaletteEvent::from_key("escape").unwrap(), &mut cx);
    assert!(outcome.closed);
    assert_eq!(outcome.invoked, None);

    let again = palette.dispatch(PaletteEvent::Dismiss, &mut cx);
    assert!(!again.closed);
    assert_eq!(doc.blocks(), before.as_slice());
}

#[test]
fn clicking_an_entry_converts_the_anchor_block() {
    let config = BlocksConfig::default().with_defaults();
    let mut doc = document();
    let mut palette = open_palette(&config);
    palette.handle(PaletteEvent::SetQuery("heading".into()));

    let mut cx = CommandContext::new(&mut doc, Some("b2".into()));
    let outcome = palette.dispatch(PaletteEvent::Activate(1), &mut cx);
    assert_eq!(outcome.invoked.as_deref(), Some("heading_2"));

    let block = doc.block(&"b2".into()).unwrap();
    assert_eq!(block.kind, "heading");
    assert_eq!(block.attrs.get("level"), Some(&serde_json::json!(2)));
}

#[test]
fn link_command_asks_host_for_input() {
    let config = BlocksConfig::default().with_defaults();
    let mut doc = document();
    let mut palette = open_palette(&config);
    palette.handle(PaletteEvent::SetQuery("ссылка".into()));

    let mut cx = CommandContext::new(&mut doc, Some("b2".into()));
    let outcome = palette.dispatch(PaletteEvent::Confirm, &mut cx);
    assert_eq!(
        outcome.prompts,
        vec![PromptRequest::Link {
            block: Some("b2".into())
        }]
    );
    assert!(outcome.closed);
}

#[test]
fn failing_command_still_closes_palette() {
    let config = BlocksConfig::default().with_defaults();
    let mut doc = BlockDocument::new(vec![Block::new("d1", "divider", "")]);
    let mut palette = open_palette(&config);
    palette.handle(PaletteEvent::SetQuery("h1".into()));

    let mut cx = CommandContext::new(&mut doc, Some("d1".into()));
    let outcome = palette.dispatch(PaletteEvent::Confirm, &mut cx);
    assert_eq!(outcome.invoked.as_deref(), Some("heading_1"));
    assert!(outcome.closed);
    assert_eq!(doc.blocks()[0].kind, "divider");
}
