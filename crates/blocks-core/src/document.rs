use serde_json::Value;

use crate::block::{Block, BlockId};
use crate::engine::{BlockEngine, CommandError, reorder_to_index};
use crate::geometry::DropSide;

type CommandHandler = fn(&mut BlockDocument, Option<&Value>) -> Result<(), CommandError>;

#[derive(Clone, Copy)]
pub struct DocumentCommand {
    pub id: &'static str,
    pub label: &'static str,
    handler: CommandHandler,
}

const DOCUMENT_COMMANDS: &[DocumentCommand] = &[
    DocumentCommand {
        id: "block.set_paragraph",
        label: "Turn into paragraph",
        handler: |doc, args| doc.set_kind(args, "paragraph", None),
    },
    DocumentCommand {
        id: "block.set_heading",
        label: "Turn into heading",
        handler: set_heading,
    },
    DocumentCommand {
        id: "list.toggle_bulleted",
        label: "Toggle bulleted list",
        handler: |doc, args| doc.toggle_list(args, "bulleted"),
    },
    DocumentCommand {
        id: "list.toggle_numbered",
        label: "Toggle numbered list",
        handler: |doc, args| doc.toggle_list(args, "numbered"),
    },
    DocumentCommand {
        id: "todo.toggle",
        label: "Toggle todo item",
        handler: |doc, args| doc.toggle_list(args, "todo"),
    },
    DocumentCommand {
        id: "blockquote.toggle",
        label: "Toggle blockquote",
        handler: |doc, args| doc.toggle_kind(args, "blockquote"),
    },
    DocumentCommand {
        id: "code_block.toggle",
        label: "Toggle code block",
        handler: |doc, args| doc.toggle_kind(args, "code_block"),
    },
    DocumentCommand {
        id: "core.insert_divider",
        label: "Insert divider",
        handler: |doc, args| {
            let block = Block::new(doc.allocate_id(), "divider", "");
            doc.insert_after_target(args, block)
        },
    },
    DocumentCommand {
        id: "table.insert",
        label: "Insert table",
        handler: insert_table,
    },
    DocumentCommand {
        id: "link.insert",
        label: "Insert link",
        handler: insert_link,
    },
    DocumentCommand {
        id: "image.insert",
        label: "Insert image",
        handler: insert_image,
    },
];

/// In-memory block list implementing [`BlockEngine`].
///
/// Blocks are flat and ordered; one block may be focused, and structural commands apply to the
/// focused block unless their args name one through `block_id`.
#[derive(Debug, Clone, Default)]
pub struct BlockDocument {
    blocks: Vec<Block>,
    focused: Option<BlockId>,
    next_id: u64,
}

impl BlockDocument {
    pub fn new(blocks: impl Into<Vec<Block>>) -> Self {
        let blocks = blocks.into();
        let focused = blocks.first().map(|block| block.id.clone());
        Self {
            next_id: blocks.len() as u64 + 1,
            blocks,
            focused,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub fn focused(&self) -> Option<&BlockId> {
        self.focused.as_ref()
    }

    pub fn set_focus(&mut self, id: Option<BlockId>) {
        self.focused = id.filter(|id| self.block(id).is_some());
    }

    pub fn set_text(&mut self, id: &BlockId, text: impl Into<String>) -> bool {
        let Some(block) = self.block_mut(id) else {
            return false;
        };
        block.text = text.into();
        true
    }

    pub fn remove_block(&mut self, id: &BlockId) -> Option<Block> {
        let ix = self.blocks.iter().position(|block| &block.id == id)?;
        let removed = self.blocks.remove(ix);
        if self.focused.as_ref() == Some(id) {
            self.focused = self
                .blocks
                .get(ix.min(self.blocks.len().saturating_sub(1)))
                .map(|block| block.id.clone());
        }
        Some(removed)
    }

    pub fn commands() -> &'static [DocumentCommand] {
        DOCUMENT_COMMANDS
    }

    fn block_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| &block.id == id)
    }

    fn allocate_id(&mut self) -> BlockId {
        loop {
            let id = BlockId::new(format!("block-{}", self.next_id));
            self.next_id += 1;
            if self.block(&id).is_none() {
                return id;
            }
        }
    }

    fn target_id(&self, args: Option<&Value>) -> Result<BlockId, CommandError> {
        if let Some(id) = args
            .and_then(|args| args.get("block_id"))
            .and_then(|v| v.as_str())
        {
            let id = BlockId::new(id);
            if self.block(&id).is_none() {
                return Err(CommandError::new(format!("Unknown block: {id}")));
            }
            return Ok(id);
        }
        self.focused
            .clone()
            .or_else(|| self.blocks.last().map(|block| block.id.clone()))
            .ok_or_else(|| CommandError::new("Document has no blocks"))
    }

    fn target_mut(&mut self, args: Option<&Value>) -> Result<&mut Block, CommandError> {
        let id = self.target_id(args)?;
        self.block_mut(&id)
            .ok_or_else(|| CommandError::new(format!("Unknown block: {id}")))
    }

    fn set_kind(
        &mut self,
        args: Option<&Value>,
        kind: &str,
        attrs: Option<(&str, Value)>,
    ) -> Result<(), CommandError> {
        let block = self.target_mut(args)?;
        if block.is_void() {
            return Err(CommandError::new(format!(
                "Cannot convert {} block into {kind}",
                block.kind
            )));
        }
        block.kind = kind.to_string();
        block.attrs.clear();
        if let Some((key, value)) = attrs {
            block.attrs.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn toggle_kind(&mut self, args: Option<&Value>, kind: &str) -> Result<(), CommandError> {
        let is_active = self.target_mut(args)?.kind == kind;
        if is_active {
            self.set_kind(args, "paragraph", None)
        } else {
            self.set_kind(args, kind, None)
        }
    }

    fn toggle_list(&mut self, args: Option<&Value>, list_type: &str) -> Result<(), CommandError> {
        let block = self.target_mut(args)?;
        let is_active = block.kind == "list_item"
            && block.attrs.get("list_type").and_then(|v| v.as_str()) == Some(list_type);
        if is_active {
            return self.set_kind(args, "paragraph", None);
        }
        self.set_kind(args, "list_item", Some(("list_type", Value::from(list_type))))?;
        if list_type == "todo" {
            self.target_mut(args)?
                .attrs
                .insert("checked".to_string(), Value::Bool(false));
        }
        Ok(())
    }

    fn insert_after_target(
        &mut self,
        args: Option<&Value>,
        block: Block,
    ) -> Result<(), CommandError> {
        let insert_ix = match self.target_id(args) {
            Ok(id) => self.index_of(&id).map(|ix| ix + 1).unwrap_or(self.blocks.len()),
            Err(_) if self.blocks.is_empty() => 0,
            Err(err) => return Err(err),
        };
        self.focused = Some(block.id.clone());
        self.blocks.insert(insert_ix, block);
        Ok(())
    }
}

impl BlockEngine for BlockDocument {
    fn block_ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|block| block.id.clone()).collect()
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    fn move_block(&mut self, from: usize, to: usize) -> bool {
        let len = self.blocks.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        true
    }

    fn drop_block(&mut self, source: &BlockId, target: &BlockId, side: DropSide) -> bool {
        if source == target {
            return false;
        }
        let (Some(from), Some(target_ix)) = (self.index_of(source), self.index_of(target)) else {
            return false;
        };
        let to = reorder_to_index(from, target_ix, side, self.blocks.len());
        self.move_block(from, to)
    }

    fn run_command(&mut self, id: &str, args: Option<Value>) -> Result<(), CommandError> {
        let Some(command) = DOCUMENT_COMMANDS.iter().find(|command| command.id == id) else {
            return Err(CommandError::new(format!("Unknown command: {id}")));
        };
        (command.handler)(self, args.as_ref())
    }
}

fn set_heading(doc: &mut BlockDocument, args: Option<&Value>) -> Result<(), CommandError> {
    let level = args
        .and_then(|args| args.get("level"))
        .and_then(|v| v.as_u64())
        .unwrap_or(1)
        .clamp(1, 6);
    doc.set_kind(args, "heading", Some(("level", Value::from(level))))
}

fn insert_table(doc: &mut BlockDocument, args: Option<&Value>) -> Result<(), CommandError> {
    let dim = |key: &str| {
        args.and_then(|args| args.get(key))
            .and_then(|v| v.as_u64())
            .unwrap_or(3)
            .clamp(1, 64)
    };
    let block = Block::new(doc.allocate_id(), "table", "")
        .attr("rows", Value::from(dim("rows")))
        .attr("cols", Value::from(dim("cols")));
    doc.insert_after_target(args, block)
}

fn insert_link(doc: &mut BlockDocument, args: Option<&Value>) -> Result<(), CommandError> {
    let Some(url) = args
        .and_then(|args| args.get("url"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|url| !url.is_empty())
    else {
        return Err(CommandError::new("link.insert requires a non-empty url"));
    };
    let text = args
        .and_then(|args| args.get("text"))
        .and_then(|v| v.as_str())
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(url)
        .to_string();
    let url = url.to_string();

    let block = doc.target_mut(args)?;
    if block.is_void() {
        return Err(CommandError::new(format!(
            "Cannot insert a link into a {} block",
            block.kind
        )));
    }
    block.text.push_str(&text);
    let links = block
        .attrs
        .entry("links".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(links) = links {
        links.push(serde_json::json!({ "text": text, "url": url }));
    }
    Ok(())
}

fn insert_image(doc: &mut BlockDocument, args: Option<&Value>) -> Result<(), CommandError> {
    let Some(src) = args
        .and_then(|args| args.get("src"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|src| !src.is_empty())
    else {
        return Err(CommandError::new("image.insert requires a non-empty src"));
    };
    let mut block = Block::new(doc.allocate_id(), "image", "").attr("src", Value::from(src));
    if let Some(alt) = args.and_then(|args| args.get("alt")).and_then(|v| v.as_str()) {
        block = block.attr("alt", Value::from(alt));
    }
    doc.insert_after_target(args, block)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc() -> BlockDocument {
        BlockDocument::new(vec![
            Block::paragraph("a", "A"),
            Block::paragraph("b", "B"),
            Block::paragraph("c", "C"),
            Block::paragraph("d", "D"),
        ])
    }

    fn ids(doc: &BlockDocument) -> Vec<String> {
        doc.blocks().iter().map(|b| b.id.to_string()).collect()
    }

    #[test]
    fn drop_block_after_moves_down() {
        let mut doc = doc();
        assert!(doc.drop_block(&"a".into(), &"c".into(), DropSide::After));
        assert_eq!(ids(&doc), ["b", "c", "a", "d"]);
    }

    #[test]
    fn drop_block_before_moves_up() {
        let mut doc = doc();
        assert!(doc.drop_block(&"d".into(), &"b".into(), DropSide::Before));
        assert_eq!(ids(&doc), ["a", "d", "b", "c"]);
    }

    #[test]
    fn drop_block_into_own_slot_is_not_a_mutation() {
        let mut doc = doc();
        assert!(!doc.drop_block(&"b".into(), &"a".into(), DropSide::After));
        assert!(!doc.drop_block(&"b".into(), &"c".into(), DropSide::Before));
        assert!(!doc.drop_block(&"b".into(), &"b".into(), DropSide::After));
        assert!(!doc.drop_block(&"zz".into(), &"b".into(), DropSide::After));
        assert_eq!(ids(&doc), ["a", "b", "c", "d"]);
    }

    #[test]
    fn move_block_rejects_out_of_range() {
        let mut doc = doc();
        assert!(!doc.move_block(0, 4));
        assert!(!doc.move_block(4, 0));
        assert!(doc.move_block(3, 0));
        assert_eq!(ids(&doc), ["d", "a", "b", "c"]);
    }

    #[test]
    fn heading_converts_focused_block() {
        let mut doc = doc();
        doc.set_focus(Some("b".into()));
        doc.run_command("block.set_heading", Some(json!({ "level": 9 })))
            .unwrap();
        let block = doc.block(&"b".into()).unwrap();
        assert_eq!(block.kind, "heading");
        assert_eq!(block.attrs.get("level"), Some(&json!(6)));
    }

    #[test]
    fn list_toggle_round_trips_to_paragraph() {
        let mut doc = doc();
        doc.run_command("list.toggle_bulleted", None).unwrap();
        assert_eq!(doc.blocks()[0].kind, "list_item");
        doc.run_command("list.toggle_numbered", None).unwrap();
        assert_eq!(doc.blocks()[0].attrs.get("list_type"), Some(&json!("numbered")));
        doc.run_command("list.toggle_numbered", None).unwrap();
        assert_eq!(doc.blocks()[0].kind, "paragraph");
        assert!(doc.blocks()[0].attrs.is_empty());
    }

    #[test]
    fn insertions_land_after_target_and_take_focus() {
        let mut doc = doc();
        doc.run_command("table.insert", Some(json!({ "block_id": "a", "rows": 2 })))
            .unwrap();
        let table = &doc.blocks()[1];
        assert_eq!(table.kind, "table");
        assert_eq!(table.attrs.get("rows"), Some(&json!(2)));
        assert_eq!(table.attrs.get("cols"), Some(&json!(3)));
        assert_eq!(doc.focused(), Some(&table.id));

        doc.run_command("core.insert_divider", None).unwrap();
        assert_eq!(doc.blocks()[2].kind, "divider");
        assert_eq!(doc.block_count(), 6);
    }

    #[test]
    fn void_blocks_refuse_conversion() {
        let mut doc = doc();
        doc.run_command("core.insert_divider", None).unwrap();
        let err = doc.run_command("block.set_heading", None).unwrap_err();
        assert!(err.message().contains("divider"));
    }

    #[test]
    fn link_and_image_require_their_payload() {
        let mut doc = doc();
        assert!(doc.run_command("link.insert", None).is_err());
        assert!(doc.run_command("image.insert", Some(json!({ "src": " " }))).is_err());

        doc.run_command(
            "link.insert",
            Some(json!({ "url": "https://example.com", "text": " site" })),
        )
        .unwrap();
        let block = &doc.blocks()[0];
        assert_eq!(block.text, "A site");
        assert_eq!(
            block.attrs.get("links"),
            Some(&json!([{ "text": " site", "url": "https://example.com" }]))
        );

        doc.run_command("image.insert", Some(json!({ "src": "cat.png" })))
            .unwrap();
        assert_eq!(doc.blocks()[1].kind, "image");
    }

    #[test]
    fn unknown_command_and_block_are_errors() {
        let mut doc = doc();
        assert!(doc.run_command("nope", None).is_err());
        assert!(
            doc.run_command("block.set_heading", Some(json!({ "block_id": "zz" })))
                .is_err()
        );
    }

    #[test]
    fn allocated_ids_skip_existing_ones() {
        let mut doc = BlockDocument::new(vec![Block::paragraph("block-2", "")]);
        doc.run_command("core.insert_divider", None).unwrap();
        doc.run_command("core.insert_divider", None).unwrap();
        assert_eq!(ids(&doc), ["block-2", "block-3", "block-4"]);
    }
}
