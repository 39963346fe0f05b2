use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::block::BlockId;

pub const PLAIN_TEXT_FORMAT: &str = "text/plain";
pub const BLOCK_FORMAT: &str = "application/x-manos-block";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropEffect {
    #[default]
    None,
    Move,
}

/// Structured form of the dragged block, stored under [`BLOCK_FORMAT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockPayload {
    block_id: BlockId,
}

/// Platform-neutral drag payload, keyed by format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    entries: BTreeMap<String, String>,
    pub effect_allowed: DropEffect,
    pub drop_effect: DropEffect,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, format: impl Into<String>, data: impl Into<String>) {
        self.entries.insert(format.into(), data.into());
    }

    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.entries.get(format).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes `id` in both the plain-text and structured forms and marks the transfer as a move.
    pub fn set_block(&mut self, id: &BlockId) {
        self.set_data(PLAIN_TEXT_FORMAT, id.as_str());
        let payload = BlockPayload {
            block_id: id.clone(),
        };
        if let Ok(json) = serde_json::to_string(&payload) {
            self.set_data(BLOCK_FORMAT, json);
        }
        self.effect_allowed = DropEffect::Move;
    }

    /// Reads the dragged block, preferring the structured form. Empty ids count as absent.
    pub fn block_id(&self) -> Option<BlockId> {
        let structured = self
            .get_data(BLOCK_FORMAT)
            .and_then(|json| serde_json::from_str::<BlockPayload>(json).ok())
            .map(|payload| payload.block_id)
            .filter(|id| !id.is_empty());
        structured.or_else(|| {
            self.get_data(PLAIN_TEXT_FORMAT)
                .map(BlockId::from)
                .filter(|id| !id.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_block_writes_both_forms() {
        let mut transfer = DataTransfer::new();
        transfer.set_block(&BlockId::new("b1"));
        assert_eq!(transfer.get_data(PLAIN_TEXT_FORMAT), Some("b1"));
        assert_eq!(transfer.get_data(BLOCK_FORMAT), Some(r#"{"blockId":"b1"}"#));
        assert_eq!(transfer.effect_allowed, DropEffect::Move);
        assert_eq!(transfer.block_id(), Some(BlockId::new("b1")));
    }

    #[test]
    fn plain_text_is_a_fallback() {
        let mut transfer = DataTransfer::new();
        transfer.set_data(PLAIN_TEXT_FORMAT, "b7");
        assert_eq!(transfer.block_id(), Some(BlockId::new("b7")));

        transfer.set_data(BLOCK_FORMAT, "not json");
        assert_eq!(transfer.block_id(), Some(BlockId::new("b7")));

        transfer.set_data(BLOCK_FORMAT, r#"{"blockId":""}"#);
        assert_eq!(transfer.block_id(), Some(BlockId::new("b7")));
    }

    #[test]
    fn missing_or_empty_payload_reads_as_none() {
        assert_eq!(DataTransfer::new().block_id(), None);

        let mut transfer = DataTransfer::new();
        transfer.set_data(PLAIN_TEXT_FORMAT, "");
        assert_eq!(transfer.block_id(), None);
    }
}
