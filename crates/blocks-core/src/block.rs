use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type Attrs = BTreeMap<String, serde_json::Value>;
pub type BlockKind = String;

/// Attribute a rendered element carries to declare which block it belongs to.
pub const BLOCK_ID_ATTR: &str = "data-block-id";

/// Stable, opaque identity of a block, assigned by the document engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for BlockId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BlockId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub text: String,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, kind: impl Into<BlockKind>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            attrs: Attrs::default(),
            text: text.into(),
        }
    }

    pub fn paragraph(id: impl Into<BlockId>, text: impl Into<String>) -> Self {
        Self::new(id, "paragraph", text)
    }

    pub fn attr(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind.as_str(), "divider" | "image" | "table")
    }

    /// Short human label used by drag ghosts and debug dumps.
    pub fn label(&self) -> String {
        let text = self.text.trim();
        if !text.is_empty() {
            return text.chars().take(48).collect();
        }
        match self.kind.as_str() {
            "table" => {
                let rows = self.attrs.get("rows").and_then(|v| v.as_u64()).unwrap_or(0);
                let cols = self.attrs.get("cols").and_then(|v| v.as_u64()).unwrap_or(0);
                format!("table {rows}x{cols}")
            }
            "image" => self
                .attrs
                .get("src")
                .and_then(|v| v.as_str())
                .unwrap_or("image")
                .to_string(),
            kind => kind.to_string(),
        }
    }
}
