use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::BlockId;
use crate::engine::{BlockEngine, CommandError};

pub type CommandInvoke =
    Arc<dyn Fn(&mut CommandContext<'_>) -> Result<(), CommandError> + Send + Sync>;

/// A structural-insertion command listed in the palette.
#[derive(Clone)]
pub struct PaletteCommand {
    pub id: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    invoke: CommandInvoke,
}

impl PaletteCommand {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        invoke: impl Fn(&mut CommandContext<'_>) -> Result<(), CommandError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            keywords: Vec::new(),
            invoke: Arc::new(invoke),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive substring match against the title or any keyword.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(needle))
    }

    pub fn invoke(&self, cx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        (self.invoke)(cx)
    }
}

impl fmt::Debug for PaletteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteCommand")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

/// The ordered, immutable list of commands a palette offers.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    commands: Vec<PaletteCommand>,
}

impl CommandCatalog {
    pub fn new(commands: impl Into<Vec<PaletteCommand>>) -> Self {
        Self {
            commands: commands.into(),
        }
    }

    pub fn commands(&self) -> &[PaletteCommand] {
        &self.commands
    }

    pub fn get(&self, ix: usize) -> Option<&PaletteCommand> {
        self.commands.get(ix)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Catalog indices matching `query`, in catalog order.
    pub fn filter_indices(&self, query: &str) -> Vec<usize> {
        let needle = query.to_lowercase();
        self.commands
            .iter()
            .enumerate()
            .filter(|(_, command)| needle.is_empty() || command.matches(&needle))
            .map(|(ix, _)| ix)
            .collect()
    }
}

/// Filters `commands` by `query`, keeping catalog order. No ranking.
pub fn filter_commands<'a>(commands: &'a [PaletteCommand], query: &str) -> Vec<&'a PaletteCommand> {
    let needle = query.to_lowercase();
    commands
        .iter()
        .filter(|command| needle.is_empty() || command.matches(&needle))
        .collect()
}

/// Follow-up input a command needs from the host before it can edit the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    Link { block: Option<BlockId> },
    Image { block: Option<BlockId> },
}

/// What a command sees while it runs: the editor handle and the block the palette was opened at.
pub struct CommandContext<'a> {
    editor: &'a mut dyn BlockEngine,
    block: Option<BlockId>,
    prompts: Vec<PromptRequest>,
}

impl<'a> CommandContext<'a> {
    pub fn new(editor: &'a mut dyn BlockEngine, block: Option<BlockId>) -> Self {
        Self {
            editor,
            block,
            prompts: Vec::new(),
        }
    }

    pub fn editor(&mut self) -> &mut dyn BlockEngine {
        &mut *self.editor
    }

    pub fn block(&self) -> Option<&BlockId> {
        self.block.as_ref()
    }

    /// Runs an engine command against the palette's block.
    pub fn run(&mut self, id: &str, args: Option<Value>) -> Result<(), CommandError> {
        let args = match (&self.block, args) {
            (Some(block), Some(Value::Object(mut map))) => {
                map.entry("block_id")
                    .or_insert_with(|| Value::from(block.as_str()));
                Some(Value::Object(map))
            }
            (Some(block), None) => Some(serde_json::json!({ "block_id": block.as_str() })),
            (_, args) => args,
        };
        self.editor.run_command(id, args)
    }

    pub fn request_prompt(&mut self, prompt: PromptRequest) {
        self.prompts.push(prompt);
    }

    pub fn take_prompts(&mut self) -> Vec<PromptRequest> {
        std::mem::take(&mut self.prompts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorPosition {
    pub x: f32,
    pub y: f32,
}

impl AnchorPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPalette {
    pub anchor: AnchorPosition,
    pub query: String,
    /// Catalog indices, in catalog order.
    pub filtered: Vec<usize>,
    pub selected: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PaletteState {
    #[default]
    Closed,
    Open(OpenPalette),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaletteEvent {
    Open { anchor: AnchorPosition },
    SetQuery(String),
    SelectNext,
    SelectPrev,
    Confirm,
    /// Pointer activation of the n-th listed entry.
    Activate(usize),
    Dismiss,
    PointerDownOutside,
    FocusLost,
}

impl PaletteEvent {
    /// Maps a key name to a palette event. Accepts both gpui and DOM key names.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "down" | "ArrowDown" => Some(Self::SelectNext),
            "up" | "ArrowUp" => Some(Self::SelectPrev),
            "enter" | "Enter" => Some(Self::Confirm),
            "escape" | "Escape" => Some(Self::Dismiss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteEffect {
    /// Invoke the catalog command at this index.
    Invoke(usize),
    /// The palette went from open to closed; notify the host.
    Close,
}

/// Pure palette transition.
///
/// Every event except `Open` is ignored while closed, so closing twice is harmless.
pub fn palette_transition(
    state: PaletteState,
    event: PaletteEvent,
    catalog: &CommandCatalog,
) -> (PaletteState, Vec<PaletteEffect>) {
    let mut open = match (state, &event) {
        (_, PaletteEvent::Open { anchor }) => {
            let open = OpenPalette {
                anchor: *anchor,
                query: String::new(),
                filtered: catalog.filter_indices(""),
                selected: 0,
            };
            return (PaletteState::Open(open), Vec::new());
        }
        (PaletteState::Closed, _) => return (PaletteState::Closed, Vec::new()),
        (PaletteState::Open(open), _) => open,
    };

    let invoke_at = |open: OpenPalette, ix: usize| match open.filtered.get(ix).copied() {
        Some(command_ix) => (
            PaletteState::Closed,
            vec![PaletteEffect::Invoke(command_ix), PaletteEffect::Close],
        ),
        None => (PaletteState::Open(open), Vec::new()),
    };

    match event {
        PaletteEvent::SetQuery(query) => {
            open.filtered = catalog.filter_indices(&query);
            open.query = query;
            open.selected = 0;
        }
        PaletteEvent::SelectNext => {
            let len = open.filtered.len();
            if len > 0 {
                open.selected = (open.selected + 1) % len;
            }
        }
        PaletteEvent::SelectPrev => {
            let len = open.filtered.len();
            if len > 0 {
                open.selected = (open.selected.min(len - 1) + len - 1) % len;
            }
        }
        PaletteEvent::Confirm => {
            let selected = open.selected;
            return invoke_at(open, selected);
        }
        PaletteEvent::Activate(ix) => return invoke_at(open, ix),
        PaletteEvent::Dismiss | PaletteEvent::PointerDownOutside | PaletteEvent::FocusLost => {
            return (PaletteState::Closed, vec![PaletteEffect::Close]);
        }
        PaletteEvent::Open { .. } => {}
    }
    (PaletteState::Open(open), Vec::new())
}

/// Result of feeding one event through [`CommandPalette::dispatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteOutcome {
    /// Id of the command that was invoked, if any.
    pub invoked: Option<String>,
    pub closed: bool,
    pub prompts: Vec<PromptRequest>,
}

/// A catalog plus the palette state over it.
#[derive(Debug, Clone, Default)]
pub struct CommandPalette {
    catalog: CommandCatalog,
    state: PaletteState,
}

impl CommandPalette {
    pub fn new(catalog: CommandCatalog) -> Self {
        Self {
            catalog,
            state: PaletteState::Closed,
        }
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &PaletteState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PaletteState::Open(_))
    }

    pub fn anchor(&self) -> Option<AnchorPosition> {
        match &self.state {
            PaletteState::Open(open) => Some(open.anchor),
            PaletteState::Closed => None,
        }
    }

    pub fn query(&self) -> &str {
        match &self.state {
            PaletteState::Open(open) => &open.query,
            PaletteState::Closed => "",
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        match &self.state {
            PaletteState::Open(open) if !open.filtered.is_empty() => Some(open.selected),
            _ => None,
        }
    }

    pub fn filtered(&self) -> Vec<&PaletteCommand> {
        match &self.state {
            PaletteState::Open(open) => open
                .filtered
                .iter()
                .filter_map(|&ix| self.catalog.get(ix))
                .collect(),
            PaletteState::Closed => Vec::new(),
        }
    }

    pub fn selected_command(&self) -> Option<&PaletteCommand> {
        match &self.state {
            PaletteState::Open(open) => open
                .filtered
                .get(open.selected)
                .and_then(|&ix| self.catalog.get(ix)),
            PaletteState::Closed => None,
        }
    }

    /// Applies `event` to the state and returns the effects without running them.
    pub fn handle(&mut self, event: PaletteEvent) -> Vec<PaletteEffect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = palette_transition(state, event, &self.catalog);
        self.state = next;
        effects
    }

    /// Applies `event` and runs any resulting invocation against `cx`.
    ///
    /// A failing command is logged and otherwise ignored; the palette is closed either way.
    pub fn dispatch(&mut self, event: PaletteEvent, cx: &mut CommandContext<'_>) -> PaletteOutcome {
        let mut outcome = PaletteOutcome::default();
        for effect in self.handle(event) {
            match effect {
                PaletteEffect::Invoke(ix) => {
                    let Some(command) = self.catalog.get(ix) else {
                        continue;
                    };
                    if let Err(err) = command.invoke(cx) {
                        tracing::warn!(command = %command.id, error = %err, "palette command failed");
                    }
                    outcome.invoked = Some(command.id.clone());
                    outcome.prompts.extend(cx.take_prompts());
                }
                PaletteEffect::Close => outcome.closed = true,
            }
        }
        outcome
    }
}
