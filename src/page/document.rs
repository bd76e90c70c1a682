//! In-memory page: a root element plus code-block nodes between opaque
//! stretches of HTML

use super::copy::{CopyControl, CopyState};
use crate::annotate::LevelMap;
use crate::config::FALLBACK_LANGUAGE;
use crate::syntax::canonical_tag;

/// Identity of a block node; replacing a node allocates a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Document readiness, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// The `<html>` element: theme indicators live here
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootElement {
    pub classes: Vec<String>,
    /// Every other attribute, in source order
    pub attrs: Vec<(String, String)>,
}

impl RootElement {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Returns whether anything changed
    pub fn set_class(&mut self, class: &str, on: bool) -> bool {
        match (self.has_class(class), on) {
            (false, true) => {
                self.classes.push(class.to_string());
                true
            }
            (true, false) => {
                self.classes.retain(|c| c != class);
                true
            }
            _ => false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or remove an attribute; returns whether anything changed
    pub fn set_attr(&mut self, name: &str, value: Option<&str>) -> bool {
        let current = self.attrs.iter().position(|(n, _)| n == name);
        match (current, value) {
            (Some(i), Some(v)) if self.attrs[i].1 == v => false,
            (Some(i), Some(v)) => {
                self.attrs[i].1 = v.to_string();
                true
            }
            (Some(i), None) => {
                self.attrs.remove(i);
                true
            }
            (None, Some(v)) => {
                self.attrs.push((name.to_string(), v.to_string()));
                true
            }
            (None, None) => false,
        }
    }
}

/// What a block looked like before glint touched it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalSource {
    pub text: String,
    pub classes: Vec<String>,
    /// Canonical language tag, `text` when unclassified
    pub language: String,
}

/// Visible content of a rendered node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    /// Highlighted `<pre>` markup
    pub markup: String,
    pub display_text: String,
    pub levels: LevelMap,
    pub theme: String,
    pub copy: CopyControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Source(String),
    Rendered(RenderedBlock),
}

/// A code block as it currently appears on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNode {
    pub id: NodeId,
    pub classes: Vec<String>,
    pub content: Content,
}

impl BlockNode {
    pub fn is_rendered(&self) -> bool {
        matches!(self.content, Content::Rendered(_))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Raw tag from the first `language-*` class
    pub fn language_tag(&self) -> Option<&str> {
        language_tag(&self.classes)
    }

    pub fn rendered(&self) -> Option<&RenderedBlock> {
        match &self.content {
            Content::Rendered(rendered) => Some(rendered),
            Content::Source(_) => None,
        }
    }
}

pub fn language_tag(classes: &[String]) -> Option<&str> {
    classes.iter().find_map(|c| c.strip_prefix("language-"))
}

/// A block slot: the current node, the captured original, and the markup
/// needed to write a pristine block back out
#[derive(Debug, Clone)]
pub(crate) struct BlockSlot {
    pub(crate) node: BlockNode,
    pub(crate) original: Option<OriginalSource>,
    /// Opening `<pre ...>` tag as it appeared in the source
    pub(crate) pre_open: String,
    /// `<code>` attributes other than `class`
    pub(crate) code_attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub(crate) enum Segment {
    Html(String),
    Root,
    Block(usize),
}

/// The page model
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub(crate) root: RootElement,
    pub(crate) prefers_dark: bool,
    pub(crate) segments: Vec<Segment>,
    pub(crate) slots: Vec<BlockSlot>,
    next_id: u64,
}

/// Classes that glint adds temporarily and never records as original
pub const TRANSIENT_CLASSES: &[&str] = &[super::LOADING_CLASS];

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &RootElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut RootElement {
        &mut self.root
    }

    /// OS-level colour-scheme preference
    pub fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    pub fn set_prefers_dark(&mut self, dark: bool) {
        self.prefers_dark = dark;
    }

    fn alloc_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    /// Append a pristine block
    pub fn add_block(&mut self, classes: &[&str], text: &str) -> NodeId {
        self.push_block(
            classes.iter().map(|c| c.to_string()).collect(),
            text.to_string(),
            "<pre>".to_string(),
            Vec::new(),
        )
    }

    pub(crate) fn push_block(
        &mut self,
        classes: Vec<String>,
        text: String,
        pre_open: String,
        code_attrs: Vec<(String, String)>,
    ) -> NodeId {
        let id = self.alloc_id();
        self.slots.push(BlockSlot {
            node: BlockNode {
                id,
                classes,
                content: Content::Source(text),
            },
            original: None,
            pre_open,
            code_attrs,
        });
        self.segments.push(Segment::Block(self.slots.len() - 1));
        id
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BlockNode> {
        self.slots.iter().map(|s| &s.node)
    }

    pub fn block_count(&self) -> usize {
        self.slots.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&BlockNode> {
        self.slot(id).map(|s| &s.node)
    }

    fn slot(&self, id: NodeId) -> Option<&BlockSlot> {
        self.slots.iter().find(|s| s.node.id == id)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut BlockSlot> {
        self.slots.iter_mut().find(|s| s.node.id == id)
    }

    /// The original source of a block, captured on first call
    ///
    /// Capture only ever reads pristine content; a rendered node with no
    /// recorded original yields `None`.
    pub fn capture_original(&mut self, id: NodeId) -> Option<OriginalSource> {
        let slot = self.slot_mut(id)?;
        if let Some(original) = &slot.original {
            return Some(original.clone());
        }

        let Content::Source(text) = &slot.node.content else {
            return None;
        };
        let classes: Vec<String> = slot
            .node
            .classes
            .iter()
            .filter(|c| !TRANSIENT_CLASSES.contains(&c.as_str()))
            .cloned()
            .collect();
        let language = language_tag(&classes)
            .map(canonical_tag)
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string());

        let original = OriginalSource {
            text: text.clone(),
            classes,
            language,
        };
        slot.original = Some(original.clone());
        Some(original)
    }

    /// Swap the node for a new rendered one; `None` if `id` is gone
    pub fn replace_with_rendered(&mut self, id: NodeId, rendered: RenderedBlock) -> Option<NodeId> {
        let new_id = self.alloc_id();
        let slot = self.slot_mut(id)?;
        slot.node = BlockNode {
            id: new_id,
            classes: vec![super::RENDERED_CLASS.to_string()],
            content: Content::Rendered(rendered),
        };
        Some(new_id)
    }

    /// Put a rendered node back to its captured source, keeping its identity
    pub fn restore(&mut self, id: NodeId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        let Some(original) = &slot.original else {
            return false;
        };
        if !slot.node.is_rendered() {
            return false;
        }
        slot.node.classes = original.classes.clone();
        slot.node.content = Content::Source(original.text.clone());
        true
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.slot_mut(id) {
            Some(slot) if !slot.node.has_class(class) => {
                slot.node.classes.push(class.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.slot_mut(id) {
            Some(slot) if slot.node.has_class(class) => {
                slot.node.classes.retain(|c| c != class);
                true
            }
            _ => false,
        }
    }

    /// Text the node's copy control would copy
    pub fn copy_text(&self, id: NodeId) -> Option<String> {
        self.node(id)?.rendered().map(|r| r.copy.text.clone())
    }

    pub fn set_copy_state(&mut self, id: NodeId, state: CopyState) -> bool {
        match self.slot_mut(id).map(|s| &mut s.node.content) {
            Some(Content::Rendered(rendered)) => {
                rendered.copy.state = state;
                true
            }
            _ => false,
        }
    }
}
