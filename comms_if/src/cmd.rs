//! # Command trees
//!
//! Robot commands are authored as a tree of [`ActionNode`]s. Group nodes (`sequence`, `race`,
//! `parallel`) contain children, command nodes are leaves naming a robot command from the
//! season configuration. The tree is opaque to the path geometry, it is only carried through
//! export, import and baking.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the group that runs its children one after the other.
pub const SEQUENCE: &str = "sequence";

/// Name of the group that runs its children together until the first one finishes.
pub const RACE: &str = "race";

/// Name of the group that runs its children together until all of them finish.
pub const PARALLEL: &str = "parallel";

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A node in a command tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionNode {
    /// Whether this is a group or a leaf command
    pub kind: ActionKind,

    /// Child nodes, always empty for commands
    #[serde(default)]
    pub children: Vec<ActionNode>,

    /// The group type (`sequence`, `race`, `parallel`) or the command name
    pub name: String,

    /// Identifier of the node, unique within one editing session
    pub node_id: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Group,
    Command,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ActionNode {
    /// Create a new group node with the given children.
    pub fn group(name: &str, children: Vec<ActionNode>, node_id: u64) -> Self {
        Self {
            kind: ActionKind::Group,
            children,
            name: name.into(),
            node_id,
        }
    }

    /// Create a new leaf command node.
    pub fn command(name: &str, node_id: u64) -> Self {
        Self {
            kind: ActionKind::Command,
            children: Vec::new(),
            name: name.into(),
            node_id,
        }
    }

    pub fn is_group(&self) -> bool {
        self.kind == ActionKind::Group
    }

    /// Returns true if this node has no commands anywhere beneath it.
    pub fn is_empty(&self) -> bool {
        match self.kind {
            ActionKind::Command => false,
            ActionKind::Group => self.children.iter().all(|c| c.is_empty()),
        }
    }

    /// Find the node with the given id in this tree (depth first, self included).
    pub fn find_node(&self, node_id: u64) -> Option<&ActionNode> {
        if self.node_id == node_id {
            return Some(self);
        }

        self.children.iter().find_map(|c| c.find_node(node_id))
    }

    /// Mutable version of [`ActionNode::find_node`].
    pub fn find_node_mut(&mut self, node_id: u64) -> Option<&mut ActionNode> {
        if self.node_id == node_id {
            return Some(self);
        }

        self.children
            .iter_mut()
            .find_map(|c| c.find_node_mut(node_id))
    }

    /// Insert `child` into the group with id `parent_id` at `index`.
    ///
    /// Indices past the end append. Returns the child back if the parent doesn't exist or isn't
    /// a group.
    pub fn insert_child(
        &mut self,
        parent_id: u64,
        index: usize,
        child: ActionNode,
    ) -> Result<(), ActionNode> {
        match self.find_node_mut(parent_id) {
            Some(parent) if parent.is_group() => {
                let index = index.min(parent.children.len());
                parent.children.insert(index, child);
                Ok(())
            }
            _ => Err(child),
        }
    }

    /// Number of nodes in this tree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|c| c.count()).sum::<usize>()
    }
}
