//! Datasets: named, ordered collections of top-level variables.
//!
//! Nodes are addressed two ways. Callers use dotted paths (`outer.inner`),
//! which may carry `%xx` escapes. The serialization driver uses index
//! paths (`&[usize]`, one position per level) so it can release its
//! mutable borrow between rows and hand the dataset to a selection.

use dapstream_foundation::escape::www_to_id;
use dapstream_foundation::{Error, Result, TypeKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constructor::ChildList;
use crate::variable::Variable;

/// A named schema plus the per-request state of its variables.
///
/// Clone a registered schema per request; read and selection flags are
/// request state.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dataset {
    name: String,
    vars: ChildList,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: ChildList::default(),
        }
    }

    /// The dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the dataset.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Appends a top-level variable.
    pub fn add(&mut self, var: Variable) {
        self.vars.add_child(var, None);
    }

    /// Builder form of [`Dataset::add`].
    #[must_use]
    pub fn with(mut self, var: Variable) -> Self {
        self.add(var);
        self
    }

    /// Removes a top-level variable by name.
    pub fn delete(&mut self, name: &str) -> Option<Variable> {
        self.vars.remove(name)
    }

    /// Top-level variables in insertion order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    /// Mutable iterator over the top-level variables.
    pub fn variables_mut(&mut self) -> std::slice::IterMut<'_, Variable> {
        self.vars.iter_mut()
    }

    pub(crate) fn top_level(&self) -> &ChildList {
        &self.vars
    }

    /// Finds a variable by dotted path.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Variable> {
        self.vars.lookup(&www_to_id(path), false)
    }

    /// Mutable form of [`Dataset::lookup`].
    pub fn lookup_mut(&mut self, path: &str) -> Option<&mut Variable> {
        self.vars.lookup_mut(&www_to_id(path), false)
    }

    /// Resolves a dotted path to positions, one per level.
    #[must_use]
    pub fn index_path(&self, path: &str) -> Option<Vec<usize>> {
        let mut at = Vec::new();
        locate(&self.vars, &www_to_id(path), &mut at).then_some(at)
    }

    /// The node at an index path.
    #[must_use]
    pub fn node(&self, at: &[usize]) -> Option<&Variable> {
        let (first, rest) = at.split_first()?;
        rest.iter()
            .try_fold(self.vars.get(*first)?, |node, &i| node.child(i))
    }

    /// Mutable node at an index path.
    pub fn node_mut(&mut self, at: &[usize]) -> Option<&mut Variable> {
        let (first, rest) = at.split_first()?;
        let mut node = self.vars.get_mut(*first)?;
        for &i in rest {
            node = node.child_mut(i)?;
        }
        Some(node)
    }

    /// The dotted path of the node at an index path.
    #[must_use]
    pub fn dotted_path(&self, at: &[usize]) -> Option<String> {
        let mut names = Vec::with_capacity(at.len());
        for depth in 1..=at.len() {
            names.push(self.node(&at[..depth])?.name());
        }
        Some(names.join("."))
    }

    /// The dotted path of the innermost table at or above `path`.
    ///
    /// `None` when no table encloses it, or when the path does not resolve.
    #[must_use]
    pub fn enclosing_table(&self, path: &str) -> Option<String> {
        let at = self.index_path(path)?;
        let depth = (1..=at.len())
            .rev()
            .find(|&d| self.node(&at[..d]).is_some_and(|n| n.type_kind() == TypeKind::Table))?;
        self.dotted_path(&at[..depth])
    }

    /// Marks a variable and its descendants selected or unselected.
    ///
    /// Selecting also marks every enclosing constructor, so the node is
    /// reachable by the serializer. Siblings keep their state.
    ///
    /// # Errors
    /// Returns an undefined variable error if the path does not resolve.
    pub fn mark(&mut self, path: &str, state: bool) -> Result<()> {
        let at = self
            .index_path(path)
            .ok_or_else(|| Error::undefined_variable(path))?;
        if state {
            for depth in 1..at.len() {
                if let Some(ancestor) = self.node_mut(&at[..depth]) {
                    ancestor.set_selected_shallow(true);
                }
            }
        }
        if let Some(node) = self.node_mut(&at) {
            node.set_selected(state);
        }
        Ok(())
    }

    /// Marks every variable selected or unselected.
    pub fn mark_all(&mut self, state: bool) {
        for var in self.vars.iter_mut() {
            var.set_selected(state);
        }
    }

    /// Clears the read flag everywhere, so the next serialize re-reads.
    pub fn reset_read(&mut self) {
        for var in self.vars.iter_mut() {
            var.reset_read();
        }
    }
}

fn locate(list: &[Variable], name: &str, at: &mut Vec<usize>) -> bool {
    if let Some(i) = list.iter().position(|v| v.name() == name) {
        at.push(i);
        return true;
    }
    let Some((head, rest)) = name.split_once('.') else {
        return false;
    };
    let Some(i) = list.iter().position(|v| v.name() == head) else {
        return false;
    };
    at.push(i);
    locate(list[i].children(), rest, at)
}
