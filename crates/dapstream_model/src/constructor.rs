//! Ordered child storage shared by records and tables.

use std::ops::Deref;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::variable::Variable;

/// An owned, ordered list of child variables.
///
/// Positions are plain indices: inserting or removing a child shifts the
/// positions of every later sibling.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChildList {
    children: Vec<Variable>,
}

impl ChildList {
    /// Inserts `child` before position `before`, or appends when `None`
    /// or past the end.
    pub fn add_child(&mut self, child: Variable, before: Option<usize>) {
        match before {
            Some(index) if index < self.children.len() => self.children.insert(index, child),
            _ => self.children.push(child),
        }
    }

    /// Removes and returns the direct child named `name`.
    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        let index = self.position(name)?;
        Some(self.children.remove(index))
    }

    /// Position of the direct child named `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name() == name)
    }

    /// Mutable child by position.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.children.get_mut(index)
    }

    /// Mutable iterator over the children.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Variable> {
        self.children.iter_mut()
    }

    /// The children as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Variable] {
        &self.children
    }

    /// Finds a child, or with `exact_match == false` a dotted descendant.
    #[must_use]
    pub fn lookup(&self, name: &str, exact_match: bool) -> Option<&Variable> {
        if let Some(found) = self.children.iter().find(|c| c.name() == name) {
            return Some(found);
        }
        if exact_match {
            return None;
        }
        let (head, rest) = name.split_once('.')?;
        self.children
            .iter()
            .find(|c| c.name() == head)?
            .lookup(rest, false)
    }

    /// Mutable form of [`ChildList::lookup`].
    pub fn lookup_mut(&mut self, name: &str, exact_match: bool) -> Option<&mut Variable> {
        if let Some(index) = self.position(name) {
            return self.children.get_mut(index);
        }
        if exact_match {
            return None;
        }
        let (head, rest) = name.split_once('.')?;
        let index = self.position(head)?;
        self.children[index].lookup_mut(rest, false)
    }

    /// Names that occur more than once, each reported once.
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.children.len());
        let mut dups = Vec::new();
        for child in &self.children {
            let name = child.name();
            if seen.contains(&name) {
                if !dups.contains(&name) {
                    dups.push(name);
                }
            } else {
                seen.push(name);
            }
        }
        dups
    }
}

impl Deref for ChildList {
    type Target = [Variable];

    fn deref(&self) -> &Self::Target {
        &self.children
    }
}
