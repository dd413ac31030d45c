//! Fixed-arity records.

use std::ops::{Deref, DerefMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constructor::ChildList;

/// A struct-like constructor owning an ordered list of children.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    children: ChildList,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct children (not a recursive count).
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.children.len()
    }
}

impl Deref for Record {
    type Target = ChildList;

    fn deref(&self) -> &Self::Target {
        &self.children
    }
}

impl DerefMut for Record {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.children
    }
}
