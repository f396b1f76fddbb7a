// Action identity: full names and dense layout indices

use super::{InputError, InputResult};
use std::fmt;

/// Full action name, `group.name`
///
/// Matching is exact and case-sensitive. The group never contains a dot; the
/// name part may.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionName {
    full: String,
    split: usize,
}

impl ActionName {
    /// Build a full name from its group and name parts
    pub fn new(group: &str, name: &str) -> InputResult<Self> {
        if group.is_empty() || name.is_empty() || group.contains('.') {
            return Err(InputError::InvalidActionName(format!("{group}.{name}")));
        }
        if group.chars().chain(name.chars()).any(char::is_whitespace) {
            return Err(InputError::InvalidActionName(format!("{group}.{name}")));
        }

        Ok(Self {
            full: format!("{group}.{name}"),
            split: group.len(),
        })
    }

    /// Parse a full `group.name` string
    pub fn parse(full: &str) -> InputResult<Self> {
        match full.split_once('.') {
            Some((group, name)) => Self::new(group, name),
            None => Err(InputError::InvalidActionName(full.to_string())),
        }
    }

    /// Group part
    pub fn group(&self) -> &str {
        &self.full[..self.split]
    }

    /// Name part (after the first dot)
    pub fn name(&self) -> &str {
        &self.full[self.split + 1..]
    }

    /// Full `group.name` string
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// Dense index of an action inside one installed layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) usize);

impl ActionId {
    /// Raw index
    pub fn index(&self) -> usize {
        self.0
    }
}
