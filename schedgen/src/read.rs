/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! SchedRead registry: names only, no inferred state.

use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadId(usize);

#[derive(Debug, Default)]
pub struct ReadRegistry {
    names: Vec<String>,
    by_name: IndexMap<String, ReadId>,
}

impl ReadRegistry {
    pub fn new() -> Self {
        ReadRegistry::default()
    }

    /// Returns the existing id if `name` is already registered, otherwise
    /// interns a new one. Unlike SchedWrite, SchedReads carry no state to
    /// conflict on, so re-declaration is always a harmless no-op.
    pub fn intern(&mut self, name: impl Into<String>) -> ReadId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = ReadId(self.names.len());
        self.names.push(name.clone());
        self.by_name.insert(name, id);
        id
    }

    pub fn get(&self, name: &str) -> Option<ReadId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ReadId) -> &str {
        &self.names[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_name_twice_yields_same_id() {
        let mut reg = ReadRegistry::new();
        let a = reg.intern("ReadAfterLd");
        let b = reg.intern("ReadAfterLd");
        assert_eq!(a, b);
        assert_eq!(reg.name(a), "ReadAfterLd");
    }
}
