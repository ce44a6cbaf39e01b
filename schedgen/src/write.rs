/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The SchedWrite/SchedWriteRes registry.
//!
//! Modelled as an arena: every `SchedWrite`, `WriteSequence`, and
//! `SchedWriteRes` lives in one `WriteRegistry`'s node vector and is
//! referenced everywhere else by a small `Copy` index (`WriteId`) instead of
//! `Rc<RefCell<_>>` — there is no shared mutable aliasing to manage, and
//! indices stay valid for the registry's whole lifetime since nodes are never
//! removed.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::resource::PortSet;

/// Index of one interned write/sequence/override inside a [`WriteRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteId(usize);

/// A write's resource payload. Present iff the write is *complete*.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Resources {
    pub resources: Vec<PortSet>,
    pub resource_cycles: Vec<u32>,
    pub latency: i64,
    pub num_uops: i64,
}

impl Resources {
    pub fn new(resources: Vec<PortSet>, resource_cycles: Vec<u32>, latency: i64, num_uops: i64) -> Self {
        Resources {
            resources,
            resource_cycles,
            latency,
            num_uops,
        }
    }

    /// Non-default cycles means *any* entry is not 1, not merely that the
    /// payload happens to be the singleton `[1]`.
    pub fn has_default_cycles(&self) -> bool {
        self.resource_cycles.iter().all(|&c| c == 1)
    }
}

#[derive(Debug, Clone)]
pub enum WriteKind {
    /// A plain SchedWrite (or X86FoldableSchedWrite — same shape).
    Base,
    /// A WriteSequence: an ordered list of sub-writes, repeated `repeat` times.
    Sequence { writes: Vec<WriteId>, repeat: u32 },
    /// A SchedWriteRes synthesised during inference.
    Res { index: u32 },
}

#[derive(Debug, Clone)]
pub struct SchedWrite {
    name: String,
    kind: WriteKind,
    supported: bool,
    aux: bool,
    payload: Option<Resources>,
}

impl SchedWrite {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &WriteKind {
        &self.kind
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, WriteKind::Sequence { .. })
    }

    pub fn is_res(&self) -> bool {
        matches!(self.kind, WriteKind::Res { .. })
    }

    pub fn supported(&self) -> bool {
        self.supported
    }

    pub fn set_supported(&mut self, value: bool) {
        self.supported = value;
    }

    pub fn aux(&self) -> bool {
        self.aux
    }

    pub fn payload(&self) -> Option<&Resources> {
        self.payload.as_ref()
    }

    /// Payload is written-once: setting it twice is an engine bug.
    pub fn set_payload(&mut self, resources: Resources) {
        assert!(
            self.payload.is_none(),
            "SchedWrite {}: payload already set",
            self.name
        );
        self.payload = Some(resources);
    }

    /// A base write is complete once its payload is set; a sequence is
    /// complete iff every expanded leaf is complete (checked by the registry,
    /// since that requires resolving `WriteId`s). Aux writes are always
    /// complete, which callers enforce at construction.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

/// Interned store of every SchedWrite/WriteSequence/SchedWriteRes in one
/// pipeline run. Owned per-run rather than process-wide, so independent
/// per-CPU runs never interfere.
#[derive(Debug, Default)]
pub struct WriteRegistry {
    nodes: Vec<SchedWrite>,
    by_name: IndexMap<String, WriteId>,
    res_interning: HashMap<(Vec<PortSet>, Vec<u32>, i64, i64), WriteId>,
    next_res_index: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("SchedWrite `{0}` is already registered")]
    DuplicateName(String),
    #[error("WriteSequence `{name}` re-declared with different writes/repeat than its first definition")]
    InconsistentSequence { name: String },
}

impl WriteRegistry {
    pub fn new() -> Self {
        WriteRegistry::default()
    }

    pub fn get(&self, name: &str) -> Option<WriteId> {
        self.by_name.get(name).copied()
    }

    pub fn get_all(&self) -> impl Iterator<Item = WriteId> + '_ {
        (0..self.nodes.len()).map(WriteId)
    }

    pub fn write(&self, id: WriteId) -> &SchedWrite {
        &self.nodes[id.0]
    }

    pub fn write_mut(&mut self, id: WriteId) -> &mut SchedWrite {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, name: String, kind: WriteKind, aux: bool, payload: Option<Resources>) -> WriteId {
        let id = WriteId(self.nodes.len());
        self.nodes.push(SchedWrite {
            name: name.clone(),
            kind,
            supported: true,
            aux,
            payload,
        });
        self.by_name.insert(name, id);
        id
    }

    /// Register a plain SchedWrite. Errors if the name already exists.
    pub fn register_base(&mut self, name: impl Into<String>, aux: bool) -> Result<WriteId, RegistryError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        Ok(self.push(name, WriteKind::Base, aux, None))
    }

    /// Register a base write already known to be complete (a seed write).
    pub fn register_seeded(
        &mut self,
        name: impl Into<String>,
        aux: bool,
        resources: Resources,
    ) -> Result<WriteId, RegistryError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        Ok(self.push(name, WriteKind::Base, aux, Some(resources)))
    }

    /// Register a WriteSequence. If `name` already exists, the existing
    /// definition must be identical or this is a hard error.
    pub fn register_sequence(
        &mut self,
        name: impl Into<String>,
        writes: Vec<WriteId>,
        repeat: u32,
    ) -> Result<WriteId, RegistryError> {
        let name = name.into();
        if let Some(&existing) = self.by_name.get(&name) {
            match &self.nodes[existing.0].kind {
                WriteKind::Sequence {
                    writes: existing_writes,
                    repeat: existing_repeat,
                } if *existing_writes == writes && *existing_repeat == repeat => Ok(existing),
                _ => Err(RegistryError::InconsistentSequence { name }),
            }
        } else {
            Ok(self.push(name, WriteKind::Sequence { writes, repeat }, false, None))
        }
    }

    /// Flatten a write (base leaf, or sequence unrolled `repeat` times) into
    /// its concrete leaf sequence.
    pub fn expand(&self, id: WriteId) -> Vec<WriteId> {
        match &self.nodes[id.0].kind {
            WriteKind::Base | WriteKind::Res { .. } => vec![id],
            WriteKind::Sequence { writes, repeat } => {
                let mut flat = Vec::new();
                for sub in writes {
                    flat.extend(self.expand(*sub));
                }
                let mut out = Vec::with_capacity(flat.len() * (*repeat as usize));
                for _ in 0..*repeat {
                    out.extend_from_slice(&flat);
                }
                out
            }
        }
    }

    pub fn is_complete(&self, id: WriteId) -> bool {
        match &self.nodes[id.0].kind {
            WriteKind::Base | WriteKind::Res { .. } => self.nodes[id.0].has_payload(),
            WriteKind::Sequence { .. } => self.expand(id).iter().all(|leaf| self.nodes[leaf.0].has_payload()),
        }
    }

    /// Derived latency/num_uops/resources for a sequence: sum / sum /
    /// concatenation over `expand()`. Panics if any leaf is
    /// incomplete — callers must check [`WriteRegistry::is_complete`] first.
    pub fn derive_sequence_resources(&self, id: WriteId) -> Resources {
        let leaves = self.expand(id);
        let mut resources = Vec::new();
        let mut resource_cycles = Vec::new();
        let mut latency = 0i64;
        let mut num_uops = 0i64;
        for leaf in leaves {
            let payload = self.nodes[leaf.0]
                .payload
                .as_ref()
                .expect("derive_sequence_resources: incomplete leaf");
            resources.extend(payload.resources.iter().cloned());
            resource_cycles.extend(payload.resource_cycles.iter().copied());
            latency += payload.latency;
            num_uops += payload.num_uops;
        }
        Resources::new(resources, resource_cycles, latency, num_uops)
    }

    /// Intern a SchedWriteRes by resource signature: two inserts with an
    /// equal `(resources, resource_cycles, latency, num_uops)` yield the same
    /// `WriteId`, and the first insertion's name prefix wins.
    pub fn intern_write_res(&mut self, prefix: &str, resources: Resources) -> WriteId {
        let key = (
            resources.resources.clone(),
            resources.resource_cycles.clone(),
            resources.latency,
            resources.num_uops,
        );
        if let Some(&existing) = self.res_interning.get(&key) {
            return existing;
        }
        let index = self.next_res_index;
        self.next_res_index += 1;
        let name = format!("{prefix}WriteResGroup{index}");
        let id = WriteId(self.nodes.len());
        self.nodes.push(SchedWrite {
            name: name.clone(),
            kind: WriteKind::Res { index },
            supported: true,
            aux: false,
            payload: Some(resources),
        });
        self.by_name.insert(name, id);
        self.res_interning.insert(key, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Port;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn duplicate_base_name_is_rejected() {
        let mut reg = WriteRegistry::new();
        reg.register_base("WriteFoo", false).unwrap();
        assert!(matches!(
            reg.register_base("WriteFoo", false),
            Err(RegistryError::DuplicateName(_))
        ));
    }

    #[test]
    fn sequence_expand_repeats_flattened_leaves() {
        let mut reg = WriteRegistry::new();
        let a = reg
            .register_seeded("WriteA", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();
        let b = reg
            .register_seeded("WriteB", false, Resources::new(vec![ps(&[1])], vec![1], 2, 1))
            .unwrap();
        let seq = reg.register_sequence("WriteSeq", vec![a, b], 2).unwrap();
        let leaves = reg.expand(seq);
        assert_eq!(leaves, vec![a, b, a, b]);
        assert!(reg.is_complete(seq));
        let derived = reg.derive_sequence_resources(seq);
        assert_eq!(derived.latency, 6);
        assert_eq!(derived.num_uops, 4);
        assert_eq!(derived.resources.len(), 4);
    }

    #[test]
    fn reregistering_identical_sequence_returns_same_id() {
        let mut reg = WriteRegistry::new();
        let a = reg.register_base("WriteA", true).unwrap();
        let s1 = reg.register_sequence("WriteSeq", vec![a], 3).unwrap();
        let s2 = reg.register_sequence("WriteSeq", vec![a], 3).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn reregistering_divergent_sequence_is_rejected() {
        let mut reg = WriteRegistry::new();
        let a = reg.register_base("WriteA", true).unwrap();
        reg.register_sequence("WriteSeq", vec![a], 3).unwrap();
        let result = reg.register_sequence("WriteSeq", vec![a], 4);
        assert!(matches!(result, Err(RegistryError::InconsistentSequence { .. })));
    }

    #[test]
    fn write_res_interning_dedups_by_signature() {
        let mut reg = WriteRegistry::new();
        let r1 = reg.intern_write_res("CPUA", Resources::new(vec![ps(&[0, 1])], vec![1], 3, 2));
        let r2 = reg.intern_write_res("CPUB", Resources::new(vec![ps(&[1, 0])].into_iter().map(|p| p).collect(), vec![1], 3, 2));
        // Different call sites still dedup as long as the *sorted* signature matches.
        assert_eq!(r1, r2);
        assert_eq!(reg.write(r1).name(), "CPUAWriteResGroup0");
    }

    #[test]
    fn write_res_distinct_signatures_get_distinct_ids() {
        let mut reg = WriteRegistry::new();
        let r1 = reg.intern_write_res("CPUA", Resources::new(vec![ps(&[0])], vec![1], 1, 1));
        let r2 = reg.intern_write_res("CPUA", Resources::new(vec![ps(&[1])], vec![1], 1, 1));
        assert_ne!(r1, r2);
    }
}
