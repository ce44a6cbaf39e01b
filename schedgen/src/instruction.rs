/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The per-instruction record.

use crate::read::ReadId;
use crate::resource::PortSet;
use crate::write::{WriteId, WriteRegistry};

/// Measured micro-architectural data for one instruction. `uops` is already
/// expanded: each `[count, ports]` entry in the input JSON becomes `count`
/// identical `PortSet` copies here.
#[derive(Debug, Clone)]
pub struct Measured {
    pub latency: i64,
    pub throughput: Option<f64>,
    pub uops: Vec<PortSet>,
    pub num_uops: i64,
}

#[derive(Debug, Clone)]
pub struct Instruction {
    opcode: String,
    reads: Vec<ReadId>,
    writes: Vec<WriteId>,
    isa_set: Option<String>,
    measured: Option<Measured>,
    use_override: bool,
}

impl Instruction {
    pub fn new(opcode: impl Into<String>, reads: Vec<ReadId>, writes: Vec<WriteId>, isa_set: Option<String>) -> Self {
        Instruction {
            opcode: opcode.into(),
            reads,
            writes,
            isa_set,
            measured: None,
            use_override: false,
        }
    }

    pub fn opcode(&self) -> &str {
        &self.opcode
    }

    pub fn reads(&self) -> &[ReadId] {
        &self.reads
    }

    pub fn writes(&self) -> &[WriteId] {
        &self.writes
    }

    pub fn isa_set(&self) -> Option<&str> {
        self.isa_set.as_deref()
    }

    pub fn measured(&self) -> Option<&Measured> {
        self.measured.as_ref()
    }

    pub fn use_override(&self) -> bool {
        self.use_override
    }

    pub fn set_measured(&mut self, measured: Measured) {
        self.measured = Some(measured);
    }

    pub fn set_use_override(&mut self, value: bool) {
        self.use_override = value;
    }

    /// Invalid on a CPU whose whitelist doesn't contain this instruction's
    /// `isa_set` tag: invalid iff the tag is present and not in the
    /// whitelist.
    pub fn is_invalid_on(&self, is_isa_valid: impl Fn(Option<&str>) -> bool) -> bool {
        self.isa_set.is_some() && !is_isa_valid(self.isa_set.as_deref())
    }

    /// Remove `writes[pos]`, where `pos` is the index of `old` if present.
    ///
    /// If `old` is none and not required, the new write is appended;
    /// otherwise the first occurrence of `old` is replaced.
    pub fn replace_or_add_write(&mut self, old: Option<WriteId>, new: WriteId, require_present: bool) {
        match old {
            None => {
                assert!(!require_present, "replace_or_add_write: require_present with no `old`");
                self.writes.push(new);
            }
            Some(old_id) => match self.writes.iter().position(|&w| w == old_id) {
                Some(pos) => self.writes[pos] = new,
                None => {
                    assert!(
                        !require_present,
                        "replace_or_add_write: `old` write not present on this instruction"
                    );
                    self.writes.push(new);
                }
            },
        }
    }

    pub fn remove_write(&mut self, target: WriteId) {
        if let Some(pos) = self.writes.iter().position(|&w| w == target) {
            self.writes.remove(pos);
        }
    }

    /// Aggregate this instruction's declared writes through the registry:
    /// max latency, summed num_uops, concatenated resources.
    /// Every write must be complete; callers check that first.
    pub fn compute_latency_uops_resources(&self, registry: &WriteRegistry) -> (i64, i64, Vec<PortSet>) {
        let mut latency = 0i64;
        let mut num_uops = 0i64;
        let mut resources = Vec::new();
        for &write_id in &self.writes {
            let node = registry.write(write_id);
            let payload = if node.is_sequence() {
                registry.derive_sequence_resources(write_id)
            } else {
                node.payload()
                    .cloned()
                    .unwrap_or_else(|| panic!("compute_latency_uops_resources: incomplete write `{}`", node.name()))
            };
            latency = latency.max(payload.latency);
            num_uops += payload.num_uops;
            resources.extend(payload.resources);
        }
        (latency, num_uops, resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Port;
    use crate::write::Resources;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn replace_or_add_appends_when_old_is_none() {
        let mut reg = WriteRegistry::new();
        let a = reg.register_base("WriteA", false).unwrap();
        let b = reg.register_base("WriteB", false).unwrap();
        let mut instr = Instruction::new("ADD8rr", vec![], vec![a], None);
        instr.replace_or_add_write(None, b, false);
        assert_eq!(instr.writes(), &[a, b]);
    }

    #[test]
    fn replace_or_add_replaces_first_occurrence() {
        let mut reg = WriteRegistry::new();
        let a = reg.register_base("WriteA", false).unwrap();
        let b = reg.register_base("WriteB", false).unwrap();
        let c = reg.register_base("WriteC", false).unwrap();
        let mut instr = Instruction::new("ADD8rr", vec![], vec![a, b], None);
        instr.replace_or_add_write(Some(a), c, true);
        assert_eq!(instr.writes(), &[c, b]);
    }

    #[test]
    #[should_panic(expected = "not present")]
    fn replace_or_add_panics_when_required_and_absent() {
        let mut reg = WriteRegistry::new();
        let a = reg.register_base("WriteA", false).unwrap();
        let b = reg.register_base("WriteB", false).unwrap();
        let mut instr = Instruction::new("ADD8rr", vec![], vec![], None);
        instr.replace_or_add_write(Some(a), b, true);
    }

    #[test]
    fn compute_aggregates_max_latency_sum_uops_concat_resources() {
        let mut reg = WriteRegistry::new();
        let a = reg
            .register_seeded("WriteA", false, Resources::new(vec![ps(&[0])], vec![1], 3, 1))
            .unwrap();
        let b = reg
            .register_seeded("WriteB", false, Resources::new(vec![ps(&[1])], vec![1], 5, 2))
            .unwrap();
        let instr = Instruction::new("ADD8rr", vec![], vec![a, b], None);
        let (latency, num_uops, resources) = instr.compute_latency_uops_resources(&reg);
        assert_eq!(latency, 5);
        assert_eq!(num_uops, 3);
        assert_eq!(resources.len(), 2);
    }

    #[test]
    fn is_invalid_on_checks_isa_whitelist() {
        let instr = Instruction::new("VFOO", vec![], vec![], Some("AVX512F_512".to_string()));
        assert!(instr.is_invalid_on(|tag| tag != Some("AVX512F_512")));
        assert!(!instr.is_invalid_on(|_| true));

        let no_isa = Instruction::new("MOV8rr", vec![], vec![], None);
        assert!(!no_isa.is_invalid_on(|_| false));
    }
}
