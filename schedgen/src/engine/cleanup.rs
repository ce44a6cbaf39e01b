/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pass 1: wrong-write cleanup.

use crate::error::PipelineError;
use crate::instruction::Instruction;
use crate::resource::{contains, PortSet};
use crate::write::WriteRegistry;

pub fn run(write_registry: &mut WriteRegistry, instructions: &mut [Instruction]) -> Result<(), PipelineError> {
    for instr in instructions.iter_mut() {
        let measured = match instr.measured() {
            Some(m) => m.clone(),
            None => continue,
        };

        let mut wrong_aux = Vec::new();
        let mut wrong_sequences = Vec::new();

        for &write_id in instr.writes() {
            let node = write_registry.write(write_id);
            if node.aux() {
                debug_assert!(write_registry.is_complete(write_id), "aux write must always be complete (I4)");
                let payload = node.payload().expect("aux write without payload");
                let wrong = payload.latency > measured.latency
                    || payload.num_uops > measured.num_uops
                    || !contains(measured.uops.as_slice(), payload.resources.as_slice());
                if wrong {
                    wrong_aux.push(write_id);
                }
            } else if node.is_sequence() {
                let leaves = write_registry.expand(write_id);
                let mut latency = 0i64;
                let mut num_uops = 0i64;
                let mut resources: Vec<PortSet> = Vec::new();
                for leaf in leaves {
                    if let Some(payload) = write_registry.write(leaf).payload() {
                        latency += payload.latency;
                        num_uops += payload.num_uops;
                        resources.extend(payload.resources.iter().cloned());
                    }
                }
                let wrong = latency > measured.latency
                    || num_uops > measured.num_uops
                    || !contains(measured.uops.as_slice(), resources.as_slice());
                if wrong {
                    wrong_sequences.push(write_id);
                }
            }
        }

        if !wrong_aux.is_empty() {
            instr.set_use_override(true);
            for write_id in wrong_aux {
                tracing::debug!(opcode = instr.opcode(), write = write_registry.write(write_id).name(), "removing wrong aux write");
                instr.remove_write(write_id);
            }
        }

        if !wrong_sequences.is_empty() {
            instr.set_use_override(true);
            let zero = write_registry
                .get("WriteZero")
                .expect("WriteZero must be seeded before Pass 1 runs");
            for write_id in wrong_sequences {
                tracing::debug!(
                    opcode = instr.opcode(),
                    write = write_registry.write(write_id).name(),
                    "replacing wrong write sequence with WriteZero"
                );
                instr.replace_or_add_write(Some(write_id), zero, true);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Measured;
    use crate::resource::Port;
    use crate::write::Resources;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn wrong_aux_write_is_stripped_and_forces_override() {
        let mut reg = WriteRegistry::new();
        reg.register_seeded("WriteZero", false, Resources::new(vec![], vec![], 1, 1))
            .unwrap();
        let zero = reg.get("WriteZero").unwrap();
        let rmw = reg
            .register_seeded("WriteRMW", true, Resources::new(vec![ps(&[0])], vec![1], 1, 3))
            .unwrap();

        let mut instr = Instruction::new("X", vec![], vec![zero, rmw], None);
        instr.set_measured(Measured {
            latency: 1,
            throughput: None,
            uops: vec![],
            num_uops: 1,
        });

        let mut instrs = vec![instr];
        run(&mut reg, &mut instrs).unwrap();

        assert!(instrs[0].use_override());
        assert_eq!(instrs[0].writes(), &[zero]);
    }

    #[test]
    fn exact_aux_write_is_kept() {
        let mut reg = WriteRegistry::new();
        let unknown = reg.register_base("W_unknown", false).unwrap();
        let imul = reg
            .register_seeded("WriteIMulH", true, Resources::new(vec![], vec![], 3, 1))
            .unwrap();

        let mut instr = Instruction::new("Y", vec![], vec![unknown, imul], None);
        instr.set_measured(Measured {
            latency: 3,
            throughput: None,
            uops: vec![ps(&[0, 1]), ps(&[5])],
            num_uops: 2,
        });

        let mut instrs = vec![instr];
        run(&mut reg, &mut instrs).unwrap();

        assert!(!instrs[0].use_override());
        assert_eq!(instrs[0].writes(), &[unknown, imul]);
    }
}
