/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pass 2: per-class resource inference.

use indexmap::IndexMap;

use crate::error::{DataError, InvariantViolation, PipelineError};
use crate::instruction::Instruction;
use crate::resource::{contains, remove, PortSet};
use crate::write::{Resources, WriteId, WriteRegistry};

type CandidateKey = (i64, i64, Vec<PortSet>);

pub fn run(write_registry: &mut WriteRegistry, instructions: &[Instruction]) -> Result<(), PipelineError> {
    let mut buckets: IndexMap<WriteId, Vec<usize>> = IndexMap::new();
    for (idx, instr) in instructions.iter().enumerate() {
        for &write_id in instr.writes() {
            buckets.entry(write_id).or_default().push(idx);
        }
    }

    for (write_id, instr_indices) in buckets {
        if write_registry.is_complete(write_id) {
            continue;
        }

        let mut tally: IndexMap<CandidateKey, usize> = IndexMap::new();
        for &idx in &instr_indices {
            let instr = &instructions[idx];
            let measured = match instr.measured() {
                Some(m) => m,
                None => continue,
            };

            let mut num_uops = measured.num_uops;
            let mut ports = measured.uops.clone();

            for &other in instr.writes() {
                if other == write_id {
                    continue;
                }
                let other_node = write_registry.write(other);
                let other_complete = write_registry.is_complete(other);
                if !other_complete || !other_node.aux() {
                    return Err(DataError::UnderdeterminedWrites {
                        opcode: instr.opcode().to_string(),
                        first: write_registry.write(write_id).name().to_string(),
                        second: other_node.name().to_string(),
                    }
                    .into());
                }
                let payload = if other_node.is_sequence() {
                    write_registry.derive_sequence_resources(other)
                } else {
                    other_node.payload().expect("complete write has payload").clone()
                };
                num_uops -= payload.num_uops;
                if !contains(ports.as_slice(), payload.resources.as_slice()) {
                    return Err(DataError::PortOutsideTopology {
                        opcode: instr.opcode().to_string(),
                        ports: format!("{:?}", payload.resources),
                    }
                    .into());
                }
                ports = remove(ports.as_slice(), payload.resources.as_slice());
            }

            ports.sort();
            let key = (measured.latency, num_uops, ports);
            *tally.entry(key).or_insert(0) += 1;
        }

        let mut ranked: Vec<(CandidateKey, usize)> = tally.into_iter().collect();
        ranked.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

        let (dr_latency, dr_num_uops, mut dr_ports) = ranked
            .into_iter()
            .find(|((latency, num_uops, _), _)| *latency >= 0 && *num_uops >= 0)
            .map(|(key, _)| key)
            .ok_or_else(|| InvariantViolation::NoInferenceCandidate {
                name: write_registry.write(write_id).name().to_string(),
            })?;

        let node = write_registry.write(write_id);
        if node.is_sequence() {
            let mut dr_latency = dr_latency;
            let mut dr_num_uops = dr_num_uops;
            let leaves = write_registry.expand(write_id);
            let mut incomplete_leaf = None;
            for leaf in leaves {
                if write_registry.is_complete(leaf) {
                    let payload = write_registry.write(leaf).payload().expect("complete leaf has payload").clone();
                    dr_latency -= payload.latency;
                    dr_num_uops -= payload.num_uops;
                    dr_ports = remove(&dr_ports, &payload.resources);
                } else {
                    assert!(incomplete_leaf.is_none(), "multiple incomplete leaves in one WriteSequence");
                    incomplete_leaf = Some(leaf);
                }
            }
            let target_leaf = incomplete_leaf.expect("fully-complete sequence should already be skipped");
            dr_ports.sort();
            let cycles = vec![1; dr_ports.len()];
            write_registry
                .write_mut(target_leaf)
                .set_payload(Resources::new(dr_ports, cycles, dr_latency, dr_num_uops));
        } else {
            let cycles = vec![1; dr_ports.len()];
            write_registry
                .write_mut(write_id)
                .set_payload(Resources::new(dr_ports, cycles, dr_latency, dr_num_uops));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Measured;
    use crate::resource::Port;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn infers_resources_for_sole_unknown_write() {
        let mut reg = WriteRegistry::new();
        let unknown = reg.register_base("W_unknown", false).unwrap();

        let mut instr = Instruction::new("Y", vec![], vec![unknown], None);
        instr.set_measured(Measured {
            latency: 3,
            throughput: None,
            uops: vec![ps(&[0, 1]), ps(&[5])],
            num_uops: 2,
        });

        run(&mut reg, &[instr]).unwrap();

        let payload = reg.write(unknown).payload().unwrap();
        assert_eq!(payload.latency, 3);
        assert_eq!(payload.num_uops, 2);
        assert_eq!(payload.resources.len(), 2);
    }

    #[test]
    fn subtracts_aux_contribution_before_inferring() {
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

        run(&mut reg, &[instr]).unwrap();

        let payload = reg.write(unknown).payload().unwrap();
        assert_eq!(payload.num_uops, 1);
    }

    #[test]
    fn two_incomplete_non_aux_writes_is_an_error() {
        let mut reg = WriteRegistry::new();
        let a = reg.register_base("WriteA", false).unwrap();
        let b = reg.register_base("WriteB", false).unwrap();

        let mut instr = Instruction::new("Y", vec![], vec![a, b], None);
        instr.set_measured(Measured {
            latency: 1,
            throughput: None,
            uops: vec![],
            num_uops: 1,
        });

        let result = run(&mut reg, &[instr]);
        assert!(matches!(result, Err(PipelineError::Data(DataError::UnderdeterminedWrites { .. }))));
    }
}
