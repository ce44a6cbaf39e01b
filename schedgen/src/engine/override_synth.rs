/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pass 3: override synthesis.
//!
//! For every measured instruction, subtract its aux writes' contribution from
//! the measured (num_uops, resources) — never latency, since an aux write is
//! never the latency-dominating path — and, if what remains doesn't already
//! match the instruction's sole non-aux write exactly, synthesise a
//! `SchedWriteRes` override and swap it in.

use crate::error::{InvariantViolation, PipelineError};
use crate::instruction::Instruction;
use crate::resource::{contains, count_eq, remove};
use crate::target::CpuProfile;
use crate::write::{Resources, WriteRegistry};

pub fn run(profile: &CpuProfile, write_registry: &mut WriteRegistry, instructions: &mut [Instruction]) -> Result<(), PipelineError> {
    for instr in instructions.iter_mut() {
        let measured = match instr.measured() {
            Some(m) => m.clone(),
            None => continue,
        };

        let mut old_schedwrite = None;
        let mut num_uops = measured.num_uops;
        let mut ports = measured.uops.clone();

        for &write_id in instr.writes() {
            let node = write_registry.write(write_id);
            if node.aux() {
                let payload = if node.is_sequence() {
                    write_registry.derive_sequence_resources(write_id)
                } else {
                    node.payload().expect("aux write must be complete (I4)").clone()
                };
                debug_assert!(
                    measured.latency >= payload.latency,
                    "aux write latency exceeds measured latency on `{}`",
                    instr.opcode()
                );
                num_uops -= payload.num_uops;
                if contains(ports.as_slice(), payload.resources.as_slice()) {
                    ports = remove(ports.as_slice(), payload.resources.as_slice());
                }
            } else {
                assert!(old_schedwrite.is_none(), "instruction `{}` has more than one non-aux write", instr.opcode());
                old_schedwrite = Some(write_id);
            }
        }

        let Some(old_id) = old_schedwrite else {
            continue;
        };

        let old_node = write_registry.write(old_id);
        let exact_match = write_registry.is_complete(old_id) && {
            let payload = if old_node.is_sequence() {
                write_registry.derive_sequence_resources(old_id)
            } else {
                old_node.payload().expect("checked complete above").clone()
            };
            payload.latency == measured.latency && payload.num_uops == num_uops && count_eq(payload.resources.as_slice(), ports.as_slice())
        };
        if exact_match {
            continue;
        }

        if num_uops < 0 {
            return Err(InvariantViolation::NegativeUops {
                opcode: instr.opcode().to_string(),
                num_uops,
            }
            .into());
        }

        ports.sort();
        let cycles = vec![1; ports.len()];
        let resources = Resources::new(ports, cycles, measured.latency, num_uops);
        let new_id = write_registry.intern_write_res(profile.short_name, resources);
        instr.replace_or_add_write(Some(old_id), new_id, false);
        instr.set_use_override(true);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Measured;
    use crate::resource::{Port, PortSet};
    use crate::target::TargetCpu;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn synthesizes_override_when_mismatch() {
        let profile = CpuProfile::for_cpu(TargetCpu::SkylakeServer);
        let mut reg = WriteRegistry::new();
        let old = reg
            .register_seeded("WriteALU", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();

        let mut instr = Instruction::new("X", vec![], vec![old], None);
        instr.set_measured(Measured {
            latency: 2,
            throughput: None,
            uops: vec![ps(&[0]), ps(&[1])],
            num_uops: 2,
        });

        let mut instrs = vec![instr];
        run(&profile, &mut reg, &mut instrs).unwrap();

        assert!(instrs[0].use_override());
        assert_ne!(instrs[0].writes(), &[old]);
        let new_id = instrs[0].writes()[0];
        let payload = reg.write(new_id).payload().unwrap();
        assert_eq!(payload.latency, 2);
        assert_eq!(payload.num_uops, 2);
    }

    #[test]
    fn exact_match_is_left_alone() {
        let profile = CpuProfile::for_cpu(TargetCpu::SkylakeServer);
        let mut reg = WriteRegistry::new();
        let old = reg
            .register_seeded("WriteALU", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();

        let mut instr = Instruction::new("X", vec![], vec![old], None);
        instr.set_measured(Measured {
            latency: 1,
            throughput: None,
            uops: vec![ps(&[0])],
            num_uops: 1,
        });

        let mut instrs = vec![instr];
        run(&profile, &mut reg, &mut instrs).unwrap();

        assert!(!instrs[0].use_override());
        assert_eq!(instrs[0].writes(), &[old]);
    }

    #[test]
    fn aux_contribution_is_subtracted_before_comparison() {
        let profile = CpuProfile::for_cpu(TargetCpu::SkylakeServer);
        let mut reg = WriteRegistry::new();
        let old = reg
            .register_seeded("WriteALU", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();
        let aux = reg
            .register_seeded("WriteIMulH", true, Resources::new(vec![ps(&[1])], vec![1], 3, 1))
            .unwrap();

        let mut instr = Instruction::new("X", vec![], vec![old, aux], None);
        instr.set_measured(Measured {
            latency: 3,
            throughput: None,
            uops: vec![ps(&[0]), ps(&[1])],
            num_uops: 2,
        });

        let mut instrs = vec![instr];
        run(&profile, &mut reg, &mut instrs).unwrap();

        assert!(instrs[0].use_override());
    }
}
