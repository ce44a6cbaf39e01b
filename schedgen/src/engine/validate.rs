/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pass 4: validation. Every measured instruction's declared
//! writes must re-derive exactly the measured (latency, num_uops, resources)
//! once inference has finished — a mismatch here means passes 1-3 left the
//! model in an inconsistent state and the run is aborted.

use crate::error::{InvariantViolation, PipelineError};
use crate::instruction::Instruction;
use crate::resource::count_eq;
use crate::write::WriteRegistry;

pub fn run(write_registry: &WriteRegistry, instructions: &[Instruction]) -> Result<(), PipelineError> {
    for instr in instructions {
        let measured = match instr.measured() {
            Some(m) => m,
            None => continue,
        };

        let (latency, num_uops, resources) = instr.compute_latency_uops_resources(write_registry);
        if latency != measured.latency || num_uops != measured.num_uops || !count_eq(resources.as_slice(), measured.uops.as_slice()) {
            return Err(InvariantViolation::ValidationMismatch {
                opcode: instr.opcode().to_string(),
                expected_latency: measured.latency,
                expected_uops: measured.num_uops,
                actual_latency: latency,
                actual_uops: num_uops,
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Measured;
    use crate::resource::{Port, PortSet};
    use crate::write::Resources;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn matching_instruction_passes() {
        let mut reg = WriteRegistry::new();
        let w = reg
            .register_seeded("WriteFoo", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();
        let mut instr = Instruction::new("X", vec![], vec![w], None);
        instr.set_measured(Measured {
            latency: 1,
            throughput: None,
            uops: vec![ps(&[0])],
            num_uops: 1,
        });
        run(&reg, &[instr]).unwrap();
    }

    #[test]
    fn mismatched_instruction_is_rejected() {
        let mut reg = WriteRegistry::new();
        let w = reg
            .register_seeded("WriteFoo", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();
        let mut instr = Instruction::new("X", vec![], vec![w], None);
        instr.set_measured(Measured {
            latency: 2,
            throughput: None,
            uops: vec![ps(&[0])],
            num_uops: 1,
        });
        let result = run(&reg, &[instr]);
        assert!(matches!(result, Err(PipelineError::Invariant(InvariantViolation::ValidationMismatch { .. }))));
    }
}
