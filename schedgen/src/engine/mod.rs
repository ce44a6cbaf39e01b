/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The five-pass inference engine: wrong-write cleanup, per-class
//! resource inference, override synthesis, validation, supportedness tagging.
//! Ordering is load-bearing — each pass assumes the invariants the one before
//! it established.

mod cleanup;
mod infer;
mod override_synth;
mod supported;
mod validate;

use tracing::instrument;

use crate::error::PipelineError;
use crate::instruction::Instruction;
use crate::target::CpuProfile;
use crate::write::WriteRegistry;

#[instrument(skip_all, fields(cpu = profile.short_name))]
pub fn run_pipeline(
    profile: &CpuProfile,
    write_registry: &mut WriteRegistry,
    instructions: &mut Vec<Instruction>,
) -> Result<(), PipelineError> {
    tracing::info!(instructions = instructions.len(), "running cleanup pass");
    cleanup::run(write_registry, instructions)?;

    tracing::info!("running per-class resource inference");
    infer::run(write_registry, instructions)?;

    tracing::info!("running override synthesis");
    override_synth::run(profile, write_registry, instructions)?;

    tracing::info!("validating inferred model against measured data");
    validate::run(write_registry, instructions)?;

    tracing::info!("tagging write supportedness");
    supported::run(profile, write_registry, instructions);

    Ok(())
}
