/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! x86-schedgen – per-CPU instruction scheduling model generator.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── resource       – execution-port algebra (Ports, PortSets, multiset ops)
//! ├── write          – SchedWrite/SchedWriteRes registry
//! ├── read           – SchedRead registry
//! ├── target         – per-CPU profiles, port-name codec, seed writes
//! ├── instruction    – per-instruction record
//! ├── parse          – input JSON ingestion
//! ├── reducer        – resource-set inclusion reducer
//! ├── regex_reducer  – opcode-set regex compression
//! ├── engine         – the five-pass inference pipeline
//! ├── emit           – target-description fragment emitter
//! └── error          – pipeline error types
//! ```

pub mod emit;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod parse;
pub mod read;
pub mod reducer;
pub mod regex_reducer;
pub mod resource;
pub mod target;
pub mod write;

use error::PipelineError;
use read::ReadRegistry;
use target::CpuProfile;
use write::WriteRegistry;

/// Run the full pipeline for one CPU against one instruction-info JSON
/// document: seed the write registry, parse instructions, run the five
/// inference passes, and emit the resulting target-description fragment.
pub fn run(profile: &CpuProfile, instruction_json: &str, prologue: &str) -> Result<String, PipelineError> {
    let mut write_registry = WriteRegistry::new();
    let mut read_registry = ReadRegistry::new();
    profile.seed_writes(&mut write_registry)?;

    let mut instructions = parse::parse_instruction_info(instruction_json, profile, &mut write_registry, &mut read_registry)?;

    engine::run_pipeline(profile, &mut write_registry, &mut instructions)?;

    Ok(emit::emit(profile, &write_registry, &read_registry, &instructions, prologue))
}
