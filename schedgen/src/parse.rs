/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Input JSON ingestion: instruction-info and the supplemented
//! verification-info side channel.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{ConfigError, PipelineError};
use crate::instruction::{Instruction, Measured};
use crate::read::ReadRegistry;
use crate::resource::{Port, PortSet};
use crate::target::CpuProfile;
use crate::write::{WriteId, WriteRegistry};

#[derive(Debug, Deserialize)]
struct RawSchedRead {
    #[serde(rename = "Type")]
    ty: String,
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawSchedWrite {
    #[serde(rename = "Type")]
    ty: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Writes", default)]
    writes: Option<Vec<RawSchedWrite>>,
    #[serde(rename = "Repeat", default)]
    repeat: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct RawXedInfo {
    #[serde(rename = "IsaSet", default)]
    isa_set: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInstrInfo {
    #[serde(rename = "SchedReads", default)]
    sched_reads: Vec<RawSchedRead>,
    #[serde(rename = "SchedWrites", default)]
    sched_writes: Vec<RawSchedWrite>,
    #[serde(rename = "XedInfo", default)]
    xed_info: Option<RawXedInfo>,
    #[serde(rename = "Port", default)]
    port: Option<Vec<(u32, Vec<i8>)>>,
    #[serde(rename = "Latency", default)]
    latency: Option<i64>,
    #[serde(rename = "Tp", default)]
    tp: Option<f64>,
    #[serde(rename = "Uops", default)]
    uops: Option<i64>,
}

type RawInput = IndexMap<String, RawInstrInfo>;

/// Parse the instruction-info JSON into a read registry, a write
/// registry (already seeded by `profile.seed_writes`), and the instruction
/// list in source-JSON order, which downstream passes rely on for
/// deterministic output.
pub fn parse_instruction_info(
    json: &str,
    profile: &CpuProfile,
    write_registry: &mut WriteRegistry,
    read_registry: &mut ReadRegistry,
) -> Result<Vec<Instruction>, PipelineError> {
    let raw: RawInput = serde_json::from_str(json).map_err(|source| PipelineError::Json {
        path: "<input>".to_string(),
        source,
    })?;

    let mut instructions = Vec::with_capacity(raw.len());
    for (opcode, info) in raw {
        let reads = info
            .sched_reads
            .iter()
            .map(|r| intern_read(&opcode, r, read_registry))
            .collect::<Result<Vec<_>, _>>()?;
        let writes = info
            .sched_writes
            .iter()
            .map(|w| intern_write(&opcode, w, write_registry))
            .collect::<Result<Vec<_>, _>>()?;
        let isa_set = info.xed_info.as_ref().and_then(|x| x.isa_set.clone());

        let mut instr = Instruction::new(opcode, reads, writes, isa_set);

        if info.latency.is_some() || info.port.is_some() || info.uops.is_some() || info.tp.is_some() {
            let latency = info.latency.unwrap_or(profile.max_latency);
            let uops = expand_ports(info.port.as_deref().unwrap_or(&[]));
            let num_uops = info
                .uops
                .unwrap_or_else(|| info.port.as_deref().unwrap_or(&[]).iter().map(|(c, _)| *c as i64).sum());
            instr.set_measured(Measured {
                latency,
                throughput: info.tp,
                uops,
                num_uops,
            });
        }

        instructions.push(instr);
    }
    Ok(instructions)
}

fn expand_ports(port: &[(u32, Vec<i8>)]) -> Vec<PortSet> {
    let mut uops = Vec::new();
    for (count, port_numbers) in port {
        let set = PortSet::new(port_numbers.iter().map(|&n| Port::new(n)).collect());
        for _ in 0..*count {
            uops.push(set.clone());
        }
    }
    uops
}

fn intern_read(opcode: &str, raw: &RawSchedRead, read_registry: &mut ReadRegistry) -> Result<crate::read::ReadId, PipelineError> {
    if raw.ty != "SchedRead" {
        return Err(ConfigError::UnknownReadType {
            opcode: opcode.to_string(),
            found: raw.ty.clone(),
        }
        .into());
    }
    Ok(read_registry.intern(raw.name.clone()))
}

fn intern_write(opcode: &str, raw: &RawSchedWrite, write_registry: &mut WriteRegistry) -> Result<WriteId, PipelineError> {
    if let Some(existing) = write_registry.get(&raw.name) {
        if raw.ty == "WriteSequence" {
            return intern_sequence(opcode, raw, write_registry);
        }
        return Ok(existing);
    }

    match raw.ty.as_str() {
        "SchedWrite" | "X86FoldableSchedWrite" => write_registry
            .register_base(raw.name.clone(), false)
            .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() }.into()),
        "WriteSequence" => intern_sequence(opcode, raw, write_registry),
        other => Err(ConfigError::UnknownWriteType {
            opcode: opcode.to_string(),
            found: other.to_string(),
        }
        .into()),
    }
}

fn intern_sequence(opcode: &str, raw: &RawSchedWrite, write_registry: &mut WriteRegistry) -> Result<WriteId, PipelineError> {
    let sub_writes = raw.writes.as_ref().ok_or_else(|| ConfigError::MalformedSequence {
        opcode: opcode.to_string(),
        name: raw.name.clone(),
        field: "Writes",
    })?;
    let repeat = raw.repeat.ok_or_else(|| ConfigError::MalformedSequence {
        opcode: opcode.to_string(),
        name: raw.name.clone(),
        field: "Repeat",
    })?;
    let ids = sub_writes
        .iter()
        .map(|w| intern_write(opcode, w, write_registry))
        .collect::<Result<Vec<_>, _>>()?;
    write_registry
        .register_sequence(raw.name.clone(), ids, repeat)
        .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() }.into())
}

/// Supplemented feature (SPEC_FULL.md §1): a standalone parser for the
/// verification JSON's per-opcode `WriteRes` maps, independent of the main
/// inference pipeline.
#[derive(Debug, Deserialize)]
pub struct RawVerifiedInstr {
    #[serde(rename = "WriteRes", default)]
    pub write_res: IndexMap<String, u32>,
    #[serde(rename = "Latency")]
    pub latency: i64,
    #[serde(rename = "NumUops")]
    pub num_uops: i64,
    #[serde(rename = "RThroughput", default)]
    pub rthroughput: Option<f64>,
}

pub type RawVerificationInfo = IndexMap<String, RawVerifiedInstr>;

pub fn parse_verification_info(json: &str) -> Result<RawVerificationInfo, PipelineError> {
    serde_json::from_str(json).map_err(|source| PipelineError::Json {
        path: "<verify>".to_string(),
        source,
    })
}
