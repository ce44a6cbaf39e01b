/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error types for the scheduling-model pipeline.
//!
//! Two layers: a `thiserror` enum per error-kind group carrying the
//! offending opcode/write name, and a top-level [`PipelineError`] wrapping
//! all of them plus I/O and JSON failures. Nothing here is recoverable —
//! every variant aborts the run; no partial output is ever produced.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown target CPU `{0}`")]
    UnknownTargetCpu(String),
    #[error("unknown SchedWrite type `{found}` on opcode `{opcode}`")]
    UnknownWriteType { opcode: String, found: String },
    #[error("unknown SchedRead type `{found}` on opcode `{opcode}`")]
    UnknownReadType { opcode: String, found: String },
    #[error("WriteSequence `{name}` on opcode `{opcode}` is missing its `{field}` field")]
    MalformedSequence {
        opcode: String,
        name: String,
        field: &'static str,
    },
    #[error("malformed port name `{name}`")]
    MalformedPortName { name: String },
    #[error("seed resource conflict: {detail}")]
    SeedConflict { detail: String },
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("opcode `{opcode}` measures a uop on port set {ports} which is outside the CPU's port topology")]
    PortOutsideTopology { opcode: String, ports: String },
    #[error(
        "opcode `{opcode}` references two incomplete non-aux writes (`{first}`, `{second}`); \
         inference is underdetermined"
    )]
    UnderdeterminedWrites {
        opcode: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("SchedWrite `{name}` has no candidate with non-negative (latency, num_uops) across its users")]
    NoInferenceCandidate { name: String },
    #[error("opcode `{opcode}`: override synthesis produced num_uops = {num_uops} < 0")]
    NegativeUops { opcode: String, num_uops: i64 },
    #[error(
        "opcode `{opcode}`: validation mismatch after inference \
         (expected latency={expected_latency} uops={expected_uops}, got latency={actual_latency} uops={actual_uops})"
    )]
    ValidationMismatch {
        opcode: String,
        expected_latency: i64,
        expected_uops: i64,
        actual_latency: i64,
        actual_uops: i64,
    },
    #[error("seed write `{name}` references port {port} outside the CPU's topology")]
    SeedPortOutsideTopology { name: String, port: i8 },
    #[error("SchedWrite name `{0}` is already registered")]
    DuplicateWriteName(String),
    #[error("regex reduction for opcode `{opcode}` matched {hits} output patterns, expected exactly 1")]
    RegexValidationFailed { opcode: String, hits: usize },
    #[error("resource reduction tried to subtract from port set {ports}, whose cycle count is already non-positive")]
    ReducerCyclesUnderflow { ports: String },
}

/// Top-level error returned from the engine's public entry point.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    #[error("failed to read input `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON in `{path}`: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
