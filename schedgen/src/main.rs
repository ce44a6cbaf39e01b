/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use x86_schedgen::parse::parse_verification_info;
use x86_schedgen::read::ReadRegistry;
use x86_schedgen::reducer::reduce_resources;
use x86_schedgen::resource::{count_eq, PortSet};
use x86_schedgen::target::{CpuProfile, TargetCpu};
use x86_schedgen::{engine, parse};

/// Per-CPU x86 instruction scheduling model generator.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Target CPU to generate a scheduling model for.
    #[arg(long, value_enum)]
    target_cpu: TargetCpu,

    /// Instruction-info JSON.
    #[arg(long)]
    input: PathBuf,

    /// Output file, or `-` for standard out.
    #[arg(long, default_value = "-")]
    output: String,

    /// Verification JSON; logs a consistency
    /// report as warnings without affecting emission.
    #[arg(long)]
    verify: Option<PathBuf>,

    /// Static prologue template prepended verbatim to the emitted fragment.
    #[arg(long)]
    template: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let profile = CpuProfile::for_cpu(cli.target_cpu);

    let instruction_json = fs::read_to_string(&cli.input).with_context(|| format!("reading input JSON `{}`", cli.input.display()))?;
    let prologue = match &cli.template {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading template `{}`", path.display()))?,
        None => String::new(),
    };

    let output = x86_schedgen::run(&profile, &instruction_json, &prologue).context("scheduling model generation failed")?;

    if let Some(verify_path) = &cli.verify {
        let verify_json = fs::read_to_string(verify_path).with_context(|| format!("reading verification JSON `{}`", verify_path.display()))?;
        run_verification_report(&profile, &instruction_json, &verify_json)?;
    }

    if cli.output == "-" {
        print!("{output}");
    } else {
        fs::write(&cli.output, &output).with_context(|| format!("writing output `{}`", cli.output))?;
    }

    Ok(())
}

/// Supplemented feature (SPEC_FULL.md #1): cross-checks the independently
/// sourced verification JSON against the model this run just generated,
/// logging mismatches as warnings. Never blocks emission.
fn run_verification_report(profile: &CpuProfile, instruction_json: &str, verify_json: &str) -> Result<()> {
    let verified = parse_verification_info(verify_json).context("parsing verification JSON")?;

    let mut write_registry = x86_schedgen::write::WriteRegistry::new();
    let mut read_registry = ReadRegistry::new();
    profile.seed_writes(&mut write_registry).context("seeding target profile")?;
    let mut instructions = parse::parse_instruction_info(instruction_json, profile, &mut write_registry, &mut read_registry)
        .context("parsing instruction-info JSON")?;
    engine::run_pipeline(profile, &mut write_registry, &mut instructions).context("running inference pipeline")?;

    for instr in &instructions {
        let Some(verified_instr) = verified.get(instr.opcode()) else {
            continue;
        };

        let nodes: Vec<(PortSet, i64)> = match verified_instr
            .write_res
            .iter()
            .map(|(name, cycles)| profile.decode_port_name(name).map(|ps| (ps, *cycles as i64)))
            .collect::<Result<_, _>>()
        {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(opcode = instr.opcode(), error = %e, "skipping unparseable WriteRes entry in verification data");
                continue;
            }
        };
        let reduced = match reduce_resources(nodes) {
            Ok(reduced) => reduced,
            Err(e) => {
                tracing::warn!(opcode = instr.opcode(), error = %e, "skipping unreducible WriteRes entry in verification data");
                continue;
            }
        };
        let expected_resources: Vec<PortSet> = reduced
            .into_iter()
            .flat_map(|(ps, cycles)| std::iter::repeat(ps).take(cycles.max(0) as usize))
            .collect();

        let (latency, num_uops, resources) = instr.compute_latency_uops_resources(&write_registry);
        if latency != verified_instr.latency {
            tracing::warn!(
                opcode = instr.opcode(),
                generated = latency,
                verified = verified_instr.latency,
                "latency mismatch against verification data"
            );
        }
        if num_uops != verified_instr.num_uops {
            tracing::warn!(
                opcode = instr.opcode(),
                generated = num_uops,
                verified = verified_instr.num_uops,
                "num_uops mismatch against verification data"
            );
        }
        if !count_eq(resources.as_slice(), expected_resources.as_slice()) {
            tracing::warn!(opcode = instr.opcode(), "resource-set mismatch against verification data");
        }
    }

    Ok(())
}
