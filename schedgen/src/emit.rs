/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The Emitter: serialises writes, synthesised overrides, and
//! instruction-to-override bindings into the target-description grammar.
//!
//! The static template prologue is out of scope for this crate and is
//! passed in verbatim by the caller instead of being read from a file here.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::instruction::Instruction;
use crate::read::{ReadId, ReadRegistry};
use crate::regex_reducer;
use crate::resource::PortSet;
use crate::target::CpuProfile;
use crate::write::{SchedWrite, WriteId, WriteRegistry};

/// Collapse a (possibly duplicated) resource list into unique port-sets with
/// their multiplicities, in first-occurrence order. Mirrors
/// `collections.Counter(resources).items()` in the original emitter — the
/// per-uop resource list that inference assigns (one entry per uop, unit
/// cycles) is only ever collapsed at *emission* time, not when it's recorded.
fn collapse(resources: &[PortSet]) -> Vec<(PortSet, u32)> {
    let mut counts: IndexMap<PortSet, u32> = IndexMap::new();
    for r in resources {
        *counts.entry(r.clone()).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

fn exe_ports_string(profile: &CpuProfile, collapsed: &[(PortSet, u32)]) -> String {
    let names: Vec<String> = collapsed.iter().map(|(p, _)| profile.encode_port_name(p)).collect();
    format!("[{}]", names.join(", "))
}

fn cycles_vec(collapsed: &[(PortSet, u32)]) -> Vec<u32> {
    collapsed.iter().map(|(_, c)| *c).collect()
}

/// "Default" cycles means every collapsed entry has multiplicity 1, not that
/// the (always all-1, per-uop) stored `resource_cycles` field happens to be
/// the singleton `[1]`.
fn is_default_cycles(collapsed: &[(PortSet, u32)]) -> bool {
    collapsed.iter().all(|(_, c)| *c == 1)
}

fn emit_write_res_unsupported(out: &mut String, write: &SchedWrite) {
    let _ = writeln!(out, "defm : X86WriteResUnsupported<{}>;", write.name());
}

fn emit_write_res_pair_unsupported(out: &mut String, write: &SchedWrite) {
    let _ = writeln!(out, "defm : X86WriteResPairUnsupported<{}>;", write.name());
}

fn emit_write_res(out: &mut String, profile: &CpuProfile, write: &SchedWrite) {
    let payload = write.payload().expect("emit_write_res: incomplete write");
    let collapsed = collapse(&payload.resources);
    let exe_ports = exe_ports_string(profile, &collapsed);
    let latstr = profile.lat2str(payload.latency);

    if payload.num_uops != 1 {
        let _ = writeln!(
            out,
            "defm : X86WriteRes<{}, {}, {}, {:?}, {}>;",
            write.name(),
            exe_ports,
            latstr,
            cycles_vec(&collapsed),
            payload.num_uops
        );
        return;
    }

    let _ = write!(out, "def : WriteRes<{}, {}>", write.name(), exe_ports);
    let mut tailer = String::new();
    if !is_default_cycles(&collapsed) {
        let _ = writeln!(tailer, "  let ResourceCycles = {:?};", cycles_vec(&collapsed));
    }
    if payload.latency != 1 {
        let _ = writeln!(tailer, "  let Latency = {latstr};");
    }
    if tailer.is_empty() {
        out.push_str(";\n");
    } else {
        out.push_str(" {\n");
        out.push_str(&tailer);
        out.push_str("}\n");
    }
}

fn emit_schedwriteres(out: &mut String, profile: &CpuProfile, write: &SchedWrite) {
    let payload = write.payload().expect("emit_schedwriteres: incomplete SchedWriteRes");
    let collapsed = collapse(&payload.resources);
    let exe_ports = exe_ports_string(profile, &collapsed);
    let latstr = profile.lat2str(payload.latency);

    let _ = write!(out, "def {} : SchedWriteRes<{}>", write.name(), exe_ports);
    let mut tailer = String::new();
    if !is_default_cycles(&collapsed) {
        let _ = writeln!(tailer, "  let ResourceCycles = {:?};", cycles_vec(&collapsed));
    }
    if payload.latency != 1 {
        let _ = writeln!(tailer, "  let Latency = {latstr};");
    }
    if payload.num_uops != 1 {
        let _ = writeln!(tailer, "  let NumMicroOps = {};", payload.num_uops);
    }
    if tailer.is_empty() {
        out.push_str(";\n");
    } else {
        out.push_str(" {\n");
        out.push_str(&tailer);
        out.push_str("}\n");
    }
}

/// Attempt a paired register/memory-form declaration. Returns `false` (and
/// writes nothing) if the pair doesn't fit the pattern — caller falls back to
/// emitting each half singly.
fn try_emit_write_res_pair(out: &mut String, profile: &CpuProfile, write_reg: &SchedWrite, write_mem: &SchedWrite) -> bool {
    let Some(reg_payload) = write_reg.payload() else { return false };
    let Some(mem_payload) = write_mem.payload() else { return false };

    let ports_diff = crate::resource::diff(reg_payload.resources.as_slice(), mem_payload.resources.as_slice());
    if ports_diff.is_empty() || ports_diff.iter().any(|p| *p != profile.load_ports) {
        return false;
    }

    let num_loads = ports_diff.len() as i64;
    if mem_payload.num_uops - reg_payload.num_uops != num_loads {
        return false;
    }

    let collapsed = collapse(&reg_payload.resources);
    let exe_ports = exe_ports_string(profile, &collapsed);
    let latstr = profile.lat2str(reg_payload.latency);
    let load_lat = mem_payload.latency - reg_payload.latency;
    if load_lat < 0 {
        out.push_str("// Warning: negative load latency.\n");
    }

    let _ = write!(
        out,
        "defm : {}WriteResPair<{}, {}, {}",
        profile.short_name,
        write_reg.name(),
        exe_ports,
        latstr
    );

    let mut tailer = String::new();
    let mut must_present = false;
    if num_loads != 1 {
        tailer = format!(", {num_loads}{tailer}");
        must_present = true;
    }
    if must_present || load_lat != profile.load_latency {
        tailer = format!(", {load_lat}{tailer}");
        must_present = true;
    }
    if must_present || reg_payload.num_uops != 1 {
        tailer = format!(", {}{tailer}", reg_payload.num_uops);
        must_present = true;
    }
    if must_present || !is_default_cycles(&collapsed) {
        tailer = format!(", {:?}{tailer}", cycles_vec(&collapsed));
    }
    out.push_str(&tailer);
    out.push_str(">;\n");
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SchedElem {
    Read(ReadId),
    Write(WriteId),
}

fn elem_rank(write_registry: &WriteRegistry, elem: SchedElem) -> u8 {
    match elem {
        SchedElem::Read(_) => 2,
        SchedElem::Write(id) => {
            if write_registry.write(id).is_res() {
                0
            } else {
                1
            }
        }
    }
}

fn elem_name<'a>(write_registry: &'a WriteRegistry, read_registry: &'a ReadRegistry, elem: SchedElem) -> &'a str {
    match elem {
        SchedElem::Read(id) => read_registry.name(id),
        SchedElem::Write(id) => write_registry.write(id).name(),
    }
}

fn emit_instrw(
    out: &mut String,
    write_registry: &WriteRegistry,
    read_registry: &ReadRegistry,
    signature: &[SchedElem],
    opcodes: &[String],
) {
    let names: Vec<&str> = signature.iter().map(|&e| elem_name(write_registry, read_registry, e)).collect();
    let joined_names = names.join(", ");

    let reduced = regex_reducer::reduce(opcodes, 4).expect("regex reducer must validate its own output");
    let mut regexes = Vec::new();
    let mut literals = Vec::new();
    for expr in reduced {
        if expr.chars().any(|c| matches!(c, '(' | ')' | '|' | '?' | '*')) {
            regexes.push(expr);
        } else {
            literals.push(expr);
        }
    }

    if !regexes.is_empty() {
        let header = format!("def : InstRW<[{joined_names}], (instregex ");
        out.push_str(&header);
        for (i, r) in regexes.iter().enumerate() {
            if i > 0 {
                out.push_str(",\n");
                out.push_str(&" ".repeat(header.len()));
            }
            let _ = write!(out, "\"^{r}$\"");
        }
        out.push_str(")>;\n");
    }

    if !literals.is_empty() {
        let header = format!("def : InstRW<[{joined_names}], (instrs ");
        out.push_str(&header);
        for (i, op) in literals.iter().enumerate() {
            if i > 0 {
                out.push_str(",\n");
                out.push_str(&" ".repeat(header.len()));
            }
            out.push_str(op);
        }
        out.push_str(")>;\n");
    }
}

/// Emit the full target-description fragment for `instructions` against
/// `write_registry`/`read_registry`. `prologue` is the opaque
/// static template text prepended verbatim.
pub fn emit(profile: &CpuProfile, write_registry: &WriteRegistry, read_registry: &ReadRegistry, instructions: &[Instruction], prologue: &str) -> String {
    let mut out = String::new();
    out.push_str(prologue);
    let _ = writeln!(out, "\n//==={}===//", "-".repeat(70));
    out.push_str("// The following definitons are infered by smg.\n");
    let _ = writeln!(out, "//==={}===//\n", "-".repeat(70));
    out.push_str("// Infered SchedWrite definition.\n");

    let mut lived: IndexMap<WriteId, ()> = IndexMap::new();
    for instr in instructions {
        for &write_id in instr.writes() {
            let node = write_registry.write(write_id);
            if node.is_sequence() {
                for leaf in write_registry.expand(write_id) {
                    lived.insert(leaf, ());
                }
            } else if !node.is_res() {
                lived.insert(write_id, ());
            }
        }
    }

    let mut dead: Vec<WriteId> = write_registry
        .get_all()
        .filter(|&id| {
            let node = write_registry.write(id);
            !node.is_sequence() && !node.is_res() && !lived.contains_key(&id)
        })
        .collect();
    dead.sort_by_key(|&id| write_registry.write(id).name().to_string());

    let mut lived_sorted: Vec<WriteId> = lived.keys().copied().collect();
    lived_sorted.sort_by_key(|&id| write_registry.write(id).name().to_string());

    let mut remaining: std::collections::VecDeque<WriteId> = lived_sorted.into_iter().collect();
    let mut consumed: IndexMap<WriteId, ()> = IndexMap::new();

    while let Some(write_id) = remaining.pop_front() {
        if consumed.contains_key(&write_id) {
            continue;
        }
        consumed.insert(write_id, ());
        let write = write_registry.write(write_id);
        let mem_name = format!("{}Ld", write.name());
        let mem_id = write_registry.get(&mem_name).filter(|&id| !write_registry.write(id).is_sequence() && !write_registry.write(id).is_res());

        if let Some(mem_id) = mem_id {
            if let Some(pos) = remaining.iter().position(|&id| id == mem_id) {
                remaining.remove(pos);
            }
            consumed.insert(mem_id, ());
            let mem = write_registry.write(mem_id);

            if !write.supported() && !mem.supported() {
                emit_write_res_pair_unsupported(&mut out, write);
                continue;
            }
            if write.has_payload() && mem.has_payload() && try_emit_write_res_pair(&mut out, profile, write, mem) {
                continue;
            }

            for w in [write, mem] {
                if !w.supported() {
                    emit_write_res_unsupported(&mut out, w);
                } else if !w.has_payload() {
                    out.push_str("// FIXME: Incompleted schedwrite.\n");
                    emit_write_res_unsupported(&mut out, w);
                } else {
                    emit_write_res(&mut out, profile, w);
                }
            }
        } else if !write.supported() {
            emit_write_res_unsupported(&mut out, write);
        } else if !write.has_payload() {
            out.push_str("// FIXME: Incompleted schedwrite.\n");
            emit_write_res_unsupported(&mut out, write);
        } else {
            emit_write_res(&mut out, profile, write);
        }
    }

    if !dead.is_empty() {
        out.push_str("\n// Dead schedwrites that nobody uses.\n");
    }
    for id in &dead {
        emit_write_res_unsupported(&mut out, write_registry.write(*id));
    }

    let mut groups: IndexMap<Vec<SchedElem>, Vec<usize>> = IndexMap::new();
    for (idx, instr) in instructions.iter().enumerate() {
        if !instr.use_override() {
            continue;
        }
        let mut sig: Vec<SchedElem> = instr
            .reads()
            .iter()
            .map(|&r| SchedElem::Read(r))
            .chain(instr.writes().iter().map(|&w| SchedElem::Write(w)))
            .collect();
        sig.sort_by(|&a, &b| {
            let ra = elem_rank(write_registry, a);
            let rb = elem_rank(write_registry, b);
            ra.cmp(&rb).then_with(|| elem_name(write_registry, read_registry, a).cmp(elem_name(write_registry, read_registry, b)))
        });
        groups.entry(sig).or_default().push(idx);
    }

    let mut group_list: Vec<(Vec<SchedElem>, Vec<usize>)> = groups.into_iter().collect();
    group_list.sort_by(|(a, _), (b, _)| {
        let rank_a = a.first().map(|&e| elem_rank(write_registry, e)).unwrap_or(u8::MAX);
        let rank_b = b.first().map(|&e| elem_rank(write_registry, e)).unwrap_or(u8::MAX);
        let name_a = a.first().map(|&e| elem_name(write_registry, read_registry, e)).unwrap_or("");
        let name_b = b.first().map(|&e| elem_name(write_registry, read_registry, e)).unwrap_or("");
        rank_a.cmp(&rank_b).then_with(|| name_a.cmp(name_b)).then_with(|| a.len().cmp(&b.len()))
    });

    out.push_str("\n// Infered SchedWriteRes and InstRW definition.\n");
    let mut emitted_res: IndexMap<WriteId, ()> = IndexMap::new();
    for (sig, indices) in &group_list {
        for &elem in sig {
            if let SchedElem::Write(id) = elem {
                let node = write_registry.write(id);
                if node.is_res() && !emitted_res.contains_key(&id) {
                    emitted_res.insert(id, ());
                    out.push('\n');
                    emit_schedwriteres(&mut out, profile, node);
                }
            }
        }
        let opcodes: Vec<String> = indices.iter().map(|&i| instructions[i].opcode().to_string()).collect();
        emit_instrw(&mut out, write_registry, read_registry, sig, &opcodes);
    }

    out.push_str("\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Port;
    use crate::target::TargetCpu;
    use crate::write::Resources;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn single_uop_unit_write_uses_short_form() {
        let profile = CpuProfile::for_cpu(TargetCpu::SkylakeServer);
        let mut reg = WriteRegistry::new();
        let w = reg
            .register_seeded("WriteALU", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();
        let reads = ReadRegistry::new();
        let instr = Instruction::new("ADD8rr", vec![], vec![w], None);

        let text = emit(&profile, &reg, &reads, &[instr], "");
        assert!(text.contains("def : WriteRes<WriteALU, [SKXPort0]>;"));
    }

    #[test]
    fn multi_uop_write_uses_full_form() {
        let profile = CpuProfile::for_cpu(TargetCpu::SkylakeServer);
        let mut reg = WriteRegistry::new();
        let w = reg
            .register_seeded("WriteFoo", false, Resources::new(vec![ps(&[0]), ps(&[1])], vec![1, 1], 2, 2))
            .unwrap();
        let reads = ReadRegistry::new();
        let instr = Instruction::new("X", vec![], vec![w], None);

        let text = emit(&profile, &reg, &reads, &[instr], "");
        assert!(text.contains("defm : X86WriteRes<WriteFoo, [SKXPort0, SKXPort1], 2, [1, 1], 2>;"));
    }

    #[test]
    fn unsupported_write_emits_marker() {
        let profile = CpuProfile::for_cpu(TargetCpu::Skylake);
        let mut reg = WriteRegistry::new();
        let w = reg
            .register_seeded("WriteAvx512", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();
        reg.write_mut(w).set_supported(false);
        let reads = ReadRegistry::new();
        let instr = Instruction::new("VFOO", vec![], vec![w], Some("AVX512F_512".to_string()));

        let text = emit(&profile, &reg, &reads, &[instr], "");
        assert!(text.contains("defm : X86WriteResUnsupported<WriteAvx512>;"));
    }

    #[test]
    fn paired_write_emits_paired_form() {
        let profile = CpuProfile::for_cpu(TargetCpu::SkylakeServer);
        let mut reg = WriteRegistry::new();
        let reg_write = reg
            .register_seeded("WriteALU", false, Resources::new(vec![ps(&[0])], vec![1], 1, 1))
            .unwrap();
        let mem_write = reg
            .register_seeded(
                "WriteALULd",
                false,
                Resources::new(vec![ps(&[0]), profile.load_ports.clone()], vec![1, 1], 5, 2),
            )
            .unwrap();
        let reads = ReadRegistry::new();
        let instr_reg = Instruction::new("ADD8rr", vec![], vec![reg_write], None);
        let instr_mem = Instruction::new("ADD8rm", vec![], vec![mem_write], None);

        let text = emit(&profile, &reg, &reads, &[instr_reg, instr_mem], "");
        assert!(text.contains("SKXWriteResPair<WriteALU,"));
    }
}
