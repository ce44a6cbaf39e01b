/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pass 5: supportedness tagging.
//!
//! Unlike passes 1-2, which bucket instructions by their *declared* write,
//! this pass buckets by *leaf* write (a WriteSequence's members, expanded),
//! since it's the leaves that get emitted as `let FooIsSupported = ...` in
//! the Emitter. A leaf with zero referencing instructions is unsupported.
//! Otherwise a leaf is supported iff every one of its referencing
//! instructions is untagged, or at least one of them carries an ISA tag
//! valid on this CPU — this must be decided over *all* of a leaf's users at
//! once, not instruction-by-instruction: a leaf shared by one untagged
//! instruction and one invalid-tagged instruction is unsupported, because
//! the untagged user alone isn't enough to redeem it once another user is
//! known to be tagged-and-invalid.

use indexmap::IndexMap;

use crate::instruction::Instruction;
use crate::target::CpuProfile;
use crate::write::{WriteId, WriteRegistry};

#[derive(Default)]
struct Tally {
    all_untagged: bool,
    any_tagged_valid: bool,
}

pub fn run(profile: &CpuProfile, write_registry: &mut WriteRegistry, instructions: &[Instruction]) {
    let mut tallies: IndexMap<WriteId, Tally> = IndexMap::new();

    for instr in instructions {
        let tagged = instr.isa_set().is_some();
        let tagged_valid = tagged && !instr.is_invalid_on(|tag| profile.is_isa_valid(tag));

        for &write_id in instr.writes() {
            for leaf in write_registry.expand(write_id) {
                let tally = tallies.entry(leaf).or_insert_with(|| Tally {
                    all_untagged: true,
                    any_tagged_valid: false,
                });
                tally.all_untagged &= !tagged;
                tally.any_tagged_valid |= tagged_valid;
            }
        }
    }

    let ids: Vec<WriteId> = write_registry.get_all().collect();
    for id in ids {
        let supported = tallies
            .get(&id)
            .is_some_and(|tally| tally.all_untagged || tally.any_tagged_valid);
        write_registry.write_mut(id).set_supported(supported);
    }
}
