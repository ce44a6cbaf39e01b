/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Resource Reducer: strips inclusion-dominated port-set/cycle
//! pairs down to a minimal leaf decomposition. Used to normalise per-opcode
//! `WriteRes` maps from the verification JSON before handing them to the
//! resource-inference code.

use crate::error::InvariantViolation;
use crate::resource::{contains, PortSet};

/// Reduce `nodes` (port-set, cycle-count pairs, possibly redundantly nested)
/// to their leaf-only residual form. Every remaining entry carries only its
/// own incremental demand once its supersets' shares are subtracted out.
///
/// Superset edges are keyed by node *index*, not by distinct `PortSet`
/// value: two entries with equal port sets but different cycle counts (e.g.
/// from two differently-spelled port-name keys that decode to the same
/// canonical `PortSet`) still form mutual superset edges and subtract from
/// each other.
pub fn reduce_resources(mut nodes: Vec<(PortSet, i64)>) -> Result<Vec<(PortSet, i64)>, InvariantViolation> {
    let n = nodes.len();
    let mut superset_of: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in 0..n {
            if i != j && contains(nodes[j].0.as_slice(), nodes[i].0.as_slice()) {
                superset_of[i].push(j);
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(superset_of[i].len()));

    for i in order {
        let cycles = nodes[i].1;
        if cycles > 0 {
            for &j in &superset_of[i] {
                if nodes[j].1 <= 0 {
                    return Err(InvariantViolation::ReducerCyclesUnderflow {
                        ports: format!("{:?}", nodes[j].0),
                    });
                }
                nodes[j].1 -= cycles;
            }
        }
    }

    Ok(nodes.into_iter().filter(|(_, cycles)| *cycles > 0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Port;

    fn ps(ports: &[i8]) -> PortSet {
        PortSet::new(ports.iter().map(|&n| Port::new(n)).collect())
    }

    #[test]
    fn subset_cycles_are_subtracted_from_superset() {
        let nodes = vec![(ps(&[0]), 3), (ps(&[0, 1]), 5)];
        let reduced = reduce_resources(nodes).unwrap();
        assert_eq!(reduced, vec![(ps(&[0]), 3), (ps(&[0, 1]), 2)]);
    }

    #[test]
    fn fully_dominated_superset_is_dropped() {
        let nodes = vec![(ps(&[0]), 5), (ps(&[0, 1]), 5)];
        let reduced = reduce_resources(nodes).unwrap();
        assert_eq!(reduced, vec![(ps(&[0]), 5)]);
    }

    #[test]
    fn disjoint_sets_are_untouched() {
        let nodes = vec![(ps(&[0]), 2), (ps(&[1]), 3)];
        let reduced = reduce_resources(nodes.clone()).unwrap();
        assert_eq!(reduced, nodes);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let nodes = vec![(ps(&[0]), 3), (ps(&[0, 1]), 7), (ps(&[0, 1, 2]), 10)];
        let once = reduce_resources(nodes).unwrap();
        let twice = reduce_resources(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn equal_port_sets_with_different_cycles_subtract_each_other() {
        let nodes = vec![(ps(&[0, 1]), 4), (ps(&[0, 1]), 9)];
        let reduced = reduce_resources(nodes).unwrap();
        assert_eq!(reduced, vec![(ps(&[0, 1]), 5)]);
    }

    #[test]
    fn subtracting_below_zero_is_an_invariant_violation() {
        // Two disjoint subsets (ps0, ps1) both drain the same small superset
        // (ps012): the first drains it past zero, the second then finds it
        // already non-positive before it can subtract its own share.
        let nodes = vec![(ps(&[0, 1, 2]), 1), (ps(&[0]), 5), (ps(&[1]), 3)];
        let err = reduce_resources(nodes).unwrap_err();
        assert!(matches!(err, InvariantViolation::ReducerCyclesUnderflow { .. }));
    }
}
