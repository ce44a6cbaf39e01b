/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Opcode-set regex compression.
//!
//! Iteratively merges strings sharing a longest common prefix/postfix where
//! the differing middle passes a validity filter, until no merge pass
//! changes anything. The merge order and checker-priority details below are
//! load-bearing for which exact alternation gets produced, so they're kept
//! literal rather than simplified.

use std::collections::VecDeque;

use regex::Regex;

use crate::error::{InvariantViolation, PipelineError};

fn chars_of(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn common_postfix_len(a: &[char], b: &[char]) -> usize {
    let mut count = 0;
    while count < a.len() && count < b.len() && a[a.len() - 1 - count] == b[b.len() - 1 - count] {
        count += 1;
    }
    count
}

/// A diff straddles an existing parenthesised group or quantifier in
/// `string[begin..end)` — merging there would change what an earlier
/// alternation matches.
fn is_in_regex(string: &[char], begin: usize, end: usize) -> bool {
    let mut probe = 0i32;
    for (i, &c) in string.iter().enumerate().take(end) {
        if c == '(' {
            probe += 1;
        } else if c == ')' {
            probe -= 1;
        }
        if i >= begin && (probe != 0 || c == '?') {
            return true;
        }
    }
    false
}

fn is_all_digits(diff1: &[char], diff2: &[char]) -> bool {
    !diff1.is_empty() && !diff2.is_empty() && diff1.iter().all(|c| c.is_ascii_digit()) && diff2.iter().all(|c| c.is_ascii_digit())
}

fn is_under_limit(diff1: &[char], diff2: &[char], limit: usize) -> bool {
    diff1.len().max(diff2.len()) <= limit
}

struct Found {
    common_prefix: Vec<char>,
    common_postfix: Vec<char>,
    use_digits_checker: bool,
}

fn diff_bounds(specimen: &[char], candidate: &[char]) -> (usize, usize, usize, usize) {
    let cprefix_len = common_prefix_len(candidate, specimen);
    let rem_candidate = &candidate[cprefix_len..];
    let rem_specimen = &specimen[cprefix_len..];
    let cpostfix_len = common_postfix_len(rem_candidate, rem_specimen);
    let begin1 = cprefix_len;
    let end1 = specimen.len() - cpostfix_len;
    let begin2 = cprefix_len;
    let end2 = candidate.len() - cpostfix_len;
    (begin1, end1, begin2, end2)
}

fn reduce_once(regexes_in: &[String], diff_len_limit: usize) -> (Vec<String>, bool) {
    let mut changed = false;
    let mut worklist: VecDeque<String> = regexes_in.iter().cloned().collect();
    let mut regexes_out = Vec::new();

    while let Some(specimen) = worklist.pop_front() {
        let specimen_chars = chars_of(&specimen);
        let mut found: Option<Found> = None;

        // Checker priority mirrors the original: all-digits diffs are
        // accepted unconditionally (any length), tried before the
        // length-bounded filter so a non-digit merge never shadows a digit
        // merge the length bound alone would also have allowed.
        'search: for use_digits in [true, false] {
            for candidate in worklist.iter() {
                let candidate_chars = chars_of(candidate);
                let (begin1, end1, begin2, end2) = diff_bounds(&specimen_chars, &candidate_chars);
                let diff1 = &specimen_chars[begin1..end1];
                let diff2 = &candidate_chars[begin2..end2];

                let passes = if use_digits {
                    is_all_digits(diff1, diff2)
                } else {
                    is_under_limit(diff1, diff2, diff_len_limit)
                };

                if passes && !is_in_regex(&specimen_chars, begin1, end1) && !is_in_regex(&candidate_chars, begin2, end2) {
                    found = Some(Found {
                        common_prefix: specimen_chars[..begin1].to_vec(),
                        common_postfix: specimen_chars[end1..].to_vec(),
                        use_digits_checker: use_digits,
                    });
                    changed = true;
                    break 'search;
                }
            }
        }

        let regex = if let Some(group) = found {
            let mut members: Vec<String> = Vec::new();
            for candidate in worklist.iter() {
                let candidate_chars = chars_of(candidate);
                let (begin1, end1, begin2, end2) = diff_bounds(&specimen_chars, &candidate_chars);
                let this_prefix = &specimen_chars[..begin1];
                let this_postfix = &specimen_chars[end1..];
                if this_prefix == group.common_prefix.as_slice() && this_postfix == group.common_postfix.as_slice() {
                    let diff1 = &specimen_chars[begin1..end1];
                    let diff2 = &candidate_chars[begin2..end2];
                    let passes = if group.use_digits_checker {
                        is_all_digits(diff1, diff2)
                    } else {
                        is_under_limit(diff1, diff2, diff_len_limit)
                    };
                    if passes {
                        members.push(candidate.clone());
                    }
                }
            }
            for member in &members {
                if let Some(pos) = worklist.iter().position(|x| x == member) {
                    worklist.remove(pos);
                }
            }
            members.push(specimen.clone());

            build_alternation(&members, &group.common_prefix, &group.common_postfix)
        } else {
            specimen.clone()
        };

        regexes_out.push(regex);
    }

    (regexes_out, changed)
}

fn build_alternation(members: &[String], common_prefix: &[char], common_postfix: &[char]) -> String {
    if members.len() == 1 {
        return members[0].clone();
    }

    let prefix_len = common_prefix.len();
    let postfix_len = common_postfix.len();
    let mut diffs: Vec<String> = members
        .iter()
        .map(|m| {
            let chars = chars_of(m);
            chars[prefix_len..chars.len() - postfix_len].iter().collect::<String>()
        })
        .collect();

    let need_question_mark = diffs.iter().any(|d| d.is_empty());
    if need_question_mark {
        diffs.retain(|d| !d.is_empty());
    }

    let mut alt = String::new();
    if !diffs.is_empty() {
        diffs.sort_by(|a, b| (a.chars().count(), a.clone()).cmp(&(b.chars().count(), b.clone())));
        let joined = diffs.join("|");
        alt = if diffs.len() > 1 || diffs[0].chars().count() > 1 {
            format!("({joined})")
        } else {
            joined
        };
    }
    if need_question_mark {
        alt = format!("({alt}?)");
    }

    let prefix: String = common_prefix.iter().collect();
    let postfix: String = common_postfix.iter().collect();
    format!("{prefix}{alt}{postfix}")
}

/// Reduce `opcodes` to a minimal ordered set of anchored regexes whose union
/// matches exactly that set. `diff_len_limit` bounds non-digit
/// diffs; values above 2 first converge at limit 2 to prefer short prefixes
/// before the caller's wider limit is applied.
pub fn reduce(opcodes: &[String], diff_len_limit: usize) -> Result<Vec<String>, PipelineError> {
    let mut last = opcodes.to_vec();

    if diff_len_limit > 2 {
        loop {
            let (next, changed) = reduce_once(&last, 2);
            last = next;
            if !changed {
                break;
            }
        }
    }

    loop {
        let (next, changed) = reduce_once(&last, diff_len_limit);
        last = next;
        if !changed {
            break;
        }
    }

    validate(opcodes, &last)?;
    Ok(last)
}

fn validate(opcodes: &[String], reduced: &[String]) -> Result<(), PipelineError> {
    let compiled: Vec<Regex> = reduced
        .iter()
        .map(|r| Regex::new(&format!("^{r}$")).expect("regex reducer produced an invalid pattern"))
        .collect();
    for opcode in opcodes {
        let hits = compiled.iter().filter(|re| re.is_match(opcode)).count();
        if hits != 1 {
            return Err(InvariantViolation::RegexValidationFailed {
                opcode: opcode.clone(),
                hits,
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_limit_matches_reference_scenario() {
        let input = strs(&[
            "ABS8ri8", "ABS16ri8", "ABS8mr", "ABS32ri16", "ABS32ri32", "ABS8x", "ABS8f", "ABS8i", "ABS8", "aes",
        ]);
        let result = reduce(&input, 2).unwrap();
        let mut expected = strs(&["ABS(8|16)ri8", "ABS8((f|i|x|mr)?)", "ABS32ri(16|32)", "aes"]);
        let mut result_sorted = result.clone();
        result_sorted.sort();
        expected.sort();
        assert_eq!(result_sorted, expected);
    }

    #[test]
    fn every_input_matches_exactly_one_output() {
        let input = strs(&["CVTSD2SIrm", "VCVTSD2SIrm", "CVTTSD2SIrm", "VCVTTSD2SIrm"]);
        let result = reduce(&input, 4).unwrap();
        assert!(result.len() <= input.len());
        for opcode in &input {
            let hits = result
                .iter()
                .filter(|r| Regex::new(&format!("^{r}$")).unwrap().is_match(opcode))
                .count();
            assert_eq!(hits, 1, "opcode {opcode} matched {hits} patterns");
        }
    }

    #[test]
    fn zero_limit_only_merges_digit_diffs() {
        let input = strs(&[
            "ABS8ri8", "ABS16ri8", "ABS8mr", "ABS32ri16", "ABS32ri32", "ABS8x", "ABS8f", "ABS8i", "ABS8", "aes",
        ]);
        let result = reduce(&input, 0).unwrap();
        assert!(result.contains(&"ABS8mr".to_string()));
        assert!(result.contains(&"ABS8x".to_string()));
        assert!(result.contains(&"ABS(8|16)ri8".to_string()));
    }
}
