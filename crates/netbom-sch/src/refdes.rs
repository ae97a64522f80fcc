//! Reference designators (`R12`, `VD3`) and their compressed range notation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Letter part followed by the number. Only the start of a designator must match,
/// so `R1A` reads as `R`/`1`.
static DESIGNATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^0-9?]+)([0-9]+)").unwrap());

/// Letter part of a designator: `VD` for `VD3`.
pub fn ref_type(reference: &str) -> Option<&str> {
    DESIGNATOR
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Numeric part of a designator: `3` for `VD3`.
pub fn ref_number(reference: &str) -> Option<u64> {
    DESIGNATOR
        .captures(reference)
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

fn split(reference: &str) -> Option<(&str, u64)> {
    Some((ref_type(reference)?, ref_number(reference)?))
}

/// Compress a list of designators, e.g. `R7, R9-R14` or `VD1, VD2`.
///
/// Consecutive numbers with the same letter part form a run. Runs of three or
/// more are written `first-last`; shorter runs list their members. Designators
/// that cannot be split into letters and number follow the others verbatim.
pub fn compress_designators<S: AsRef<str>>(designators: &[S]) -> String {
    if let [single] = designators {
        return single.as_ref().to_string();
    }

    let mut parsed: Vec<(&str, u64)> = Vec::with_capacity(designators.len());
    let mut verbatim: Vec<&str> = Vec::new();
    for designator in designators {
        match split(designator.as_ref()) {
            Some(parts) => parsed.push(parts),
            None => verbatim.push(designator.as_ref()),
        }
    }
    parsed.sort();

    let mut items: Vec<String> = Vec::new();
    let mut index = 0;
    while index < parsed.len() {
        let (prefix, first) = parsed[index];
        let mut last = first;
        let mut end = index + 1;
        while end < parsed.len()
            && parsed[end].0 == prefix
            && Some(parsed[end].1) == last.checked_add(1)
        {
            last = parsed[end].1;
            end += 1;
        }

        match end - index {
            1 => items.push(format!("{prefix}{first}")),
            2 => {
                items.push(format!("{prefix}{first}"));
                items.push(format!("{prefix}{last}"));
            }
            _ => items.push(format!("{prefix}{first}-{prefix}{last}")),
        }
        index = end;
    }
    items.extend(verbatim.into_iter().map(str::to_string));
    items.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designator_parts() {
        assert_eq!(ref_type("VD3"), Some("VD"));
        assert_eq!(ref_number("VD3"), Some(3));
        assert_eq!(ref_type("R1A"), Some("R"));
        assert_eq!(ref_type("R?"), None);
        assert_eq!(ref_number("12"), None);
        assert_eq!(ref_type(""), None);
    }

    #[test]
    fn single_designator_is_verbatim() {
        assert_eq!(compress_designators(&["R5"]), "R5");
        assert_eq!(compress_designators(&["#PWR01"]), "#PWR01");
    }

    #[test]
    fn runs_and_pairs() {
        assert_eq!(compress_designators(&["VD2", "VD1"]), "VD1, VD2");
        assert_eq!(compress_designators(&["C11", "C8", "C10", "C9"]), "C8-C11");
        assert_eq!(
            compress_designators(&["R14", "R7", "R9", "R10", "R11", "R12", "R13"]),
            "R7, R9-R14"
        );
        assert_eq!(
            compress_designators(&["R9", "R10", "R11", "R13", "R14"]),
            "R9-R11, R13, R14"
        );
    }

    #[test]
    fn prefixes_sort_before_numbers() {
        assert_eq!(
            compress_designators(&["VD1", "C2", "C1", "C3", "R1"]),
            "C1-C3, R1, VD1"
        );
    }

    #[test]
    fn unparsable_designators_follow() {
        assert_eq!(compress_designators(&["X?", "R2", "R1"]), "R1, R2, X?");
    }

    #[test]
    fn empty_input() {
        let none: [&str; 0] = [];
        assert_eq!(compress_designators(&none), "");
    }
}
