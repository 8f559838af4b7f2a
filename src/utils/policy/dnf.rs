//! Disjunctive normal form conversion and access structures.
//!
//! An access structure is the list of minimal attribute sets satisfying a
//! policy; the decentralized DNF scheme embeds one ciphertext component set
//! per such minterm.
use crate::utils::policy::pest::PolicyValue;

/// Expands a policy into its minimal satisfying attribute sets.
///
/// `or` concatenates the children's structures, `and` multiplies them out
/// pairwise: `(A or B) and (C or D)` yields `[{A,C},{A,D},{B,C},{B,D}]`.
/// Every minterm keeps first-occurrence order and contains no duplicates.
pub fn access_structure(value: &PolicyValue) -> Vec<Vec<String>> {
    match value {
        PolicyValue::Leaf(name) => vec![vec![name.clone()]],
        PolicyValue::Or(children) => children.iter().flat_map(access_structure).collect(),
        PolicyValue::And(children) => {
            let mut terms: Vec<Vec<String>> = vec![Vec::new()];
            for child in children {
                let child_terms = access_structure(child);
                let mut expanded = Vec::with_capacity(terms.len() * child_terms.len());
                for term in &terms {
                    for child_term in &child_terms {
                        let mut merged = term.clone();
                        for attribute in child_term {
                            if !merged.contains(attribute) {
                                merged.push(attribute.clone());
                            }
                        }
                        expanded.push(merged);
                    }
                }
                terms = expanded;
            }
            terms
        }
    }
}

/// Rebuilds a policy as an or-of-ands equivalent to the input.
pub fn to_dnf(value: &PolicyValue) -> PolicyValue {
    let terms: Vec<PolicyValue> = access_structure(value)
        .into_iter()
        .map(|term| {
            if term.len() == 1 {
                PolicyValue::Leaf(term.into_iter().next().unwrap())
            } else {
                PolicyValue::And(term.into_iter().map(PolicyValue::Leaf).collect())
            }
        })
        .collect();
    if terms.len() == 1 {
        terms.into_iter().next().unwrap()
    } else {
        PolicyValue::Or(terms)
    }
}

/// Order independent equality of two access structures (set-of-sets).
pub fn access_structure_eq(left: &[Vec<String>], right: &[Vec<String>]) -> bool {
    normalize(left) == normalize(right)
}

fn normalize(structure: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut sorted: Vec<Vec<String>> = structure
        .iter()
        .map(|term| {
            let mut term = term.clone();
            term.sort();
            term
        })
        .collect();
    sorted.sort();
    sorted.dedup();
    sorted
}
