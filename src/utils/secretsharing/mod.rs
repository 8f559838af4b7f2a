//! Shamir secret sharing over policy trees.
//!
//! Shares, reconstruction coefficients and pruned selections are all
//! produced in the same leaf pre-order, so callers can pair them (and the
//! ciphertext components generated from them) positionally. Matching by
//! attribute name alone would mis-pair values when a policy names the same
//! attribute in more than one branch.
use rabe_bn::*;
use rand::Rng;

use crate::error::AbeError;
use crate::utils::policy::pest::PolicyValue;
use crate::utils::tools::usize_to_fr;

/// Shamir shares of `secret` for a `k` of `n` threshold. Index 0 holds the
/// secret itself (the polynomial at 0), indices 1..=n the shares.
pub fn gen_shares(secret: Fr, k: usize, n: usize) -> Vec<Fr> {
    let mut rng = rand::thread_rng();
    let mut coeffs: Vec<Fr> = vec![secret];
    for _ in 1..k {
        coeffs.push(rng.gen());
    }
    (0..=n).map(|x| polynomial(&coeffs, usize_to_fr(x))).collect()
}

pub fn polynomial(coeffs: &[Fr], x: Fr) -> Fr {
    let mut share = Fr::zero();
    for (i, coeff) in coeffs.iter().enumerate() {
        share = share + (*coeff * x.pow(usize_to_fr(i)));
    }
    share
}

/// Lagrange interpolation coefficients at 0 for the given points.
pub fn recover_coefficients(points: &[Fr]) -> Vec<Fr> {
    let mut coeffs: Vec<Fr> = Vec::new();
    for i in points {
        let mut result = Fr::one();
        for j in points {
            if i != j {
                result = result * ((Fr::zero() - *j) * (*i - *j).inverse().unwrap());
            }
        }
        coeffs.push(result);
    }
    coeffs
}

/// One share per policy leaf, pre-order. An `and` node splits its secret
/// n-of-n, an `or` node hands it to every child unchanged.
pub fn gen_shares_policy(secret: Fr, policy: &PolicyValue) -> Vec<(String, Fr)> {
    let mut shares = Vec::new();
    shares_node(secret, policy, &mut shares);
    shares
}

fn shares_node(secret: Fr, policy: &PolicyValue, out: &mut Vec<(String, Fr)>) {
    match policy {
        PolicyValue::Leaf(name) => out.push((name.clone(), secret)),
        PolicyValue::Or(children) => {
            for child in children {
                shares_node(secret, child, out);
            }
        }
        PolicyValue::And(children) => {
            let n = children.len();
            let shares = gen_shares(secret, n, n);
            for (i, child) in children.iter().enumerate() {
                shares_node(shares[i + 1], child, out);
            }
        }
    }
}

/// Reconstruction coefficient per policy leaf, same pre-order as
/// [`gen_shares_policy`]: summing `coefficient * share` over any pruned
/// selection recovers the secret.
pub fn calc_coefficients(policy: &PolicyValue) -> Vec<(String, Fr)> {
    let mut coeffs = Vec::new();
    coefficients_node(policy, Fr::one(), &mut coeffs);
    coeffs
}

fn coefficients_node(policy: &PolicyValue, coeff: Fr, out: &mut Vec<(String, Fr)>) {
    match policy {
        PolicyValue::Leaf(name) => out.push((name.clone(), coeff)),
        PolicyValue::Or(children) => {
            for child in children {
                coefficients_node(child, coeff, out);
            }
        }
        PolicyValue::And(children) => {
            let points: Vec<Fr> = (1..=children.len()).map(usize_to_fr).collect();
            let lagrange = recover_coefficients(&points);
            for (i, child) in children.iter().enumerate() {
                coefficients_node(child, coeff * lagrange[i], out);
            }
        }
    }
}

fn leaf_count(policy: &PolicyValue) -> usize {
    match policy {
        PolicyValue::Leaf(_) => 1,
        PolicyValue::And(children) | PolicyValue::Or(children) => {
            children.iter().map(leaf_count).sum()
        }
    }
}

/// Minimal satisfying selection of leaves reachable with `attributes`,
/// reported as `(name, leaf_index)` pairs where the index counts leaves in
/// pre-order over the whole policy. Fails with [`AbeError::PolicyNotSatisfied`].
pub fn calc_pruned(
    policy: &PolicyValue,
    attributes: &[String],
) -> Result<Vec<(String, usize)>, AbeError> {
    prune_node(policy, attributes, 0).ok_or(AbeError::PolicyNotSatisfied)
}

fn prune_node(
    policy: &PolicyValue,
    attributes: &[String],
    offset: usize,
) -> Option<Vec<(String, usize)>> {
    match policy {
        PolicyValue::Leaf(name) => {
            if attributes.iter().any(|a| a == name) {
                Some(vec![(name.clone(), offset)])
            } else {
                None
            }
        }
        PolicyValue::And(children) => {
            let mut selected = Vec::new();
            let mut offset = offset;
            for child in children {
                selected.append(&mut prune_node(child, attributes, offset)?);
                offset += leaf_count(child);
            }
            Some(selected)
        }
        PolicyValue::Or(children) => {
            let mut offset = offset;
            for child in children {
                if let Some(selected) = prune_node(child, attributes, offset) {
                    return Some(selected);
                }
                offset += leaf_count(child);
            }
            None
        }
    }
}

/// Recombines shares produced by [`gen_shares_policy`]; test helper for the
/// sharing/coefficient pair.
pub fn recover_secret(shares: &[Fr], policy: &PolicyValue) -> Fr {
    let coeffs = calc_coefficients(policy);
    let mut secret = Fr::zero();
    for (i, share) in shares.iter().enumerate() {
        secret = secret + (coeffs[i].1 * *share);
    }
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::policy::pest::parse;

    #[test]
    fn test_secret_sharing_or() {
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        let shares = gen_shares(secret, 1, 2);
        assert_eq!(shares[0], secret);
        let policy = parse("A or B").unwrap();
        let reconstructed = recover_secret(&[shares[1], shares[2]], &policy);
        assert_eq!(secret, reconstructed);
    }

    #[test]
    fn test_secret_sharing_and() {
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        let shares = gen_shares(secret, 2, 2);
        let policy = parse("A and B").unwrap();
        let reconstructed = recover_secret(&[shares[1], shares[2]], &policy);
        assert_eq!(secret, reconstructed);
    }

    #[test]
    fn test_policy_shares_align_with_coefficients() {
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        let policy = parse("(A and B) or (C and D and E)").unwrap();
        let shares = gen_shares_policy(secret, &policy);
        let coeffs = calc_coefficients(&policy);
        assert_eq!(shares.len(), 5);
        assert_eq!(coeffs.len(), shares.len());
        for (share, coeff) in shares.iter().zip(coeffs.iter()) {
            assert_eq!(share.0, coeff.0);
        }
    }

    #[test]
    fn test_pruned_reconstruction() {
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        let policy = parse("(A and B) or (C and D)").unwrap();
        let shares = gen_shares_policy(secret, &policy);
        let coeffs = calc_coefficients(&policy);
        let held = vec!["C".to_string(), "D".to_string()];
        let pruned = calc_pruned(&policy, &held).unwrap();
        let mut reconstructed = Fr::zero();
        for (_, idx) in &pruned {
            reconstructed = reconstructed + (coeffs[*idx].1 * shares[*idx].1);
        }
        assert_eq!(secret, reconstructed);
    }

    #[test]
    fn test_pruning_picks_matching_occurrence() {
        // ONE appears in both branches; the selection must point at the
        // second branch's leaves when only that branch is satisfied.
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        let policy = parse("(ONE and THREE) or (ONE and TWO and FOUR)").unwrap();
        let shares = gen_shares_policy(secret, &policy);
        let coeffs = calc_coefficients(&policy);
        let held = vec!["ONE".to_string(), "TWO".to_string(), "FOUR".to_string()];
        let pruned = calc_pruned(&policy, &held).unwrap();
        assert_eq!(
            pruned.iter().map(|(_, i)| *i).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
        let mut reconstructed = Fr::zero();
        for (_, idx) in &pruned {
            reconstructed = reconstructed + (coeffs[*idx].1 * shares[*idx].1);
        }
        assert_eq!(secret, reconstructed);
    }

    #[test]
    fn test_pruning_unsatisfied() {
        let policy = parse("(A and B) or (C and D)").unwrap();
        let held = vec!["A".to_string(), "C".to_string()];
        assert_eq!(
            calc_pruned(&policy, &held),
            Err(AbeError::PolicyNotSatisfied)
        );
    }
}
