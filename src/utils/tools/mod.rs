use rabe_bn::*;

use crate::error::AbeError;
use crate::utils::policy::pest::PolicyValue;

pub fn usize_to_fr(i: usize) -> Fr {
    Fr::from_str(&i.to_string()).unwrap()
}

pub fn contains(data: &[String], value: &str) -> bool {
    data.iter().any(|entry| entry == value)
}

/// True if every element of `subset` occurs in `attributes`.
pub fn is_subset(subset: &[String], attributes: &[String]) -> bool {
    subset.iter().all(|entry| contains(attributes, entry))
}

/// True if `attributes` satisfies the policy formula.
pub fn traverse_policy(attributes: &[String], policy: &PolicyValue) -> bool {
    match policy {
        PolicyValue::Leaf(name) => contains(attributes, name),
        PolicyValue::And(children) => children
            .iter()
            .all(|child| traverse_policy(attributes, child)),
        PolicyValue::Or(children) => children
            .iter()
            .any(|child| traverse_policy(attributes, child)),
    }
}

/// The authority owning an attribute: the part after the last `@`.
pub fn authority_of(attribute: &str) -> Result<String, AbeError> {
    match attribute.rsplit_once('@') {
        Some((prefix, authority)) if !prefix.is_empty() && !authority.is_empty() => {
            Ok(authority.to_string())
        }
        _ => Err(AbeError::SchemeProtocol(format!(
            "attribute {} names no authority",
            attribute
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::policy::pest::parse;

    fn set(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_traverse() {
        let policy1 = parse("A and B").unwrap();
        let policy2 = parse("A or B").unwrap();
        let policy3 = parse("(C or D) and B").unwrap();

        assert!(!traverse_policy(&set(&["X", "Y"]), &policy1));
        assert!(traverse_policy(&set(&["A", "B"]), &policy1));
        assert!(!traverse_policy(&set(&["C", "D"]), &policy1));

        assert!(traverse_policy(&set(&["A"]), &policy2));
        assert!(!traverse_policy(&set(&["C", "D"]), &policy2));

        assert!(!traverse_policy(&set(&["A", "B"]), &policy3));
        assert!(traverse_policy(&set(&["C", "B"]), &policy3));
    }

    #[test]
    fn test_subset() {
        assert!(is_subset(&set(&["A"]), &set(&["A", "B"])));
        assert!(!is_subset(&set(&["A", "C"]), &set(&["A", "B"])));
        assert!(is_subset(&set(&[]), &set(&["A"])));
    }

    #[test]
    fn test_authority_of() {
        assert_eq!(authority_of("STUDENT@UT").unwrap(), "UT");
        assert_eq!(authority_of("1%STUDENT@UT").unwrap(), "UT");
        assert!(authority_of("STUDENT").is_err());
        assert!(authority_of("@UT").is_err());
    }

    #[test]
    fn test_usize_to_fr() {
        assert_eq!(usize_to_fr(0), Fr::zero());
        assert_eq!(usize_to_fr(1), Fr::one());
        assert_eq!(usize_to_fr(2), Fr::one() + Fr::one());
    }
}
