use pest::Parser;
use serde::{Deserialize, Serialize};

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::AbeError;

pub(crate) mod human;

use self::human::{HumanPolicyParser, Rule};

/// A parsed boolean policy formula.
///
/// `and`/`or` nodes always have at least two children; the grammar folds
/// single-term groups into the term itself.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub enum PolicyValue {
    Leaf(String),
    And(Vec<PolicyValue>),
    Or(Vec<PolicyValue>),
}

/// Parses a human readable policy, e.g. `"A@X and (B@Y or C@Y)"`.
pub fn parse(policy: &str) -> Result<PolicyValue, AbeError> {
    match HumanPolicyParser::parse(Rule::content, policy) {
        Ok(mut pairs) => Ok(human::build(pairs.next().unwrap())),
        Err(e) => Err(e.into()),
    }
}

/// Renders a policy tree back into the human readable language. Composite
/// children are parenthesized, so the output reparses to an equal tree.
pub fn serialize_policy(value: &PolicyValue) -> String {
    match value {
        PolicyValue::Leaf(name) => name.clone(),
        PolicyValue::And(children) => join(children, " and "),
        PolicyValue::Or(children) => join(children, " or "),
    }
}

fn join(children: &[PolicyValue], op: &str) -> String {
    children
        .iter()
        .map(|child| match child {
            PolicyValue::Leaf(name) => name.clone(),
            composite => format!("({})", serialize_policy(composite)),
        })
        .collect::<Vec<_>>()
        .join(op)
}

/// Every distinct attribute leaf, in pre-order.
pub fn list_attributes(value: &PolicyValue) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    collect_attributes(value, &mut names);
    names
}

fn collect_attributes(value: &PolicyValue, names: &mut Vec<String>) {
    match value {
        PolicyValue::Leaf(name) => {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        PolicyValue::And(children) | PolicyValue::Or(children) => {
            for child in children {
                collect_attributes(child, names);
            }
        }
    }
}

/// Rewrites every leaf with `f`, preserving the boolean structure.
pub fn map_leaves<F: Fn(&str) -> String>(value: &PolicyValue, f: &F) -> PolicyValue {
    match value {
        PolicyValue::Leaf(name) => PolicyValue::Leaf(f(name)),
        PolicyValue::And(children) => {
            PolicyValue::And(children.iter().map(|c| map_leaves(c, f)).collect())
        }
        PolicyValue::Or(children) => {
            PolicyValue::Or(children.iter().map(|c| map_leaves(c, f)).collect())
        }
    }
}
