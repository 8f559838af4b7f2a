use pest::iterators::Pair;
use pest_derive::Parser;

use crate::utils::policy::pest::PolicyValue;

#[derive(Parser)]
#[grammar = "human.policy.pest"]
pub(crate) struct HumanPolicyParser;

pub(crate) fn build(pair: Pair<Rule>) -> PolicyValue {
    match pair.as_rule() {
        Rule::attribute => PolicyValue::Leaf(pair.as_str().to_string()),
        Rule::and => PolicyValue::And(operands(pair).map(build).collect()),
        Rule::or => PolicyValue::Or(operands(pair).map(build).collect()),
        _ => unreachable!(),
    }
}

// the keyword tokens are atomic (not silent), skip them
fn operands(pair: Pair<Rule>) -> impl Iterator<Item = Pair<Rule>> {
    pair.into_inner()
        .filter(|p| !matches!(p.as_rule(), Rule::and_kw | Rule::or_kw))
}
