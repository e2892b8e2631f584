// crates/govgate-core/src/orchestrator/multi_agent.rs
// ============================================================================
// Module: Multi-Agent Runner
// Description: Deterministic aggregation over N agent-proposed candidates.
// Purpose: Implement spec §4.5 exactly: profile-driven alternative pick,
//          Closed Layer screen, then one of five aggregation policies.
// Dependencies: crate::{closed_layer, entities::{identifiers, protocol}}
// ============================================================================

//! ## Overview
//! This module is pure: it never touches storage or the event log. The
//! orchestrator builds each agent's candidate protocol, runs the Closed
//! Layer itself, and passes the resulting [`AgentCandidate`]s in here for
//! aggregation. Only the selected candidate ever becomes a persisted
//! [`crate::entities::decision::Decision`]; the rest exist only as the audit
//! events the orchestrator emits alongside this call.

use std::collections::HashMap;

use crate::entities::identifiers::AgentId;
use crate::entities::protocol::RiskProfile;

/// An agent's declared participation profile.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    /// The agent's identifier.
    pub id: AgentId,
    /// The risk profile this agent proposes at.
    pub risk_profile: RiskProfile,
    /// Voting weight for [`AggregationPolicy::WeightedMajority`] (default 1
    /// when absent).
    pub weight: Option<u32>,
    /// Whether this agent participates in this round.
    pub enabled: bool,
}

impl AgentProfile {
    /// Returns the agent's effective weight, defaulting to 1.
    #[must_use]
    pub fn effective_weight(&self) -> u32 {
        self.weight.unwrap_or(1)
    }
}

/// How the runner resolves disagreement among agent candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPolicy {
    /// First non-blocked agent in input order.
    FirstValid,
    /// Most votes (one per agent); ties break lexicographically smallest
    /// alternative, then earliest agent.
    MajorityByAlternative,
    /// Same as [`Self::MajorityByAlternative`] but votes are weighted.
    WeightedMajority,
    /// Decide only if every non-blocked agent agrees.
    RequireConsensus,
    /// Never auto-decide; always return every candidate for human review.
    HumanOverrideRequired,
}

/// A single agent's proposed candidate for this round.
#[derive(Debug, Clone)]
pub struct AgentCandidate {
    /// The proposing agent.
    pub agent_id: AgentId,
    /// The alternative this agent's candidate protocol chose.
    pub alternative: String,
    /// The risk profile this candidate was built at.
    pub risk_profile: RiskProfile,
    /// Whether the Closed Layer blocked this candidate.
    pub blocked: bool,
    /// The stable rule id that blocked this candidate, if any.
    pub block_rule_id: Option<&'static str>,
}

/// Outcome of aggregating a round of [`AgentCandidate`]s.
#[derive(Debug, Clone)]
pub enum AggregationOutcome {
    /// A single candidate was selected to back the persisted Decision.
    Selected(AgentCandidate),
    /// `REQUIRE_CONSENSUS` ran but the non-blocked agents disagreed.
    NoConsensus,
    /// `HUMAN_OVERRIDE_REQUIRED` always returns here with every candidate.
    HumanOverrideRequired(Vec<AgentCandidate>),
    /// Every candidate was blocked by the Closed Layer.
    AllBlocked,
}

/// Deterministically picks an alternative from `alternatives` for the given
/// `risk_profile`: conservative picks the first, moderate the (lower-)
/// middle, aggressive the last.
#[must_use]
pub fn pick_alternative_for_profile(
    alternatives: &[String],
    risk_profile: RiskProfile,
) -> Option<&String> {
    if alternatives.is_empty() {
        return None;
    }
    let index = match risk_profile {
        RiskProfile::Conservative => 0,
        RiskProfile::Moderate => (alternatives.len() - 1) / 2,
        RiskProfile::Aggressive => alternatives.len() - 1,
    };
    alternatives.get(index)
}

/// Aggregates `candidates` under `policy`, in the original agent input
/// order (tie-breaks rely on that order). `profiles` supplies the voting
/// weights [`AggregationPolicy::WeightedMajority`] needs; it is ignored by
/// every other policy and may be empty.
#[must_use]
pub fn aggregate(
    policy: AggregationPolicy,
    candidates: &[AgentCandidate],
    profiles: &[AgentProfile],
) -> AggregationOutcome {
    if matches!(policy, AggregationPolicy::HumanOverrideRequired) {
        return AggregationOutcome::HumanOverrideRequired(candidates.to_vec());
    }

    let non_blocked: Vec<&AgentCandidate> = candidates.iter().filter(|c| !c.blocked).collect();
    if non_blocked.is_empty() {
        return AggregationOutcome::AllBlocked;
    }

    match policy {
        AggregationPolicy::HumanOverrideRequired => unreachable!("handled above"),
        AggregationPolicy::FirstValid => AggregationOutcome::Selected(non_blocked[0].clone()),
        AggregationPolicy::MajorityByAlternative => {
            majority_vote(&non_blocked, |_| 1).map_or(AggregationOutcome::NoConsensus, |winner| {
                AggregationOutcome::Selected(winner.clone())
            })
        }
        AggregationPolicy::WeightedMajority => {
            let weights: HashMap<&str, u32> = profiles
                .iter()
                .map(|profile| (profile.id.as_str(), profile.effective_weight()))
                .collect();
            majority_vote(&non_blocked, |candidate| {
                weights.get(candidate.agent_id.as_str()).copied().unwrap_or(1)
            })
            .map_or(AggregationOutcome::NoConsensus, |winner| {
                AggregationOutcome::Selected(winner.clone())
            })
        }
        AggregationPolicy::RequireConsensus => {
            let first_alternative = &non_blocked[0].alternative;
            let all_agree = non_blocked
                .iter()
                .all(|candidate| &candidate.alternative == first_alternative);
            if all_agree {
                AggregationOutcome::Selected(non_blocked[0].clone())
            } else {
                AggregationOutcome::NoConsensus
            }
        }
    }
}

/// Tallies votes (one alternative per candidate, weighted by `weight_of`),
/// returning the winner under the `most votes, tie-break lexicographically
/// smallest alternative, then earliest agent` rule.
fn majority_vote<'a>(
    candidates: &[&'a AgentCandidate],
    weight_of: impl Fn(&AgentCandidate) -> u32,
) -> Option<&'a AgentCandidate> {
    let mut tally: HashMap<&str, u32> = HashMap::new();
    for candidate in candidates {
        *tally.entry(candidate.alternative.as_str()).or_insert(0) += weight_of(candidate);
    }

    let max_votes = *tally.values().max()?;
    let mut winning_alternatives: Vec<&str> = tally
        .iter()
        .filter(|(_, votes)| **votes == max_votes)
        .map(|(alternative, _)| *alternative)
        .collect();
    winning_alternatives.sort_unstable();
    let winning_alternative = *winning_alternatives.first()?;

    candidates
        .iter()
        .find(|candidate| candidate.alternative == winning_alternative)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(agent: &str, alternative: &str, blocked: bool) -> AgentCandidate {
        AgentCandidate {
            agent_id: AgentId::new(agent),
            alternative: alternative.to_string(),
            risk_profile: RiskProfile::Moderate,
            blocked,
            block_rule_id: if blocked { Some("RISK_REQUIRED") } else { None },
        }
    }

    #[test]
    fn pick_alternative_conservative_takes_first() {
        let alternatives = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(
            pick_alternative_for_profile(&alternatives, RiskProfile::Conservative),
            Some(&"A".to_string())
        );
    }

    #[test]
    fn pick_alternative_aggressive_takes_last() {
        let alternatives = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(
            pick_alternative_for_profile(&alternatives, RiskProfile::Aggressive),
            Some(&"C".to_string())
        );
    }

    #[test]
    fn pick_alternative_moderate_takes_lower_middle() {
        let alternatives = vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()];
        assert_eq!(
            pick_alternative_for_profile(&alternatives, RiskProfile::Moderate),
            Some(&"B".to_string())
        );
    }

    #[test]
    fn first_valid_picks_first_non_blocked_in_order() {
        let candidates = vec![
            candidate("a1", "A", true),
            candidate("a2", "B", false),
            candidate("a3", "C", false),
        ];
        let outcome = aggregate(AggregationPolicy::FirstValid, &candidates, &[]);
        assert!(matches!(outcome, AggregationOutcome::Selected(c) if c.agent_id.as_str() == "a2"));
    }

    #[test]
    fn majority_breaks_ties_lexicographically() {
        let candidates = vec![
            candidate("a1", "B", false),
            candidate("a2", "A", false),
        ];
        let outcome = aggregate(AggregationPolicy::MajorityByAlternative, &candidates, &[]);
        assert!(matches!(outcome, AggregationOutcome::Selected(c) if c.alternative == "A"));
    }

    #[test]
    fn require_consensus_fails_on_disagreement() {
        let candidates = vec![candidate("a1", "A", false), candidate("a2", "B", false)];
        let outcome = aggregate(AggregationPolicy::RequireConsensus, &candidates, &[]);
        assert!(matches!(outcome, AggregationOutcome::NoConsensus));
    }

    #[test]
    fn require_consensus_succeeds_on_agreement() {
        let candidates = vec![candidate("a1", "A", false), candidate("a2", "A", false)];
        let outcome = aggregate(AggregationPolicy::RequireConsensus, &candidates, &[]);
        assert!(matches!(outcome, AggregationOutcome::Selected(_)));
    }

    #[test]
    fn human_override_always_returns_every_candidate() {
        let candidates = vec![candidate("a1", "A", false), candidate("a2", "B", true)];
        let outcome = aggregate(AggregationPolicy::HumanOverrideRequired, &candidates, &[]);
        assert!(matches!(outcome, AggregationOutcome::HumanOverrideRequired(c) if c.len() == 2));
    }

    #[test]
    fn all_blocked_candidates_yield_all_blocked() {
        let candidates = vec![candidate("a1", "A", true), candidate("a2", "B", true)];
        let outcome = aggregate(AggregationPolicy::FirstValid, &candidates, &[]);
        assert!(matches!(outcome, AggregationOutcome::AllBlocked));
    }

    #[test]
    fn weighted_majority_favors_heavier_agent() {
        let candidates = vec![candidate("a1", "A", false), candidate("a2", "B", false)];
        let profiles = vec![
            AgentProfile {
                id: AgentId::new("a1"),
                risk_profile: RiskProfile::Conservative,
                weight: Some(1),
                enabled: true,
            },
            AgentProfile {
                id: AgentId::new("a2"),
                risk_profile: RiskProfile::Aggressive,
                weight: Some(5),
                enabled: true,
            },
        ];
        let outcome = aggregate(AggregationPolicy::WeightedMajority, &candidates, &profiles);
        assert!(matches!(outcome, AggregationOutcome::Selected(c) if c.alternative == "B"));
    }
}
