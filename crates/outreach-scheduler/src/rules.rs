//! Static pre-check gate (component G): a pure, ordered rule pipeline that
//! decides whether a record is eligible for AI analysis this tick, before
//! any LLM call is made. First matching rule wins (spec.md §4.7).

use outreach_graph::Priority;
use serde::{Deserialize, Serialize};

/// `{ minDaysBetweenActions, maxActionAttempts, recordTooRecentDays,
/// recentUpdateCooldownDays, highPriorityMinDays, lowPriorityMultiplier,
/// enabledStatuses, escalationThreshold, batchSize }` (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerRules {
    pub min_days_between_actions: u32,
    pub max_action_attempts: u32,
    pub record_too_recent_days: u32,
    pub recent_update_cooldown_days: u32,
    pub high_priority_min_days: u32,
    pub low_priority_multiplier: f64,
    #[serde(default)]
    pub enabled_statuses: Vec<outreach_graph::RecordStatus>,
    pub escalation_threshold: u32,
    pub batch_size: u32,
}

impl Default for SchedulerRules {
    fn default() -> Self {
        Self {
            min_days_between_actions: 3,
            max_action_attempts: 5,
            record_too_recent_days: 1,
            recent_update_cooldown_days: 1,
            high_priority_min_days: 1,
            low_priority_multiplier: 2.0,
            enabled_statuses: vec![outreach_graph::RecordStatus::Open],
            escalation_threshold: 3,
            batch_size: 50,
        }
    }
}

/// The per-record metrics the rule pipeline reads. `days_since_last_action`
/// is `None` when the record has never been acted on via an action channel
/// ({EMAIL, PHONE, SMS, WHATSAPP}), which the pipeline treats as +infinity.
#[derive(Debug, Clone, Copy)]
pub struct PrecheckInput {
    pub action_count: u32,
    pub days_since_last_action: Option<f64>,
    pub days_since_last_update: f64,
    pub days_since_creation: f64,
    pub priority: Option<Priority>,
}

/// The reason code a rule attaches to its decision. Matches the literal
/// codes in spec.md §4.7's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    MaxAttemptsReached,
    TooSoon,
    RecordTooRecent,
    RecentlyUpdated,
    HighPriorityReady,
    LowPriorityTooSoon,
    FirstActionCandidate,
    NeedsAiAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecheckDecision {
    pub proceed: bool,
    pub reason: ReasonCode,
}

impl PrecheckDecision {
    fn skip(reason: ReasonCode) -> Self {
        Self {
            proceed: false,
            reason,
        }
    }

    fn proceed(reason: ReasonCode) -> Self {
        Self {
            proceed: true,
            reason,
        }
    }
}

/// Evaluates the ordered rule table against `input`, returning the first
/// matching rule's decision. Pure and deterministic: the same `(rules,
/// input)` pair always produces the same decision (spec.md §8 property 6).
pub fn precheck(rules: &SchedulerRules, input: PrecheckInput) -> PrecheckDecision {
    let days_since_last_action = input.days_since_last_action.unwrap_or(f64::INFINITY);

    // 1. actionCount >= maxActionAttempts -> SKIP MAX_ATTEMPTS_REACHED
    if input.action_count >= rules.max_action_attempts {
        return PrecheckDecision::skip(ReasonCode::MaxAttemptsReached);
    }

    // 2. daysSinceLastAction < minDaysBetweenActions -> SKIP TOO_SOON
    if days_since_last_action < rules.min_days_between_actions as f64 {
        return PrecheckDecision::skip(ReasonCode::TooSoon);
    }

    // 3. daysSinceCreation < recordTooRecentDays -> SKIP RECORD_TOO_RECENT
    if input.days_since_creation < rules.record_too_recent_days as f64 {
        return PrecheckDecision::skip(ReasonCode::RecordTooRecent);
    }

    // 4. daysSinceLastUpdate < recentUpdateCooldownDays -> SKIP RECENTLY_UPDATED
    if input.days_since_last_update < rules.recent_update_cooldown_days as f64 {
        return PrecheckDecision::skip(ReasonCode::RecentlyUpdated);
    }

    // 5. priority == HIGH && daysSinceLastAction >= highPriorityMinDays -> PROCEED
    if input.priority == Some(Priority::High)
        && days_since_last_action >= rules.high_priority_min_days as f64
    {
        return PrecheckDecision::proceed(ReasonCode::HighPriorityReady);
    }

    // 6. priority == LOW && daysSinceLastAction < minDaysBetweenActions * lowPriorityMultiplier -> SKIP
    if input.priority == Some(Priority::Low)
        && days_since_last_action < rules.min_days_between_actions as f64 * rules.low_priority_multiplier
    {
        return PrecheckDecision::skip(ReasonCode::LowPriorityTooSoon);
    }

    // 7. actionCount == 0 && daysSinceCreation >= minDaysBetweenActions -> PROCEED
    if input.action_count == 0 && input.days_since_creation >= rules.min_days_between_actions as f64 {
        return PrecheckDecision::proceed(ReasonCode::FirstActionCandidate);
    }

    // default -> PROCEED NEEDS_AI_ANALYSIS
    PrecheckDecision::proceed(ReasonCode::NeedsAiAnalysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> PrecheckInput {
        PrecheckInput {
            action_count: 1,
            days_since_last_action: Some(10.0),
            days_since_last_update: 10.0,
            days_since_creation: 30.0,
            priority: Some(Priority::Medium),
        }
    }

    #[test]
    fn max_attempts_reached_wins_first() {
        let rules = SchedulerRules::default();
        let input = PrecheckInput {
            action_count: 5,
            ..base_input()
        };
        let decision = precheck(&rules, input);
        assert!(!decision.proceed);
        assert_eq!(decision.reason, ReasonCode::MaxAttemptsReached);
    }

    #[test]
    fn too_soon_after_last_action() {
        let rules = SchedulerRules::default();
        let input = PrecheckInput {
            days_since_last_action: Some(1.0),
            ..base_input()
        };
        let decision = precheck(&rules, input);
        assert!(!decision.proceed);
        assert_eq!(decision.reason, ReasonCode::TooSoon);
    }

    #[test]
    fn high_priority_bypasses_low_priority_multiplier_rule() {
        let rules = SchedulerRules::default();
        let input = PrecheckInput {
            action_count: 2,
            days_since_last_action: Some(rules.high_priority_min_days as f64),
            days_since_last_update: 10.0,
            days_since_creation: 30.0,
            priority: Some(Priority::High),
        };
        let decision = precheck(&rules, input);
        assert!(decision.proceed);
        assert_eq!(decision.reason, ReasonCode::HighPriorityReady);
    }

    #[test]
    fn low_priority_too_soon_blocks_before_default() {
        let rules = SchedulerRules::default();
        let input = PrecheckInput {
            action_count: 2,
            days_since_last_action: Some(
                rules.min_days_between_actions as f64 * rules.low_priority_multiplier - 0.5,
            ),
            days_since_last_update: 10.0,
            days_since_creation: 30.0,
            priority: Some(Priority::Low),
        };
        let decision = precheck(&rules, input);
        assert!(!decision.proceed);
        assert_eq!(decision.reason, ReasonCode::LowPriorityTooSoon);
    }

    #[test]
    fn first_action_candidate_when_never_acted_on() {
        let rules = SchedulerRules::default();
        let input = PrecheckInput {
            action_count: 0,
            days_since_last_action: None,
            days_since_last_update: 10.0,
            days_since_creation: 30.0,
            priority: Some(Priority::Medium),
        };
        let decision = precheck(&rules, input);
        assert!(decision.proceed);
        assert_eq!(decision.reason, ReasonCode::FirstActionCandidate);
    }

    #[test]
    fn default_falls_through_to_needs_ai_analysis() {
        let rules = SchedulerRules::default();
        let decision = precheck(&rules, base_input());
        assert!(decision.proceed);
        assert_eq!(decision.reason, ReasonCode::NeedsAiAnalysis);
    }

    #[test]
    fn unrelated_field_swap_does_not_change_outcome() {
        let rules = SchedulerRules::default();
        let a = precheck(&rules, base_input());
        let b = precheck(
            &rules,
            PrecheckInput {
                action_count: base_input().action_count,
                ..PrecheckInput {
                    priority: Some(Priority::Medium),
                    ..base_input()
                }
            },
        );
        assert_eq!(a, b);
    }
}
