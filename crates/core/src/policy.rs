// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::state::PolicyTransition;
use ferry_book_audit::{Action, Actor, AuditEvent, AuditScope, Cause, StateSnapshot};
use ferry_book_domain::RefundPolicyRule;

fn rule_snapshot(rule: Option<&RefundPolicyRule>) -> StateSnapshot {
    StateSnapshot::new(rule.map_or_else(
        || String::from("none"),
        |r| {
            format!(
                "days={},pct={},min={},max={},active={}",
                r.days_before_departure,
                r.refund_percentage,
                r.min_fee.map_or_else(|| String::from("-"), |v| v.to_string()),
                r.max_fee.map_or_else(|| String::from("-"), |v| v.to_string()),
                r.active
            )
        },
    ))
}

/// Validates and records a new refund tier.
///
/// # Errors
///
/// Returns `InvalidRefundPolicy` if the rule is malformed.
pub fn create_policy_rule(
    rule: RefundPolicyRule,
    actor: Actor,
    cause: Cause,
) -> Result<PolicyTransition, CoreError> {
    rule.validate()?;
    let audit_event = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("CreateRefundPolicyRule"),
            Some(format!(
                "{}% from {} day(s) before departure",
                rule.refund_percentage, rule.days_before_departure
            )),
        ),
        rule_snapshot(None),
        rule_snapshot(Some(&rule)),
        AuditScope::new("refund_policy", rule.rule_id),
    );
    Ok(PolicyTransition { rule, audit_event })
}

/// Validates and records an edit to an existing tier, including
/// deactivation.
///
/// # Errors
///
/// Returns `InvalidRefundPolicy` if the edited rule is malformed.
pub fn update_policy_rule(
    existing: &RefundPolicyRule,
    mut updated: RefundPolicyRule,
    actor: Actor,
    cause: Cause,
) -> Result<PolicyTransition, CoreError> {
    updated.rule_id = existing.rule_id;
    updated.validate()?;
    let audit_event = AuditEvent::new(
        actor,
        cause,
        Action::new(String::from("UpdateRefundPolicyRule"), None),
        rule_snapshot(Some(existing)),
        rule_snapshot(Some(&updated)),
        AuditScope::new("refund_policy", existing.rule_id),
    );
    Ok(PolicyTransition {
        rule: updated,
        audit_event,
    })
}
