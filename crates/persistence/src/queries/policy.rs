// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;

use ferry_book_domain::RefundPolicyRule;

use crate::codec::encode_flag;
use crate::data_models::RefundPolicyRow;
use crate::diesel_schema::refund_policies;
use crate::error::PersistenceError;

/// Lists refund tiers, most generous threshold first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_policy_rules(
    conn: &mut SqliteConnection,
    active_only: bool,
) -> Result<Vec<RefundPolicyRule>, PersistenceError> {
    let mut query = refund_policies::table
        .order(refund_policies::days_before_departure.desc())
        .select(RefundPolicyRow::as_select())
        .into_boxed();
    if active_only {
        query = query.filter(refund_policies::is_active.eq(encode_flag(true)));
    }
    query
        .load(conn)?
        .into_iter()
        .map(RefundPolicyRule::try_from)
        .collect()
}

/// Retrieves one refund tier.
///
/// # Errors
///
/// Returns `NotFound` if the rule does not exist.
pub fn get_policy_rule(
    conn: &mut SqliteConnection,
    rule_id: i64,
) -> Result<RefundPolicyRule, PersistenceError> {
    let row: RefundPolicyRow = refund_policies::table
        .filter(refund_policies::rule_id.eq(rule_id))
        .select(RefundPolicyRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("refund policy rule {rule_id}")))?;
    RefundPolicyRule::try_from(row)
}
