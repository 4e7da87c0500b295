// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;

use ferry_book_domain::RefundPolicyRule;

use crate::connection::InsertedRowId;
use crate::codec::encode_flag;
use crate::diesel_schema::refund_policies;
use crate::error::PersistenceError;

/// Inserts a refund tier and returns its ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_policy_rule(
    conn: &mut SqliteConnection,
    rule: &RefundPolicyRule,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(refund_policies::table)
        .values((
            refund_policies::days_before_departure.eq(i64::from(rule.days_before_departure)),
            refund_policies::refund_percentage.eq(i32::from(rule.refund_percentage)),
            refund_policies::min_fee.eq(rule.min_fee),
            refund_policies::max_fee.eq(rule.max_fee),
            refund_policies::is_active.eq(encode_flag(rule.active)),
        ))
        .execute(conn)?;
    conn.last_row_id()
}

/// Overwrites a refund tier.
///
/// # Errors
///
/// Returns `NotFound` if the rule does not exist.
pub fn update_policy_rule(
    conn: &mut SqliteConnection,
    rule_id: i64,
    rule: &RefundPolicyRule,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(refund_policies::table.filter(refund_policies::rule_id.eq(rule_id)))
            .set((
                refund_policies::days_before_departure.eq(i64::from(rule.days_before_departure)),
                refund_policies::refund_percentage.eq(i32::from(rule.refund_percentage)),
                refund_policies::min_fee.eq(rule.min_fee),
                refund_policies::max_fee.eq(rule.max_fee),
                refund_policies::is_active.eq(encode_flag(rule.active)),
            ))
            .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "refund policy rule {rule_id}"
        )));
    }
    Ok(())
}
