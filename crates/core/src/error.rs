// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ferry_book_domain::DomainError;
use thiserror::Error;

/// Why a transition function refused to produce a new state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// A ticket, refund or other record named by the command is absent
    /// from the aggregate.
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },
}
