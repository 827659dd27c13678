// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Latest known account state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::amount::Fixed18;

/// Balance and interest rate as of the last successful refresh.
///
/// Never invalidated automatically; refresh after a transaction settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    /// Checksummed account address
    pub account_address: String,
    /// Native balance in human units
    pub native_balance: Fixed18,
    /// Interest rate reported by the contract
    pub interest_rate_percent: Fixed18,
    pub refreshed_at: DateTime<Utc>,
}

/// Single-writer holder of the current [`AccountSnapshot`].
///
/// Only whole snapshots are stored, so balance and rate always come from the
/// same refresh.
#[derive(Debug, Default)]
pub struct AccountStateCache {
    snapshot: Option<AccountSnapshot>,
}

impl AccountStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&AccountSnapshot> {
        self.snapshot.as_ref()
    }

    /// Replace the snapshot with a freshly read one.
    pub fn replace(
        &mut self,
        account_address: String,
        native_balance: Fixed18,
        interest_rate_percent: Fixed18,
    ) -> &AccountSnapshot {
        self.snapshot.insert(AccountSnapshot {
            account_address,
            native_balance,
            interest_rate_percent,
            refreshed_at: Utc::now(),
        })
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}
