use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::monetary::MonetaryAmount;
use crate::model::wallet::Wallet;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum WithdrawStatus {
    Initial,
    Processing,
    Success,
    Failed,
}

impl WithdrawStatus {
    pub fn is_terminal_failure(self) -> bool {
        matches!(self, WithdrawStatus::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitiatedWithdrawInfo {
    pub receiving_wallet: Wallet,
    pub withdraw_id: String,
    pub gross_emitted_amount: MonetaryAmount,
    pub initiated_time: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentWithdrawInfo {
    pub net_emitted_amount: MonetaryAmount,
    pub fee: MonetaryAmount,
    pub status: WithdrawStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceivedWithdrawInfo {
    pub deposit_id: String,
    pub net_received_amount: MonetaryAmount,
    pub received_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveredWithdrawInfo {
    pub initiated: InitiatedWithdrawInfo,
    pub received: Option<ReceivedWithdrawInfo>,
}

/// A single candidate for `queryRecentDeposits`, fed into the closest-recent-deposit heuristic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecentDeposit {
    pub deposit_id: String,
    pub amount: MonetaryAmount,
    pub time_point: DateTime<Utc>,
}

/// Relative tolerance within which a deposit amount is considered a match for an expected
/// withdrawal amount (0.1%).
pub const RECENT_DEPOSIT_RELATIVE_TOLERANCE: f64 = 0.001;

/// Deposits older than this, relative to the withdrawal's initiation time, are never considered.
pub fn recent_deposit_max_age() -> ChronoDuration {
    ChronoDuration::days(1)
}

/// Implements §4.H.1: exact match wins outright (most recent if several); otherwise amongst
/// deposits no older than `initiated_time - 1 day`, pick the one closest in amount, breaking
/// ties by recency and then by the candidates' original relative order (a stable sort, so the
/// first-seen deposit among perfect ties is preferred — ties this exact are not expected to
/// occur in practice but the contract must still be deterministic).
pub fn select_closest_recent_deposit<'a>(
    deposits: &'a [RecentDeposit],
    expected: MonetaryAmount,
    initiated_time: DateTime<Utc>,
) -> Option<&'a RecentDeposit> {
    if let Some(exact) = deposits
        .iter()
        .filter(|d| d.amount == expected)
        .max_by_key(|d| d.time_point)
    {
        return Some(exact);
    }

    let cutoff = initiated_time - recent_deposit_max_age();
    let mut candidates: Vec<&RecentDeposit> = deposits.iter().filter(|d| d.time_point >= cutoff).collect();
    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|a, b| {
        let diff_a = (a.amount.to_f64() - expected.to_f64()).abs();
        let diff_b = (b.amount.to_f64() - expected.to_f64()).abs();
        diff_a
            .partial_cmp(&diff_b)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.time_point.cmp(&a.time_point))
    });

    let head = candidates[0];
    let relative_diff = (head.amount.to_f64() - expected.to_f64()).abs() / expected.to_f64();
    if relative_diff <= RECENT_DEPOSIT_RELATIVE_TOLERANCE {
        Some(head)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn ma(s: &str) -> MonetaryAmount {
        MonetaryAmount::from_str(s).unwrap()
    }

    fn dep(id: &str, amount: MonetaryAmount, hours_ago: i64, now: DateTime<Utc>) -> RecentDeposit {
        RecentDeposit {
            deposit_id: id.into(),
            amount,
            time_point: now - ChronoDuration::hours(hours_ago),
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let now = Utc::now();
        let deposits = vec![
            dep("a", ma("1.0 BTC"), 2, now),
            dep("b", ma("0.5 BTC"), 1, now),
        ];
        let found = select_closest_recent_deposit(&deposits, ma("0.5 BTC"), now).unwrap();
        assert_eq!(found.deposit_id, "b");
    }

    #[test]
    fn test_closest_within_tolerance() {
        let now = Utc::now();
        let deposits = vec![dep("a", ma("0.9995 BTC"), 1, now)];
        let found = select_closest_recent_deposit(&deposits, ma("1.0 BTC"), now).unwrap();
        assert_eq!(found.deposit_id, "a");
    }

    #[test]
    fn test_outside_tolerance_rejected() {
        let now = Utc::now();
        let deposits = vec![dep("a", ma("0.9 BTC"), 1, now)];
        assert!(select_closest_recent_deposit(&deposits, ma("1.0 BTC"), now).is_none());
    }

    #[test]
    fn test_too_old_is_dropped() {
        let now = Utc::now();
        let deposits = vec![dep("a", ma("0.9995 BTC"), 30, now)];
        assert!(select_closest_recent_deposit(&deposits, ma("1.0 BTC"), now).is_none());
    }
}
