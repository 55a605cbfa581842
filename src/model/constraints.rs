use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::currency::CurrencyCode;
use crate::model::order::OrderId;

#[derive(Copy, Clone, Eq, PartialEq)]
struct ConstraintBits(u8);

impl ConstraintBits {
    const CUR1: ConstraintBits = ConstraintBits(0b0001);
    const CUR2: ConstraintBits = ConstraintBits(0b0010);
    const IDS: ConstraintBits = ConstraintBits(0b0100);
    const TIME: ConstraintBits = ConstraintBits(0b1000);

    fn empty() -> Self {
        ConstraintBits(0)
    }

    fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ConstraintBits {
    type Output = ConstraintBits;
    fn bitor(self, rhs: Self) -> Self::Output {
        ConstraintBits(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ConstraintBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for ConstraintBits {
    type Output = ConstraintBits;
    fn bitand(self, rhs: Self) -> Self::Output {
        ConstraintBits(self.0 & rhs.0)
    }
}

impl std::ops::Not for ConstraintBits {
    type Output = ConstraintBits;
    fn not(self) -> Self::Output {
        ConstraintBits(!self.0 & 0b1111)
    }
}

/// A filtering predicate over (currency pair, id set, time window), with a small bitmap of which
/// predicates are actually set so callers can take fast paths without inspecting every field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryConstraints<Id: Clone + Eq + std::hash::Hash> {
    cur1: Option<CurrencyCode>,
    cur2: Option<CurrencyCode>,
    ids: Option<HashSet<Id>>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl<Id: Clone + Eq + std::hash::Hash> Default for QueryConstraints<Id> {
    fn default() -> Self {
        Self {
            cur1: None,
            cur2: None,
            ids: None,
            since: None,
            until: None,
        }
    }
}

impl<Id: Clone + Eq + std::hash::Hash> QueryConstraints<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currency(mut self, cur1: CurrencyCode) -> Self {
        self.cur1 = Some(cur1);
        self
    }

    pub fn with_market(mut self, cur1: CurrencyCode, cur2: CurrencyCode) -> Self {
        self.cur1 = Some(cur1);
        self.cur2 = Some(cur2);
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_time_window(mut self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    fn bits(&self) -> ConstraintBits {
        let mut bits = ConstraintBits::empty();
        if self.cur1.is_some() {
            bits |= ConstraintBits::CUR1;
        }
        if self.cur2.is_some() {
            bits |= ConstraintBits::CUR2;
        }
        if self.ids.is_some() {
            bits |= ConstraintBits::IDS;
        }
        if self.since.is_some() || self.until.is_some() {
            bits |= ConstraintBits::TIME;
        }
        bits
    }

    pub fn no_constraints(&self) -> bool {
        self.bits().is_empty()
    }

    /// True if the constraint can be fully decided from the (base, quote) pair alone, without
    /// inspecting ids or timestamps.
    pub fn is_market_only_dependent(&self) -> bool {
        let bits = self.bits();
        !bits.is_empty() && (bits & !(ConstraintBits::CUR1 | ConstraintBits::CUR2)).is_empty()
    }

    pub fn cur1(&self) -> Option<CurrencyCode> {
        self.cur1
    }

    pub fn cur2(&self) -> Option<CurrencyCode> {
        self.cur2
    }

    pub fn matches_currency(&self, currency: CurrencyCode) -> bool {
        self.cur1.map(|c| c == currency).unwrap_or(true) && self.cur2.is_none()
    }

    pub fn matches_market(&self, base: CurrencyCode, quote: CurrencyCode) -> bool {
        let cur1_ok = self.cur1.map(|c| c == base || c == quote).unwrap_or(true);
        let cur2_ok = self.cur2.map(|c| c == base || c == quote).unwrap_or(true);
        cur1_ok && cur2_ok
    }

    pub fn matches_id(&self, id: &Id) -> bool {
        self.ids.as_ref().map(|set| set.contains(id)).unwrap_or(true)
    }

    pub fn matches_time(&self, at: DateTime<Utc>) -> bool {
        self.since.map(|s| at >= s).unwrap_or(true) && self.until.map(|u| at <= u).unwrap_or(true)
    }
}

pub type OrdersConstraints = QueryConstraints<OrderId>;
pub type DepositsConstraints = QueryConstraints<String>;
pub type WithdrawsConstraints = QueryConstraints<String>;
