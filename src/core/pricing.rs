use crate::domain::model::{Frequency, SelectionKey};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Amount in cents. Displayed rounded to whole dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Money(u64);

impl Money {
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Negative or non-finite inputs become zero.
    pub fn from_dollars(dollars: f64) -> Self {
        if dollars.is_finite() && dollars > 0.0 {
            Self((dollars * 100.0).round() as u64)
        } else {
            Self(0)
        }
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Half-up rounding to whole dollars.
    pub fn whole_dollars(&self) -> u64 {
        self.0 / 100 + u64::from(self.0 % 100 >= 50)
    }

    /// Applies a percentage discount, rounding half-up to the cent.
    pub fn discounted(&self, percent: u32) -> Self {
        let keep = 100 - u128::from(percent.min(100));
        // keep <= 100, so the result never exceeds the original amount
        Self(((u128::from(self.0) * keep + 50) / 100) as u64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.whole_dollars())
    }
}

/// Base prices per visit frequency plus a discount that only applies to weekly visits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSchedule {
    base: BTreeMap<Frequency, Money>,
    weekly_discount: u32,
}

impl PriceSchedule {
    pub fn new(weekly_discount: u32) -> Self {
        Self {
            base: BTreeMap::new(),
            weekly_discount: weekly_discount.min(100),
        }
    }

    pub fn with_base(mut self, frequency: Frequency, price: Money) -> Self {
        self.base.insert(frequency, price);
        self
    }

    pub fn base_price(&self, frequency: Frequency) -> Option<Money> {
        self.base.get(&frequency).copied()
    }

    pub fn frequencies(&self) -> impl Iterator<Item = Frequency> + '_ {
        self.base.keys().copied()
    }

    pub fn displayed_price(&self, frequency: Frequency) -> Option<Money> {
        let base = self.base_price(frequency)?;
        Some(match frequency {
            Frequency::Weekly => base.discounted(self.weekly_discount),
            _ => base,
        })
    }
}

#[derive(Debug, Clone)]
struct PricedItem {
    schedule: PriceSchedule,
    frequency: Frequency,
}

/// Current frequency choice per priced catalog item. Independent of the selection:
/// switching frequency never selects or deselects anything.
#[derive(Debug, Clone, Default)]
pub struct PricingBoard {
    items: HashMap<SelectionKey, PricedItem>,
}

impl PricingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: SelectionKey, schedule: PriceSchedule, frequency: Frequency) {
        self.items.insert(key, PricedItem { schedule, frequency });
    }

    pub fn frequency(&self, key: &SelectionKey) -> Option<Frequency> {
        self.items.get(key).map(|p| p.frequency)
    }

    pub fn displayed_price(&self, key: &SelectionKey) -> Option<Money> {
        let priced = self.items.get(key)?;
        priced.schedule.displayed_price(priced.frequency)
    }

    /// Switches the frequency and returns the new displayed price. Unknown keys and
    /// frequencies the schedule has no price for leave the board unchanged.
    pub fn set_frequency(&mut self, key: &SelectionKey, frequency: Frequency) -> Option<Money> {
        let priced = self.items.get_mut(key)?;
        let price = priced.schedule.displayed_price(frequency)?;
        priced.frequency = frequency;
        Some(price)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&SelectionKey) -> bool,
    {
        self.items.retain(|key, _| keep(key));
    }
}
