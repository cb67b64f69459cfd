use crate::conversion::{full_conversion, MAX_QUANTITY};
use crate::model::{
    CalculationSummary, ItemInput, ItemKind, IterationRecord, PriceSpec, PriceUnit,
    ValueBreakdown, ValueCalculation, ITEM_COUNT,
};
use crate::valuation::{value_breakdown, value_difference, PriceTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Everything a user has declared: holdings, prices and per-item policy.
/// Setters sanitize, so the engine only ever sees non-negative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    quantities: [u64; ITEM_COUNT],
    min_reserves: [u64; ITEM_COUNT],
    auto_repeat: [bool; ITEM_COUNT],
    pub prices: PriceTable,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            quantities: [0; ITEM_COUNT],
            min_reserves: [0; ITEM_COUNT],
            auto_repeat: [true; ITEM_COUNT],
            prices: PriceTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReport {
    pub summaries: Vec<CalculationSummary>,
    pub iterations: Vec<IterationRecord>,
    pub value: ValueCalculation,
    pub breakdown: Vec<ValueBreakdown>,
    pub capped: bool,
}

impl CalculationReport {
    pub fn total_operations(&self) -> u64 {
        self.iterations.iter().map(|r| r.total_operations).sum()
    }
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self, kind: ItemKind) -> u64 {
        self.quantities[kind.index()]
    }

    pub fn min_reserve(&self, kind: ItemKind) -> u64 {
        self.min_reserves[kind.index()]
    }

    pub fn auto_repeat(&self, kind: ItemKind) -> bool {
        self.auto_repeat[kind.index()]
    }

    pub fn price(&self, kind: ItemKind) -> PriceSpec {
        self.prices.get(kind)
    }

    pub fn set_quantity(&mut self, kind: ItemKind, raw: i64) {
        self.quantities[kind.index()] = clamp_count(raw);
    }

    pub fn set_min_reserve(&mut self, kind: ItemKind, raw: i64) {
        self.min_reserves[kind.index()] = clamp_count(raw);
    }

    pub fn set_auto_repeat(&mut self, kind: ItemKind, enabled: bool) {
        self.auto_repeat[kind.index()] = enabled;
    }

    pub fn set_price(&mut self, kind: ItemKind, raw: f64, unit: PriceUnit) {
        let value = if raw.is_finite() && raw > 0.0 { raw } else { 0.0 };
        self.prices.set(kind, PriceSpec::new(value, unit));
    }

    pub fn merge_detected(&mut self, detected: &HashMap<ItemKind, u64>) {
        for (kind, qty) in detected {
            self.quantities[kind.index()] = (*qty).min(MAX_QUANTITY);
        }
    }

    pub fn clear_quantities(&mut self) {
        self.quantities = [0; ITEM_COUNT];
    }

    pub fn inputs(&self) -> [ItemInput; ITEM_COUNT] {
        ItemKind::ALL.map(|k| {
            ItemInput::new(k, self.quantity(k))
                .with_reserve(self.min_reserve(k))
                .with_auto_repeat(self.auto_repeat(k))
        })
    }

    pub fn calculate(&self) -> CalculationReport {
        let outcome = full_conversion(&self.inputs());
        let value = value_difference(&outcome.summaries, &self.prices);
        let breakdown = value_breakdown(&outcome.summaries, &self.prices);

        info!(
            iterations = outcome.iterations.len(),
            operations = outcome.total_operations(),
            difference = value.difference,
            "calculated autoclave run"
        );

        CalculationReport {
            summaries: outcome.summaries.to_vec(),
            iterations: outcome.iterations,
            value,
            breakdown,
            capped: outcome.capped,
        }
    }
}

fn clamp_count(raw: i64) -> u64 {
    (raw.max(0) as u64).min(MAX_QUANTITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = Profile::new();
        for kind in ItemKind::ALL {
            assert_eq!(p.quantity(kind), 0);
            assert_eq!(p.min_reserve(kind), 0);
            assert!(p.auto_repeat(kind));
            assert_eq!(p.price(kind).unit, PriceUnit::CurrencyPerItem);
            assert!(!p.price(kind).is_priced());
        }
    }

    #[test]
    fn setters_clamp_negatives() {
        let mut p = Profile::new();
        p.set_quantity(ItemKind::Swab, -5);
        p.set_min_reserve(ItemKind::Swab, -1);
        p.set_price(ItemKind::Swab, -2.0, PriceUnit::ItemsPerCurrency);
        assert_eq!(p.quantity(ItemKind::Swab), 0);
        assert_eq!(p.min_reserve(ItemKind::Swab), 0);
        assert_eq!(p.price(ItemKind::Swab).value, 0.0);

        p.set_price(ItemKind::Swab, f64::NAN, PriceUnit::CurrencyPerItem);
        assert_eq!(p.price(ItemKind::Swab).value, 0.0);
    }

    #[test]
    fn setters_cap_at_max_quantity() {
        let mut p = Profile::new();
        p.set_quantity(ItemKind::Gauze, i64::MAX);
        p.set_min_reserve(ItemKind::Gauze, i64::MAX);
        p.merge_detected(&HashMap::from([(ItemKind::Sponge, u64::MAX)]));
        assert_eq!(p.quantity(ItemKind::Gauze), MAX_QUANTITY);
        assert_eq!(p.min_reserve(ItemKind::Gauze), MAX_QUANTITY);
        assert_eq!(p.quantity(ItemKind::Sponge), MAX_QUANTITY);
    }

    #[test]
    fn calculate_at_integer_limits() {
        let mut p = Profile::new();
        for kind in ItemKind::ALL {
            p.set_quantity(kind, i64::MAX);
        }
        p.set_price(ItemKind::Sponge, 1.0, PriceUnit::CurrencyPerItem);

        let report = p.calculate();
        assert!(!report.capped);
        for s in &report.summaries {
            assert_eq!(
                s.final_quantity + s.total_consumed,
                s.original_quantity + s.total_received
            );
        }
        assert!(report.value.profit_percent.is_finite());
    }

    #[test]
    fn merge_overwrites_only_detected() {
        let mut p = Profile::new();
        p.set_quantity(ItemKind::Sponge, 10);
        p.set_quantity(ItemKind::Gauze, 30);

        let detected = HashMap::from([(ItemKind::Gauze, 7), (ItemKind::Splint, 0)]);
        p.merge_detected(&detected);

        assert_eq!(p.quantity(ItemKind::Sponge), 10);
        assert_eq!(p.quantity(ItemKind::Gauze), 7);
        assert_eq!(p.quantity(ItemKind::Splint), 0);
    }

    #[test]
    fn inputs_carry_policy() {
        let mut p = Profile::new();
        p.set_quantity(ItemKind::Suture, 99);
        p.set_min_reserve(ItemKind::Suture, 9);
        p.set_auto_repeat(ItemKind::Suture, false);

        let inputs = p.inputs();
        let suture = inputs[ItemKind::Suture.index()];
        assert_eq!(suture.kind, ItemKind::Suture);
        assert_eq!(suture.quantity, 99);
        assert_eq!(suture.min_reserve, 9);
        assert!(!suture.auto_repeat);
    }

    #[test]
    fn calculate_bundles_engine_and_value() {
        let mut p = Profile::new();
        p.set_quantity(ItemKind::Sponge, 20);
        p.set_price(ItemKind::Sponge, 20.0, PriceUnit::ItemsPerCurrency);
        p.set_price(ItemKind::Gauze, 3.0, PriceUnit::CurrencyPerItem);

        let report = p.calculate();
        assert_eq!(report.summaries.len(), ITEM_COUNT);
        assert_eq!(report.iterations.len(), 1);
        assert_eq!(report.total_operations(), 1);
        assert!(!report.capped);
        assert!((report.value.before_value - 1.0).abs() < 1e-9);
        assert!((report.value.after_value - 3.0).abs() < 1e-9);
        assert!((report.value.profit_percent - 200.0).abs() < 1e-9);
        assert_eq!(report.breakdown.len(), ITEM_COUNT);
    }

    #[test]
    fn calculate_is_repeatable() {
        let mut p = Profile::new();
        for (i, kind) in ItemKind::ALL.into_iter().enumerate() {
            p.set_quantity(kind, 37 * i as i64);
            p.set_auto_repeat(kind, i % 3 != 0);
        }
        assert_eq!(p.calculate(), p.calculate());
    }
}
