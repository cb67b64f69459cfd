use crate::model::{
    CalculationSummary, ItemKind, PriceSpec, PriceUnit, ValueBreakdown, ValueCalculation,
    ITEM_COUNT,
};
use serde::{Deserialize, Serialize};

/// Normalizes a price in either unit to currency per single item.
/// Unpriced, negative and non-finite values are worth nothing.
pub fn per_item_value(value: f64, unit: PriceUnit) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    match unit {
        PriceUnit::ItemsPerCurrency => 1.0 / value,
        PriceUnit::CurrencyPerItem => value,
    }
}

impl PriceSpec {
    pub fn per_item_value(&self) -> f64 {
        per_item_value(self.value, self.unit)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    specs: [PriceSpec; ITEM_COUNT],
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ItemKind) -> PriceSpec {
        self.specs[kind.index()]
    }

    pub fn set(&mut self, kind: ItemKind, spec: PriceSpec) {
        self.specs[kind.index()] = spec;
    }

    pub fn with(mut self, kind: ItemKind, value: f64, unit: PriceUnit) -> Self {
        self.set(kind, PriceSpec::new(value, unit));
        self
    }

    pub fn value_of(&self, kind: ItemKind) -> f64 {
        self.get(kind).per_item_value()
    }

    pub fn priced_count(&self) -> usize {
        self.specs.iter().filter(|s| s.is_priced()).count()
    }
}

pub fn total_value<I>(quantities: I, prices: &PriceTable) -> f64
where
    I: IntoIterator<Item = (ItemKind, u64)>,
{
    quantities
        .into_iter()
        .map(|(kind, qty)| qty as f64 * prices.value_of(kind))
        .sum()
}

pub fn value_difference(summaries: &[CalculationSummary], prices: &PriceTable) -> ValueCalculation {
    let before_value = total_value(summaries.iter().map(|s| (s.kind, s.original_quantity)), prices);
    let after_value = total_value(summaries.iter().map(|s| (s.kind, s.final_quantity)), prices);
    let difference = after_value - before_value;

    let profit_percent = if before_value > 0.0 {
        (difference / before_value) * 100.0
    } else {
        0.0
    };

    ValueCalculation {
        before_value,
        after_value,
        difference,
        profit_percent,
        is_profitable: difference > 0.0,
    }
}

pub fn value_breakdown(summaries: &[CalculationSummary], prices: &PriceTable) -> Vec<ValueBreakdown> {
    summaries
        .iter()
        .map(|s| {
            let per_item = prices.value_of(s.kind);
            let before_value = s.original_quantity as f64 * per_item;
            let after_value = s.final_quantity as f64 * per_item;
            ValueBreakdown {
                kind: s.kind,
                per_item_value: per_item,
                before_quantity: s.original_quantity,
                after_quantity: s.final_quantity,
                before_value,
                after_value,
                difference: after_value - before_value,
            }
        })
        .collect()
}

pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{}{:.2}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}{:.2}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}{:.1}K", sign, abs / 1_000.0)
    } else {
        format!("{}{:.2}", sign, abs)
    }
}
