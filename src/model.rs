use serde::{Deserialize, Serialize};

pub const ITEM_COUNT: usize = 13;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    Sponge,
    Gauze,
    Bandage,
    Swab,
    Scalpel,
    Forceps,
    Syringe,
    Suture,
    Catheter,
    Splint,
    Tourniquet,
    Antiseptic,
    Stethoscope,
}

impl ItemKind {
    /// Canonical processing order.
    pub const ALL: [ItemKind; ITEM_COUNT] = [
        ItemKind::Sponge,
        ItemKind::Gauze,
        ItemKind::Bandage,
        ItemKind::Swab,
        ItemKind::Scalpel,
        ItemKind::Forceps,
        ItemKind::Syringe,
        ItemKind::Suture,
        ItemKind::Catheter,
        ItemKind::Splint,
        ItemKind::Tourniquet,
        ItemKind::Antiseptic,
        ItemKind::Stethoscope,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn others(self) -> impl Iterator<Item = ItemKind> {
        Self::ALL.into_iter().filter(move |k| *k != self)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sponge => "Sponge",
            Self::Gauze => "Gauze",
            Self::Bandage => "Bandage",
            Self::Swab => "Swab",
            Self::Scalpel => "Scalpel",
            Self::Forceps => "Forceps",
            Self::Syringe => "Syringe",
            Self::Suture => "Suture",
            Self::Catheter => "Catheter",
            Self::Splint => "Splint",
            Self::Tourniquet => "Tourniquet",
            Self::Antiseptic => "Antiseptic",
            Self::Stethoscope => "Stethoscope",
        }
    }

    /// Case-insensitive lookup by display name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<ItemKind> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.display_name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInput {
    pub kind: ItemKind,
    pub quantity: u64,
    pub min_reserve: u64,
    pub auto_repeat: bool,
}

impl ItemInput {
    pub fn new(kind: ItemKind, quantity: u64) -> Self {
        ItemInput {
            kind,
            quantity,
            min_reserve: 0,
            auto_repeat: true,
        }
    }

    pub fn with_reserve(mut self, min_reserve: u64) -> Self {
        self.min_reserve = min_reserve;
        self
    }

    pub fn with_auto_repeat(mut self, auto_repeat: bool) -> Self {
        self.auto_repeat = auto_repeat;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub input_kind: ItemKind,
    pub input_quantity: u64,
    pub operation_count: u64,
    pub units_consumed: u64,
    pub remainder: u64,
    pub outputs: Vec<(ItemKind, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub total_operations: u64,
    pub items_processed: Vec<(ItemKind, u64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSummary {
    pub kind: ItemKind,
    pub original_quantity: u64,
    pub min_reserve: u64,
    pub auto_repeat: bool,
    pub total_consumed: u64,
    pub total_received: u64,
    pub final_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub summaries: [CalculationSummary; ITEM_COUNT],
    pub iterations: Vec<IterationRecord>,
    /// Set when the loop stopped at the iteration cap instead of a fixed point.
    pub capped: bool,
}

impl ConversionOutcome {
    pub fn summary(&self, kind: ItemKind) -> &CalculationSummary {
        &self.summaries[kind.index()]
    }

    pub fn total_operations(&self) -> u64 {
        self.iterations.iter().map(|r| r.total_operations).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceUnit {
    /// "N items cost 1 currency unit"
    ItemsPerCurrency,
    /// "N currency units per item"
    #[default]
    CurrencyPerItem,
}

impl PriceUnit {
    pub const ALL: [PriceUnit; 2] = [PriceUnit::ItemsPerCurrency, PriceUnit::CurrencyPerItem];

    pub fn label(self) -> &'static str {
        match self {
            Self::ItemsPerCurrency => "items per unit",
            Self::CurrencyPerItem => "units per item",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::ItemsPerCurrency => "items_per_currency",
            Self::CurrencyPerItem => "currency_per_item",
        }
    }

    pub fn from_key(key: &str) -> Option<PriceUnit> {
        Self::ALL.into_iter().find(|u| u.key() == key.trim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSpec {
    pub value: f64,
    pub unit: PriceUnit,
}

impl PriceSpec {
    pub fn new(value: f64, unit: PriceUnit) -> Self {
        PriceSpec { value, unit }
    }

    pub fn is_priced(&self) -> bool {
        self.value > 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueCalculation {
    pub before_value: f64,
    pub after_value: f64,
    pub difference: f64,
    pub profit_percent: f64,
    pub is_profitable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBreakdown {
    pub kind: ItemKind,
    pub per_item_value: f64,
    pub before_quantity: u64,
    pub after_quantity: u64,
    pub before_value: f64,
    pub after_value: f64,
    pub difference: f64,
}
