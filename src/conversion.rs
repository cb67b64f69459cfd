use crate::model::{
    CalculationSummary, ConversionOutcome, ConversionResult, ItemInput, ItemKind,
    IterationRecord, ITEM_COUNT,
};
use tracing::{debug, warn};

pub const REQUIREMENT: u64 = 20;

pub const OUTPUT_PER_OPERATION: u64 = 1;

/// Hard ceiling on loop passes in `full_conversion`.
pub const MAX_ITERATIONS: u32 = 1000;

/// Largest quantity or reserve accepted for one kind. Every conversion
/// removes 8 units of total mass, so with 13 kinds at this ceiling the
/// cumulative consumed count stays under 2.5 * 13 * MAX_QUANTITY, which
/// fits in both u64 and the i64 columns of the store.
pub const MAX_QUANTITY: u64 = 100_000_000_000_000_000;

/// The first pass converts everything it can; later passes only touch
/// kinds that opted into auto-repeat.
pub fn is_eligible(iteration: u32, auto_repeat: bool) -> bool {
    iteration <= 1 || auto_repeat
}

pub fn single_conversion(input: &ItemInput) -> ConversionResult {
    let convertible = input.quantity.saturating_sub(input.min_reserve);
    let operation_count = convertible / REQUIREMENT;
    let units_consumed = operation_count * REQUIREMENT;

    ConversionResult {
        input_kind: input.kind,
        input_quantity: input.quantity,
        operation_count,
        units_consumed,
        remainder: input.quantity - units_consumed,
        outputs: input
            .kind
            .others()
            .map(|k| (k, operation_count * OUTPUT_PER_OPERATION))
            .collect(),
    }
}

pub fn full_conversion(inputs: &[ItemInput]) -> ConversionOutcome {
    full_conversion_bounded(inputs, MAX_ITERATIONS)
}

/// Runs the fixed-point loop with an explicit pass limit. Inputs for the
/// same kind later in the slice replace earlier ones; absent kinds start
/// empty with default policy.
pub fn full_conversion_bounded(inputs: &[ItemInput], max_iterations: u32) -> ConversionOutcome {
    let mut config: [ItemInput; ITEM_COUNT] = ItemKind::ALL.map(|k| ItemInput::new(k, 0));
    for input in inputs {
        if input.quantity > MAX_QUANTITY || input.min_reserve > MAX_QUANTITY {
            warn!(item = %input.kind, quantity = input.quantity, "clamping quantity to MAX_QUANTITY");
        }
        config[input.kind.index()] = ItemInput {
            quantity: input.quantity.min(MAX_QUANTITY),
            min_reserve: input.min_reserve.min(MAX_QUANTITY),
            ..*input
        };
    }

    let mut working: [u64; ITEM_COUNT] = config.map(|c| c.quantity);
    let mut consumed = [0u64; ITEM_COUNT];
    let mut received = [0u64; ITEM_COUNT];
    let mut iterations = Vec::new();
    let mut capped = true;

    for iteration in 1..=max_iterations {
        let results: Vec<ConversionResult> = ItemKind::ALL
            .iter()
            .map(|k| &config[k.index()])
            .filter(|c| is_eligible(iteration, c.auto_repeat) && working[c.kind.index()] > 0)
            .map(|c| {
                single_conversion(&ItemInput {
                    quantity: working[c.kind.index()],
                    ..*c
                })
            })
            .filter(|r| r.operation_count > 0)
            .collect();

        if results.is_empty() {
            capped = false;
            break;
        }

        let record = IterationRecord {
            iteration,
            total_operations: results.iter().map(|r| r.operation_count).sum(),
            items_processed: results
                .iter()
                .map(|r| (r.input_kind, r.operation_count))
                .collect(),
        };
        debug!(
            iteration,
            operations = record.total_operations,
            kinds = record.items_processed.len(),
            "autoclave pass"
        );
        iterations.push(record);

        for r in &results {
            let i = r.input_kind.index();
            working[i] -= r.units_consumed;
            consumed[i] += r.units_consumed;
            for (kind, qty) in &r.outputs {
                let o = kind.index();
                working[o] += *qty;
                received[o] += *qty;
            }
        }
    }

    if capped {
        warn!(
            max_iterations,
            "conversion stopped at iteration cap before reaching a fixed point"
        );
    }

    let summaries = ItemKind::ALL.map(|k| {
        let c = &config[k.index()];
        CalculationSummary {
            kind: k,
            original_quantity: c.quantity,
            min_reserve: c.min_reserve,
            auto_repeat: c.auto_repeat,
            total_consumed: consumed[k.index()],
            total_received: received[k.index()],
            final_quantity: working[k.index()],
        }
    });

    ConversionOutcome {
        summaries,
        iterations,
        capped,
    }
}
