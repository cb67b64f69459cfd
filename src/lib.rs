// Twenty units of one item kind convert into one unit of each of the
// other twelve kinds; conversion runs that to a fixed point, valuation
// prices the inventory before and after.

pub mod conversion;
pub mod import;
pub mod model;
pub mod profile;
pub mod store;
pub mod valuation;

pub use conversion::{full_conversion, single_conversion, MAX_ITERATIONS, MAX_QUANTITY, REQUIREMENT};
pub use model::{ItemInput, ItemKind, PriceSpec, PriceUnit};
pub use profile::{CalculationReport, Profile};
pub use valuation::PriceTable;
