// State - Qearn contract state held in fixed-capacity tables
// Principle: Exact capacities, no hidden allocation growth

pub mod fixed_array;
pub mod records;
pub mod store;

pub use fixed_array::*;
pub use records::*;
pub use store::*;
