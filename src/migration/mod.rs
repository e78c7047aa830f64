// Migration - Legacy state -> state with epoch statistics
// Principle: Read everything, compute in memory, replace the file in one step

pub mod backfill;
pub mod driver;

pub use backfill::*;
pub use driver::*;
