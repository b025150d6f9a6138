//! Input/output helpers.
//!
//! - series JSON read/write and registry loading (`series_file`)
//! - legacy harvester `.js` data files (`legacy`)
//! - CSV export of derived series (`export`)

pub mod export;
pub mod legacy;
pub mod series_file;

pub use export::*;
pub use series_file::*;
