//! Grid handles and the grid system they conform to

mod handle;
mod system;

pub use handle::{Grid, GridId};
pub use system::GridSystem;
