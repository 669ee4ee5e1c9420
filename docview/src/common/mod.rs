//! Common types shared by the view engine: values, sort orders, locks and constants.

mod constants;
mod lock;
mod sort_order;
mod value;
pub mod util;

pub use constants::*;
pub use lock::*;
pub use sort_order::*;
pub use util::*;
pub use value::*;
