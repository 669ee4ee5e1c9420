mod field_utils;
mod type_utils;

pub use field_utils::*;
pub use type_utils::*;
