//! 平台相关输出

mod output;

pub use output::{explain, write_raw};
