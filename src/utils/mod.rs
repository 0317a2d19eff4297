pub mod diagnostics;
pub mod interval;
pub mod visibility;
