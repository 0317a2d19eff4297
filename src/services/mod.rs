pub mod gate;
pub mod googletag;
pub mod registry;
pub mod scheduler;
