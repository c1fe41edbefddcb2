pub mod roster;
pub mod stats;
pub mod validate;
