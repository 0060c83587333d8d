pub mod keys;
pub mod plan;
pub mod sync;
