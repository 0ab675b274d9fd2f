pub mod memory;
pub mod selector;
pub mod traits;
pub mod types;
