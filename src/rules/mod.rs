pub mod editor;
pub mod normalize;
pub mod store;
pub mod types;
