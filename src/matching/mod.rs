//! Element discovery and activation: the oracles, the text matcher, and the
//! ordered rule pipeline built on them.
pub mod clickability;
pub mod evaluator;
pub mod pipeline;
pub mod text_matcher;
pub mod visibility;
