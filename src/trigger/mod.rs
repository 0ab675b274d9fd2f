pub mod controller;
pub mod event_bus;
pub mod mutation;
pub mod state;
