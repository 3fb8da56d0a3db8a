pub mod clock;
pub mod engine;
pub mod models;
pub mod registry;
pub mod router;
pub mod selector;
pub mod settings;
