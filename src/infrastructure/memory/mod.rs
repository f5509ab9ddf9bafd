//! Memory Layer - In-Memory State Management

mod preference_store;

pub use preference_store::InMemoryPreferenceStore;
