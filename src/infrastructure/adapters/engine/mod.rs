//! Audio Engine Adapters

mod fake_engine;

pub use fake_engine::FakeAudioEngine;
