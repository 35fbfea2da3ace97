//! Source loading for Ostinato - decoding, metadata, and background loads

mod loader;
mod worker;

pub use loader::{LoadError, LoadedTrack, TrackLoader, TrackMetadata};
pub use worker::{LoadOutcome, LoadWorker};
