//! Cross-module scenarios, built on temporary directories. Most use a
//! recording concatenator; the FFmpeg ones run on generated WAV files.

pub mod e2e;
pub mod fixtures;
