//! Input discovery
//!
//! - Directory listing with extension filtering
//! - Audio stream probing (codec, sample rate, channels, bitrate)

pub mod audio;
pub mod scanner;

pub use audio::{probe_audio, AudioStreamInfo};
pub use scanner::scan_directory;
