//! Cross-module scene tests: documents, play mode, physics and scripts
//! working together.

mod play_mode;
mod round_trip;
