//! VoiceRelay - voice capture and upload client
//!
//! This crate records a spoken utterance from the microphone, transcodes it
//! into a canonical 16-bit PCM WAV container, and hands it to a remote
//! speech/agent processing backend.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core business logic, value objects, entities, and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, Opus/Ogg, HTTP, etc.)
//! - **CLI**: Command-line interface and argument parsing

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
