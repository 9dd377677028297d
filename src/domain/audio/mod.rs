//! Audio domain module

mod decoded;
mod encoded;
pub mod wav;

pub use decoded::DecodedAudio;
pub use encoded::{AudioMimeType, EncodedAudio, EncodedChunk};
pub use wav::WavPayload;
