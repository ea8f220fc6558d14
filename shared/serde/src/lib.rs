//! # Lockstep Serde
//! Byte-level building blocks for the lockstep object-graph codec: a growable
//! writer, a bounds-checked reader, the chunk tags that frame every value and
//! the fixed-width wire primitives.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod chunk;
mod error;
mod integer;
mod serde;
mod stream_reader;
mod stream_writer;

pub use chunk::ChunkType;
pub use error::SerdeErr;
pub use integer::{RefIndex, UnsignedInteger24};
pub use serde::Serde;
pub use stream_reader::StreamReader;
pub use stream_writer::StreamWriter;
