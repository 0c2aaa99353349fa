//! glTF 2.0 document model, codec, and transform pipeline.

pub use gltf_json as json;

pub mod document;
pub mod error;
pub mod extension;
pub mod graph;
pub mod io;
pub mod logger;
pub mod property;

pub use document::Document;
pub use error::{Error, Result};
pub use io::{read_glb, read_gltf, write_glb, write_gltf, FsIo, Source};
pub use logger::{Level, Logger};
