//! Platform I/O adapter (spec §4.F), grounded directly on the teacher's
//! `import::Source` trait: implementors supply bytes for the top-level
//! asset and any externally referenced buffer/image URI, decoupling the
//! codec from any one storage backend.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A source (and sink) of glTF bytes. `read_json`/`read_binary` read the
/// top-level `.gltf`/`.glb` asset; `read_external`/`write_external`
/// resolve sidecar URIs (external `.bin` buffers, external images) found
/// inside it.
pub trait Source {
    fn read_asset(&mut self) -> Result<Vec<u8>>;
    fn read_external(&mut self, uri: &str) -> Result<Vec<u8>>;
    fn write_asset(&mut self, data: &[u8]) -> Result<()>;
    fn write_external(&mut self, uri: &str, data: &[u8]) -> Result<()>;
}

/// The default `std::fs`-backed [`Source`], reading/writing relative to a
/// glTF asset's own path (mirrors the teacher's `FromPath`).
#[derive(Clone, Debug)]
pub struct FsIo {
    path: PathBuf,
}

impl FsIo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FsIo { path: path.into() }
    }

    fn resolve(&self, uri: &str) -> PathBuf {
        let decoded = urlencoding::decode(uri).map(|s| s.into_owned()).unwrap_or_else(|_| uri.to_string());
        self.path.parent().map(|dir| dir.join(&decoded)).unwrap_or_else(|| Path::new(&decoded).to_path_buf())
    }
}

impl Source for FsIo {
    fn read_asset(&mut self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    fn read_external(&mut self, uri: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(uri))?)
    }

    fn write_asset(&mut self, data: &[u8]) -> Result<()> {
        Ok(fs::write(&self.path, data)?)
    }

    fn write_external(&mut self, uri: &str, data: &[u8]) -> Result<()> {
        Ok(fs::write(self.resolve(uri), data)?)
    }
}

/// Decodes a `data:` URI's payload (base64 or percent-encoded), or `None`
/// if `uri` isn't a data URI.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (_mime, payload) = rest.split_once(',')?;
    if rest.contains(";base64,") {
        base64::decode(payload).ok()
    } else {
        urlencoding::decode(payload).ok().map(|s| s.into_owned().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_data_uri() {
        let uri = "data:application/octet-stream;base64,AQID";
        assert_eq!(decode_data_uri(uri), Some(vec![1, 2, 3]));
    }

    #[test]
    fn non_data_uri_returns_none() {
        assert_eq!(decode_data_uri("buffer.bin"), None);
    }
}
