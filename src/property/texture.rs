use super::Extras;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WrappingMode {
    ClampToEdge,
    MirroredRepeat,
    Repeat,
}

impl Default for WrappingMode {
    fn default() -> Self {
        WrappingMode::Repeat
    }
}

/// An image plus its sampler parameters, collapsed into a single property
/// (the data model has no standalone `Image`/`Sampler` property types).
#[derive(Clone, Debug, Default)]
pub struct Texture {
    pub mime_type: Option<String>,
    /// Raw encoded image bytes (PNG/JPEG). Only header metadata
    /// (`width`/`height`) is ever decoded from it.
    pub data: Option<Vec<u8>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mag_filter: Option<MagFilter>,
    pub min_filter: Option<MinFilter>,
    pub wrap_s: WrappingMode,
    pub wrap_t: WrappingMode,
    pub name: Option<String>,
    pub extras: Extras,
}

impl Texture {
    /// Reads `width`/`height` from the image header without decoding pixel
    /// data, per the non-goal that only dimensions/channel counts matter.
    pub fn read_dimensions(&mut self) -> crate::error::Result<()> {
        let Some(data) = self.data.as_ref() else { return Ok(()) };
        let reader = image::ImageReader::new(std::io::Cursor::new(data))
            .with_guessed_format()
            .map_err(crate::error::Error::Io)?;
        let (w, h) = reader
            .into_dimensions()
            .map_err(|e| crate::error::Error::Parse(e.to_string()))?;
        self.width = Some(w);
        self.height = Some(h);
        Ok(())
    }
}
