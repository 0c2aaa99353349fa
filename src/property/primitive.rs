use super::Extras;

/// Topology of a primitive's indices/vertex stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Triangles
    }
}

impl Mode {
    pub fn from_gl(value: u32) -> Option<Self> {
        Some(match value {
            0 => Mode::Points,
            1 => Mode::Lines,
            2 => Mode::LineLoop,
            3 => Mode::LineStrip,
            4 => Mode::Triangles,
            5 => Mode::TriangleStrip,
            6 => Mode::TriangleFan,
            _ => return None,
        })
    }

    pub fn to_gl(self) -> u32 {
        match self {
            Mode::Points => 0,
            Mode::Lines => 1,
            Mode::LineLoop => 2,
            Mode::LineStrip => 3,
            Mode::Triangles => 4,
            Mode::TriangleStrip => 5,
            Mode::TriangleFan => 6,
        }
    }
}

/// A drawable primitive. Vertex attributes are reached via edges named by
/// their semantic (`"POSITION"`, `"NORMAL"`, `"TEXCOORD_0"`, ...), indices
/// via `"indices"`, material via `"material"`, and morph targets via
/// `"morphTarget{n}.{SEMANTIC}"`.
#[derive(Clone, Debug, Default)]
pub struct Primitive {
    pub mode: Mode,
    /// Number of morph targets declared (each target's accessors are
    /// reached as `"morphTarget{i}.{SEMANTIC}"` edges for `i` in
    /// `0..target_count`).
    pub target_count: usize,
    pub extras: Extras,
}
