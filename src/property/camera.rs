use super::Extras;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        aspect_ratio: Option<f32>,
        yfov: f32,
        zfar: Option<f32>,
        znear: f32,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        zfar: f32,
        znear: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective { aspect_ratio: None, yfov: std::f32::consts::FRAC_PI_3, zfar: None, znear: 0.01 }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Camera {
    pub projection: Projection,
    pub name: Option<String>,
    pub extras: Extras,
}
