use super::Extras;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Interpolation {
    Linear,
    Step,
    CubicSpline,
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Linear
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

/// Owns `"channels"` and `"samplers"` edges to
/// [`AnimationChannel`]/[`AnimationSampler`].
#[derive(Clone, Debug, Default)]
pub struct Animation {
    pub name: Option<String>,
    pub extras: Extras,
}

/// Keyframe times/values reached via `"input"`/`"output"` edges to
/// [`crate::property::Accessor`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationSampler {
    pub interpolation: Interpolation,
}

/// Binds a sampler (via the `"sampler"` edge, an index into the owning
/// animation) to a target node/property (via `"targetNode"`).
#[derive(Clone, Copy, Debug)]
pub struct AnimationChannel {
    pub target_path: TargetPath,
}
