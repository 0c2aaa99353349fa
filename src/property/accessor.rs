//! Accessor arithmetic (spec §4.D): typed reads/writes, normalization,
//! sparse overlay materialization, and quantize/dequantize.

use super::Extras;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    pub fn size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }

    pub fn from_gl(value: u32) -> Option<Self> {
        Some(match value {
            5120 => ComponentType::I8,
            5121 => ComponentType::U8,
            5122 => ComponentType::I16,
            5123 => ComponentType::U16,
            5125 => ComponentType::U32,
            5126 => ComponentType::F32,
            _ => return None,
        })
    }

    pub fn to_gl(self) -> u32 {
        match self {
            ComponentType::I8 => 5120,
            ComponentType::U8 => 5121,
            ComponentType::I16 => 5122,
            ComponentType::U16 => 5123,
            ComponentType::U32 => 5125,
            ComponentType::F32 => 5126,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, ComponentType::F32)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, ComponentType::I8 | ComponentType::I16)
    }

    fn bits(self) -> u32 {
        self.size() as u32 * 8
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Type {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl Type {
    pub fn components(self) -> usize {
        match self {
            Type::Scalar => 1,
            Type::Vec2 => 2,
            Type::Vec3 => 3,
            Type::Vec4 => 4,
            Type::Mat2 => 4,
            Type::Mat3 => 9,
            Type::Mat4 => 16,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Type::Scalar => "SCALAR",
            Type::Vec2 => "VEC2",
            Type::Vec3 => "VEC3",
            Type::Vec4 => "VEC4",
            Type::Mat2 => "MAT2",
            Type::Mat3 => "MAT3",
            Type::Mat4 => "MAT4",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "SCALAR" => Type::Scalar,
            "VEC2" => Type::Vec2,
            "VEC3" => Type::Vec3,
            "VEC4" => Type::Vec4,
            "MAT2" => Type::Mat2,
            "MAT3" => Type::Mat3,
            "MAT4" => Type::Mat4,
            _ => return None,
        })
    }
}

/// A sparse override: `indices[i]` (sorted ascending) receives `values`
/// element `i`, overlaid on an otherwise-zeroed or base-bufferView-backed
/// accessor. Preserved from the source document purely for round-trip
/// metadata; reads always go through the densely materialized `data`.
#[derive(Clone, Debug)]
pub struct Sparse {
    pub indices: Vec<u32>,
    pub values: Vec<u8>,
}

/// A typed, densely packed element array (spec §4.D). `data` always holds
/// `count * type_.components() * component_type.size()` bytes, tightly
/// packed with no inter-element stride; the binary codec is responsible
/// for choosing a buffer-view stride on write.
#[derive(Clone, Debug)]
pub struct Accessor {
    pub component_type: ComponentType,
    pub type_: Type,
    pub normalized: bool,
    pub count: usize,
    pub data: Vec<u8>,
    pub min: Option<Vec<f32>>,
    pub max: Option<Vec<f32>>,
    pub sparse: Option<Sparse>,
    pub name: Option<String>,
    pub extras: Extras,
}

impl Accessor {
    pub fn new(component_type: ComponentType, type_: Type, count: usize) -> Self {
        let len = count * type_.components() * component_type.size();
        Accessor {
            component_type,
            type_,
            normalized: false,
            count,
            data: vec![0u8; len],
            min: None,
            max: None,
            sparse: None,
            name: None,
            extras: None,
        }
    }

    fn element_size(&self) -> usize {
        self.type_.components() * self.component_type.size()
    }

    /// Reads element `index` as `f32`s, applying normalization if set.
    pub fn read_element(&self, index: usize) -> Vec<f32> {
        let n = self.type_.components();
        let stride = self.element_size();
        let base = index * stride;
        let mut out = Vec::with_capacity(n);
        for c in 0..n {
            let off = base + c * self.component_type.size();
            let raw = read_component(&self.data[off..], self.component_type);
            out.push(if self.normalized { normalize_int_to_float(raw, self.component_type) } else { raw });
        }
        out
    }

    /// Writes element `index` from `values` (length must equal the
    /// accessor's component count), applying normalization if set.
    pub fn write_element(&mut self, index: usize, values: &[f32]) {
        let n = self.type_.components();
        assert_eq!(values.len(), n, "value count must match accessor type");
        let stride = self.element_size();
        let base = index * stride;
        for (c, &v) in values.iter().enumerate() {
            let off = base + c * self.component_type.size();
            let raw = if self.normalized { normalize_float_to_int(v, self.component_type) } else { v };
            write_component(&mut self.data[off..], self.component_type, raw);
        }
    }

    /// Applies the sparse override (if any) onto a copy of `data`,
    /// returning the materialized dense array. `base` is typically
    /// `self.data`'s zero-filled initial state before sparse application;
    /// callers reading directly from `data` never need this, it exists for
    /// reconstructing from a base-bufferView + sparse JSON pair during
    /// read.
    pub fn materialize_sparse(base: &[u8], element_size: usize, indices: &[u32], values: &[u8]) -> Vec<u8> {
        let mut out = base.to_vec();
        for (i, &idx) in indices.iter().enumerate() {
            let dst = idx as usize * element_size;
            let src = i * element_size;
            out[dst..dst + element_size].copy_from_slice(&values[src..src + element_size]);
        }
        out
    }

    /// Binary-searches `indices` (must be sorted ascending, as required by
    /// the glTF sparse accessor format) for `element_index`, returning the
    /// overlay row if present.
    pub fn sparse_lookup<'a>(indices: &[u32], values: &'a [u8], element_size: usize, element_index: u32) -> Option<&'a [u8]> {
        indices.binary_search(&element_index).ok().map(|i| &values[i * element_size..(i + 1) * element_size])
    }

    /// Recomputes `min`/`max` over all elements (component-wise).
    pub fn recompute_bounds(&mut self) {
        let n = self.type_.components();
        let mut min = vec![f32::INFINITY; n];
        let mut max = vec![f32::NEG_INFINITY; n];
        for i in 0..self.count {
            let el = self.read_element(i);
            for c in 0..n {
                min[c] = min[c].min(el[c]);
                max[c] = max[c].max(el[c]);
            }
        }
        self.min = Some(min);
        self.max = Some(max);
    }
}

fn read_component(bytes: &[u8], ty: ComponentType) -> f32 {
    match ty {
        ComponentType::I8 => bytes[0] as i8 as f32,
        ComponentType::U8 => bytes[0] as f32,
        ComponentType::I16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f32,
        ComponentType::U16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f32,
        ComponentType::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
        ComponentType::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

fn write_component(bytes: &mut [u8], ty: ComponentType, value: f32) {
    match ty {
        ComponentType::I8 => bytes[0] = (value.round() as i32 as i8) as u8,
        ComponentType::U8 => bytes[0] = value.round() as u32 as u8,
        ComponentType::I16 => bytes[0..2].copy_from_slice(&(value.round() as i32 as i16).to_le_bytes()),
        ComponentType::U16 => bytes[0..2].copy_from_slice(&(value.round() as u32 as u16).to_le_bytes()),
        ComponentType::U32 => bytes[0..4].copy_from_slice(&(value.round() as u32).to_le_bytes()),
        ComponentType::F32 => bytes[0..4].copy_from_slice(&value.to_le_bytes()),
    }
}

/// Signed integers normalize to `[-1, 1]`, unsigned to `[0, 1]`, per the
/// glTF normalized-integer convention.
fn normalize_int_to_float(raw: f32, ty: ComponentType) -> f32 {
    let max = (1u64 << (ty.bits() - ty.is_signed() as u32)) as f32 - 1.0;
    if ty.is_signed() {
        (raw / max).max(-1.0)
    } else {
        raw / max
    }
}

fn normalize_float_to_int(value: f32, ty: ComponentType) -> f32 {
    let max = (1u64 << (ty.bits() - ty.is_signed() as u32)) as f32 - 1.0;
    if ty.is_signed() {
        (value.clamp(-1.0, 1.0) * max).round()
    } else {
        (value.clamp(0.0, 1.0) * max).round()
    }
}

/// Dequantizes a `k`-bit (`k <= storage bits`) normalized integer into a
/// float, as produced by a component-type's normalized reading — exposed
/// standalone for callers decoding a raw quantized value outside an
/// `Accessor` (e.g. while unpacking `KHR_mesh_quantization` data).
pub fn dequantize(raw: i64, bits: u32, signed: bool) -> f32 {
    let max = ((1i64 << (bits - signed as u32)) - 1) as f32;
    if signed {
        (raw as f32 / max).max(-1.0)
    } else {
        raw as f32 / max
    }
}

/// Quantizes a float in `[-1, 1]` (signed) or `[0, 1]` (unsigned) to a
/// `bits`-wide integer, then replicates the high bits into the low bits so
/// the value fills the full storage width of `storage_bits` without biasing
/// toward zero — the standard quantization replication rule for `bits <
/// storage_bits` (e.g. 10-bit normals stored in 16-bit components).
pub fn quantize(value: f32, bits: u32, storage_bits: u32, signed: bool) -> i64 {
    let max = ((1i64 << (bits - signed as u32)) - 1) as f32;
    let clamped = if signed { value.clamp(-1.0, 1.0) } else { value.clamp(0.0, 1.0) };
    let q = (clamped * max).round() as i64;
    if bits >= storage_bits {
        return q;
    }
    let shift = storage_bits - bits;
    let mut replicated = q << shift;
    let mut remaining = shift;
    let src_bits = bits;
    while remaining > 0 {
        let take = remaining.min(src_bits);
        let top = q >> (src_bits - take);
        replicated |= top << (remaining - take);
        remaining -= take;
    }
    replicated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_round_trip_f32() {
        let mut a = Accessor::new(ComponentType::F32, Type::Vec3, 2);
        a.write_element(0, &[1.0, 2.0, 3.0]);
        a.write_element(1, &[-1.0, 0.5, 9.0]);
        assert_eq!(a.read_element(0), vec![1.0, 2.0, 3.0]);
        assert_eq!(a.read_element(1), vec![-1.0, 0.5, 9.0]);
    }

    #[test]
    fn normalized_u8_round_trip() {
        let mut a = Accessor::new(ComponentType::U8, Type::Scalar, 1);
        a.normalized = true;
        a.write_element(0, &[1.0]);
        let v = a.read_element(0)[0];
        assert!((v - 1.0).abs() < 1e-3);
        a.write_element(0, &[0.0]);
        assert_eq!(a.read_element(0)[0], 0.0);
    }

    #[test]
    fn normalized_i16_round_trip_signed_range() {
        let mut a = Accessor::new(ComponentType::I16, Type::Scalar, 1);
        a.normalized = true;
        a.write_element(0, &[-1.0]);
        assert!((a.read_element(0)[0] - -1.0).abs() < 1e-3);
        a.write_element(0, &[1.0]);
        assert!((a.read_element(0)[0] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn sparse_lookup_finds_overlaid_indices() {
        let indices = vec![1u32, 3, 7];
        let values: Vec<u8> = vec![10, 11, 12];
        assert_eq!(Accessor::sparse_lookup(&indices, &values, 1, 3), Some(&values[1..2]));
        assert_eq!(Accessor::sparse_lookup(&indices, &values, 1, 4), None);
    }

    #[test]
    fn quantize_dequantize_round_trip_within_tolerance() {
        let bits = 10;
        let storage = 16;
        let q = quantize(0.5, bits, storage, true);
        let back = dequantize(q >> (storage - bits), bits, true);
        assert!((back - 0.5).abs() < 1.0 / (1i64 << (bits - 1)) as f32);
    }

    #[test]
    fn recompute_bounds_matches_written_elements() {
        let mut a = Accessor::new(ComponentType::F32, Type::Vec3, 2);
        a.write_element(0, &[1.0, -2.0, 0.0]);
        a.write_element(1, &[-1.0, 5.0, 2.0]);
        a.recompute_bounds();
        assert_eq!(a.min.unwrap(), vec![-1.0, -2.0, 0.0]);
        assert_eq!(a.max.unwrap(), vec![1.0, 5.0, 2.0]);
    }
}
