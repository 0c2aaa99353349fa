//! GLB binary container framing (spec §4.E): the 12-byte header plus a
//! sequence of 4-byte-aligned chunks.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::{Error, Result};

pub const MAGIC: u32 = 0x46546C67; // "glTF"
pub const VERSION: u32 = 2;
pub const JSON_CHUNK_TYPE: u32 = 0x4E4F534A; // "JSON"
pub const BIN_CHUNK_TYPE: u32 = 0x004E4942; // "BIN\0"

/// One decoded chunk: its declared type and raw (still-padded) payload.
pub struct Chunk {
    pub chunk_type: u32,
    pub data: Vec<u8>,
}

/// A parsed GLB container: the mandatory JSON chunk plus an optional BIN
/// chunk. Chunks of any other type are read and discarded — the `?`
/// extensibility the format reserves for future chunk kinds (spec §8
/// unknown-chunk-tolerance).
pub struct Glb {
    pub json: Vec<u8>,
    pub bin: Option<Vec<u8>>,
}

pub fn read<R: Read>(mut reader: R) -> Result<Glb> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != MAGIC {
        return Err(Error::Parse(format!("not a GLB file: bad magic {magic:#010x}")));
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(Error::Parse(format!("unsupported GLB version {version}")));
    }
    let total_length = reader.read_u32::<LittleEndian>()?;

    let mut remaining = total_length.saturating_sub(12) as i64;
    let mut json = None;
    let mut bin = None;

    while remaining > 0 {
        let chunk_length = reader.read_u32::<LittleEndian>()?;
        let chunk_type = reader.read_u32::<LittleEndian>()?;
        let mut data = vec![0u8; chunk_length as usize];
        reader.read_exact(&mut data)?;
        remaining -= 8 + chunk_length as i64;

        match chunk_type {
            JSON_CHUNK_TYPE => json = Some(data),
            BIN_CHUNK_TYPE => bin = Some(data),
            _ => {} // unknown chunk type: tolerated, discarded
        }
    }

    let json = json.ok_or_else(|| Error::Parse("GLB file has no JSON chunk".to_string()))?;
    Ok(Glb { json, bin })
}

fn pad(data: &mut Vec<u8>, fill: u8) {
    while data.len() % 4 != 0 {
        data.push(fill);
    }
}

pub fn write<W: Write>(mut writer: W, json: &[u8], bin: Option<&[u8]>) -> Result<()> {
    let mut json_padded = json.to_vec();
    pad(&mut json_padded, b' ');

    let mut bin_padded = bin.map(|b| b.to_vec());
    if let Some(bin) = bin_padded.as_mut() {
        pad(bin, 0);
    }

    let mut total_length = 12 + 8 + json_padded.len() as u32;
    if let Some(bin) = &bin_padded {
        total_length += 8 + bin.len() as u32;
    }

    writer.write_u32::<LittleEndian>(MAGIC)?;
    writer.write_u32::<LittleEndian>(VERSION)?;
    writer.write_u32::<LittleEndian>(total_length)?;

    writer.write_u32::<LittleEndian>(json_padded.len() as u32)?;
    writer.write_u32::<LittleEndian>(JSON_CHUNK_TYPE)?;
    writer.write_all(&json_padded)?;

    if let Some(bin) = bin_padded {
        writer.write_u32::<LittleEndian>(bin.len() as u32)?;
        writer.write_u32::<LittleEndian>(BIN_CHUNK_TYPE)?;
        writer.write_all(&bin)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_json_and_bin_chunks() {
        let json = br#"{"asset":{"version":"2.0"}}"#;
        let bin = vec![1u8, 2, 3];
        let mut buf = Vec::new();
        write(&mut buf, json, Some(&bin)).unwrap();

        let glb = read(Cursor::new(buf)).unwrap();
        assert_eq!(&glb.json[..json.len()], json);
        assert_eq!(&glb.bin.unwrap()[..3], &bin[..]);
    }

    #[test]
    fn tolerates_and_discards_unknown_chunks() {
        let json = br#"{"asset":{"version":"2.0"}}"#;
        let mut buf = Vec::new();
        write(&mut buf, json, None).unwrap();

        // Splice an unknown chunk type ("FOO\0") in before the end.
        let mut patched = buf[..12].to_vec();
        let unknown_data = b"????";
        patched.extend_from_slice(&(unknown_data.len() as u32).to_le_bytes());
        patched.extend_from_slice(b"FOO\0");
        patched.extend_from_slice(unknown_data);
        patched.extend_from_slice(&buf[12..]);
        let new_total = patched.len() as u32;
        patched[8..12].copy_from_slice(&new_total.to_le_bytes());

        let glb = read(Cursor::new(patched)).unwrap();
        assert_eq!(&glb.json[..json.len()], json);
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = vec![0u8; 12];
        assert!(read(Cursor::new(buf)).is_err());
    }
}
