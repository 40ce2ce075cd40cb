//! Display list export
//!
//! Binary layout, little endian, every field 4-byte aligned so the streams
//! can be viewed directly as `Float32Array`s:
//!
//! ```text
//! "B3DLIST1"                      8 bytes magic
//! z_bottom: f32, z_top: f32
//! 5 x stream:
//!   vertex_count: u32
//!   has_normals: u8, has_uvs: u8, 2 bytes padding
//!   vertices: vertex_count x 3 x f32
//!   normals:  vertex_count x 3 x f32   (if has_normals)
//!   uvs:      vertex_count x 2 x f32   (if has_uvs)
//! ```
//!
//! The JSON form carries the same streams base64 encoded.

use super::list::{TexCoord, TriangleDisplayList, TriangleList, Vertex};
use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Serializer};
use std::path::Path;

pub const DISPLAY_LIST_MAGIC: &[u8; 8] = b"B3DLIST1";

pub const STREAM_NAMES: [&str; 5] = ["top", "bottom", "middle", "topSegmentEnds", "bottomSegmentEnds"];

fn push_u32(buffer: &mut Vec<u8>, value: u32) {
    let mut word = [0u8; 4];
    LittleEndian::write_u32(&mut word, value);
    buffer.extend_from_slice(&word);
}

fn push_f32s(buffer: &mut Vec<u8>, values: &[f32]) {
    let start = buffer.len();
    buffer.resize(start + values.len() * 4, 0);
    LittleEndian::write_f32_into(values, &mut buffer[start..]);
}

fn flatten<const N: usize>(values: &[[f32; N]]) -> Vec<f32> {
    values.iter().flat_map(|v| v.iter().copied()).collect()
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    push_f32s(&mut bytes, values);
    bytes
}

impl TriangleList {
    fn write_binary(&self, buffer: &mut Vec<u8>) {
        push_u32(buffer, self.vertices.len() as u32);
        buffer.extend_from_slice(&[self.has_normals() as u8, self.has_uvs() as u8, 0, 0]);
        push_f32s(buffer, &flatten(&self.vertices));
        if self.has_normals() {
            push_f32s(buffer, &flatten(&self.normals));
        }
        if self.has_uvs() {
            push_f32s(buffer, &flatten(&self.uvs));
        }
    }

    fn read_binary(reader: &mut Reader) -> Result<Self> {
        let count = reader.u32()? as usize;
        let flags = reader.bytes(4)?;
        let (has_normals, has_uvs) = (flags[0] != 0, flags[1] != 0);
        let vertices = reader.vectors::<3>(count)?;
        let normals = if has_normals { reader.vectors::<3>(count)? } else { Vec::new() };
        let uvs = if has_uvs { reader.vectors::<2>(count)? } else { Vec::new() };
        Ok(Self { vertices, normals, uvs })
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|&end| end <= self.data.len());
        let Some(end) = end else {
            bail!("display list truncated at byte {} (wanted {} more)", self.offset, len);
        };
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.bytes(4)?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.bytes(4)?))
    }

    fn vectors<const N: usize>(&mut self, count: usize) -> Result<Vec<[f32; N]>> {
        let len = count.checked_mul(N * 4).context("display list stream too large")?;
        let bytes = self.bytes(len)?;
        let mut flat = vec![0.0f32; count * N];
        LittleEndian::read_f32_into(bytes, &mut flat);
        Ok(flat
            .chunks_exact(N)
            .map(|c| {
                let mut v = [0.0f32; N];
                v.copy_from_slice(c);
                v
            })
            .collect())
    }
}

impl TriangleDisplayList {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(DISPLAY_LIST_MAGIC);
        push_f32s(&mut buffer, &[self.z_bottom, self.z_top]);
        for stream in self.streams() {
            stream.write_binary(&mut buffer);
        }
        buffer
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Reader { data, offset: 0 };
        if reader.bytes(8)? != DISPLAY_LIST_MAGIC {
            bail!("not a display list: bad magic");
        }
        let z_bottom = reader.f32()?;
        let z_top = reader.f32()?;
        Ok(Self {
            z_bottom,
            z_top,
            top: TriangleList::read_binary(&mut reader)?,
            bottom: TriangleList::read_binary(&mut reader)?,
            middle: TriangleList::read_binary(&mut reader)?,
            top_segment_ends: TriangleList::read_binary(&mut reader)?,
            bottom_segment_ends: TriangleList::read_binary(&mut reader)?,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()).with_context(|| format!("Failed to write display list {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&DisplayListJson::from(self)).context("Failed to serialize display list")
    }
}

/// Serialize f32 vertex components as base64 of their little-endian bytes
pub fn serialize_vertices_base64<S>(data: &Vec<Vertex>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&general_purpose::STANDARD.encode(f32_bytes(&flatten(data))))
}

/// Optional variant: empty streams serialize as `null`
pub fn serialize_normals_as_base64<S>(data: &Vec<Vertex>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if data.is_empty() {
        return serializer.serialize_none();
    }
    serializer.serialize_some(&general_purpose::STANDARD.encode(f32_bytes(&flatten(data))))
}

pub fn serialize_uvs_as_base64<S>(data: &Vec<TexCoord>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if data.is_empty() {
        return serializer.serialize_none();
    }
    serializer.serialize_some(&general_purpose::STANDARD.encode(f32_bytes(&flatten(data))))
}

/// One stream for JSON transport
#[derive(Serialize, Debug, Clone)]
pub struct StreamJson {
    pub name: String,
    #[serde(rename = "vertexCount")]
    pub vertex_count: usize,
    #[serde(rename = "vertexData", serialize_with = "serialize_vertices_base64")]
    pub vertices: Vec<Vertex>,
    #[serde(rename = "normalData", skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_normals_as_base64")]
    pub normals: Vec<Vertex>,
    #[serde(rename = "uvData", skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_uvs_as_base64")]
    pub uvs: Vec<TexCoord>,
}

#[derive(Serialize, Debug, Clone)]
pub struct DisplayListJson {
    #[serde(rename = "zBottom")]
    pub z_bottom: f32,
    #[serde(rename = "zTop")]
    pub z_top: f32,
    pub streams: Vec<StreamJson>,
}

impl From<&TriangleDisplayList> for DisplayListJson {
    fn from(list: &TriangleDisplayList) -> Self {
        let streams = STREAM_NAMES
            .iter()
            .zip(list.streams())
            .map(|(name, stream)| StreamJson {
                name: name.to_string(),
                vertex_count: stream.vertices.len(),
                vertices: stream.vertices.clone(),
                normals: stream.normals.clone(),
                uvs: stream.uvs.clone(),
            })
            .collect();
        Self { z_bottom: list.z_bottom, z_top: list.z_top, streams }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::display_list::UP;

    fn sample() -> TriangleDisplayList {
        let mut list = TriangleDisplayList::new(-0.1, 0.1);
        list.top.add_triangle([0.0, 0.0, 0.1], [1.0, 0.0, 0.1], [0.0, 1.0, 0.1]);
        list.middle.add_quad_with_normals([[0.0, 0.0, -0.1], [1.0, 0.0, -0.1], [1.0, 0.0, 0.1], [0.0, 0.0, 0.1]], [UP; 4]);
        list.top_segment_ends.add_textured_triangle(
            [[0.0, 0.0, 0.1], [1.0, 0.0, 0.1], [0.5, 1.0, 0.1]],
            [[0.0, 0.5], [1.0, 0.5], [0.5, 1.2]],
        );
        list
    }

    #[test]
    fn test_binary_layout() {
        let list = sample();
        let bytes = list.to_bytes();
        assert_eq!(&bytes[..8], DISPLAY_LIST_MAGIC);
        assert_eq!(bytes.len() % 4, 0);
        // Header, then the top stream's vertex count
        assert_eq!(LittleEndian::read_f32(&bytes[8..12]), -0.1);
        assert_eq!(LittleEndian::read_u32(&bytes[16..20]), 3);
        assert_eq!(&bytes[20..24], &[0, 0, 0, 0]);

        assert_eq!(TriangleDisplayList::from_bytes(&bytes).unwrap(), list);
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let bytes = sample().to_bytes();
        assert!(TriangleDisplayList::from_bytes(&bytes[..bytes.len() - 4]).is_err());
        assert!(TriangleDisplayList::from_bytes(b"NOTALIST").is_err());
    }

    #[test]
    fn test_json_streams() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let streams = value["streams"].as_array().unwrap();
        assert_eq!(streams.len(), 5);
        assert_eq!(streams[0]["name"], "top");
        assert_eq!(streams[0]["vertexCount"], 3);
        assert!(streams[0].get("normalData").is_none());
        assert!(streams[2]["normalData"].is_string());
        assert!(streams[3]["uvData"].is_string());

        let encoded = streams[0]["vertexData"].as_str().unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(bytes.len(), 9 * 4);
        assert_eq!(LittleEndian::read_f32(&bytes[12..16]), 1.0);
    }
}
