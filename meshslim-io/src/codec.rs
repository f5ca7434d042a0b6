//! Chunked little-endian scene container
//!
//! Layout: `MSLM` magic, `u16` version, `u16` flags, then a sequence of
//! chunks, each a 4-byte tag, a `u32` payload length and the payload. With
//! the aligned flag every payload is zero-padded to a 4-byte boundary.
//!
//! Chunks: `MATL` (materials), `TEXR` (textures) and one `NODE` per scene
//! node. Mesh attributes are stored as `f32` or, for quantized profiles, as
//! normalized integers over the attribute bounds (signed for normals).
//! Unknown chunks are skipped on read.

use crate::error::CodecError;
use crate::profile::ExportProfile;
use crate::{SceneLoader, SceneSerializer};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use meshslim_core::{
    Error, Material, MaterialGroup, MeshBuffer, Point3f, Result, Scene, SceneNode, Texture,
    Vector3f,
};
use std::io::{Cursor, Read, Write};

pub const MAGIC: &[u8; 4] = b"MSLM";
pub const VERSION: u16 = 1;

const HEADER_LEN: usize = 8;
const CHUNK_HEADER_LEN: usize = 8;

const FLAG_QUANTIZED: u16 = 1;
const FLAG_ALIGNED: u16 = 1 << 1;

const TAG_MATERIALS: &[u8; 4] = b"MATL";
const TAG_TEXTURES: &[u8; 4] = b"TEXR";
const TAG_NODE: &[u8; 4] = b"NODE";

const MESH_HAS_NORMALS: u8 = 1;
const MESH_HAS_UVS: u8 = 1 << 1;
const MESH_INDEXED: u8 = 1 << 2;
const MESH_SHORT_INDICES: u8 = 1 << 3;

const TEXTURE_EMBEDDED: u8 = 1;
const NO_TEXTURE: i32 = -1;

const MAX_QUANTIZATION_BITS: u8 = 16;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

type CodecResult<T> = std::result::Result<T, CodecError>;

/// Reads and writes scenes in the `MSLM` container
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySceneCodec;

impl BinarySceneCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SceneLoader for BinarySceneCodec {
    fn load(&self, name: &str, bytes: &[u8]) -> Result<Scene> {
        decode_scene(bytes).map_err(|e| Error::InputLoad {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

impl SceneSerializer for BinarySceneCodec {
    fn serialize(&self, scene: &Scene, profile: &ExportProfile) -> Result<Vec<u8>> {
        encode_scene(scene, profile).map_err(|e| Error::Serialization {
            profile: profile.name.clone(),
            message: e.to_string(),
        })
    }

    fn minify(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let profile = ExportProfile::minimal();
        decode_scene(bytes)
            .and_then(|scene| encode_scene(&scene, &profile))
            .map_err(|e| Error::Serialization {
                profile: profile.name,
                message: e.to_string(),
            })
    }
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8], align: bool) -> CodecResult<()> {
    let len = u32::try_from(payload.len()).map_err(|_| CodecError::write("chunk exceeds 4 GiB"))?;
    out.write_all(tag)?;
    out.write_u32::<LittleEndian>(len)?;
    out.write_all(payload)?;
    if align {
        out.resize(out.len() + padding(payload.len()), 0);
    }
    Ok(())
}

fn write_str(out: &mut Vec<u8>, value: &str) -> CodecResult<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| CodecError::write(format!("string of {} bytes is too long", value.len())))?;
    out.write_u16::<LittleEndian>(len)?;
    out.write_all(value.as_bytes())?;
    Ok(())
}

fn write_len(out: &mut Vec<u8>, len: usize, what: &str) -> CodecResult<()> {
    let len = u32::try_from(len).map_err(|_| CodecError::write(format!("too many {}", what)))?;
    out.write_u32::<LittleEndian>(len)?;
    Ok(())
}

fn check_bits(bits: u8, min: u8, attribute: &str) -> CodecResult<()> {
    if bits < min || bits > MAX_QUANTIZATION_BITS {
        return Err(CodecError::write(format!(
            "{} quantization of {} bits is outside {}..={}",
            attribute, bits, min, MAX_QUANTIZATION_BITS
        )));
    }
    Ok(())
}

fn unorm_levels(bits: u8) -> f32 {
    ((1u32 << bits) - 1) as f32
}

fn snorm_levels(bits: u8) -> f32 {
    ((1u32 << (bits - 1)) - 1) as f32
}

fn write_quantized(out: &mut Vec<u8>, level: u32, bits: u8) -> CodecResult<()> {
    if bits <= 8 {
        out.write_u8(level as u8)?;
    } else {
        out.write_u16::<LittleEndian>(level as u16)?;
    }
    Ok(())
}

fn write_unorm(out: &mut Vec<u8>, value: f32, min: f32, extent: f32, bits: u8) -> CodecResult<()> {
    let t = if extent > 0.0 {
        ((value - min) / extent).clamp(0.0, 1.0)
    } else {
        0.0
    };
    write_quantized(out, (t * unorm_levels(bits)).round() as u32, bits)
}

fn write_snorm(out: &mut Vec<u8>, value: f32, bits: u8) -> CodecResult<()> {
    let q = (value.clamp(-1.0, 1.0) * snorm_levels(bits)).round() as i32;
    if bits <= 8 {
        out.write_i8(q as i8)?;
    } else {
        out.write_i16::<LittleEndian>(q as i16)?;
    }
    Ok(())
}

/// Per-component minimum and extent of a set of points
fn bounds<const N: usize>(points: impl Iterator<Item = [f32; N]>) -> CodecResult<([f32; N], [f32; N])> {
    let mut min = [f32::INFINITY; N];
    let mut max = [f32::NEG_INFINITY; N];
    for p in points {
        for axis in 0..N {
            if !p[axis].is_finite() {
                return Err(CodecError::write("cannot quantize non-finite attribute"));
            }
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let mut extent = [0.0; N];
    for axis in 0..N {
        if min[axis] > max[axis] {
            min[axis] = 0.0;
        } else {
            extent[axis] = max[axis] - min[axis];
        }
    }
    Ok((min, extent))
}

fn write_bounds<const N: usize>(out: &mut Vec<u8>, min: &[f32; N], extent: &[f32; N]) -> CodecResult<()> {
    for v in min.iter().chain(extent.iter()) {
        out.write_f32::<LittleEndian>(*v)?;
    }
    Ok(())
}

fn encode_mesh(out: &mut Vec<u8>, mesh: &MeshBuffer, profile: &ExportProfile) -> CodecResult<()> {
    mesh.validate()
        .map_err(|e| CodecError::write(format!("invalid mesh: {}", e)))?;

    let (position_bits, normal_bits, uv_bits) = match profile.quantization {
        Some(q) => {
            check_bits(q.position_bits, 1, "position")?;
            check_bits(q.normal_bits, 2, "normal")?;
            check_bits(q.uv_bits, 1, "uv")?;
            (q.position_bits, q.normal_bits, q.uv_bits)
        }
        None => (0, 0, 0),
    };

    let short_indices = profile.compact_indices && mesh.vertex_count() <= u16::MAX as usize + 1;
    let mut flags = 0u8;
    if mesh.normals.is_some() {
        flags |= MESH_HAS_NORMALS;
    }
    if mesh.uvs.is_some() {
        flags |= MESH_HAS_UVS;
    }
    if mesh.indices.is_some() {
        flags |= MESH_INDEXED;
        if short_indices {
            flags |= MESH_SHORT_INDICES;
        }
    }

    out.write_u8(flags)?;
    out.write_all(&[position_bits, normal_bits, uv_bits])?;
    write_len(out, mesh.vertex_count(), "vertices")?;

    if position_bits > 0 {
        let (min, extent) = bounds(mesh.positions.iter().map(|p| [p.x, p.y, p.z]))?;
        write_bounds(out, &min, &extent)?;
        for p in &mesh.positions {
            for axis in 0..3 {
                write_unorm(out, p[axis], min[axis], extent[axis], position_bits)?;
            }
        }
    } else {
        for p in &mesh.positions {
            for axis in 0..3 {
                out.write_f32::<LittleEndian>(p[axis])?;
            }
        }
    }

    if let Some(normals) = &mesh.normals {
        for n in normals {
            for axis in 0..3 {
                if normal_bits > 0 {
                    write_snorm(out, n[axis], normal_bits)?;
                } else {
                    out.write_f32::<LittleEndian>(n[axis])?;
                }
            }
        }
    }

    if let Some(uvs) = &mesh.uvs {
        if uv_bits > 0 {
            let (min, extent) = bounds(uvs.iter().copied())?;
            write_bounds(out, &min, &extent)?;
            for uv in uvs {
                for axis in 0..2 {
                    write_unorm(out, uv[axis], min[axis], extent[axis], uv_bits)?;
                }
            }
        } else {
            for uv in uvs {
                out.write_f32::<LittleEndian>(uv[0])?;
                out.write_f32::<LittleEndian>(uv[1])?;
            }
        }
    }

    if let Some(indices) = &mesh.indices {
        write_len(out, indices.len(), "indices")?;
        for &i in indices {
            if short_indices {
                out.write_u16::<LittleEndian>(i as u16)?;
            } else {
                out.write_u32::<LittleEndian>(i)?;
            }
        }
    }

    write_len(out, mesh.groups.len(), "material groups")?;
    for g in &mesh.groups {
        write_len(out, g.start, "group start")?;
        write_len(out, g.count, "group count")?;
        write_len(out, g.material_index, "material index")?;
    }
    Ok(())
}

/// Drop ancillary PNG chunks (text, time, color profiles) except
/// transparency. Non-PNG or malformed data is returned unchanged.
pub fn strip_png_metadata(data: &[u8]) -> Vec<u8> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return data.to_vec();
    }

    let mut out = PNG_SIGNATURE.to_vec();
    let mut pos = PNG_SIGNATURE.len();
    while pos + 12 <= data.len() {
        let len = BigEndian::read_u32(&data[pos..pos + 4]) as usize;
        let end = match (pos + 12).checked_add(len) {
            Some(end) if end <= data.len() => end,
            _ => return data.to_vec(),
        };
        let kind = &data[pos + 4..pos + 8];
        if kind[0].is_ascii_uppercase() || kind == b"tRNS" {
            out.extend_from_slice(&data[pos..end]);
        }
        pos = end;
    }
    out
}

/// Serialize a scene with the given profile
pub fn encode_scene(scene: &Scene, profile: &ExportProfile) -> CodecResult<Vec<u8>> {
    let mut flags = 0u16;
    if profile.is_quantized() {
        flags |= FLAG_QUANTIZED;
    }
    if profile.align_chunks {
        flags |= FLAG_ALIGNED;
    }

    let mut out = Vec::new();
    out.write_all(MAGIC)?;
    out.write_u16::<LittleEndian>(VERSION)?;
    out.write_u16::<LittleEndian>(flags)?;

    let mut payload = Vec::new();
    write_len(&mut payload, scene.materials.len(), "materials")?;
    for material in &scene.materials {
        write_str(&mut payload, &material.name)?;
        for c in material.base_color {
            payload.write_f32::<LittleEndian>(c)?;
        }
        let texture = match material.base_color_texture {
            Some(t) => i32::try_from(t).map_err(|_| CodecError::write("texture index overflow"))?,
            None => NO_TEXTURE,
        };
        payload.write_i32::<LittleEndian>(texture)?;
    }
    write_chunk(&mut out, TAG_MATERIALS, &payload, profile.align_chunks)?;

    payload.clear();
    write_len(&mut payload, scene.textures.len(), "textures")?;
    for texture in &scene.textures {
        write_str(&mut payload, &texture.name)?;
        write_str(&mut payload, &texture.mime_type)?;
        if profile.embed_images {
            let data = if profile.strip_image_metadata {
                strip_png_metadata(&texture.data)
            } else {
                texture.data.clone()
            };
            payload.write_u8(TEXTURE_EMBEDDED)?;
            write_len(&mut payload, data.len(), "texture bytes")?;
            payload.write_all(&data)?;
        } else {
            payload.write_u8(0)?;
            write_len(&mut payload, texture.data.len(), "texture bytes")?;
        }
    }
    write_chunk(&mut out, TAG_TEXTURES, &payload, profile.align_chunks)?;

    for node in &scene.nodes {
        payload.clear();
        write_str(&mut payload, &node.name)?;
        match &node.mesh {
            Some(mesh) => {
                payload.write_u8(1)?;
                encode_mesh(&mut payload, mesh, profile)?;
            }
            None => payload.write_u8(0)?,
        }
        write_chunk(&mut out, TAG_NODE, &payload, profile.align_chunks)?;
    }

    Ok(out)
}

struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    fn remaining(&self) -> usize {
        self.cursor
            .get_ref()
            .len()
            .saturating_sub(self.cursor.position() as usize)
    }

    /// Read a `u32` element count, rejecting counts the payload cannot hold
    fn count(&mut self, element_size: usize, what: &str) -> CodecResult<usize> {
        let count = self.cursor.read_u32::<LittleEndian>()? as usize;
        if count.saturating_mul(element_size) > self.remaining() {
            return Err(CodecError::parse(format!(
                "{} {} exceed the remaining {} bytes",
                count,
                what,
                self.remaining()
            )));
        }
        Ok(count)
    }

    fn string(&mut self) -> CodecResult<String> {
        let len = self.cursor.read_u16::<LittleEndian>()? as usize;
        let mut bytes = vec![0u8; len.min(self.remaining())];
        self.cursor.read_exact(&mut bytes)?;
        if bytes.len() < len {
            return Err(CodecError::parse("truncated string"));
        }
        String::from_utf8(bytes).map_err(|_| CodecError::parse("string is not valid UTF-8"))
    }

    fn f32(&mut self) -> CodecResult<f32> {
        Ok(self.cursor.read_f32::<LittleEndian>()?)
    }

    fn bounds<const N: usize>(&mut self) -> CodecResult<([f32; N], [f32; N])> {
        let mut min = [0.0; N];
        let mut extent = [0.0; N];
        for v in min.iter_mut().chain(extent.iter_mut()) {
            *v = self.f32()?;
        }
        Ok((min, extent))
    }

    fn quantized(&mut self, bits: u8) -> CodecResult<u32> {
        Ok(if bits <= 8 {
            self.cursor.read_u8()? as u32
        } else {
            self.cursor.read_u16::<LittleEndian>()? as u32
        })
    }

    fn unorm(&mut self, min: f32, extent: f32, bits: u8) -> CodecResult<f32> {
        let level = self.quantized(bits)?;
        Ok(min + level as f32 / unorm_levels(bits) * extent)
    }

    fn snorm(&mut self, bits: u8) -> CodecResult<f32> {
        let q = if bits <= 8 {
            self.cursor.read_i8()? as f32
        } else {
            self.cursor.read_i16::<LittleEndian>()? as f32
        };
        Ok((q / snorm_levels(bits)).max(-1.0))
    }
}

fn element_size(bits: u8, components: usize) -> usize {
    match bits {
        0 => 4 * components,
        1..=8 => components,
        _ => 2 * components,
    }
}

fn decode_mesh(reader: &mut Reader<'_>) -> CodecResult<MeshBuffer> {
    let flags = reader.cursor.read_u8()?;
    let mut bits = [0u8; 3];
    reader.cursor.read_exact(&mut bits)?;
    let [position_bits, normal_bits, uv_bits] = bits;
    if position_bits > MAX_QUANTIZATION_BITS
        || normal_bits > MAX_QUANTIZATION_BITS
        || normal_bits == 1
        || uv_bits > MAX_QUANTIZATION_BITS
    {
        return Err(CodecError::parse("invalid quantization bit depth"));
    }

    let vertex_count = reader.count(element_size(position_bits, 3), "vertices")?;
    let mut positions = Vec::with_capacity(vertex_count);
    if position_bits > 0 {
        let (min, extent) = reader.bounds::<3>()?;
        for _ in 0..vertex_count {
            let mut p = [0.0f32; 3];
            for axis in 0..3 {
                p[axis] = reader.unorm(min[axis], extent[axis], position_bits)?;
            }
            positions.push(Point3f::new(p[0], p[1], p[2]));
        }
    } else {
        for _ in 0..vertex_count {
            positions.push(Point3f::new(reader.f32()?, reader.f32()?, reader.f32()?));
        }
    }

    let normals = if flags & MESH_HAS_NORMALS != 0 {
        let mut normals = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            let n = if normal_bits > 0 {
                let n = Vector3f::new(
                    reader.snorm(normal_bits)?,
                    reader.snorm(normal_bits)?,
                    reader.snorm(normal_bits)?,
                );
                n.try_normalize(f32::EPSILON).unwrap_or(n)
            } else {
                Vector3f::new(reader.f32()?, reader.f32()?, reader.f32()?)
            };
            normals.push(n);
        }
        Some(normals)
    } else {
        None
    };

    let uvs = if flags & MESH_HAS_UVS != 0 {
        let mut uvs = Vec::with_capacity(vertex_count);
        if uv_bits > 0 {
            let (min, extent) = reader.bounds::<2>()?;
            for _ in 0..vertex_count {
                uvs.push([
                    reader.unorm(min[0], extent[0], uv_bits)?,
                    reader.unorm(min[1], extent[1], uv_bits)?,
                ]);
            }
        } else {
            for _ in 0..vertex_count {
                uvs.push([reader.f32()?, reader.f32()?]);
            }
        }
        Some(uvs)
    } else {
        None
    };

    let indices = if flags & MESH_INDEXED != 0 {
        let short = flags & MESH_SHORT_INDICES != 0;
        let count = reader.count(if short { 2 } else { 4 }, "indices")?;
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            indices.push(if short {
                reader.cursor.read_u16::<LittleEndian>()? as u32
            } else {
                reader.cursor.read_u32::<LittleEndian>()?
            });
        }
        Some(indices)
    } else {
        None
    };

    let group_count = reader.count(12, "material groups")?;
    let mut groups = Vec::with_capacity(group_count);
    for _ in 0..group_count {
        let start = reader.cursor.read_u32::<LittleEndian>()? as usize;
        let count = reader.cursor.read_u32::<LittleEndian>()? as usize;
        let material = reader.cursor.read_u32::<LittleEndian>()? as usize;
        groups.push(MaterialGroup::new(start, count, material));
    }

    let mesh = MeshBuffer {
        positions,
        normals,
        uvs,
        indices,
        groups,
    };
    mesh.validate()
        .map_err(|e| CodecError::parse(format!("invalid mesh: {}", e)))?;
    Ok(mesh)
}

fn decode_materials(reader: &mut Reader<'_>, scene: &mut Scene) -> CodecResult<()> {
    let count = reader.count(22, "materials")?;
    for _ in 0..count {
        let mut material = Material::new(reader.string()?);
        for c in material.base_color.iter_mut() {
            *c = reader.f32()?;
        }
        let texture = reader.cursor.read_i32::<LittleEndian>()?;
        material.base_color_texture = usize::try_from(texture).ok();
        scene.materials.push(material);
    }
    Ok(())
}

fn decode_textures(reader: &mut Reader<'_>, scene: &mut Scene) -> CodecResult<()> {
    let count = reader.count(9, "textures")?;
    for _ in 0..count {
        let name = reader.string()?;
        let mime_type = reader.string()?;
        let embedded = reader.cursor.read_u8()? & TEXTURE_EMBEDDED != 0;
        let len = reader.count(if embedded { 1 } else { 0 }, "texture bytes")?;
        let mut data = Vec::new();
        if embedded {
            data.resize(len, 0);
            reader.cursor.read_exact(&mut data)?;
        }
        scene.textures.push(Texture {
            name,
            mime_type,
            data,
        });
    }
    Ok(())
}

/// Parse a container produced by [`encode_scene`]
pub fn decode_scene(bytes: &[u8]) -> CodecResult<Scene> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(CodecError::InvalidFormat {
            format: "missing MSLM header".to_string(),
        });
    }
    let version = LittleEndian::read_u16(&bytes[4..6]);
    if version != VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let aligned = LittleEndian::read_u16(&bytes[6..8]) & FLAG_ALIGNED != 0;

    let mut scene = Scene::new();
    let mut pos = HEADER_LEN;
    while pos < bytes.len() {
        if pos + CHUNK_HEADER_LEN > bytes.len() {
            return Err(CodecError::parse("truncated chunk header"));
        }
        let tag = &bytes[pos..pos + 4];
        let len = LittleEndian::read_u32(&bytes[pos + 4..pos + 8]) as usize;
        let start = pos + CHUNK_HEADER_LEN;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| CodecError::parse("chunk runs past the end of the data"))?;
        let mut reader = Reader::new(&bytes[start..end]);

        if tag == TAG_MATERIALS {
            decode_materials(&mut reader, &mut scene)?;
        } else if tag == TAG_TEXTURES {
            decode_textures(&mut reader, &mut scene)?;
        } else if tag == TAG_NODE {
            let name = reader.string()?;
            let mesh = match reader.cursor.read_u8()? {
                0 => None,
                _ => Some(decode_mesh(&mut reader)?),
            };
            scene.nodes.push(SceneNode::new(name, mesh));
        }

        pos = end;
        if aligned {
            pos = (pos + padding(len)).min(bytes.len());
        }
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_foreign_bytes() {
        assert!(matches!(
            decode_scene(b"glTF\x02\x00\x00\x00"),
            Err(CodecError::InvalidFormat { .. })
        ));
        assert!(matches!(
            decode_scene(b"MSLM\x09\x00\x00\x00"),
            Err(CodecError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_empty_scene_layout() {
        let bytes = encode_scene(&Scene::new(), &ExportProfile::plain_binary()).unwrap();
        // header + MATL(4) + TEXR(4)
        assert_eq!(bytes.len(), HEADER_LEN + 2 * (CHUNK_HEADER_LEN + 4));
        assert_eq!(&bytes[..4], MAGIC);
        let scene = decode_scene(&bytes).unwrap();
        assert!(scene.nodes.is_empty());
    }

    #[test]
    fn test_oversized_count_is_rejected() {
        let mut bytes = encode_scene(&Scene::new(), &ExportProfile::plain_binary()).unwrap();
        // Claim a billion materials
        bytes[HEADER_LEN + CHUNK_HEADER_LEN..HEADER_LEN + CHUNK_HEADER_LEN + 4]
            .copy_from_slice(&1_000_000_000u32.to_le_bytes());
        assert!(matches!(decode_scene(&bytes), Err(CodecError::ParseError { .. })));
    }

    #[test]
    fn test_strip_png_metadata() {
        fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
            let mut c = (data.len() as u32).to_be_bytes().to_vec();
            c.extend_from_slice(kind);
            c.extend_from_slice(data);
            c.extend_from_slice(&[0, 0, 0, 0]);
            c
        }
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(chunk(b"IHDR", &[0; 13]));
        png.extend(chunk(b"tEXt", b"Software\0some editor"));
        png.extend(chunk(b"tRNS", &[0; 2]));
        png.extend(chunk(b"IDAT", &[1; 20]));
        png.extend(chunk(b"IEND", &[]));

        let stripped = strip_png_metadata(&png);
        assert_eq!(stripped.len(), png.len() - chunk(b"tEXt", b"Software\0some editor").len());
        assert!(!stripped.windows(4).any(|w| w == b"tEXt"));
        assert!(stripped.windows(4).any(|w| w == b"tRNS"));

        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0, 4];
        assert_eq!(strip_png_metadata(&jpeg), jpeg);
    }
}
