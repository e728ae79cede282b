//! Binary STL serialization
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    - Header (free-form, not semantically significant)
//! UINT32       - Number of triangles, little-endian
//! foreach triangle
//!     REAL32[3] - Normal vector
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute byte count (zero)
//! end
//! ```
//!
//! The writer either completes the whole byte stream for a mesh or fails;
//! it never emits a NaN normal — a zero-length cross product aborts the
//! write instead.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use glam::DVec3;

use super::{Mesh, Triangle};
use crate::error::{GlobeError, Result};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Serialize a mesh as binary STL to any writer
///
/// # Errors
///
/// Returns `DegenerateMesh` if any triangle has a zero-length face normal
/// (the mesh invariant forbids this, so encountering one means the input is
/// corrupt and the file must not be produced), or `Io` on a write failure.
pub fn write_stl<W: Write>(writer: &mut W, mesh: &Mesh) -> Result<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"relief_globe binary STL";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    if mesh.triangle_count() > u32::MAX as usize {
        return Err(GlobeError::DegenerateMesh(format!(
            "{} triangles exceed the STL u32 count field",
            mesh.triangle_count()
        )));
    }
    let count = mesh.triangle_count() as u32;
    writer.write_all(&count.to_le_bytes())?;

    for (i, tri) in mesh.triangles().iter().enumerate() {
        let normal = tri.normal_direction();
        let len = normal.length();
        if !(len > 0.0) {
            return Err(GlobeError::DegenerateMesh(format!(
                "triangle {} has a zero-length normal",
                i
            )));
        }
        let normal = normal / len;

        write_vec3(writer, normal)?;
        write_vec3(writer, tri.a)?;
        write_vec3(writer, tri.b)?;
        write_vec3(writer, tri.c)?;
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

/// Write a mesh as binary STL to a file
///
/// The file handle is buffered and flushed before returning; on error the
/// partially written target is the caller's to discard.
///
/// # Example
///
/// ```no_run
/// use relief_globe::{save_stl, Mesh};
///
/// let mesh = Mesh::new();
/// save_stl("globe.stl", &mesh).unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(path: P, mesh: &Mesh) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl(&mut writer, mesh)?;
    writer.flush()?;
    Ok(())
}

/// Parse a binary STL byte stream back into a mesh
///
/// Stored normals are ignored; they are derived data and are recomputed
/// from the winding wherever needed.
///
/// # Errors
///
/// Returns `Io` if the stream is shorter than its header's triangle count
/// promises.
pub fn read_stl<R: Read>(mut reader: R) -> Result<Mesh> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut count_bytes = [0u8; 4];
    reader.read_exact(&mut count_bytes)?;
    let count = u32::from_le_bytes(count_bytes);

    let mut mesh = Mesh::with_capacity(count as usize);
    let mut record = [0u8; TRIANGLE_SIZE];
    for _ in 0..count {
        reader.read_exact(&mut record)?;
        let a = read_vec3(&record[12..24]);
        let b = read_vec3(&record[24..36]);
        let c = read_vec3(&record[36..48]);
        mesh.push(Triangle::new(a, b, c));
    }

    Ok(mesh)
}

/// Load a binary STL file
pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let file = File::open(path)?;
    read_stl(BufReader::new(file))
}

/// Write a vector as 3 little-endian f32s
///
/// f64 to f32 truncation is intentional: the STL format stores f32.
fn write_vec3<W: Write>(writer: &mut W, v: DVec3) -> Result<()> {
    writer.write_all(&(v.x as f32).to_le_bytes())?;
    writer.write_all(&(v.y as f32).to_le_bytes())?;
    writer.write_all(&(v.z as f32).to_le_bytes())?;
    Ok(())
}

/// Read a vector from 12 bytes (3 little-endian f32s)
fn read_vec3(buf: &[u8]) -> DVec3 {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    DVec3::new(f64::from(x), f64::from(y), f64::from(z))
}
