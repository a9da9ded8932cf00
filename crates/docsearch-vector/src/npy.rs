//! Minimal NumPy `.npy` codec for 2-D little-endian `f32` matrices.
//!
//! Writes format version 1.0 with a `{'descr': '<f4', 'fortran_order': False,
//! 'shape': (rows, cols), }` header, padded so the payload starts on a
//! 64-byte boundary. Reads versions 1.0 through 3.0 with the same contents.

use ndarray::Array2;
use std::io::Write;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;
const F32_DESCR: &str = "<f4";

pub fn write_matrix<W: Write + ?Sized>(out: &mut W, matrix: &Array2<f32>) -> std::io::Result<()> {
    let mut header = format!(
        "{{'descr': '{F32_DESCR}', 'fortran_order': False, 'shape': ({}, {}), }}",
        matrix.nrows(),
        matrix.ncols()
    );
    // magic(6) + version(2) + header length(2) + header + '\n'
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    header.push_str(&" ".repeat((ALIGN - unpadded % ALIGN) % ALIGN));
    header.push('\n');
    let header_len = u16::try_from(header.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "npy header too long"))?;

    out.write_all(MAGIC)?;
    out.write_all(&[1, 0])?;
    out.write_all(&header_len.to_le_bytes())?;
    out.write_all(header.as_bytes())?;
    let mut payload = Vec::with_capacity(matrix.len() * 4);
    // Iteration is in logical (row-major) order regardless of memory layout.
    for v in matrix {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    out.write_all(&payload)
}

/// Parse a complete `.npy` file. Errors describe what is malformed.
pub fn read_matrix(bytes: &[u8]) -> Result<Array2<f32>, String> {
    if bytes.len() < 10 || &bytes[0..6] != MAGIC {
        return Err("missing .npy magic".to_string());
    }
    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (usize::from(u16::from_le_bytes([bytes[8], bytes[9]])), 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated .npy preamble".to_string());
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (usize::try_from(len).map_err(|e| e.to_string())?, 12)
        }
        v => return Err(format!("unsupported .npy version {v}")),
    };
    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err("truncated .npy header".to_string());
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| "header is not valid text".to_string())?;

    let descr = quoted_value(header, "descr").ok_or("header has no descr")?;
    if descr != F32_DESCR {
        return Err(format!("element type {descr} is not little-endian f32"));
    }
    let fortran = raw_value(header, "fortran_order").ok_or("header has no fortran_order")?;
    let fortran_order = match fortran.trim() {
        "False" => false,
        "True" => true,
        other => return Err(format!("bad fortran_order {other}")),
    };
    let shape = parse_shape(header)?;
    let [rows, cols] = shape[..] else {
        return Err(format!("expected a 2-D matrix, found shape {shape:?}"));
    };

    let payload = &bytes[data_start..];
    let expected = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(4))
        .ok_or("shape overflows")?;
    if payload.len() != expected {
        return Err(format!(
            "payload is {} bytes, shape ({rows}, {cols}) needs {expected}",
            payload.len()
        ));
    }
    let values: Vec<f32> = payload
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let matrix = if fortran_order {
        Array2::from_shape_vec((cols, rows), values).map(|m| m.reversed_axes().as_standard_layout().into_owned())
    } else {
        Array2::from_shape_vec((rows, cols), values)
    };
    matrix.map_err(|e| e.to_string())
}

/// Text following `'key':` up to the next top-level comma or closing brace.
fn raw_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("'{key}':");
    let rest = &header[header.find(&needle)? + needle.len()..];
    let end = rest.find([',', '}']).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn quoted_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let raw = raw_value(header, key)?.trim();
    raw.strip_prefix('\'')?.strip_suffix('\'')
}

fn parse_shape(header: &str) -> Result<Vec<usize>, String> {
    let needle = "'shape':";
    let rest = &header[header.find(needle).ok_or("header has no shape")? + needle.len()..];
    let open = rest.find('(').ok_or("shape is not a tuple")?;
    let close = rest.find(')').ok_or("shape is not a tuple")?;
    if close < open {
        return Err("shape is not a tuple".to_string());
    }
    rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().map_err(|e| format!("bad shape entry {s}: {e}")))
        .collect()
}
