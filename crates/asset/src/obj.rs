//! Wavefront OBJ subset: `v`, `vt`, `vn`, `f`, `mtllib`, `usemtl`.
//! Everything else (`o`, `g`, `s`, ...) is ignored.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::error::{ImportError, ImportResult};

/// One corner of a face, with 0-based indices into the attribute arrays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FaceVertex {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// A polygon as read from the file. No triangulation happens here.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub corners: Vec<FaceVertex>,
    /// Material active (`usemtl`) when the face was read.
    pub material: Option<String>,
    /// 1-based source line, kept for diagnostics.
    pub line: usize,
}

/// Raw attribute arrays and faces of an OBJ file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
    /// Material library named by `mtllib`. Resolved against the mesh
    /// directory when parsed from a path.
    pub material_library: Option<PathBuf>,
    /// Last material selected with `usemtl`.
    pub active_material: Option<String>,
}

impl ObjData {
    /// Number of face corners, i.e. vertices emitted without triangulation.
    pub fn corner_count(&self) -> usize {
        self.faces.iter().map(|f| f.corners.len()).sum()
    }
}

/// Parser switches that differ between the two face dialects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjParseOptions {
    /// Store texture V as `1 - v`.
    pub flip_v: bool,
    /// Accept only `p/t/n p/t/n p/t/n` faces.
    pub strict: bool,
}

impl Default for ObjParseOptions {
    fn default() -> Self {
        Self {
            flip_v: true,
            strict: false,
        }
    }
}

/// Parse an OBJ file. A relative `mtllib` is resolved against the file's directory.
pub fn parse_obj_from_path(path: impl AsRef<Path>, options: ObjParseOptions) -> ImportResult<ObjData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut data = parse_obj(BufReader::new(file), options)?;

    if let Some(lib) = data.material_library.take() {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        data.material_library = Some(base.join(lib));
    }
    Ok(data)
}

/// Parse OBJ records from any [`BufRead`].
pub fn parse_obj_from_reader<R: BufRead>(reader: R, options: ObjParseOptions) -> ImportResult<ObjData> {
    parse_obj(reader, options)
}

/// Convenience helper to parse an OBJ string literal.
pub fn parse_obj_from_str(contents: &str, options: ObjParseOptions) -> ImportResult<ObjData> {
    parse_obj(io::Cursor::new(contents), options)
}

fn parse_obj<R: BufRead>(reader: R, options: ObjParseOptions) -> ImportResult<ObjData> {
    let mut data = ObjData::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|source| ImportError::Read {
            line: line_no,
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (tag, rest) = split_tag(trimmed);
        let mut parts = rest.split_whitespace();

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                data.positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                let v = if options.flip_v { 1.0 - v } else { v };
                data.texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                data.normals.push([nx, ny, nz]);
            }
            "f" => {
                let corners = if options.strict {
                    parse_strict_face(rest, &data, line_no)?
                } else {
                    parse_face(rest, &data, line_no)?
                };
                data.faces.push(Face {
                    corners,
                    material: data.active_material.clone(),
                    line: line_no,
                });
            }
            "mtllib" => {
                if rest.is_empty() {
                    log::warn!("mtllib without a file name on line {}", line_no);
                    continue;
                }
                if let Some(prev) = &data.material_library {
                    log::debug!("mtllib on line {} replaces {}", line_no, prev.display());
                }
                data.material_library = Some(PathBuf::from(rest));
            }
            "usemtl" => {
                if let Some(name) = parts.next() {
                    log::debug!("Using material '{}' from line {}", name, line_no);
                    data.active_material = Some(name.to_owned());
                }
            }
            _ => {}
        }
    }

    Ok(data)
}

/// Splits a trimmed line into its keyword and the trimmed remainder.
pub(crate) fn split_tag(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((tag, rest)) => (tag, rest.trim()),
        None => (line, ""),
    }
}

pub(crate) fn parse_f32(value: Option<&str>, line: usize, what: &'static str) -> ImportResult<f32> {
    value
        .and_then(|token| token.parse::<f32>().ok())
        .ok_or(ImportError::InvalidNumber { line, what })
}

fn parse_face(rest: &str, data: &ObjData, line: usize) -> ImportResult<Vec<FaceVertex>> {
    let corners = rest
        .split_whitespace()
        .map(|token| parse_face_vertex(token, data, line))
        .collect::<ImportResult<Vec<_>>>()?;

    if corners.len() < 3 {
        return Err(ImportError::MalformedFace {
            line,
            expected: "at least three vertices",
            found: rest.to_owned(),
        });
    }
    Ok(corners)
}

fn parse_strict_face(rest: &str, data: &ObjData, line: usize) -> ImportResult<Vec<FaceVertex>> {
    let malformed = || ImportError::MalformedFace {
        line,
        expected: "three p/t/n triples",
        found: rest.to_owned(),
    };

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(malformed());
    }

    let mut corners = Vec::with_capacity(3);
    for token in tokens {
        let groups: Vec<&str> = token.split('/').collect();
        if groups.len() != 3 || groups.iter().any(|g| g.is_empty()) {
            return Err(malformed());
        }
        corners.push(parse_face_vertex(token, data, line)?);
    }
    Ok(corners)
}

/// Parses `p`, `p/t`, `p/t/n` or `p//n`. Missing trailing groups mean "no reference".
fn parse_face_vertex(token: &str, data: &ObjData, line: usize) -> ImportResult<FaceVertex> {
    let mut split = token.split('/');

    let position = match split.next() {
        Some(value) if !value.is_empty() => resolve_index(value, data.positions.len(), line)?,
        _ => {
            return Err(ImportError::InvalidIndex {
                line,
                token: token.to_owned(),
            });
        }
    };

    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, data.texcoords.len(), line)?),
        _ => None,
    };

    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, data.normals.len(), line)?),
        _ => None,
    };

    Ok(FaceVertex {
        position,
        texcoord,
        normal,
    })
}

/// Converts a 1-based (or negative, relative) index to 0-based.
/// Bounds are checked later, when the buffer is built.
fn resolve_index(token: &str, declared: usize, line: usize) -> ImportResult<usize> {
    let invalid = || ImportError::InvalidIndex {
        line,
        token: token.to_owned(),
    };

    let raw = token.parse::<i64>().map_err(|_| invalid())?;
    match raw {
        0 => Err(invalid()),
        r if r > 0 => usize::try_from(r - 1).map_err(|_| invalid()),
        r => {
            let back = usize::try_from(-r).map_err(|_| invalid())?;
            declared.checked_sub(back).ok_or_else(invalid)
        }
    }
}
