//! Wavefront MTL subset: `newmtl`, `Ka`, `Kd`, `Ks`, `Ns`, `map_Kd`.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{ImportError, ImportResult},
    obj::{parse_f32, split_tag},
};

/// A named material. Coefficients start zeroed, as in a fresh MTL entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    /// `map_Kd`, verbatim (may contain spaces).
    pub diffuse_texture: Option<String>,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: Option<f32>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Lighting coefficients, taking the shininess from `fallback` when `Ns` was absent.
    pub fn coefficients(&self, fallback: Coefficients) -> Coefficients {
        Coefficients {
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            shininess: self.shininess.unwrap_or(fallback.shininess),
        }
    }
}

/// Phong lighting coefficients handed to the shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Coefficients {
    /// Defaults used by the single-light Phong scene.
    pub const fn fallback() -> Self {
        Self {
            ambient: [0.2; 3],
            diffuse: [0.7; 3],
            specular: [1.0; 3],
            shininess: 32.0,
        }
    }

    /// Defaults used by the three-light scene.
    pub const fn fallback_bright() -> Self {
        Self {
            diffuse: [0.8; 3],
            shininess: 64.0,
            ..Self::fallback()
        }
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Materials keyed by name.
pub type MaterialLibrary = HashMap<String, Material>;

/// Parse an MTL file.
pub fn parse_mtl_from_path(path: impl AsRef<Path>) -> ImportResult<MaterialLibrary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mtl(BufReader::new(file))
}

/// Parse MTL records from any [`BufRead`].
pub fn parse_mtl_from_reader<R: BufRead>(reader: R) -> ImportResult<MaterialLibrary> {
    parse_mtl(reader)
}

/// Convenience helper to parse an MTL string literal.
pub fn parse_mtl_from_str(contents: &str) -> ImportResult<MaterialLibrary> {
    parse_mtl(io::Cursor::new(contents))
}

fn parse_mtl<R: BufRead>(reader: R) -> ImportResult<MaterialLibrary> {
    let mut materials = MaterialLibrary::new();
    let mut current: Option<String> = None;

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
        if tag == "newmtl" {
            let name = rest.split_whitespace().next().unwrap_or_default().to_owned();
            if materials.contains_key(&name) {
                log::warn!("Material '{}' redefined on line {}", name, line_no);
            }
            materials.insert(name.clone(), Material::new(name.clone()));
            current = Some(name);
            continue;
        }

        // Records before the first `newmtl` have nothing to attach to.
        let Some(material) = current.as_ref().and_then(|name| materials.get_mut(name)) else {
            continue;
        };

        let mut parts = rest.split_whitespace();
        // Unsupported coefficient forms (`Ka spectral ...`, `Kd xyz ...`) are skipped.
        let parsed = match tag {
            "Ka" => parse_rgb(&mut parts, line_no).map(|rgb| material.ambient = rgb),
            "Kd" => parse_rgb(&mut parts, line_no).map(|rgb| material.diffuse = rgb),
            "Ks" => parse_rgb(&mut parts, line_no).map(|rgb| material.specular = rgb),
            "Ns" => parse_f32(parts.next(), line_no, "shininess")
                .map(|ns| material.shininess = Some(ns)),
            "map_Kd" if !rest.is_empty() => {
                log::info!("Found diffuse texture for '{}': {}", material.name, rest);
                material.diffuse_texture = Some(rest.to_owned());
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(err) = parsed {
            log::warn!("Skipping '{}' in material '{}': {}", tag, material.name, err);
        }
    }

    Ok(materials)
}

fn parse_rgb<'a>(parts: &mut impl Iterator<Item = &'a str>, line: usize) -> ImportResult<[f32; 3]> {
    let r = parse_f32(parts.next(), line, "red component")?;
    let g = parse_f32(parts.next(), line, "green component")?;
    let b = parse_f32(parts.next(), line, "blue component")?;
    Ok([r, g, b])
}
