//! One configurable importer for every mesh dialect the scenes use.
//!
//! The two presets mirror the two ways meshes are drawn:
//! - [`ImportOptions::textured`]: `{position, texcoord, color}`, V flipped,
//!   tolerant faces (`p`, `p/t`, `p//n`, `p/t/n`, any corner count).
//! - [`ImportOptions::lit`]: `{position, color, normal, texcoord}`, V as-is,
//!   strict `p/t/n` triangles with normals.
//!
//! Failures are returned as [`ImportError`]; the `*_or_*` helpers turn them
//! into a logged fallback so callers can keep drawing something.

use std::path::{Path, PathBuf};

use crate::{
    buffer::{InterleavedBuffer, build_interleaved},
    error::{ImportError, ImportResult},
    layout::VertexLayout,
    mtl::{Coefficients, Material, MaterialLibrary, parse_mtl_from_path},
    obj::{ObjData, ObjParseOptions, parse_obj_from_path, parse_obj_from_str},
    primitive::generate_uv_sphere,
};

/// What to do with a face index that points past its attribute array.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IndexPolicy {
    /// Abort the whole import.
    #[default]
    Fail,
    /// Drop the corner (position) or use the default (texcoord/normal).
    Skip,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportOptions {
    pub layout: VertexLayout,
    pub flip_v: bool,
    pub strict: bool,
    pub tolerate_missing_normals: bool,
    /// Fan-triangulate polygons with more than three corners.
    pub triangulate: bool,
    pub index_policy: IndexPolicy,
    /// Placeholder vertex color, visible when no texture is bound.
    pub color: [f32; 3],
    pub default_normal: [f32; 3],
}

impl ImportOptions {
    pub fn textured() -> Self {
        Self {
            layout: VertexLayout::textured(),
            flip_v: true,
            strict: false,
            tolerate_missing_normals: true,
            triangulate: false,
            index_policy: IndexPolicy::Fail,
            color: [1.0, 0.0, 0.0],
            default_normal: [0.0, 0.0, 1.0],
        }
    }

    pub fn lit() -> Self {
        Self {
            layout: VertexLayout::lit(),
            flip_v: false,
            strict: true,
            tolerate_missing_normals: false,
            ..Self::textured()
        }
    }

    pub fn parse_options(&self) -> ObjParseOptions {
        ObjParseOptions {
            flip_v: self.flip_v,
            strict: self.strict,
        }
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::textured()
    }
}

/// Result of a successful import (or of a fallback).
#[derive(Clone, Debug)]
pub struct ImportedMesh {
    pub buffer: InterleavedBuffer,
    pub materials: MaterialLibrary,
    /// The material selected by the last `usemtl`, if it was found.
    pub material: Option<Material>,
    /// `map_Kd` of `material`, resolved against the MTL directory.
    pub texture_path: Option<PathBuf>,
    /// `true` when the buffer is procedural rather than read from a file.
    pub is_fallback: bool,
}

impl ImportedMesh {
    pub fn vertex_count(&self) -> usize {
        self.buffer.vertex_count()
    }

    /// Material coefficients, or `fallback` when no material is active.
    pub fn coefficients(&self, fallback: Coefficients) -> Coefficients {
        self.material
            .as_ref()
            .map_or(fallback, |m| m.coefficients(fallback))
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshImporter {
    options: ImportOptions,
    material_file: Option<PathBuf>,
}

impl MeshImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            material_file: None,
        }
    }

    /// Use this MTL file instead of the one named by `mtllib`.
    pub fn with_material_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.material_file = Some(path.into());
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Parse the mesh, its material library and build the vertex buffer.
    pub fn import(&self, path: impl AsRef<Path>) -> ImportResult<ImportedMesh> {
        let path = path.as_ref();
        log::info!("Importing mesh {}", path.display());
        let obj = parse_obj_from_path(path, self.options.parse_options())?;
        self.finish(obj)
    }

    /// Import from OBJ text. A relative `mtllib` resolves against the working directory.
    pub fn import_str(&self, contents: &str) -> ImportResult<ImportedMesh> {
        let obj = parse_obj_from_str(contents, self.options.parse_options())?;
        self.finish(obj)
    }

    /// Import, or log the failure and return a UV sphere in the same layout.
    pub fn import_or_sphere(&self, path: impl AsRef<Path>, radius: f32, segments: u32) -> ImportedMesh {
        match self.import(path.as_ref()) {
            Ok(mesh) => mesh,
            Err(err) => {
                log::warn!(
                    "Could not import {}: {}. Using procedural sphere.",
                    path.as_ref().display(),
                    err
                );
                let buffer = generate_uv_sphere(
                    radius,
                    segments,
                    segments,
                    self.options.layout.clone(),
                    self.options.color,
                );
                ImportedMesh {
                    buffer,
                    materials: MaterialLibrary::new(),
                    material: None,
                    texture_path: None,
                    is_fallback: true,
                }
            }
        }
    }

    fn finish(&self, obj: ObjData) -> ImportResult<ImportedMesh> {
        let buffer = build_interleaved(&obj, &self.options)?;
        if buffer.is_empty() {
            return Err(ImportError::Empty);
        }

        let library_path = self.material_file.clone().or(obj.material_library);
        let materials = match &library_path {
            Some(lib) => {
                log::info!("Loading material library {}", lib.display());
                parse_mtl_from_path(lib).unwrap_or_else(|err| {
                    log::warn!("Ignoring material library: {}", err);
                    MaterialLibrary::new()
                })
            }
            None => MaterialLibrary::new(),
        };

        let material = obj.active_material.as_ref().and_then(|name| {
            let found = materials.get(name).cloned();
            if found.is_none() {
                log::warn!("Material '{}' is not defined", name);
            }
            found
        });

        let texture_path = material
            .as_ref()
            .and_then(|m| m.diffuse_texture.as_deref())
            .map(|tex| resolve_relative(library_path.as_deref(), tex));

        log::info!(
            "Built {} vertices ({} bytes/vertex)",
            buffer.vertex_count(),
            buffer.stride_bytes()
        );

        Ok(ImportedMesh {
            buffer,
            materials,
            material,
            texture_path,
            is_fallback: false,
        })
    }
}

fn resolve_relative(library: Option<&Path>, file: &str) -> PathBuf {
    let file = Path::new(file);
    match library.and_then(Path::parent) {
        Some(dir) if file.is_relative() => dir.join(file),
        _ => file.to_path_buf(),
    }
}

/// Coefficients of `name` (or of the only material) in an MTL file, falling
/// back to `fallback` when the file or material is missing.
pub fn load_coefficients_or_default(
    path: impl AsRef<Path>,
    name: Option<&str>,
    fallback: Coefficients,
) -> Coefficients {
    let path = path.as_ref();
    let library = match parse_mtl_from_path(path) {
        Ok(library) => library,
        Err(err) => {
            log::warn!("{}. Using default material coefficients.", err);
            return fallback;
        }
    };

    let material = match name {
        Some(name) => library.get(name),
        None if library.len() == 1 => library.values().next(),
        None => None,
    };
    match material {
        Some(m) => m.coefficients(fallback),
        None => {
            log::warn!(
                "No usable material in {} ({} defined). Using default coefficients.",
                path.display(),
                library.len()
            );
            fallback
        }
    }
}
