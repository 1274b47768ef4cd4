//! Command-line front end: import a mesh the way a scene would and report
//! what would be uploaded to the GPU.

use std::path::PathBuf;

use anyhow::Result;
use asset::{Coefficients, ImportOptions, IndexPolicy, MeshImporter, texture::TextureData};
use clap::{Parser, ValueEnum};
use corelib::{LightRig, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum LayoutArg {
    /// position + texcoord + color (8 floats), V flipped
    #[default]
    Textured,
    /// position + color + normal + texcoord (11 floats), strict faces
    Lit,
}

#[derive(Parser, Debug)]
#[command(name = "app", about = "Import a Wavefront OBJ/MTL mesh into an interleaved vertex buffer")]
struct Args {
    /// OBJ file to import
    mesh: PathBuf,

    #[arg(long, default_value = "textured", value_enum)]
    layout: LayoutArg,

    /// MTL file to use instead of the mesh's `mtllib`
    #[arg(long)]
    material: Option<PathBuf>,

    /// Require exactly three p/t/n triples per face
    #[arg(long, conflicts_with = "tolerant")]
    strict: bool,

    /// Accept any face form (p, p/t, p//n, p/t/n)
    #[arg(long)]
    tolerant: bool,

    /// Fan-triangulate polygons with more than three corners
    #[arg(long)]
    triangulate: bool,

    /// Drop corners with out-of-range indices instead of failing
    #[arg(long)]
    skip_bad_indices: bool,

    /// Latitude/longitude segments of the fallback sphere
    #[arg(long, default_value = "50")]
    sphere_segments: u32,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn import_options(&self) -> ImportOptions {
        let mut options = match self.layout {
            LayoutArg::Textured => ImportOptions::textured(),
            LayoutArg::Lit => ImportOptions::lit(),
        };
        if self.strict {
            options.strict = true;
        }
        if self.tolerant {
            options.strict = false;
            options.tolerate_missing_normals = true;
        }
        options.triangulate = self.triangulate;
        if self.skip_bad_indices {
            options.index_policy = IndexPolicy::Skip;
        }
        options
    }

    fn fallback_coefficients(&self) -> Coefficients {
        match self.layout {
            LayoutArg::Textured => Coefficients::fallback(),
            LayoutArg::Lit => Coefficients::fallback_bright(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut importer = MeshImporter::new(args.import_options());
    if let Some(mtl) = &args.material {
        importer = importer.with_material_file(mtl);
    }
    log::debug!("Import options: {:?}", importer.options());

    let mesh = importer.import_or_sphere(&args.mesh, 0.5, args.sphere_segments);
    let buffer = &mesh.buffer;

    log::info!(
        "{}: {} vertices, stride {} bytes, {} bytes total{}",
        args.mesh.display(),
        buffer.vertex_count(),
        buffer.stride_bytes(),
        buffer.as_bytes().len(),
        if mesh.is_fallback { " (procedural sphere)" } else { "" }
    );
    for desc in buffer.layout().attributes() {
        log::info!(
            "  location {} {:?}: {} floats at offset {}",
            desc.location,
            desc.attribute,
            desc.components,
            desc.offset
        );
    }

    let coefficients = mesh.coefficients(args.fallback_coefficients());
    match &mesh.material {
        Some(m) => log::info!("Material '{}': {:?}", m.name, coefficients),
        None => log::info!("No material, defaults: {:?}", coefficients),
    }

    if let Some(path) = &mesh.texture_path {
        let texture = TextureData::load_or_fallback(path, None);
        log::info!("Diffuse texture {}x{}", texture.width, texture.height);
    }

    if let Some((min, max)) = buffer.bounds() {
        let (min, max) = (Vec3::from_array(min), Vec3::from_array(max));
        let rig = LightRig::three_point((min + max) * 0.5, max - min);
        for light in &rig.lights {
            log::debug!(
                "Light at {:?}, color {:?}, intensity {}",
                light.position,
                light.color,
                light.intensity
            );
        }
    }

    Ok(())
}
