//! Mesh import: Wavefront OBJ/MTL into interleaved vertex buffers.
//! Parsers produce raw records, `buffer` flattens them per a `VertexLayout`,
//! `importer` ties both together with fallbacks.

pub mod buffer;
pub mod error;
pub mod importer;
pub mod layout;
pub mod mtl;
pub mod obj;
pub mod primitive;
pub mod texture;

pub use buffer::{InterleavedBuffer, Vertex, build_interleaved};
pub use error::{ImportError, ImportResult};
pub use importer::{ImportOptions, ImportedMesh, IndexPolicy, MeshImporter, load_coefficients_or_default};
pub use layout::{Attribute, AttributeDesc, VertexLayout};
pub use mtl::{Coefficients, Material, MaterialLibrary};
