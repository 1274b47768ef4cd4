//! Flattening parsed OBJ data into an interleaved float buffer.

use crate::{
    error::{AttributeRef, ImportError, ImportResult},
    importer::{ImportOptions, IndexPolicy},
    layout::{Attribute, VertexLayout},
    obj::{FaceVertex, ObjData},
};

/// Every attribute a record may carry; the layout decides which are written.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub color: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Appends this vertex to `out` in `layout` order.
    pub fn write(&self, layout: &VertexLayout, out: &mut Vec<f32>) {
        for desc in layout.attributes() {
            match desc.attribute {
                Attribute::Position => out.extend_from_slice(&self.position),
                Attribute::Texcoord => out.extend_from_slice(&self.texcoord),
                Attribute::Color => out.extend_from_slice(&self.color),
                Attribute::Normal => out.extend_from_slice(&self.normal),
            }
        }
    }
}

/// Flat vertex data ready for a GPU array buffer, plus its layout.
#[derive(Clone, Debug, PartialEq)]
pub struct InterleavedBuffer {
    data: Vec<f32>,
    layout: VertexLayout,
}

impl InterleavedBuffer {
    pub fn new(layout: VertexLayout) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn with_capacity(layout: VertexLayout, vertices: usize) -> Self {
        let data = Vec::with_capacity(vertices * layout.width());
        Self { data, layout }
    }

    pub fn push(&mut self, vertex: &Vertex) {
        vertex.write(&self.layout, &mut self.data);
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Derived from the buffer length; never tracked separately.
    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.layout.width()
    }

    pub fn stride_bytes(&self) -> usize {
        self.layout.stride()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the `index`-th record.
    pub fn record(&self, index: usize) -> Option<&[f32]> {
        let width = self.layout.width();
        self.data.get(index * width..(index + 1) * width)
    }

    /// Axis-aligned bounds of the emitted positions.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let offset = self.layout.float_offset(Attribute::Position)?;
        let mut records = self.data.chunks_exact(self.layout.width());
        let first = records.next()?;
        let mut min = [first[offset], first[offset + 1], first[offset + 2]];
        let mut max = min;
        for record in records {
            for axis in 0..3 {
                let value = record[offset + axis];
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }
        Some((min, max))
    }
}

/// Emits one record per face corner, in file order. Shared vertices are
/// repeated, not de-duplicated.
pub fn build_interleaved(obj: &ObjData, options: &ImportOptions) -> ImportResult<InterleavedBuffer> {
    let layout = options.layout.clone();
    let needs_normal = layout.contains(Attribute::Normal);
    let mut buffer = InterleavedBuffer::with_capacity(layout, obj.corner_count());
    let mut skipped = 0usize;

    for face in &obj.faces {
        let triangulated;
        let corners: &[FaceVertex] = if options.triangulate {
            triangulated = fan(&face.corners);
            &triangulated
        } else {
            &face.corners
        };

        for corner in corners {
            match resolve_corner(obj, corner, face.line, needs_normal, options)? {
                Some(vertex) => buffer.push(&vertex),
                None => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} face corners with out-of-range indices", skipped);
    }
    Ok(buffer)
}

/// Fan triangulation: (0, i, i + 1) for every interior corner.
fn fan(corners: &[FaceVertex]) -> Vec<FaceVertex> {
    if corners.len() <= 3 {
        return corners.to_vec();
    }
    let mut out = Vec::with_capacity((corners.len() - 2) * 3);
    for tri in 1..(corners.len() - 1) {
        out.push(corners[0]);
        out.push(corners[tri]);
        out.push(corners[tri + 1]);
    }
    out
}

/// `Ok(None)` means the corner is dropped under [`IndexPolicy::Skip`].
fn resolve_corner(
    obj: &ObjData,
    corner: &FaceVertex,
    line: usize,
    needs_normal: bool,
    options: &ImportOptions,
) -> ImportResult<Option<Vertex>> {
    let out_of_range = |attribute, index, len| ImportError::IndexOutOfRange {
        line,
        attribute,
        index,
        len,
    };

    let Some(&position) = obj.positions.get(corner.position) else {
        return match options.index_policy {
            IndexPolicy::Fail => Err(out_of_range(
                AttributeRef::Position,
                corner.position,
                obj.positions.len(),
            )),
            IndexPolicy::Skip => Ok(None),
        };
    };

    let texcoord = match corner.texcoord {
        None => [0.0, 0.0],
        Some(i) => match (obj.texcoords.get(i), options.index_policy) {
            (Some(&uv), _) => uv,
            (None, IndexPolicy::Skip) => [0.0, 0.0],
            (None, IndexPolicy::Fail) => {
                return Err(out_of_range(AttributeRef::Texcoord, i, obj.texcoords.len()));
            }
        },
    };

    let normal = match corner.normal {
        None if needs_normal && !options.tolerate_missing_normals => {
            return Err(ImportError::MissingNormal { line });
        }
        None => options.default_normal,
        Some(i) => match (obj.normals.get(i), options.index_policy) {
            (Some(&n), _) => n,
            (None, IndexPolicy::Skip) => options.default_normal,
            (None, IndexPolicy::Fail) => {
                return Err(out_of_range(AttributeRef::Normal, i, obj.normals.len()));
            }
        },
    };

    Ok(Some(Vertex {
        position,
        texcoord,
        color: options.color,
        normal,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::parse_obj_from_str;

    const CUBE: &str = r#"
        v -1 -1 -1
        v  1 -1 -1
        v  1  1 -1
        v -1  1 -1
        v -1 -1  1
        v  1 -1  1
        v  1  1  1
        v -1  1  1
        f 1 2 3
        f 1 3 4
        f 5 6 7
        f 5 7 8
        f 1 2 6
        f 1 6 5
        f 2 3 7
        f 2 7 6
        f 3 4 8
        f 3 8 7
        f 4 1 5
        f 4 5 8
    "#;

    fn build(src: &str, options: &ImportOptions) -> ImportResult<InterleavedBuffer> {
        let obj = parse_obj_from_str(src, options.parse_options())?;
        build_interleaved(&obj, options)
    }

    #[test]
    fn cube_emits_three_vertices_per_triangle() {
        let options = ImportOptions::textured();
        let obj = parse_obj_from_str(CUBE, options.parse_options()).unwrap();
        let buffer = build_interleaved(&obj, &options).unwrap();

        assert_eq!(buffer.vertex_count(), 36);
        assert_eq!(buffer.vertex_count(), 3 * obj.faces.len());
        assert_eq!(buffer.as_slice().len() % buffer.layout().width(), 0);

        for (i, corner) in obj.faces.iter().flat_map(|f| &f.corners).enumerate() {
            let record = buffer.record(i).unwrap();
            assert_eq!(&record[0..3], &obj.positions[corner.position]);
        }
    }

    #[test]
    fn textured_record_has_flipped_uv_and_placeholder_color() {
        let src = "v 1 2 3\nv 0 0 0\nv 0 1 0\nvt 0.3 0.2\nf 1/1 2/1 3/1\n";
        let buffer = build(src, &ImportOptions::textured()).unwrap();
        let record = buffer.record(0).unwrap();
        assert_eq!(&record[0..3], &[1.0, 2.0, 3.0]);
        assert!((record[3] - 0.3).abs() < 1e-6);
        assert!((record[4] - 0.8).abs() < 1e-6);
        assert_eq!(&record[5..8], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn lit_record_keeps_uv_unflipped() {
        let src = "v 1 2 3\nvt 0.3 0.2\nvn 0 1 0\nf 1/1/1 1/1/1 1/1/1\n";
        let buffer = build(src, &ImportOptions::lit()).unwrap();
        assert_eq!(buffer.layout().width(), 11);
        let record = buffer.record(0).unwrap();
        assert_eq!(&record[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&record[3..6], &[1.0, 0.0, 0.0]);
        assert_eq!(&record[6..9], &[0.0, 1.0, 0.0]);
        assert!((record[10] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn empty_texcoord_field_gives_zero_uv_and_real_normal() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 0 0\nvn 0 0 1\nf 1//2 2//2 3//2\n";
        let mut options = ImportOptions::lit();
        options.strict = false;
        let buffer = build(src, &options).unwrap();
        let record = buffer.record(2).unwrap();
        assert_eq!(&record[6..9], &[0.0, 0.0, 1.0]);
        assert_eq!(&record[9..11], &[0.0, 0.0]);
    }

    #[test]
    fn missing_normal_fails_unless_tolerated() {
        let src = "v 0 0 0\nf 1 1 1\n";
        let mut options = ImportOptions::lit();
        options.strict = false;
        options.tolerate_missing_normals = false;
        assert!(matches!(
            build(src, &options),
            Err(ImportError::MissingNormal { line: 2 })
        ));

        options.tolerate_missing_normals = true;
        let buffer = build(src, &options).unwrap();
        assert_eq!(&buffer.record(0).unwrap()[6..9], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn out_of_range_index_fails_fast_by_default() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = build(src, &ImportOptions::textured()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::IndexOutOfRange {
                line: 3,
                attribute: AttributeRef::Position,
                index: 2,
                len: 2,
            }
        ));
    }

    #[test]
    fn skip_policy_drops_whole_corner() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let mut options = ImportOptions::textured();
        options.index_policy = IndexPolicy::Skip;
        let buffer = build(src, &options).unwrap();
        assert_eq!(buffer.vertex_count(), 2);
        assert_eq!(buffer.as_slice().len(), 16);
    }

    #[test]
    fn quads_pass_through_or_fan() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mut options = ImportOptions::textured();
        assert_eq!(build(src, &options).unwrap().vertex_count(), 4);

        options.triangulate = true;
        let buffer = build(src, &options).unwrap();
        assert_eq!(buffer.vertex_count(), 6);
        assert_eq!(&buffer.record(3).unwrap()[0..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&buffer.record(5).unwrap()[0..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn bounds_cover_positions() {
        let options = ImportOptions::textured();
        let buffer = build(CUBE, &options).unwrap();
        assert_eq!(buffer.bounds(), Some(([-1.0; 3], [1.0; 3])));
        assert_eq!(buffer.as_bytes().len(), 36 * buffer.stride_bytes());
        assert_eq!(InterleavedBuffer::new(VertexLayout::lit()).bounds(), None);
    }
}
