//! Interleaved vertex layouts and the descriptor needed to bind them.

/// A per-vertex attribute that can appear in an interleaved record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Attribute {
    Position,
    Texcoord,
    Color,
    Normal,
}

impl Attribute {
    /// Number of `f32` components.
    pub const fn components(self) -> usize {
        match self {
            Attribute::Texcoord => 2,
            Attribute::Position | Attribute::Color | Attribute::Normal => 3,
        }
    }
}

/// Where one attribute lives inside a vertex record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttributeDesc {
    pub attribute: Attribute,
    /// Shader location, in declaration order.
    pub location: u32,
    pub components: usize,
    /// Offset from the start of the record, in bytes.
    pub offset: usize,
}

/// Ordered set of attributes making up one vertex record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexLayout {
    attributes: Vec<AttributeDesc>,
    width: usize,
}

impl VertexLayout {
    /// `{position, texcoord, color}`, 8 floats per vertex.
    pub fn textured() -> Self {
        Self::from_order(&[Attribute::Position, Attribute::Texcoord, Attribute::Color])
    }

    /// `{position, color, normal, texcoord}`, 11 floats per vertex.
    pub fn lit() -> Self {
        Self::from_order(&[
            Attribute::Position,
            Attribute::Color,
            Attribute::Normal,
            Attribute::Texcoord,
        ])
    }

    /// Builds a layout from an attribute order. Repeated attributes are dropped.
    /// Returns `None` for an empty order: a record must hold at least one float.
    pub fn new(order: &[Attribute]) -> Option<Self> {
        let layout = Self::from_order(order);
        (layout.width > 0).then_some(layout)
    }

    fn from_order(order: &[Attribute]) -> Self {
        let mut attributes: Vec<AttributeDesc> = Vec::with_capacity(order.len());
        let mut width = 0;
        for &attribute in order {
            if attributes.iter().any(|d| d.attribute == attribute) {
                log::warn!("Attribute {:?} listed twice in vertex layout", attribute);
                continue;
            }
            attributes.push(AttributeDesc {
                attribute,
                location: attributes.len() as u32,
                components: attribute.components(),
                offset: width * size_of::<f32>(),
            });
            width += attribute.components();
        }
        Self { attributes, width }
    }

    pub fn attributes(&self) -> &[AttributeDesc] {
        &self.attributes
    }

    /// Floats per vertex record.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bytes per vertex record.
    pub fn stride(&self) -> usize {
        self.width * size_of::<f32>()
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.attributes.iter().any(|d| d.attribute == attribute)
    }

    /// Float offset of `attribute` within a record.
    pub fn float_offset(&self, attribute: Attribute) -> Option<usize> {
        self.attributes
            .iter()
            .find(|d| d.attribute == attribute)
            .map(|d| d.offset / size_of::<f32>())
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::textured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textured_layout_offsets() {
        let layout = VertexLayout::textured();
        assert_eq!(layout.width(), 8);
        assert_eq!(layout.stride(), 32);
        let offsets: Vec<usize> = layout.attributes().iter().map(|d| d.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
        assert!(!layout.contains(Attribute::Normal));
    }

    #[test]
    fn lit_layout_locations() {
        let layout = VertexLayout::lit();
        assert_eq!(layout.width(), 11);
        let normal = layout.attributes()[2];
        assert_eq!(normal.attribute, Attribute::Normal);
        assert_eq!(normal.location, 2);
        assert_eq!(normal.offset, 6 * 4);
        assert_eq!(layout.float_offset(Attribute::Texcoord), Some(9));
    }

    #[test]
    fn duplicate_attribute_is_dropped() {
        let layout = VertexLayout::new(&[Attribute::Position, Attribute::Position]).unwrap();
        assert_eq!(layout.width(), 3);
        assert_eq!(layout.attributes().len(), 1);
    }

    #[test]
    fn empty_layout_is_rejected() {
        assert_eq!(VertexLayout::new(&[]), None);
    }

    #[test]
    fn custom_layout_builds_buffers() {
        let layout = VertexLayout::new(&[Attribute::Normal, Attribute::Position]).unwrap();
        assert_eq!(layout.float_offset(Attribute::Position), Some(3));
        let mut buffer = crate::buffer::InterleavedBuffer::new(layout);
        buffer.push(&crate::buffer::Vertex {
            position: [1.0, 2.0, 3.0],
            normal: [0.0, 1.0, 0.0],
            ..Default::default()
        });
        assert_eq!(buffer.vertex_count(), 1);
        assert_eq!(buffer.as_slice(), &[0.0, 1.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(buffer.bounds(), Some(([1.0, 2.0, 3.0], [1.0, 2.0, 3.0])));
    }
}
