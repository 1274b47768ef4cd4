//! Procedural geometry used when a mesh file cannot be loaded.

use std::f32::consts::PI;

use crate::{
    buffer::{InterleavedBuffer, Vertex},
    layout::VertexLayout,
};

/// UV sphere as a triangle list: two triangles per latitude/longitude cell.
pub fn generate_uv_sphere(
    radius: f32,
    lat_segments: u32,
    lon_segments: u32,
    layout: VertexLayout,
    color: [f32; 3],
) -> InterleavedBuffer {
    let lat_segments = lat_segments.max(1);
    let lon_segments = lon_segments.max(1);
    let vertices = sphere_vertex_count(lat_segments, lon_segments);
    let mut buffer = InterleavedBuffer::with_capacity(layout, vertices);

    let point = |lat: u32, lon: u32| {
        let theta = lat as f32 * PI / lat_segments as f32;
        let phi = lon as f32 * 2.0 * PI / lon_segments as f32;
        let dir = [phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
        Vertex {
            position: dir.map(|c| c * radius),
            texcoord: [phi / (2.0 * PI), theta / PI],
            color,
            normal: normalize(dir),
        }
    };

    for i in 0..lat_segments {
        for j in 0..lon_segments {
            let v0 = point(i, j);
            let v1 = point(i + 1, j);
            let v2 = point(i, j + 1);
            let v3 = point(i + 1, j + 1);
            for v in [v0, v1, v2, v1, v3, v2] {
                buffer.push(&v);
            }
        }
    }

    log::debug!(
        "Generated sphere r={} ({}x{}), {} vertices",
        radius,
        lat_segments,
        lon_segments,
        buffer.vertex_count()
    );
    buffer
}

/// Vertices emitted by [`generate_uv_sphere`]: six per cell.
pub fn sphere_vertex_count(lat_segments: u32, lon_segments: u32) -> usize {
    lat_segments.max(1) as usize * lon_segments.max(1) as usize * 6
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > f32::EPSILON {
        v.map(|c| c / len)
    } else {
        [0.0, 1.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_emits_six_vertices_per_cell() {
        let sphere = generate_uv_sphere(0.5, 50, 50, VertexLayout::lit(), [1.0, 0.0, 0.0]);
        assert_eq!(sphere.vertex_count(), 6 * 50 * 50);
        assert_eq!(sphere.as_slice().len(), sphere.vertex_count() * 11);
    }

    #[test]
    fn vertex_count_is_computed_without_u32_overflow() {
        assert_eq!(sphere_vertex_count(70_000, 70_000), 29_400_000_000);
        assert_eq!(sphere_vertex_count(0, 3), 18);
    }

    #[test]
    fn sphere_points_lie_on_radius() {
        let sphere = generate_uv_sphere(2.0, 8, 12, VertexLayout::lit(), [0.0; 3]);
        for i in 0..sphere.vertex_count() {
            let r = sphere.record(i).unwrap();
            let len = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
            assert!((len - 2.0).abs() < 1e-4);
            let n = (r[6] * r[6] + r[7] * r[7] + r[8] * r[8]).sqrt();
            assert!((n - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn first_vertex_is_north_pole() {
        let sphere = generate_uv_sphere(1.0, 4, 4, VertexLayout::textured(), [0.0; 3]);
        let r = sphere.record(0).unwrap();
        assert!((r[1] - 1.0).abs() < 1e-6);
        assert_eq!(&r[3..5], &[0.0, 0.0]);
    }
}
