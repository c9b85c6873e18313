//! Static index tables and outline vertex expansion.
//!
//! All three index buffers are built once at resource-creation time and
//! shared by every draw. Each table holds [`INDEX_TABLE_LEN`] entries, and
//! a draw consumes a prefix sized to the batch.

use glam::Vec2;

use crate::vertex::{FlatVertex, MAX_FILL_VERTICES, MAX_QUADS};

/// Length of every pre-built index table.
pub const INDEX_TABLE_LEN: usize = 3072;

/// Two triangles per quad over 4-vertex groups:
/// `(0, 1, 2, 2, 3, 0)` offset by `4 * quad`.
pub fn quad_index_table() -> Vec<u16> {
    let mut indices = Vec::with_capacity(INDEX_TABLE_LEN);
    for quad in 0..MAX_QUADS as u16 {
        let base = quad * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

/// Fan triangulation anchored at vertex 0: triangle `i` is
/// `(0, i + 1, i + 2)`. Fills convex polygons of up to
/// [`MAX_FILL_VERTICES`] vertices.
pub fn fan_index_table() -> Vec<u16> {
    let mut indices = Vec::with_capacity(INDEX_TABLE_LEN);
    for i in 0..MAX_FILL_VERTICES as u16 {
        indices.extend_from_slice(&[0, i + 1, i + 2]);
    }
    indices
}

/// Identity table for line lists over pre-doubled edge vertices.
pub fn line_index_table() -> Vec<u16> {
    (0..INDEX_TABLE_LEN as u16).collect()
}

/// Expand a closed polygon into line-list vertices: each edge contributes
/// both endpoints, with the last vertex joined back to the first. `out` is
/// cleared first and ends up holding `2 * polygon.len()` entries.
pub fn outline_vertices_into(polygon: &[Vec2], out: &mut Vec<FlatVertex>) {
    out.clear();
    for (i, &vertex) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        out.push(FlatVertex::new(vertex));
        out.push(FlatVertex::new(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::MAX_BATCH_VERTICES;

    #[test]
    fn quad_table_covers_max_quads() {
        let table = quad_index_table();
        assert_eq!(table.len(), INDEX_TABLE_LEN);
        assert_eq!(table[..6], [0, 1, 2, 2, 3, 0]);
        assert_eq!(table[6..12], [4, 5, 6, 6, 7, 4]);

        // Every entry addresses a vertex inside a full batch.
        assert!(table.iter().all(|&i| (i as usize) < MAX_BATCH_VERTICES));

        // Last quad references the final 4-vertex group.
        let last = &table[INDEX_TABLE_LEN - 6..];
        assert_eq!(last, [2044, 2045, 2046, 2046, 2047, 2044]);
    }

    #[test]
    fn fan_table_is_anchored_triangles() {
        let table = fan_index_table();
        assert_eq!(table.len(), INDEX_TABLE_LEN);
        for (i, triple) in table.chunks_exact(3).enumerate() {
            assert_eq!(triple, [0, (i + 1) as u16, (i + 2) as u16]);
        }
    }

    #[test]
    fn line_table_is_identity() {
        let table = line_index_table();
        assert_eq!(table.len(), INDEX_TABLE_LEN);
        for (i, &index) in table.iter().enumerate() {
            assert_eq!(index, i as u16);
        }
    }

    #[test]
    fn outline_doubles_edges_and_wraps() {
        let triangle = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        let mut out = Vec::new();
        outline_vertices_into(&triangle, &mut out);

        assert_eq!(out.len(), 6);
        assert_eq!(out[0].pos, [0.0, 0.0]);
        assert_eq!(out[1].pos, [1.0, 0.0]);
        assert_eq!(out[2].pos, [1.0, 0.0]);
        assert_eq!(out[3].pos, [0.0, 1.0]);
        // Closing edge joins back to the first vertex.
        assert_eq!(out[4].pos, [0.0, 1.0]);
        assert_eq!(out[5].pos, [0.0, 0.0]);
    }

    #[test]
    fn outline_reuses_the_output_buffer() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let mut out = Vec::with_capacity(64);
        outline_vertices_into(&square, &mut out);
        assert_eq!(out.len(), 8);

        let triangle = &square[..3];
        outline_vertices_into(triangle, &mut out);
        assert_eq!(out.len(), 6);
    }
}
