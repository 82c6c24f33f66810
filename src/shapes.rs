//! Procedural shape generators
//!
//! Each generator drives a batch through its full `begin…end` lifecycle, so
//! the result is ready to draw. The curved solids go through
//! [`WeldedMeshBuilder`], since their heavy corner reuse is exactly what the
//! welding indexer compacts; the cube exercises the streaming batch's
//! per-vertex emission path.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::backend::traits::{BackendResult, GraphicsBackend};
use crate::backend::types::PrimitiveTopology;
use crate::batch::{StreamingBatch, WeldedMeshBuilder};

/// Build a UV sphere into `mesh`.
///
/// `slices` segments around the equator, `stacks` rings from pole to pole.
/// Normals point outward, texture coordinates wrap once around the equator
/// and run pole to pole.
pub fn make_sphere<B: GraphicsBackend>(
    backend: &mut B,
    mesh: &mut WeldedMeshBuilder,
    radius: f32,
    slices: u32,
    stacks: u32,
) -> BackendResult<()> {
    mesh.begin_mesh(slices * stacks * 6);

    let point = |ring: u32, segment: u32| {
        let theta = ring as f32 * PI / stacks as f32;
        let phi = segment as f32 * 2.0 * PI / slices as f32;
        let dir = Vec3::new(
            theta.sin() * phi.cos(),
            theta.cos(),
            theta.sin() * phi.sin(),
        );
        (
            dir * radius,
            dir,
            Vec2::new(segment as f32 / slices as f32, ring as f32 / stacks as f32),
        )
    };

    for ring in 0..stacks {
        for segment in 0..slices {
            let (pa, na, ta) = point(ring, segment);
            let (pb, nb, tb) = point(ring + 1, segment);
            let (pc, nc, tc) = point(ring, segment + 1);
            let (pd, nd, td) = point(ring + 1, segment + 1);

            mesh.add_triangle([pa, pb, pc], [na, nb, nc], [ta, tb, tc]);
            mesh.add_triangle([pc, pb, pd], [nc, nb, nd], [tc, tb, td]);
        }
    }

    mesh.end(backend)
}

/// Build a torus into `mesh`.
///
/// `major_radius` is the distance from the hub to the tube center,
/// `minor_radius` the tube radius. The hub axis is +Z.
pub fn make_torus<B: GraphicsBackend>(
    backend: &mut B,
    mesh: &mut WeldedMeshBuilder,
    major_radius: f32,
    minor_radius: f32,
    major_steps: u32,
    minor_steps: u32,
) -> BackendResult<()> {
    mesh.begin_mesh(major_steps * minor_steps * 6);

    let point = |major: u32, minor: u32| {
        let theta = major as f32 * 2.0 * PI / major_steps as f32;
        let phi = minor as f32 * 2.0 * PI / minor_steps as f32;
        let ring = Vec3::new(phi.cos() * theta.cos(), phi.cos() * theta.sin(), phi.sin());
        let center = Vec3::new(theta.cos(), theta.sin(), 0.0) * major_radius;
        (
            center + ring * minor_radius,
            ring,
            Vec2::new(
                major as f32 / major_steps as f32,
                minor as f32 / minor_steps as f32,
            ),
        )
    };

    for major in 0..major_steps {
        for minor in 0..minor_steps {
            let (pa, na, ta) = point(major, minor);
            let (pb, nb, tb) = point(major + 1, minor);
            let (pc, nc, tc) = point(major, minor + 1);
            let (pd, nd, td) = point(major + 1, minor + 1);

            mesh.add_triangle([pa, pb, pc], [na, nb, nc], [ta, tb, tc]);
            mesh.add_triangle([pc, pb, pd], [nc, nb, nd], [tc, tb, td]);
        }
    }

    mesh.end(backend)
}

/// Build a cylinder wall into `mesh`, running from z = 0 to z = `length`.
///
/// The radius tapers linearly from `base_radius` to `top_radius`; passing 0
/// for one of them yields a cone. Caps are not generated; compose with
/// [`make_disk`] for closed ends.
pub fn make_cylinder<B: GraphicsBackend>(
    backend: &mut B,
    mesh: &mut WeldedMeshBuilder,
    base_radius: f32,
    top_radius: f32,
    length: f32,
    slices: u32,
    stacks: u32,
) -> BackendResult<()> {
    mesh.begin_mesh(slices * stacks * 6);

    // Outward wall normal, tilted by the taper slope.
    let normal_z = (base_radius - top_radius) / length;

    let point = |stack: u32, slice: u32| {
        let t = stack as f32 / stacks as f32;
        let theta = slice as f32 * 2.0 * PI / slices as f32;
        let radius = base_radius + (top_radius - base_radius) * t;
        (
            Vec3::new(theta.cos() * radius, theta.sin() * radius, t * length),
            Vec3::new(theta.cos(), theta.sin(), normal_z),
            Vec2::new(slice as f32 / slices as f32, t),
        )
    };

    for stack in 0..stacks {
        for slice in 0..slices {
            let (pa, na, ta) = point(stack, slice);
            let (pb, nb, tb) = point(stack + 1, slice);
            let (pc, nc, tc) = point(stack, slice + 1);
            let (pd, nd, td) = point(stack + 1, slice + 1);

            mesh.add_triangle([pa, pb, pc], [na, nb, nc], [ta, tb, tc]);
            mesh.add_triangle([pc, pb, pd], [nc, nb, nd], [tc, tb, td]);
        }
    }

    mesh.end(backend)
}

/// Build a flat annulus in the XY plane into `mesh`, facing +Z.
///
/// `stacks` concentric rings step the radius from `inner_radius` to
/// `outer_radius`. An `inner_radius` of 0 produces a full disk; the
/// degenerate inner corners weld down to a single center vertex.
pub fn make_disk<B: GraphicsBackend>(
    backend: &mut B,
    mesh: &mut WeldedMeshBuilder,
    inner_radius: f32,
    outer_radius: f32,
    slices: u32,
    stacks: u32,
) -> BackendResult<()> {
    mesh.begin_mesh(slices * stacks * 6);

    let point = |ring: u32, slice: u32| {
        let t = ring as f32 / stacks as f32;
        let theta = slice as f32 * 2.0 * PI / slices as f32;
        let radius = inner_radius + (outer_radius - inner_radius) * t;
        let (x, y) = (theta.cos() * radius, theta.sin() * radius);
        (
            Vec3::new(x, y, 0.0),
            Vec3::Z,
            // uv from position, so the texture sits concentrically
            Vec2::new(
                0.5 + 0.5 * x / outer_radius,
                0.5 + 0.5 * y / outer_radius,
            ),
        )
    };

    for ring in 0..stacks {
        for slice in 0..slices {
            let (pa, na, ta) = point(ring, slice);
            let (pb, nb, tb) = point(ring + 1, slice);
            let (pc, nc, tc) = point(ring, slice + 1);
            let (pd, nd, td) = point(ring + 1, slice + 1);

            mesh.add_triangle([pa, pb, pc], [na, nb, nc], [ta, tb, tc]);
            mesh.add_triangle([pc, pb, pd], [nc, nb, nd], [tc, tb, td]);
        }
    }

    mesh.end(backend)
}

/// Build an axis-aligned cube with half-extent `radius` into `batch`,
/// emitted vertex by vertex through the streaming path (36 vertices,
/// one texture unit).
pub fn make_cube<B: GraphicsBackend>(
    backend: &mut B,
    batch: &mut StreamingBatch,
    radius: f32,
) -> BackendResult<()> {
    // normal + the face's four corners, counter-clockwise from the outside
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        (
            Vec3::Z,
            [
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, 1.0),
            ],
        ),
        (
            -Vec3::Z,
            [
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::X,
            [
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, 1.0),
            ],
        ),
        (
            -Vec3::X,
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::Y,
            [
                Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
            ],
        ),
        (
            -Vec3::Y,
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(-1.0, -1.0, 1.0),
            ],
        ),
    ];
    let corner_uvs = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    batch.begin(PrimitiveTopology::TriangleList, 36, 1);

    for (normal, corners) in faces {
        for corner in [0usize, 1, 2, 0, 2, 3] {
            // position last: the cursor advances on the vertex call
            batch.tex_coord(backend, 0, corner_uvs[corner].x, corner_uvs[corner].y)?;
            batch.normal_v(backend, normal)?;
            batch.vertex_v(backend, corners[corner] * radius)?;
        }
    }

    batch.end(backend);
    Ok(())
}
