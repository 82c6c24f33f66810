//! End-to-end tests for the batching subsystem against the headless backend.

use glam::{Vec2, Vec3, Vec4};
use vertex_batch::backend::headless::DrawCall;
use vertex_batch::{
    AttributeIndex, HeadlessBackend, IndexFormat, PrimitiveTopology, StreamingBatch,
    WeldedMeshBuilder,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bound_floats(backend: &HeadlessBackend, attribute: AttributeIndex) -> Vec<f32> {
    let binding = backend
        .attribute_binding(attribute)
        .expect("attribute bound");
    bytemuck::cast_slice(backend.buffer_data(binding.buffer).unwrap()).to_vec()
}

#[test]
fn emitted_positions_round_trip() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut batch = StreamingBatch::new();

    let verts: Vec<Vec3> = (0..7)
        .map(|i| Vec3::new(i as f32, i as f32 * 0.5, -(i as f32)))
        .collect();

    batch.begin(PrimitiveTopology::TriangleFan, verts.len() as u32, 0);
    for v in &verts {
        batch.vertex_v(&mut backend, *v).unwrap();
    }
    batch.end(&mut backend);

    let uploaded = bound_floats(&backend, AttributeIndex::Position);
    let expected: Vec<f32> = verts.iter().flat_map(|v| [v.x, v.y, v.z]).collect();
    assert_eq!(uploaded, expected);
}

#[test]
fn overflow_keeps_first_n_vertices() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut batch = StreamingBatch::new();

    batch.begin(PrimitiveTopology::LineLoop, 4, 0);
    for i in 0..10 {
        batch.vertex(&mut backend, i as f32, 0.0, 0.0).unwrap();
    }
    batch.end(&mut backend);

    assert_eq!(batch.recorded_vertices(), 4);
    let uploaded = bound_floats(&backend, AttributeIndex::Position);
    assert_eq!(
        uploaded,
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0]
    );
}

#[test]
fn reset_pass_draws_latest_data() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut batch = StreamingBatch::new();

    batch.begin(PrimitiveTopology::TriangleList, 6, 0);
    for i in 0..6 {
        batch.vertex(&mut backend, i as f32, 0.0, 0.0).unwrap();
    }
    batch.end(&mut backend);
    batch.draw(&mut backend);

    // per-frame update: rewrite a subset of the vertices in a new pass
    batch.reset();
    batch.vertex(&mut backend, -1.0, -1.0, -1.0).unwrap();
    batch.vertex(&mut backend, -2.0, -2.0, -2.0).unwrap();
    batch.end(&mut backend);
    batch.draw(&mut backend);

    let uploaded = bound_floats(&backend, AttributeIndex::Position);
    assert_eq!(&uploaded[..6], &[-1.0, -1.0, -1.0, -2.0, -2.0, -2.0]);
    // beyond the new cursor the previous pass's data remains
    assert_eq!(&uploaded[6..9], &[2.0, 0.0, 0.0]);

    // both draws cover the full declared capacity
    assert_eq!(
        backend.draw_calls(),
        &[
            DrawCall::Arrays {
                topology: PrimitiveTopology::TriangleList,
                vertices: 0..6
            },
            DrawCall::Arrays {
                topology: PrimitiveTopology::TriangleList,
                vertices: 0..6
            },
        ]
    );
}

#[test]
fn full_attribute_streams_bind_to_fixed_slots() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut batch = StreamingBatch::new();

    batch.begin(PrimitiveTopology::TriangleList, 3, 2);
    for i in 0..3 {
        let f = i as f32;
        batch.color(&mut backend, f, 0.0, 0.0, 1.0).unwrap();
        batch.normal(&mut backend, 0.0, 0.0, 1.0).unwrap();
        batch.tex_coord(&mut backend, 0, f, f).unwrap();
        batch.tex_coord(&mut backend, 1, -f, -f).unwrap();
        batch.vertex(&mut backend, f, f, f).unwrap();
    }
    batch.end(&mut backend);

    for attribute in [
        AttributeIndex::Position,
        AttributeIndex::Normal,
        AttributeIndex::Color,
        AttributeIndex::TexCoord0,
        AttributeIndex::TexCoord1,
    ] {
        assert!(
            backend.attribute_binding(attribute).is_some(),
            "{:?} not bound",
            attribute
        );
    }
    assert!(backend.attribute_binding(AttributeIndex::TexCoord2).is_none());

    let colors = bound_floats(&backend, AttributeIndex::Color);
    assert_eq!(&colors[4..8], &[1.0, 0.0, 0.0, 1.0]);
    let second_unit = bound_floats(&backend, AttributeIndex::TexCoord1);
    assert_eq!(&second_unit[2..4], &[-1.0, -1.0]);
}

#[test]
fn bulk_uploaded_batch_draws_each_frame() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut batch = StreamingBatch::new();

    let mut verts = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    let colors = vec![Vec4::ONE; 3];

    batch.begin(PrimitiveTopology::TriangleList, 3, 0);
    batch.copy_position_data(&mut backend, &verts).unwrap();
    batch.copy_color_data(&mut backend, &colors).unwrap();
    batch.end(&mut backend);
    batch.draw(&mut backend);

    // procedural per-frame update re-uploads into the same buffers
    for frame in 1..4 {
        verts[0].x = frame as f32;
        batch.copy_position_data(&mut backend, &verts).unwrap();
        batch.draw(&mut backend);
    }

    assert_eq!(backend.buffer_count(), 2);
    assert_eq!(backend.draw_calls().len(), 4);
    let uploaded = bound_floats(&backend, AttributeIndex::Position);
    assert_eq!(uploaded[0], 3.0);
}

// Scenario: three distinct corners make three unique vertices, indexed 0,1,2.
#[test]
fn welding_single_triangle() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut mesh = WeldedMeshBuilder::new();

    mesh.begin_mesh(100);
    mesh.add_triangle(
        [Vec3::ZERO, Vec3::X, Vec3::Y],
        [Vec3::Z, Vec3::Z, Vec3::Z],
        [Vec2::ZERO, Vec2::X, Vec2::Y],
    );

    assert_eq!(mesh.unique_vertex_count(), 3);
    assert_eq!(mesh.index_count(), 3);
    assert_eq!(mesh.indices(), &[0, 1, 2]);

    mesh.end(&mut backend).unwrap();
    assert_eq!(mesh.index_count(), 3);
}

// Scenario: two triangles sharing an edge weld the two shared corners.
#[test]
fn welding_shared_edge() {
    init_logging();
    let mut mesh = WeldedMeshBuilder::new();

    mesh.begin_mesh(100);
    mesh.add_triangle(
        [Vec3::ZERO, Vec3::X, Vec3::Y],
        [Vec3::Z; 3],
        [Vec2::ZERO, Vec2::X, Vec2::Y],
    );
    mesh.add_triangle(
        [Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
        [Vec3::Z; 3],
        [Vec2::X, Vec2::ONE, Vec2::Y],
    );

    assert_eq!(mesh.unique_vertex_count(), 4);
    assert_eq!(mesh.index_count(), 6);
}

// Corners matching on position and normal but not texcoord must stay split.
#[test]
fn welding_requires_all_attributes_to_match() {
    init_logging();
    let mut mesh = WeldedMeshBuilder::new();

    mesh.begin_mesh(100);
    mesh.add_triangle(
        [Vec3::ZERO, Vec3::X, Vec3::Y],
        [Vec3::Z; 3],
        [Vec2::ZERO, Vec2::X, Vec2::Y],
    );
    mesh.add_triangle(
        [Vec3::ZERO, Vec3::X, Vec3::Y],
        [Vec3::Z; 3],
        [Vec2::splat(0.9), Vec2::splat(0.8), Vec2::splat(0.7)],
    );

    assert_eq!(mesh.unique_vertex_count(), 6);
    assert_eq!(mesh.index_count(), 6);
}

#[test]
fn welded_mesh_uploads_compacted_streams() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut mesh = WeldedMeshBuilder::new();

    // a quad: two triangles, four unique corners
    let (a, b, c, d) = (Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y);
    let (ua, ub, uc, ud) = (Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y);
    mesh.begin_mesh(6);
    mesh.add_triangle([a, b, c], [Vec3::Z; 3], [ua, ub, uc]);
    mesh.add_triangle([a, c, d], [Vec3::Z; 3], [ua, uc, ud]);
    mesh.end(&mut backend).unwrap();
    mesh.draw(&mut backend);

    // four unique vertices of three floats each
    let positions = bound_floats(&backend, AttributeIndex::Position);
    assert_eq!(positions.len(), 12);
    // normalized normals uploaded alongside
    let normals = bound_floats(&backend, AttributeIndex::Normal);
    assert_eq!(&normals[..3], &[0.0, 0.0, 1.0]);

    match &backend.draw_calls()[0] {
        DrawCall::Indexed {
            index_buffer,
            format,
            indices,
            ..
        } => {
            assert_eq!(*format, IndexFormat::Uint16);
            assert_eq!(*indices, 0..6);
            let welded: &[u16] =
                bytemuck::cast_slice(backend.buffer_data(*index_buffer).unwrap());
            assert_eq!(welded, &[0, 1, 2, 0, 2, 3]);
        }
        other => panic!("expected indexed draw, got {:?}", other),
    }
}

// Scenario: three vertices, end, draw; one non-indexed triangle draw.
#[test]
fn streaming_triangle_draw_submission() {
    init_logging();
    let mut backend = HeadlessBackend::new();
    let mut batch = StreamingBatch::new();

    batch.begin(PrimitiveTopology::TriangleList, 3, 0);
    batch.vertex(&mut backend, -0.5, 0.0, 0.0).unwrap();
    batch.vertex(&mut backend, 0.5, 0.0, 0.0).unwrap();
    batch.vertex(&mut backend, 0.0, 0.5, 0.0).unwrap();
    batch.end(&mut backend);
    batch.draw(&mut backend);

    assert_eq!(
        backend.draw_calls(),
        &[DrawCall::Arrays {
            topology: PrimitiveTopology::TriangleList,
            vertices: 0..3
        }]
    );
}

// Scenario: a texture-unit request above four is clamped, not rejected.
#[test]
fn texture_unit_request_clamped() {
    init_logging();
    let mut batch = StreamingBatch::new();
    batch.begin(PrimitiveTopology::TriangleList, 3, 7);
    assert_eq!(batch.texture_unit_count(), 4);
}

#[test]
fn independent_batches_own_independent_buffers() {
    init_logging();
    let mut backend = HeadlessBackend::new();

    let mut quad = StreamingBatch::new();
    quad.begin(PrimitiveTopology::TriangleStrip, 4, 0);
    for i in 0..4 {
        quad.vertex(&mut backend, i as f32, 0.0, 0.0).unwrap();
    }
    quad.end(&mut backend);

    let mut mesh = WeldedMeshBuilder::new();
    mesh.begin_mesh(3);
    mesh.add_triangle(
        [Vec3::ZERO, Vec3::X, Vec3::Y],
        [Vec3::Z; 3],
        [Vec2::ZERO, Vec2::X, Vec2::Y],
    );
    mesh.end(&mut backend).unwrap();

    assert_eq!(backend.buffer_count(), 5);

    // destroying one leaves the other drawable
    quad.destroy(&mut backend);
    assert_eq!(backend.buffer_count(), 4);
    mesh.draw(&mut backend);
    assert_eq!(backend.draw_calls().len(), 1);
}
