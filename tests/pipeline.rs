//! End-to-end pipeline scenarios: scenes rendered through the engine
//! against a recording surface.

use intrast::object::{FaceCulling, FrustumCulling, MeshLodLevel, MeshLodObject};
use intrast::prelude::*;
use intrast::rasterizer::WindowRasterizer;
use intrast::surface::SurfaceCall;
use intrast::vertex::VERTEX16_UNIT as UNIT;

type Engine<'scene> = EngineRenderTask<'scene, MockSurface, 8, 64>;

const FACING_TRIANGLE: [Vertex16; 3] = [
    Vertex16::new(0, 0, UNIT),
    Vertex16::new(UNIT, 0, UNIT),
    Vertex16::new(0, UNIT, UNIT),
];
const SINGLE_FACE: [TriangleFace; 1] = [TriangleFace { a: 0, b: 1, c: 2 }];
const REVERSED_FACE: [TriangleFace; 1] = [TriangleFace { a: 0, b: 2, c: 1 }];

fn triangle_fills(surface: &MockSurface) -> Vec<SurfaceCall> {
    surface
        .calls
        .iter()
        .filter(|call| matches!(call, SurfaceCall::TriangleFill { .. }))
        .copied()
        .collect()
}

#[test]
fn point_behind_the_camera_draws_nothing() {
    let mut shader = PointPixelShader;
    let points = [Vertex16::new(0, 0, -UNIT)];
    let mut cloud: SimplePointCloudObject<1> = SimplePointCloudObject::with_static_tables(&points);
    cloud.frustum_culling = FrustumCulling::NoCulling;
    cloud.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16::ZERO);
    assert!(engine.add_object(&mut cloud));
    engine.start();
    engine.render_frames(1);

    assert_eq!(engine.status().fragments_drawn, 0);
    assert_eq!(engine.surface().draw_call_count(), 0);
}

#[test]
fn facing_triangle_renders_once_inside_the_window() {
    let mut shader = TriangleFillShader;
    let mut mesh: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&FACING_TRIANGLE, &SINGLE_FACE);
    mesh.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut mesh));
    engine.start();
    engine.render_frames(1);

    assert_eq!(engine.status().fragments_drawn, 1);

    let fills = triangle_fills(engine.surface());
    assert_eq!(fills.len(), 1);
    let SurfaceCall::TriangleFill {
        x1,
        y1,
        x2,
        y2,
        x3,
        y3,
        ..
    } = fills[0]
    else {
        unreachable!();
    };
    // All three corners strictly inside the window.
    for (x, y) in [(x1, y1), (x2, y2), (x3, y3)] {
        assert!(x > 0 && x < 127 && y > 0 && y < 127, "({x},{y})");
    }
    // The projection is anchored at the viewport center.
    assert_eq!((x1, y1), (64, 64));
    assert!(x2 > 64 && y3 > 64);
}

#[test]
fn reversed_winding_culls_under_backface_culling() {
    let mut shader = TriangleFillShader;
    let mut mesh: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&FACING_TRIANGLE, &REVERSED_FACE);
    mesh.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut mesh));
    engine.start();
    engine.render_frames(1);

    assert_eq!(engine.status().fragments_drawn, 0);
    assert_eq!(engine.surface().draw_call_count(), 0);
}

#[test]
fn reversed_winding_draws_without_culling() {
    let mut shader = TriangleFillShader;
    let mut mesh: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&FACING_TRIANGLE, &REVERSED_FACE);
    mesh.face_culling = FaceCulling::NoCulling;
    mesh.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut mesh));
    engine.start();
    engine.render_frames(1);

    assert_eq!(engine.status().fragments_drawn, 1);
    assert_eq!(triangle_fills(engine.surface()).len(), 1);
}

#[test]
fn overlapping_triangles_paint_back_to_front() {
    const NEAR: [Vertex16; 3] = [
        Vertex16::new(0, 0, 2048),
        Vertex16::new(UNIT, 0, 2048),
        Vertex16::new(0, UNIT, 2048),
    ];
    const FAR: [Vertex16; 3] = [
        Vertex16::new(512, 256, 3072),
        Vertex16::new(UNIT + 512, 256, 3072),
        Vertex16::new(512, UNIT + 256, 3072),
    ];

    let mut near_shader = TriangleFillShader;
    let mut near: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&NEAR, &SINGLE_FACE);
    near.set_albedo(Rgb8::RED);
    near.fragment_shader = Some(&mut near_shader);

    let mut far_shader = TriangleFillShader;
    let mut far: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&FAR, &SINGLE_FACE);
    far.set_albedo(Rgb8::BLUE);
    far.fragment_shader = Some(&mut far_shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    // Near is registered first; depth ordering must still paint far first.
    assert!(engine.add_object(&mut near));
    assert!(engine.add_object(&mut far));
    engine.start();
    engine.render_frames(1);

    let fills = triangle_fills(engine.surface());
    assert_eq!(fills.len(), 2);
    let SurfaceCall::TriangleFill { color: first, .. } = fills[0] else {
        unreachable!();
    };
    let SurfaceCall::TriangleFill { color: second, .. } = fills[1] else {
        unreachable!();
    };
    assert_eq!(first, Rgb8::BLUE);
    assert_eq!(second, Rgb8::RED);
}

#[test]
fn line_clips_to_the_window() {
    let mut surface = MockSurface::new(101, 101);
    {
        let mut rasterizer = WindowRasterizer::new(&mut surface);
        rasterizer.draw_line(Rgb8::WHITE, -50, 50, 150, 50);
    }
    assert_eq!(
        surface.calls,
        vec![SurfaceCall::Line {
            color: Rgb8::WHITE,
            x1: 0,
            y1: 50,
            x2: 100,
            y2: 50,
        }]
    );
}

#[test]
fn directional_light_shades_through_the_pipeline() {
    let lights = [LightSource::directional(
        Rgb8::WHITE,
        Vertex16::new(0, 0, -UNIT),
    )];
    let mut scene_shader = LightsShader::new();
    scene_shader.set_lights(&lights);

    // The facing triangle's derived normal points along +z, into the light.
    let mut shader = TriangleFillShader;
    let mut mesh: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&FACING_TRIANGLE, &SINGLE_FACE);
    mesh.fragment_shader = Some(&mut shader);
    mesh.scene_shader = Some(&scene_shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut mesh));
    engine.start();
    engine.render_frames(1);

    let fills = triangle_fills(engine.surface());
    assert_eq!(fills.len(), 1);
    let SurfaceCall::TriangleFill { color, .. } = fills[0] else {
        unreachable!();
    };
    // Full Lambert response: the lit color reaches the albedo (modulo the
    // 8-bit light modulation).
    assert!(color.red() >= 250, "{color:?}");
    assert_eq!(color.red(), color.green());
    assert_eq!(color.green(), color.blue());
}

#[test]
fn sideways_normal_gets_ambient_only() {
    let lights = [LightSource::directional(
        Rgb8::WHITE,
        Vertex16::new(0, 0, -UNIT),
    )];
    let mut scene_shader = LightsShader::new();
    scene_shader.set_lights(&lights);
    scene_shader.ambient = Rgb8::new(32, 32, 32);

    // A triangle in a plane parallel to the view axis: its normal is
    // perpendicular to the light, so only ambient survives.
    const SIDE_TRIANGLE: [Vertex16; 3] = [
        Vertex16::new(0, 0, UNIT),
        Vertex16::new(0, 0, 2 * UNIT),
        Vertex16::new(0, UNIT, UNIT),
    ];

    let mut shader = TriangleFillShader;
    let mut mesh: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&SIDE_TRIANGLE, &SINGLE_FACE);
    mesh.face_culling = FaceCulling::NoCulling;
    mesh.frustum_culling = FrustumCulling::NoCulling;
    mesh.fragment_shader = Some(&mut shader);
    mesh.scene_shader = Some(&scene_shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut mesh));
    engine.start();
    engine.render_frames(1);

    let fills = triangle_fills(engine.surface());
    assert_eq!(fills.len(), 1);
    let SurfaceCall::TriangleFill { color, .. } = fills[0] else {
        unreachable!();
    };
    assert_eq!(color, Rgb8::new(32, 32, 32));
}

#[test]
fn fragment_pool_overflow_is_counted_not_fatal() {
    let mut shader = PointPixelShader;
    // 96 points in front of the camera, but only 64 fragment slots.
    let vertices: Vec<Vertex16> = (0i16..96)
        .map(|i| Vertex16::new((i % 16) * 64, (i / 16) * 64, UNIT + i * 8))
        .collect();
    let mut cloud: SimplePointCloudObject<96> =
        SimplePointCloudObject::with_static_tables(&vertices);
    cloud.frustum_culling = FrustumCulling::NoCulling;
    cloud.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut cloud));
    engine.start();
    engine.render_frames(1);

    let status = engine.status();
    assert_eq!(status.fragments_drawn, 64);
    assert_eq!(status.fragments_dropped, 32);
}

#[test]
fn billboard_emits_one_rectangle() {
    let mut shader = BillboardFillShader;
    let mut billboard = BillboardObject::new(32, 16);
    billboard.translation = Vertex16::new(0, 0, 2 * UNIT);
    billboard.scale_mode = BillboardScaleMode::ScreenSpace;
    billboard.set_albedo(Rgb8::GREEN);
    billboard.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut billboard));
    engine.start();
    engine.render_frames(1);

    assert_eq!(engine.status().fragments_drawn, 1);
    let rectangles: Vec<_> = engine
        .surface()
        .calls
        .iter()
        .filter(|call| matches!(call, SurfaceCall::RectangleFill { .. }))
        .collect();
    assert_eq!(rectangles.len(), 1);
    let SurfaceCall::RectangleFill { color, x1, y1, x2, y2 } = rectangles[0] else {
        unreachable!();
    };
    assert_eq!(*color, Rgb8::GREEN);
    // Centered on the viewport, wider than tall per the 2:1 proportion.
    assert!(*x1 < 64 && *x2 > 64);
    assert!(*y1 < 64 && *y2 > 64);
    assert!((x2 - x1) > (y2 - y1));
}

#[test]
fn background_paints_behind_everything() {
    let mut background_shader = BackgroundFillShader;
    let mut background = BackgroundFillObject::new(Rgb8::new(1, 2, 3));
    background.fragment_shader = Some(&mut background_shader);

    let mut mesh_shader = TriangleFillShader;
    let mut mesh: SimpleMeshTriangleObject<3, 1> =
        SimpleMeshTriangleObject::with_static_tables(&FACING_TRIANGLE, &SINGLE_FACE);
    mesh.fragment_shader = Some(&mut mesh_shader);

    let mut engine = Engine::new(MockSurface::new(64, 64));
    engine.set_fov(UFraction16(16384));
    // Mesh first, background second; depth keys must still order them.
    assert!(engine.add_object(&mut mesh));
    assert!(engine.add_object(&mut background));
    engine.start();
    engine.render_frames(1);

    let draws: Vec<_> = engine.surface().draw_calls().collect();
    assert!(matches!(draws[0], SurfaceCall::RectangleFill { .. }));
    assert!(matches!(draws[1], SurfaceCall::TriangleFill { .. }));
}

#[test]
fn cube_scene_renders_only_front_faces() {
    let mut shader = TriangleFillShader;
    let mut cube: SimpleMeshTriangleObject<8, 12> =
        SimpleMeshTriangleObject::with_static_tables(
            &intrast::shapes::CUBE_VERTICES,
            &intrast::shapes::CUBE_TRIANGLES,
        );
    cube.transform.translation = Vertex16::new(0, 0, 3 * UNIT);
    cube.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut cube));
    engine.start();
    engine.render_frames(1);

    // Face-on, only the two near-face triangles survive backface culling.
    assert_eq!(engine.status().fragments_drawn, 2);
}

#[test]
fn rotated_cube_shows_two_faces() {
    let mut shader = TriangleFillShader;
    let mut cube: SimpleMeshTriangleObject<8, 12> =
        SimpleMeshTriangleObject::with_static_tables(
            &intrast::shapes::CUBE_VERTICES,
            &intrast::shapes::CUBE_TRIANGLES,
        );
    cube.transform.translation = Vertex16::new(0, 0, 3 * UNIT);
    cube.transform.rotation.y = Angle(8192);
    cube.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut cube));
    engine.start();
    engine.render_frames(1);

    // An eighth of a turn shows the near and right faces; the rest are
    // culled or edge-on.
    assert_eq!(engine.status().fragments_drawn, 4);
}

#[test]
fn edge_wireframe_renders_all_cube_edges() {
    let mut shader = EdgeLineShader;
    let mut wireframe: SimpleEdgeLineObject<8, 12> = SimpleEdgeLineObject::with_static_tables(
        &intrast::shapes::CUBE_VERTICES,
        &intrast::shapes::CUBE_EDGES,
    );
    wireframe.transform.translation = Vertex16::new(0, 0, 3 * UNIT);
    wireframe.set_albedo(Rgb8::CYAN);
    wireframe.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut wireframe));
    engine.start();
    engine.render_frames(1);

    // No face culling on the wireframe: every cube edge becomes a fragment
    // and draws as a line (or a single pixel where it projects edge-on).
    assert_eq!(engine.status().fragments_drawn, 12);
    assert_eq!(engine.surface().draw_call_count(), 12);
    for call in engine.surface().draw_calls() {
        assert!(matches!(
            call,
            SurfaceCall::Line { color, .. } | SurfaceCall::Pixel { color, .. }
                if *color == Rgb8::CYAN
        ));
    }
}

#[test]
fn vertex_shaded_edge_carries_a_gradient() {
    const BAR_VERTICES: [Vertex16; 2] = [
        Vertex16::new(0, -UNIT, 0),
        Vertex16::new(0, UNIT, 0),
    ];
    const BAR_EDGES: [EdgeLine; 1] = [EdgeLine { a: 0, b: 1 }];

    let scene = NormalVisualizerShader::new();
    let mut shader = EdgeGradientShader::default();
    let mut bar: SimpleEdgeVertexObject<2, 1> =
        SimpleEdgeVertexObject::with_static_tables(&BAR_VERTICES, &BAR_EDGES);
    bar.transform.translation = Vertex16::new(0, 0, 3 * UNIT);
    bar.scene_shader = Some(&scene);
    bar.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut bar));
    engine.start();
    engine.render_frames(1);

    assert_eq!(engine.status().fragments_drawn, 1);

    // The -y endpoint's radial normal maps to zero green, the +y endpoint's
    // to full green; pixels in between interpolate.
    let mut top: Option<(i16, Rgb8)> = None;
    let mut bottom: Option<(i16, Rgb8)> = None;
    for call in engine.surface().draw_calls() {
        if let SurfaceCall::Pixel { color, y, .. } = call {
            if top.map_or(true, |(top_y, _)| *y < top_y) {
                top = Some((*y, *color));
            }
            if bottom.map_or(true, |(bottom_y, _)| *y > bottom_y) {
                bottom = Some((*y, *color));
            }
        }
    }
    let (top_y, top_color) = top.expect("gradient pixels drawn");
    let (bottom_y, bottom_color) = bottom.expect("gradient pixels drawn");
    assert!(top_y < bottom_y);
    assert!(top_color.green() < 30, "{top_color:?}");
    assert!(bottom_color.green() > 225, "{bottom_color:?}");
}

#[test]
fn vertex_shaded_mesh_interpolates_corner_colors() {
    let scene = NormalVisualizerShader::new();
    let mut shader = VertexColorTriangleShader::<intrast::sampler::TriangleAffineSampler>::default();
    let mut mesh: SimpleMeshVertexObject<3, 1> =
        SimpleMeshVertexObject::with_static_tables(&FACING_TRIANGLE, &SINGLE_FACE);
    mesh.fragment_shader = Some(&mut shader);
    mesh.scene_shader = Some(&scene);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut mesh));
    engine.start();
    engine.render_frames(1);

    assert_eq!(engine.status().fragments_drawn, 1);

    // Corner A's vertex normal points along +z: its pixel shows the normal
    // visualizer's full blue. Corner B leans along +x, raising red.
    let mut corner_a = None;
    let mut corner_b = None;
    for call in engine.surface().draw_calls() {
        if let SurfaceCall::Pixel { color, x, y } = call {
            if (*x, *y) == (64, 64) {
                corner_a = Some(*color);
            }
            if (*x, *y) == (76, 64) {
                corner_b = Some(*color);
            }
        }
    }
    let corner_a = corner_a.expect("corner A rasterized");
    let corner_b = corner_b.expect("corner B rasterized");
    assert!(corner_a.blue() > 240, "{corner_a:?}");
    assert!(corner_a.red() < 160, "{corner_a:?}");
    assert!(corner_b.red() > corner_a.red() + 60, "{corner_b:?}");
}

#[test]
fn lod_mesh_switches_levels_with_camera_distance() {
    let mut shader = TriangleFillShader;
    let mut lod: MeshLodObject<8, 12, 2> = MeshLodObject::new();
    assert!(lod.add_level(MeshLodLevel {
        vertices: &intrast::shapes::CUBE_VERTICES,
        triangles: &intrast::shapes::CUBE_TRIANGLES,
        max_distance: UNIT as u16 * 4,
    }));
    assert!(lod.add_level(MeshLodLevel {
        vertices: &intrast::shapes::DIAMOND_VERTICES,
        triangles: &intrast::shapes::DIAMOND_TRIANGLES,
        max_distance: UNIT as u16 * 8,
    }));
    lod.mesh.transform.translation = Vertex16::new(0, 0, 3 * UNIT);
    lod.mesh.face_culling = FaceCulling::NoCulling;
    lod.mesh.frustum_culling = FrustumCulling::NoCulling;
    lod.mesh.fragment_shader = Some(&mut shader);

    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut lod));
    engine.start();

    // Close: the detailed cube level.
    engine.render_frames(1);
    assert_eq!(engine.status().fragments_drawn, 12);

    // Stepping back past the first threshold swaps in the diamond level.
    engine.camera_mut().position.z = -3 * UNIT;
    engine.render_frames(1);
    assert_eq!(engine.status().fragments_drawn, 8);

    // Past every threshold nothing renders.
    engine.camera_mut().position.z = -6 * UNIT;
    engine.render_frames(1);
    assert_eq!(engine.status().fragments_drawn, 0);
}

#[cfg(feature = "frustum-debug")]
#[test]
fn frustum_wireframe_captures_and_draws() {
    use intrast::object::FrustumDebugObject;

    let mut wireframe = FrustumDebugObject::new();
    let mut engine = Engine::new(MockSurface::new(128, 128));
    engine.set_fov(UFraction16(16384));
    assert!(engine.add_object(&mut wireframe));
    engine.start();

    // The first frame captures the live frustum: the full cage of near
    // quad, far quad, connectors and origin rays.
    engine.render_frames(1);
    assert_eq!(engine.status().fragments_drawn, 16);

    // Step the camera back; the captured cage stays put and renders ahead
    // of the new viewpoint.
    engine.camera_mut().position.z = -2 * UNIT;
    engine.render_frames(1);
    assert_eq!(engine.status().fragments_drawn, 16);
    assert!(engine.surface().draw_call_count() > 0);
}
