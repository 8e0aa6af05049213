//! Renders one lit frame of the demo scene and writes it to `frame.png`.
//!
//! Run with: `cargo run --example render_png --features image`

use std::path::Path;

use intrast::prelude::*;
use intrast::shapes;

fn main() {
    env_logger::init();

    let lights = [
        LightSource::directional(
            Rgb8::WHITE,
            Vertex16::new(-VERTEX16_UNIT / 2, -VERTEX16_UNIT, -VERTEX16_UNIT),
        ),
        LightSource::point(
            Rgb8::new(64, 128, 255),
            Vertex16::new(-2 * VERTEX16_UNIT, 0, 2 * VERTEX16_UNIT),
            0,
            5 * VERTEX16_UNIT as u16,
        ),
    ];
    let mut scene_shader = LightsShader::new();
    scene_shader.set_lights(&lights);
    scene_shader.ambient = Rgb8::new(16, 16, 24);

    let mut background_shader = BackgroundFillShader;
    let mut background = BackgroundFillObject::new(Rgb8::new(8, 8, 16));
    background.fragment_shader = Some(&mut background_shader);

    let mut cube_shader = TriangleFillShader;
    let mut cube: SimpleMeshTriangleObject<8, 12> = SimpleMeshTriangleObject::with_static_tables(
        &shapes::CUBE_VERTICES,
        &shapes::CUBE_TRIANGLES,
    );
    cube.transform.translation = Vertex16::new(-VERTEX16_UNIT / 2, 0, 3 * VERTEX16_UNIT);
    cube.transform.rotation = RotationAngle {
        x: Angle(4000),
        y: Angle(9000),
        z: Angle::ZERO,
    };
    cube.set_albedo(Rgb8::new(240, 200, 80));
    cube.scene_shader = Some(&scene_shader);
    cube.fragment_shader = Some(&mut cube_shader);

    let mut diamond_shader = TriangleFillShader;
    let mut diamond: SimpleMeshTriangleObject<6, 8> = SimpleMeshTriangleObject::with_static_tables(
        &shapes::DIAMOND_VERTICES,
        &shapes::DIAMOND_TRIANGLES,
    );
    diamond.transform.translation = Vertex16::new(VERTEX16_UNIT, 0, 4 * VERTEX16_UNIT);
    diamond.transform.rotation.z = Angle(6000);
    diamond.set_albedo(Rgb8::new(120, 220, 160));
    diamond.scene_shader = Some(&scene_shader);
    diamond.fragment_shader = Some(&mut diamond_shader);

    let surface = FrameBufferSurface::new(320, 240).expect("surface dimensions");
    let mut engine: EngineRenderTask<_, 8, 128> = EngineRenderTask::new(surface);
    engine.set_fov(UFraction16(16384));
    engine.add_object(&mut background);
    engine.add_object(&mut cube);
    engine.add_object(&mut diamond);
    engine.start();
    engine.render_frames(1);

    let status = engine.status();
    log::info!(
        "rendered {} fragments in {}us",
        status.fragments_drawn,
        status.render + status.rasterize
    );

    engine
        .surface()
        .save_png(Path::new("frame.png"))
        .expect("write frame.png");
    println!("wrote frame.png");
}
