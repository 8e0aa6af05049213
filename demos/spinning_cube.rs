//! Windowed demo: a lit cube and a wireframe diamond spinning in front of
//! the camera.
//!
//! Run with: `cargo run --example spinning_cube --features window`

use intrast::prelude::*;
use intrast::shapes;

const WIDTH: i16 = 256;
const HEIGHT: i16 = 256;

fn main() {
    env_logger::init();

    let lights = [
        LightSource::directional(
            Rgb8::WHITE,
            Vertex16::new(0, -VERTEX16_UNIT, -VERTEX16_UNIT),
        ),
        LightSource::point(
            Rgb8::new(255, 96, 32),
            Vertex16::new(2 * VERTEX16_UNIT, -VERTEX16_UNIT, VERTEX16_UNIT),
            0,
            6 * VERTEX16_UNIT as u16,
        ),
    ];
    let mut scene_shader = LightsShader::new();
    scene_shader.set_lights(&lights);
    scene_shader.ambient = Rgb8::new(20, 20, 28);

    let mut background_shader = BackgroundFillShader;
    let mut background = BackgroundFillObject::new(Rgb8::new(10, 10, 18));
    background.fragment_shader = Some(&mut background_shader);

    let mut cube_shader = TriangleFillShader;
    let mut cube: SimpleMeshTriangleObject<8, 12> = SimpleMeshTriangleObject::with_static_tables(
        &shapes::CUBE_VERTICES,
        &shapes::CUBE_TRIANGLES,
    );
    cube.transform.translation = Vertex16::new(0, 0, 3 * VERTEX16_UNIT);
    cube.set_albedo(Rgb8::new(230, 190, 90));
    cube.scene_shader = Some(&scene_shader);
    cube.fragment_shader = Some(&mut cube_shader);

    let mut wire_shader = EdgeLineShader;
    let mut wireframe: SimpleEdgeLineObject<8, 12> = SimpleEdgeLineObject::with_static_tables(
        &shapes::CUBE_VERTICES,
        &shapes::CUBE_EDGES,
    );
    wireframe.transform.translation = Vertex16::new(0, 0, 3 * VERTEX16_UNIT);
    wireframe.transform.resize = Scale16::factor(5, 4);
    wireframe.set_albedo(Rgb8::new(80, 200, 255));
    wireframe.fragment_shader = Some(&mut wire_shader);

    let surface = FrameBufferSurface::new(WIDTH, HEIGHT).expect("surface dimensions");
    let mut engine: EngineRenderTask<_, 8, 128> = EngineRenderTask::new(surface);
    engine.set_fov(UFraction16(16384));
    engine.add_object(&mut background);
    engine.add_object(&mut cube);
    engine.add_object(&mut wireframe);
    engine.start();

    let (event_loop, mut window) =
        mini_gl_fb::gotta_go_fast("intrast: spinning cube", WIDTH as f64, HEIGHT as f64);

    let mut angle = Angle::ZERO;
    let mut frame = vec![[0u8; 4]; WIDTH as usize * HEIGHT as usize];

    window.glutin_handle_basic_input(event_loop, move |fb, input| {
        if input.key_is_down(mini_gl_fb::glutin::event::VirtualKeyCode::Escape) {
            return false;
        }

        // Turntable: orbit the camera around the scene center, always
        // facing it.
        angle = angle.wrapping_add(Angle(157));
        let orbit = 3 * VERTEX16_UNIT;
        let sin = intrast::fixed::sine16(angle);
        let cos = intrast::fixed::cosine16(angle);
        let camera = engine.camera_mut();
        camera.rotation.y = angle;
        camera.position = Vertex16::new(
            -sin.scale_i16(orbit),
            0,
            3 * VERTEX16_UNIT - cos.scale_i16(orbit),
        );

        engine.render_frames(1);

        // The framebuffer surface stores ARGB; the window wants RGBA rows
        // bottom-up.
        let source = engine.surface().as_argb();
        for y in 0..HEIGHT as usize {
            let source_row = &source[y * WIDTH as usize..(y + 1) * WIDTH as usize];
            let target_row = (HEIGHT as usize - 1 - y) * WIDTH as usize;
            for (x, &pixel) in source_row.iter().enumerate() {
                let color = Rgb8(pixel);
                frame[target_row + x] = [color.red(), color.green(), color.blue(), 255];
            }
        }
        fb.update_buffer(&frame);

        true
    });
}
