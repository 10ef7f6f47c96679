use bsp_raycast::{BspTree, BuildConfig, RayIdGenerator, RayQuery, Real, TriangleFlags};
use bsp_raycast_viz::{
    draw_hit, draw_pick_ui, draw_stats, report_pick, OrbitCamera, SceneMesh, TreeNavigator,
};
use macroquad::prelude::*;
use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Generates the complex scene with two cubes and a floor.
fn generate_complex_scene() -> SceneMesh {
    let mut scene = SceneMesh::new();
    let solid = TriangleFlags::GEOMETRY | TriangleFlags::CAST_SHADOWS;

    // First cube: rotated around all three axes
    let rot_x = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::x()), 0.3);
    let rot_y = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::y()), 0.4);
    let rot_z = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::z()), 0.25);
    let rotation = rot_z * rot_y * rot_x;
    scene.push_cube(Point3::new(-1.0, 0.0, 0.0), 0.8, &rotation, solid);

    // Second cube: axis-aligned
    scene.push_cube(Point3::new(1.0, 0.0, 0.0), 0.8, &Rotation3::identity(), solid);

    // Floor at y = -1, receives but does not cast
    let floor: [Point3<Real>; 4] = [
        Point3::new(-1.5, -1.0, 1.5),
        Point3::new(1.5, -1.0, 1.5),
        Point3::new(1.5, -1.0, -1.5),
        Point3::new(-1.5, -1.0, -1.5),
    ];
    scene.push_quad(floor, TriangleFlags::GEOMETRY | TriangleFlags::RECEIVE_CAUSTICS);

    scene
}

#[macroquad::main("BSP Complex Scene")]
async fn main() {
    println!("Generating complex scene...");
    let scene = generate_complex_scene();
    let mesh = match scene.mesh_ref() {
        Ok(mesh) => mesh,
        Err(err) => {
            println!("Invalid scene mesh: {err}");
            return;
        }
    };
    println!("Created {} triangles (2 cubes + 1 floor)", mesh.triangles().len());

    println!("Building BSP tree...");
    let tree = match BspTree::build(mesh, BuildConfig::new(8, 2)) {
        Ok(tree) => tree,
        Err(err) => {
            println!("Tree build failed: {err}");
            return;
        }
    };
    println!("BSP tree built: {}", tree.stats());

    let mut camera = OrbitCamera::new(5.0, 0.4, 0.4).with_zoom(0.5, 2.0, 20.0);
    let mut navigator = TreeNavigator::new();
    let ids = RayIdGenerator::new();
    let mut shadow_only = false;
    let mut picked = None;

    loop {
        camera.update();
        navigator.update(&tree);
        if is_key_pressed(KeyCode::S) {
            shadow_only = !shadow_only;
        }

        if is_mouse_button_pressed(MouseButton::Right) {
            let ray = camera.pick_ray(mouse_position().into(), &ids);
            let query = if shadow_only {
                RayQuery::new().with_filter(TriangleFlags::CAST_SHADOWS)
            } else {
                RayQuery::new()
            };
            picked = report_pick(tree.intersect(&ray, &query)).map(|hit| (ray, hit));
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        navigator.render(&tree);
        if let Some((ray, hit)) = &picked {
            draw_hit(ray, hit);
        }

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0), BLUE);

        set_default_camera();

        draw_text(
            &format!("BSP Complex Scene - {} triangles", mesh.triangles().len()),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        let y = draw_stats(tree.stats(), 45.0);

        navigator.draw_ui(&tree, y + 10.0);

        draw_pick_ui(picked.as_ref().map(|(_, hit)| hit), y + 95.0);
        draw_text(
            &format!("[S]hadow casters only: {}", if shadow_only { "on" } else { "off" }),
            10.0,
            y + 115.0,
            16.0,
            DARKGRAY,
        );
        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, y + 135.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, y + 155.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
