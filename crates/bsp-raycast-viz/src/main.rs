use bsp_raycast::{brute_force, BspTree, BuildConfig, MollerTrumbore, RayIdGenerator, RayQuery, TriangleFlags};
use bsp_raycast_viz::{
    draw_hit, draw_pick_ui, draw_scene, draw_stats, report_pick, OrbitCamera, SceneMesh,
};
use macroquad::prelude::*;

/// Rolling hills on a 20 x 20 square.
fn generate_terrain() -> SceneMesh {
    let mut scene = SceneMesh::new();
    scene.push_terrain(
        20.0,
        96,
        |x, z| (x * 0.5).sin() * (z * 0.4).cos() * 1.5 + (x * 1.7 + z * 1.3).sin() * 0.2,
        TriangleFlags::GEOMETRY | TriangleFlags::CAST_SHADOWS,
    );
    scene
}

#[macroquad::main("BSP Ray Picking")]
async fn main() {
    let scene = generate_terrain();
    let mesh = match scene.mesh_ref() {
        Ok(mesh) => mesh,
        Err(err) => {
            println!("Invalid terrain mesh: {err}");
            return;
        }
    };
    println!("Created {} triangles", mesh.triangles().len());

    println!("Building BSP tree...");
    let config = BuildConfig::new(20, 8);
    let tree = match BspTree::build(mesh, config.clone()) {
        Ok(tree) => {
            println!("BSP tree built: {}", tree.stats());
            Some(tree)
        }
        Err(err) => {
            println!("Tree build failed ({err}), picking without acceleration");
            None
        }
    };

    let mut camera = OrbitCamera::new(25.0, 0.6, 0.6).with_zoom(1.0, 5.0, 60.0);
    let ids = RayIdGenerator::new();
    let mut picked = None;

    loop {
        camera.update();

        if is_mouse_button_pressed(MouseButton::Right) {
            let ray = camera.pick_ray(mouse_position().into(), &ids);
            let query = RayQuery::default();
            let hit = match &tree {
                Some(tree) => report_pick(tree.intersect(&ray, &query)),
                None => brute_force::intersect(&mesh, &ray, &query, config.flag_mask, &MollerTrumbore),
            };
            picked = hit.map(|hit| (ray, hit));
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        draw_scene(&mesh);
        if let Some((ray, hit)) = &picked {
            draw_hit(ray, hit);
        }

        set_default_camera();

        draw_text(
            &format!("BSP Ray Picking - {} triangles", mesh.triangles().len()),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        let y = match &tree {
            Some(tree) => draw_stats(tree.stats(), 45.0),
            None => 45.0,
        };
        draw_pick_ui(picked.as_ref().map(|(_, hit)| hit), y + 10.0);

        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, y + 40.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, y + 60.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
