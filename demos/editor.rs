use anyhow::Context;
use emoji_tile_editor::{
    draw_plan, EditorConfig, EditorSession, MacroquadDrawer, Tool,
};
use macroquad::prelude::*;

const SAVE_PATH: &str = "emoji_map.json";
const PAN_SPEED: f32 = 600.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Emoji Tile Editor".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn palette(session: &EditorSession) -> Vec<String> {
    let mut tiles: Vec<String> = Vec::new();
    for cat in session.map().catalog().categories() {
        for t in &cat.tiles {
            if !tiles.contains(t) {
                tiles.push(t.clone());
            }
        }
    }
    tiles
}

async fn run() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EditorConfig::load_from_file(&path).with_context(|| format!("loading config {path}"))?,
        None => EditorConfig::default(),
    };
    let mut session = EditorSession::new(config)?;
    let tiles = palette(&session);
    let mut pick = tiles
        .iter()
        .position(|t| t == session.selected_tile())
        .unwrap_or(0);
    let mut status = String::from("B build, X bulldoze, I isolate, Tab tile, 1-3 size, Ctrl+Z/Y, S save, L load, C clear");

    loop {
        let (sw, sh) = (screen_width(), screen_height());
        let dt = get_frame_time();
        let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);

        // camera
        let (mut cx, mut cy) = (session.camera().x, session.camera().y);
        let step = PAN_SPEED * dt / session.camera().zoom;
        if is_key_down(KeyCode::Left) {
            cx -= step;
        }
        if is_key_down(KeyCode::Right) {
            cx += step;
        }
        if is_key_down(KeyCode::Up) {
            cy -= step;
        }
        if is_key_down(KeyCode::Down) {
            cy += step;
        }
        session.pan_to(cx, cy);
        let (mx, my) = mouse_position();
        let (_, wheel) = mouse_wheel();
        if wheel > 0.0 {
            session.zoom_steps(1, mx, my);
        } else if wheel < 0.0 {
            session.zoom_steps(-1, mx, my);
        }
        session.clamp_camera(sw, sh);

        // tools and palette
        if is_key_pressed(KeyCode::B) {
            session.set_tool(Tool::Build);
        }
        if is_key_pressed(KeyCode::X) {
            session.set_tool(Tool::Bulldoze);
        }
        if is_key_pressed(KeyCode::I) {
            session.set_isolation(!session.isolation());
        }
        if is_key_pressed(KeyCode::Tab) && !tiles.is_empty() {
            pick = (pick + 1) % tiles.len();
            session.select_tile(&tiles[pick]);
        }
        for (key, size) in [(KeyCode::Key1, 1), (KeyCode::Key2, 2), (KeyCode::Key3, 3)] {
            if is_key_pressed(key) {
                session.set_brush_size(size);
            }
        }

        if ctrl && is_key_pressed(KeyCode::Z) {
            session.undo();
        }
        if ctrl && is_key_pressed(KeyCode::Y) {
            session.redo();
        }
        if !ctrl && is_key_pressed(KeyCode::S) {
            status = match session.save_to_file(SAVE_PATH) {
                Ok(()) => format!("saved {SAVE_PATH}"),
                Err(e) => e.to_string(),
            };
        }
        if is_key_pressed(KeyCode::L) {
            status = match session.load_from_file(SAVE_PATH) {
                Ok(ev) => format!("{ev:?}"),
                Err(e) => e.to_string(),
            };
        }
        if is_key_pressed(KeyCode::C) {
            status = format!("{:?}", session.clear());
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            if let Err(why) = session.apply_at_screen(mx, my) {
                status = why.to_string();
            }
        }

        // draw
        clear_background(Color::from_rgba(0x2e, 0x7d, 0x32, 255));
        let plan = session.render_list(sw, sh);
        let mut drawer = MacroquadDrawer::new(session.map().catalog(), *session.camera());
        draw_plan(&plan, &mut drawer);

        let hover = session.screen_to_cell(mx, my);
        let cam = session.camera();
        let cell = session.config().cell_px * cam.zoom;
        let ok = session.preview_at(hover).is_ok();
        draw_rectangle_lines(
            (hover.x as f32 * session.config().cell_px - cam.x) * cam.zoom,
            (hover.y as f32 * session.config().cell_px - cam.y) * cam.zoom,
            cell * session.brush_size() as f32,
            cell * session.brush_size() as f32,
            2.0,
            if ok { WHITE } else { RED },
        );

        draw_text(
            &format!(
                "{:?} {} x{} on {}{}  |  {}",
                session.tool(),
                session.selected_tile(),
                session.brush_size(),
                session.placement_layer(),
                if session.isolation() { " (isolated)" } else { "" },
                status
            ),
            12.0,
            24.0,
            22.0,
            WHITE,
        );

        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("editor failed: {e:#}");
    }
}
