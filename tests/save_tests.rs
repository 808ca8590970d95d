// tests/save_tests.rs

use emoji_tile_editor::{
    CellCoord, EditorConfig, EditorSession, GridSnapshot, Layer, MapError, SessionEvent, Tool,
    TileMap,
};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("emoji_editor_save_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn session() -> EditorSession {
    EditorSession::new(EditorConfig::default()).expect("default config is valid")
}

#[test]
fn legacy_tree_lands_on_features() {
    let mut m = TileMap::from_config(&EditorConfig::default()).expect("default config is valid");
    let snap: GridSnapshot = serde_json::from_str(r#"{ "grid": { "3,4": "🌳" } }"#).unwrap();
    m.import_grid(&snap).unwrap();

    let obj = m.resolve(CellCoord::new(3, 4), Layer::Features).expect("migrated");
    assert_eq!(obj.tile, "🌳");
    assert_eq!(obj.size, 1);
    assert!(obj.is_origin);
    assert_eq!(m.store().len(), 1);
}

#[test]
fn legacy_pair_list_grid_is_read() {
    let mut m = TileMap::from_config(&EditorConfig::default()).expect("default config is valid");
    let snap: GridSnapshot =
        serde_json::from_str(r#"{"version":5,"grid":[["3,4","🌳"]]}"#).unwrap();
    m.import_grid(&snap).unwrap();
    assert_eq!(m.store().len(), 1);

    let obj = m.resolve(CellCoord::new(3, 4), Layer::Features).expect("migrated");
    assert_eq!(obj.tile, "🌳");
    assert!(obj.is_origin);
}

#[test]
fn legacy_objects_with_parts_and_layers() {
    let mut m = TileMap::from_config(&EditorConfig::default()).expect("default config is valid");
    let snap: GridSnapshot = serde_json::from_str(
        r#"{
            "version": 5,
            "grid": {
                "0,0": { "tile": "🏠", "size": 2, "isOrigin": true },
                "1,0": { "originX": 0, "originY": 0, "isOrigin": false },
                "0,1": { "originX": 0, "originY": 0, "isOrigin": false },
                "1,1": { "originX": 0, "originY": 0, "isOrigin": false },
                "5,5": { "tile": "grass", "size": 1, "isOrigin": true, "layer": 0 }
            }
        }"#,
    )
    .unwrap();
    m.import_grid(&snap).unwrap();

    assert_eq!(
        m.resolve(CellCoord::new(1, 1), Layer::Buildings).unwrap().origin,
        CellCoord::new(0, 0)
    );
    assert_eq!(m.resolve(CellCoord::new(5, 5), Layer::Ground).unwrap().tile, "grass");
}

#[test]
fn current_snapshot_text_round_trips() {
    let mut s = session();
    s.select_tile("grass");
    s.set_brush_size(3);
    s.apply_at(CellCoord::new(0, 0)).unwrap();
    s.select_tile("🏠");
    s.set_brush_size(2);
    s.apply_at(CellCoord::new(1, 1)).unwrap();
    s.pan_to(64.0, 32.0);
    s.set_zoom(2.0);

    let text = s.to_json_string().unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["version"], 6);
    assert_eq!(v["grid"]["1,1"]["3"]["tile"], "🏠");
    assert_eq!(v["grid"]["2,2"]["3"]["originX"], 1);
    assert_eq!(v["grid"]["2,2"]["0"]["isOrigin"], false);

    let mut other = session();
    assert_eq!(other.load_from_str(&text).unwrap(), SessionEvent::Loaded { cells: 9 });
    assert_eq!(other.map().store(), s.map().store());
    assert_eq!(other.camera(), s.camera());
    assert_eq!(other.selected_tile(), "🏠");
    assert_eq!(other.brush_size(), 2);
    assert!(!other.map().can_undo());
}

#[test]
fn file_save_and_load() {
    let dir = temp_dir();
    let path = dir.join("city.json");

    let mut s = session();
    s.apply_at(CellCoord::new(7, 7)).unwrap();
    s.save_to_file(&path).unwrap();

    let mut other = session();
    other.set_tool(Tool::Bulldoze);
    let ev = other.load_from_file(&path).unwrap();
    assert_eq!(ev, SessionEvent::Loaded { cells: 1 });
    assert_eq!(
        other.map().resolve(CellCoord::new(7, 7), Layer::Features).unwrap().tile,
        "🌳"
    );

    let loaded = EditorSession::from_document(
        EditorConfig::default(),
        &emoji_tile_editor::SaveDocument::read_file(&path).unwrap(),
    )
    .unwrap();
    assert_eq!(loaded.map().store(), s.map().store());

    assert!(matches!(
        s.save_to_file(dir.join("city.txt")),
        Err(MapError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        other.load_from_file(dir.join("nope.json")),
        Err(MapError::Io { .. })
    ));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn broken_save_keeps_current_map() {
    let mut s = session();
    s.apply_at(CellCoord::new(2, 3)).unwrap();
    let before = s.map().store().clone();

    for bad in [
        r#"{ "version": 6, "grid": { "2;3": {} } }"#,
        r#"{ "version": 6, "grid": { "500,3": { "2": { "tile": "🌳", "size": 1, "isOrigin": true } } } }"#,
        r#"{ "version": 6, "grid": { "0,0": { "9": { "tile": "🌳", "size": 1, "isOrigin": true } } } }"#,
        r#"{ "version": 6, "grid": { "99,0": { "2": { "tile": "🌳", "size": 3, "isOrigin": true } } } }"#,
        r#"{ "version": 6, "grid": { "0,0": { "3": { "tile": "🏠", "size": 4, "isOrigin": true } } } }"#,
        r#"{ "grid": [ ["1,1"] ] }"#,
        r#"{ "grid": [ ["1,1", "🌳"], ["1,1", "🏠"] ] }"#,
        r#"{ "grid": 7 }"#,
        "not json",
    ] {
        assert!(s.load_from_str(bad).is_err(), "accepted {bad}");
        assert_eq!(s.map().store(), &before);
        assert!(s.map().can_undo());
    }
}
