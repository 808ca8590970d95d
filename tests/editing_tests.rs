// tests/editing_tests.rs

use emoji_tile_editor::{
    ActionKind, CellCoord, EditorConfig, Layer, Rejection, TileMap,
};

fn map() -> TileMap {
    TileMap::from_config(&EditorConfig::default()).expect("default config is valid")
}

fn c(x: i32, y: i32) -> CellCoord {
    CellCoord::new(x, y)
}

#[test]
fn two_by_two_building_resolves_from_every_cell() {
    let mut m = map();
    let cs = m.place(c(5, 5), "🏠", 2, Layer::Buildings).unwrap();
    assert_eq!(cs.len(), 4);

    for (x, y) in [(5, 5), (6, 5), (5, 6), (6, 6)] {
        let obj = m.resolve(c(x, y), Layer::Buildings).expect("covered");
        assert_eq!(obj.tile, "🏠");
        assert_eq!(obj.size, 2);
        assert_eq!(obj.origin, c(5, 5));
        assert_eq!(obj.is_origin, (x, y) == (5, 5));
    }
    assert!(m.resolve(c(7, 7), Layer::Buildings).is_none());

    let removed = m.bulldoze(c(6, 6), None).unwrap();
    assert_eq!(removed.len(), 4);
    assert!(m.store().is_empty());

    assert_eq!(m.undo(), Some(ActionKind::Bulldoze));
    assert_eq!(m.resolve(c(6, 5), Layer::Buildings).unwrap().origin, c(5, 5));
}

#[test]
fn blocked_footprint_changes_nothing() {
    let mut m = map();
    m.place(c(2, 2), "🏢", 1, Layer::Buildings).unwrap();
    let before = m.store().clone();

    let err = m.place(c(0, 0), "🏠", 3, Layer::Buildings).unwrap_err();
    assert_eq!(
        err,
        Rejection::PlacementBlocked {
            cell: c(2, 2),
            layer: Layer::Buildings,
            tile: "🏢".into(),
        }
    );
    assert_eq!(m.store(), &before);
    assert_eq!(m.history().undo_len(), 1);
}

#[test]
fn layers_do_not_collide_with_each_other() {
    let mut m = map();
    m.place(c(5, 5), "🏠", 2, Layer::Buildings).unwrap();
    m.place(c(6, 6), "🌳", 1, Layer::Features).unwrap();
    m.place(c(4, 4), "grass", 3, Layer::Ground).unwrap();
    m.place(c(5, 5), "✈️", 1, Layer::Air).unwrap();

    let rec = m.store().get(c(6, 6)).unwrap();
    assert_eq!(rec.len(), 3);
    assert_eq!(m.resolve_topmost(c(6, 6)).unwrap().tile, "🏠");
    assert_eq!(m.resolve_topmost(c(5, 5)).unwrap().tile, "✈️");
    assert_eq!(m.resolve_topmost(c(4, 4)).unwrap().tile, "grass");
}

#[test]
fn bulldoze_takes_topmost_unless_isolated() {
    let mut m = map();
    m.place(c(1, 1), "grass", 1, Layer::Ground).unwrap();
    m.place(c(1, 1), "🏠", 1, Layer::Buildings).unwrap();

    m.bulldoze(c(1, 1), Some(Layer::Ground)).unwrap();
    assert!(m.resolve(c(1, 1), Layer::Ground).is_none());
    assert!(m.resolve(c(1, 1), Layer::Buildings).is_some());

    assert_eq!(
        m.bulldoze(c(1, 1), Some(Layer::Ground)).unwrap_err(),
        Rejection::NothingToRemove { cell: c(1, 1) }
    );

    m.bulldoze(c(1, 1), None).unwrap();
    assert!(m.store().is_empty());
}

#[test]
fn identical_repaint_is_not_recorded() {
    let mut m = map();
    m.place(c(5, 5), "🏠", 2, Layer::Buildings).unwrap();
    let again = m.place(c(5, 5), "🏠", 2, Layer::Buildings).unwrap();
    assert!(again.is_empty());
    assert_eq!(m.history().undo_len(), 1);
}

#[test]
fn ground_repaint_replaces_whole_object() {
    let mut m = map();
    m.place(c(0, 0), "grass", 2, Layer::Ground).unwrap();
    m.place(c(1, 1), "water", 1, Layer::Ground).unwrap();

    assert_eq!(m.resolve(c(1, 1), Layer::Ground).unwrap().tile, "water");
    for (x, y) in [(0, 0), (1, 0), (0, 1)] {
        assert!(m.resolve(c(x, y), Layer::Ground).is_none());
    }

    m.undo();
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(m.resolve(c(x, y), Layer::Ground).unwrap().tile, "grass");
    }
}

#[test]
fn layer_rules_for_ground_and_paths() {
    let mut m = map();
    assert!(matches!(
        m.place(c(0, 0), "grass", 1, Layer::Features),
        Err(Rejection::WrongLayerGround { .. })
    ));
    assert!(matches!(
        m.place(c(0, 0), "🌳", 1, Layer::Ground),
        Err(Rejection::WrongLayerGround { .. })
    ));
    assert!(matches!(
        m.place(c(0, 0), "road", 1, Layer::Buildings),
        Err(Rejection::WrongLayerPath { .. })
    ));
    m.place(c(0, 0), "road", 1, Layer::Paths).unwrap();
    m.place(c(0, 0), "rail", 1, Layer::Paths).unwrap();
    assert_eq!(m.resolve(c(0, 0), Layer::Paths).unwrap().tile, "rail");
}

#[test]
fn undo_redo_round_trip_and_redo_reset() {
    let mut m = map();
    m.place(c(0, 0), "grass", 3, Layer::Ground).unwrap();
    m.place(c(1, 1), "🏠", 2, Layer::Buildings).unwrap();
    m.bulldoze(c(2, 2), None).unwrap();
    let end = m.store().clone();

    while m.undo().is_some() {}
    assert!(m.store().is_empty());
    while m.redo().is_some() {}
    assert_eq!(m.store(), &end);

    m.undo();
    assert!(m.can_redo());
    m.place(c(9, 9), "🌳", 1, Layer::Features).unwrap();
    assert!(!m.can_redo());
}

#[test]
fn history_depth_is_bounded() {
    let cfg = EditorConfig {
        max_undo_steps: 3,
        ..EditorConfig::default()
    };
    let mut m = TileMap::from_config(&cfg).expect("valid config");
    for x in 0..5 {
        m.place(c(x, 0), "🌳", 1, Layer::Features).unwrap();
    }
    let mut undone = 0;
    while m.undo().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    // The two oldest placements are no longer reversible.
    assert!(m.resolve(c(0, 0), Layer::Features).is_some());
    assert!(m.resolve(c(1, 0), Layer::Features).is_some());
    assert!(m.resolve(c(2, 0), Layer::Features).is_none());
}
