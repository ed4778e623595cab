use map_atlas::decoder;
use map_atlas::dimension::Dimension;
use map_atlas::nbt_tree::NbtTree;
use map_atlas::{compositor, markers, png_store, tile};
use std::collections::HashMap;

fn indexed_map(id: u32, x_center: i32, z_center: i32, index: i8) -> NbtTree {
    let mut colors = vec![0i8; decoder::PIXEL_COUNT];
    colors[0] = index;

    NbtTree::Compound(vec![
        ("scale".to_owned(), NbtTree::Byte(0)),
        ("xCenter".to_owned(), NbtTree::Int(x_center)),
        ("zCenter".to_owned(), NbtTree::Int(z_center)),
        ("dimension".to_owned(), NbtTree::Int(0)),
        ("colors".to_owned(), NbtTree::ByteArray(colors)),
        (
            "banners".to_owned(),
            NbtTree::List(vec![NbtTree::Compound(vec![
                ("Color".to_owned(), NbtTree::String("red".to_owned())),
                (
                    "Name".to_owned(),
                    NbtTree::String(r#"{"text":"Base Camp"}"#.to_owned()),
                ),
                (
                    "Pos".to_owned(),
                    NbtTree::Compound(vec![
                        ("X".to_owned(), NbtTree::Int(x_center)),
                        ("Y".to_owned(), NbtTree::Int(64)),
                        ("Z".to_owned(), NbtTree::Int(z_center)),
                    ]),
                ),
            ])]),
        ),
    ])
}

/// Drives decode -> png store -> compositor -> tile slicing -> pyramid
/// reduction -> markers end to end on synthetic map data, the way `run`
/// wires the same stages together over real world data.
#[test]
fn pipeline_produces_tiles_and_markers() {
    let maps_dir = tempfile::tempdir().unwrap();
    let tiles_dir = tempfile::tempdir().unwrap();

    let data = indexed_map(1, 64, 64, 4);
    let decoded = decoder::decode(1, 0, &data, false).unwrap().unwrap();
    assert_eq!(decoded.dimension, Dimension::Overworld);

    let stored = png_store::write(maps_dir.path(), &decoded, 100, None).unwrap();
    assert!(stored.path.exists());

    let maps = vec![stored.clone()];
    let buckets = compositor::group_by_bucket(&maps);
    assert_eq!(buckets.len(), 1);

    let ((dimension, ox, oz), bucket_maps) = buckets.iter().next().unwrap();
    let canvas = compositor::composite_bucket((*ox, *oz), bucket_maps, false).unwrap();

    let written = tile::slice_bucket(tiles_dir.path(), *dimension, 0, 0, &canvas).unwrap();
    assert_eq!(written.len(), 256);
    assert!(tile::tile_path(tiles_dir.path(), *dimension, 17, 0, 0).exists());

    let reduced = map_atlas::pyramid::reduce_level(tiles_dir.path(), *dimension, 16).unwrap();
    assert!(!reduced.is_empty());
    assert!(tile::tile_path(tiles_dir.path(), *dimension, 16, 0, 0).exists());

    let mut filenames = HashMap::new();
    filenames.insert(decoded.id, stored.filename());

    let banners_path = maps_dir.path().join("banners.json");
    markers::write_banners(&banners_path, &[decoded.clone()]).unwrap();
    let banners_body = std::fs::read_to_string(&banners_path).unwrap();
    assert!(banners_body.contains("Base Camp"));

    let merged_dir = tempfile::tempdir().unwrap();
    compositor::write_bucket(merged_dir.path(), *dimension, (*ox, *oz), &canvas).unwrap();
    assert!(merged_dir.path().join(compositor::bucket_filename(*dimension, (*ox, *oz))).exists());

    let maps_path = maps_dir.path().join("maps.json");
    markers::write_maps(&maps_path, &[decoded], &filenames).unwrap();
    let maps_body = std::fs::read_to_string(&maps_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&maps_body).unwrap();
    assert_eq!(parsed["type"], "FeatureCollection");

    let feature = &parsed["features"][0];
    let members = feature["properties"]["maps"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], 1);
    assert_eq!(members[0]["filename"], stored.filename());
    assert_eq!(members[0]["banners"][0]["name"], "Base Camp");

    let ring = feature["geometry"]["coordinates"][0].as_array().unwrap();
    assert_eq!(ring.len(), 5);
    assert_eq!(ring[0], ring[4]);
}

#[test]
fn unchanged_map_is_dropped_on_second_pass() {
    let maps_dir = tempfile::tempdir().unwrap();
    let data = indexed_map(2, 0, 0, 4);

    let decoded = decoder::decode(2, 0, &data, false).unwrap().unwrap();
    let first = png_store::write(maps_dir.path(), &decoded, 1, None).unwrap();

    let stored = png_store::load_all(maps_dir.path()).unwrap();
    let previous = stored.get(&decoded.id);
    assert!(matches!(
        png_store::reconcile(&decoded, previous, 2),
        png_store::Action::Drop
    ));
    assert!(first.path.exists());
}

#[test]
fn advancing_epoch_hint_refreshes_unchanged_map() {
    let maps_dir = tempfile::tempdir().unwrap();
    let data = indexed_map(3, 0, 0, 4);

    let first_pass = decoder::decode(3, 5, &data, false).unwrap().unwrap();
    let stored_first = png_store::write(maps_dir.path(), &first_pass, 5, None).unwrap();
    assert_eq!(stored_first.epoch, 5);

    let second_pass = decoder::decode(3, 9, &data, false).unwrap().unwrap();
    assert_eq!(second_pass.hash, first_pass.hash);

    let action = png_store::reconcile(&second_pass, Some(&stored_first), 100);
    let epoch = match action {
        png_store::Action::Write { epoch } => epoch,
        png_store::Action::Drop => panic!("expected a refresh, map was dropped"),
    };
    assert_eq!(epoch, 9);

    let refreshed = png_store::write(maps_dir.path(), &second_pass, epoch, Some(&stored_first)).unwrap();
    assert_eq!(refreshed.epoch, 9);
    assert!(!stored_first.path.exists());
}

#[test]
fn new_map_is_written_at_its_epoch_hint() {
    let maps_dir = tempfile::tempdir().unwrap();
    let data = indexed_map(4, 0, 0, 4);

    let decoded = decoder::decode(4, 42, &data, false).unwrap().unwrap();
    assert!(matches!(
        png_store::reconcile(&decoded, None, 1000),
        png_store::Action::Write { epoch: 42 }
    ));

    let stored = png_store::write(maps_dir.path(), &decoded, 42, None).unwrap();
    assert_eq!(stored.epoch, 42);
}
