use std::fs;
use std::path::Path;

use super::*;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn touch(path: &Path) {
    write(path, "");
}

/// Minimal pack with a file asset, a directory asset and a cfg-less category.
fn fixture() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let pack = root.path().join("G-Zombicide-Base");
    write(&pack.join("cfg"), "# comment\nname = Base Game\nimage=cover.png\nalign=30\n");

    let tiles = pack.join("01.tiles");
    write(&tiles.join("cfg"), "name=Tiles\nz-index=1\nalign=5\nmax=1V.png:2;2R:x\npairs=1V.png:2R\n");
    touch(&tiles.join("1V.png"));
    touch(&tiles.join("1V/r_0.png"));
    touch(&tiles.join("1V/r_90.png"));
    touch(&tiles.join("1V/r_thumb.png"));
    touch(&tiles.join("2R/r_0.png"));
    touch(&tiles.join("2R/r_270.png"));
    touch(&tiles.join("notes.txt"));
    touch(&tiles.join("empty/readme.md"));

    touch(&pack.join("02.doors/door.png"));
    touch(&pack.join("misc/ignored.png"));
    root
}

#[test]
fn parse_cfg_trims_and_skips_comments() {
    let cfg = parse_cfg("# name=nope\n name = A = B \n\nbroken line\nalign=3\nalign=4");
    assert_eq!(cfg.get("name").map(String::as_str), Some("A = B"));
    assert_eq!(cfg.get("align").map(String::as_str), Some("4"));
    assert_eq!(cfg.len(), 2);
}

#[test]
fn parse_max_handles_missing_and_bad_counts() {
    let max = parse_max("a.png:1;b.png;c.png:many;");
    assert_eq!(max.get("a.png"), Some(&Some(1)));
    assert_eq!(max.get("b.png"), Some(&None));
    assert_eq!(max.get("c.png"), Some(&None));
    assert_eq!(max.len(), 3);
    assert!(parse_max("").is_empty());
}

#[test]
fn parse_pairs_is_symmetric() {
    let pairs = parse_pairs("a:b;c:d;lonely");
    assert_eq!(pairs.get("a").map(String::as_str), Some("b"));
    assert_eq!(pairs.get("b").map(String::as_str), Some("a"));
    assert_eq!(pairs.get("d").map(String::as_str), Some("c"));
    assert!(!pairs.contains_key("lonely"));
}

#[test]
fn category_names() {
    for ok in ["01.tiles", "04.1.objectives", "01B.vaults", "1.x", "10"] {
        assert!(is_category_name(ok), "{ok}");
    }
    for bad in ["tiles", "1B", "1", ".01.tiles", "a01"] {
        assert!(!is_category_name(bad), "{bad}");
    }
}

#[test]
fn plain_segments() {
    assert!(is_plain_segment("G-Zombicide-Base"));
    for bad in ["", ".", "..", ".hidden", "a/b", "a\\b", "/abs"] {
        assert!(!is_plain_segment(bad), "{bad:?}");
    }
}

#[test]
fn scan_pack_reads_root_cfg_and_categories() {
    let root = fixture();
    let pack = load_pack(root.path(), "G-Zombicide-Base").unwrap().unwrap();

    assert_eq!(
        pack.summary,
        PackSummary {
            id: "G-Zombicide-Base".into(),
            name: "Base Game".into(),
            image: Some("cover.png".into()),
            align: 30,
        }
    );
    assert_eq!(pack.detail().categories, vec!["01.tiles".to_owned()]);

    let tiles = &pack.categories["01.tiles"];
    assert_eq!(tiles.name, "Tiles");
    assert_eq!(tiles.z_index, 1);
    assert_eq!(tiles.align, 5);
    let names: Vec<&str> = tiles.assets.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["1V.png", "2R"]);
}

#[test]
fn file_asset_finds_variants_in_stem_dir() {
    let root = fixture();
    let assets = load_pack(root.path(), "G-Zombicide-Base").unwrap().unwrap().assets();
    let v = &assets["01.tiles"][0];

    assert_eq!(v.path, "G-Zombicide-Base/01.tiles/1V.png");
    assert_eq!(v.thumbnail.as_deref(), Some("G-Zombicide-Base/01.tiles/1V/r_thumb.png"));
    assert_eq!(v.rotations.keys().copied().collect::<Vec<_>>(), vec![0, 90]);
    assert_eq!(v.rotations[&90], "G-Zombicide-Base/01.tiles/1V/r_90.png");
    assert_eq!(v.max, Some(2));
    assert_eq!(v.pair.as_deref(), Some("2R"));
    assert_eq!(v.category, "01.tiles");
}

#[test]
fn directory_asset_uses_r0_as_main_image() {
    let root = fixture();
    let assets = load_pack(root.path(), "G-Zombicide-Base").unwrap().unwrap().assets();
    let r = &assets["01.tiles"][1];

    assert_eq!(r.path, "G-Zombicide-Base/01.tiles/2R/r_0.png");
    assert_eq!(r.thumbnail, None);
    assert_eq!(r.rotations.keys().copied().collect::<Vec<_>>(), vec![0, 270]);
    assert_eq!(r.max, None);
    assert_eq!(r.pair.as_deref(), Some("1V.png"));
}

#[test]
fn pack_without_cfg_uses_directory_name() {
    let root = tempfile::tempdir().unwrap();
    touch(&root.path().join("G-Zombicide-Bare/readme.txt"));

    let pack = load_pack(root.path(), "G-Zombicide-Bare").unwrap().unwrap();
    assert_eq!(pack.summary.name, "G-Zombicide-Bare");
    assert_eq!(pack.summary.image, None);
    assert_eq!(pack.summary.align, DEFAULT_PACK_ALIGN);
    assert!(pack.categories.is_empty());
}

#[test]
fn root_cfg_without_image_gets_default_cover() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("custom/cfg"), "name=Custom\nalign=oops\n");

    let pack = load_pack(root.path(), "custom").unwrap().unwrap();
    assert_eq!(pack.summary.image.as_deref(), Some(DEFAULT_PACK_IMAGE));
    assert_eq!(pack.summary.align, DEFAULT_PACK_ALIGN);
}

#[test]
fn scan_catalog_only_lists_pack_dirs() {
    let root = fixture();
    write(&root.path().join("custom/cfg"), "name=Custom\n");
    touch(&root.path().join("not-a-pack/file.png"));
    touch(&root.path().join(".hidden/cfg"));

    let ids: Vec<String> = scan_catalog(root.path()).unwrap().into_iter().map(|p| p.summary.id).collect();
    assert_eq!(ids, vec!["G-Zombicide-Base".to_owned(), "custom".to_owned()]);
}

#[test]
fn load_pack_rejects_unknown_and_traversal() {
    let root = fixture();
    assert!(load_pack(root.path(), "missing").unwrap().is_none());
    assert!(load_pack(root.path(), "../etc").unwrap().is_none());
    touch(&root.path().join("not-a-pack/file.png"));
    assert!(load_pack(root.path(), "not-a-pack").unwrap().is_none());
}

#[test]
fn detail_serialises_flat() {
    let detail = PackDetail {
        summary: PackSummary { id: "p".into(), name: "P".into(), image: None, align: 25 },
        categories: vec!["01.tiles".into()],
    };
    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json, serde_json::json!({"id": "p", "name": "P", "image": null, "align": 25, "categories": ["01.tiles"]}));
}
