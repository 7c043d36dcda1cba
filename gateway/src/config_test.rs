use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_select_live_mode() {
    let cfg = GatewayConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, GatewayConfig::default());
    assert_eq!(cfg.mode, Mode::Live);
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
    assert!(cfg.local_store_dir.is_none());
}

#[test]
fn parses_static_overrides() {
    let cfg = GatewayConfig::from_lookup(lookup_from(&[
        ("TILEBOARD_STATIC_MODE", "true"),
        ("TILEBOARD_STATIC_ROOT", "https://cdn.example.test/board"),
        ("TILEBOARD_PACKS_INDEX", "idx/packs.json"),
        ("TILEBOARD_MAPS_INDEX", "idx/maps.json"),
        ("TILEBOARD_MAPS_DIR", "published/"),
        ("TILEBOARD_LOCAL_STORE_DIR", "/tmp/tileboard"),
        ("TILEBOARD_REQUEST_TIMEOUT_SECS", "5"),
        ("TILEBOARD_CONNECT_TIMEOUT_SECS", "2"),
    ]))
    .unwrap();

    assert_eq!(cfg.mode, Mode::Static);
    assert!(cfg.static_root_is_url());
    assert_eq!(cfg.packs_index, "idx/packs.json");
    assert_eq!(cfg.maps_index, "idx/maps.json");
    assert_eq!(cfg.maps_dir, "published");
    assert_eq!(cfg.local_store_dir, Some(PathBuf::from("/tmp/tileboard")));
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
}

#[test]
fn api_base_url_drops_trailing_slash() {
    let cfg = GatewayConfig::from_lookup(lookup_from(&[("TILEBOARD_API_BASE_URL", "http://h:9/api/")])).unwrap();
    assert_eq!(cfg.api_base_url, "http://h:9/api");
}

#[test]
fn invalid_timeouts_fall_back_to_defaults() {
    let cfg = GatewayConfig::from_lookup(lookup_from(&[
        ("TILEBOARD_REQUEST_TIMEOUT_SECS", "soon"),
        ("TILEBOARD_CONNECT_TIMEOUT_SECS", "-1"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts, Timeouts::default());
}

#[test]
fn empty_values_count_as_unset() {
    let cfg = GatewayConfig::from_lookup(lookup_from(&[
        ("TILEBOARD_STATIC_MODE", ""),
        ("TILEBOARD_STATIC_ROOT", ""),
        ("TILEBOARD_LOCAL_STORE_DIR", ""),
    ]))
    .unwrap();
    assert_eq!(cfg.mode, Mode::Live);
    assert_eq!(cfg.static_root, DEFAULT_STATIC_ROOT);
    assert!(!cfg.static_root_is_url());
    assert!(cfg.local_store_dir.is_none());
}

#[test]
fn bad_static_flag_is_rejected() {
    let err = GatewayConfig::from_lookup(lookup_from(&[("TILEBOARD_STATIC_MODE", "maybe")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidFlag { var: "TILEBOARD_STATIC_MODE", value: "maybe".into() });
}

#[test]
fn flag_accepts_numeric_forms() {
    for (raw, expected) in [("1", Mode::Static), ("0", Mode::Live), (" yes ", Mode::Static)] {
        let cfg = GatewayConfig::from_lookup(lookup_from(&[("TILEBOARD_STATIC_MODE", raw)])).unwrap();
        assert_eq!(cfg.mode, expected, "raw = {raw:?}");
    }
}

#[test]
fn from_env_reads_process_environment() {
    unsafe {
        std::env::set_var("TILEBOARD_MAPS_DIR", "from-env");
    }
    let cfg = GatewayConfig::from_env().unwrap();
    assert_eq!(cfg.maps_dir, "from-env");
    unsafe {
        std::env::remove_var("TILEBOARD_MAPS_DIR");
    }
}
