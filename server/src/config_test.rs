use super::*;

/// # Safety
/// Only one test in this crate touches these variables.
unsafe fn clear_server_env() {
    unsafe {
        std::env::remove_var("PORT");
        std::env::remove_var("TILEBOARD_DATA_DIR");
        std::env::remove_var("TILEBOARD_ASSETS_DIR");
    }
}

#[test]
fn from_env_defaults_overrides_and_bad_port() {
    unsafe { clear_server_env() };
    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.port, DEFAULT_PORT);

    unsafe {
        std::env::set_var("PORT", "8123");
        std::env::set_var("TILEBOARD_DATA_DIR", "/srv/tileboard/users");
        std::env::set_var("TILEBOARD_ASSETS_DIR", "/srv/tileboard/assets");
    }
    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.port, 8123);
    assert_eq!(cfg.data_dir, PathBuf::from("/srv/tileboard/users"));
    assert_eq!(cfg.assets_dir, PathBuf::from("/srv/tileboard/assets"));

    unsafe { std::env::set_var("PORT", "eighty") };
    assert_eq!(ServerConfig::from_env().unwrap_err(), ConfigError::InvalidPort("eighty".into()));

    unsafe { clear_server_env() };
}
