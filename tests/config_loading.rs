use barbarian::config::Config;
use barbarian::server::GameServer;

#[tokio::test]
async fn default_file_loads_and_boots_a_server() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    let path = path.to_str().unwrap();
    Config::create_default(path).await.unwrap();

    let mut config = Config::load(path).await.unwrap();
    assert_eq!(config.server.session_timeout, 60);
    assert_eq!(config.game.shop.len(), 4);

    config.storage.data_dir = tmp.path().join("data").to_string_lossy().into_owned();
    // keep hashing cheap
    config.security = toml::from_str("[argon2]\nmemory_kib = 1024\ntime_cost = 1\nparallelism = 1").ok();
    let server = GameServer::new(config).await.unwrap();
    server.show_status().await.unwrap();

    let actions = server.actions();
    actions.create_account("conan", "cimmeria123").await.unwrap();
    assert_eq!(actions.store().statistics().unwrap().total_accounts, 1);
    assert!(tmp.path().join("data").join("accounts").exists());
}

#[tokio::test]
async fn broken_files_are_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    tokio::fs::write(&path, "[server]\nname = \"x\"\n").await.unwrap();
    let err = Config::load(path.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));

    let missing = tmp.path().join("nope.toml");
    let err = Config::load(missing.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));

    let mut cfg = Config::default();
    cfg.game.adventure_interval_secs = 0;
    tokio::fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).await.unwrap();
    assert!(Config::load(path.to_str().unwrap()).await.is_err());
}
