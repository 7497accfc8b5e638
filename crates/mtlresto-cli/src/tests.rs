use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use mtlresto_core::{AppConfig, Environment, MenuStatus, ValidationMode};

use super::*;

fn config_with_default_user(default_user_id: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        area_path: PathBuf::from("./config/area.yaml"),
        default_user_id: default_user_id.map(ToOwned::to_owned),
        yelp_api_key: None,
        overpass_url: "https://overpass.example/api/interpreter".to_string(),
        nominatim_url: "https://nominatim.example".to_string(),
        yelp_url: "https://yelp.example/v3".to_string(),
        http_timeout_secs: 30,
        user_agent: "ua".to_string(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
    }
}

/// Fresh scratch directory under the system temp dir.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mtlresto-cli-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["mtlresto-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["mtlresto-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["mtlresto-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn venue_search_defaults() {
    let cli = Cli::try_parse_from(["mtlresto-cli", "venues", "search"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Venues {
            command: VenueCommands::Search {
                query: None,
                type_filter: None,
                limit: 20
            }
        })
    ));
}

#[test]
fn venue_search_with_filters() {
    let cli = Cli::try_parse_from([
        "mtlresto-cli",
        "venues",
        "search",
        "--query",
        "piz",
        "--type",
        "italian",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Venues {
            command: VenueCommands::Search {
                query: Some(ref q),
                type_filter: Some(ref t),
                ..
            }
        }) if q == "piz" && t == "italian"
    ));
}

#[test]
fn geocode_takes_positional_address() {
    let cli = Cli::try_parse_from(["mtlresto-cli", "geocode", "1 Rue Notre-Dame", "--suggest"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Geocode {
            ref address,
            suggest: true
        }) if address == "1 Rue Notre-Dame"
    ));
}

#[test]
fn enrich_defaults_to_first_page() {
    let cli = Cli::try_parse_from(["mtlresto-cli", "enrich", "Joe Beef"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Enrich {
            ref name,
            location: None,
            page: 1
        }) if name == "Joe Beef"
    ));
}

#[test]
fn profile_edit_collects_fields() {
    let cli = Cli::try_parse_from([
        "mtlresto-cli",
        "profile",
        "edit",
        "--user-id",
        "user-1",
        "--phone",
        "514-555-0100",
        "--image-url",
        "https://img.example.com/a.png",
    ])
    .unwrap();
    let Some(Commands::Profile {
        command: ProfileCommands::Edit { user_id, fields },
    }) = cli.command
    else {
        panic!("expected profile edit");
    };
    assert_eq!(user_id.as_deref(), Some("user-1"));

    let update: mtlresto_core::ProfileUpdate = fields.into();
    assert_eq!(update.phone.as_deref(), Some("514-555-0100"));
    assert_eq!(
        update.image_url.as_deref(),
        Some("https://img.example.com/a.png")
    );
    assert!(update.first_name.is_none());
}

#[test]
fn user_id_falls_back_to_configured_default() {
    let config = config_with_default_user(Some("default-user"));
    assert_eq!(
        profile::resolve_user_id(None, &config).unwrap(),
        "default-user"
    );
    assert_eq!(
        profile::resolve_user_id(Some("explicit".to_string()), &config).unwrap(),
        "explicit"
    );
}

#[test]
fn missing_user_id_is_an_error() {
    let config = config_with_default_user(None);
    assert!(profile::resolve_user_id(None, &config).is_err());
}

#[test]
fn contact_send_defaults_to_strict_mode() {
    let cli = Cli::try_parse_from([
        "mtlresto-cli",
        "contact",
        "send",
        "--name",
        "Ana",
        "--email",
        "ana@example.com",
        "--message",
        "hello there, great map",
    ])
    .unwrap();
    let Some(Commands::Contact {
        command: ContactCommands::Send { mode, .. },
    }) = cli.command
    else {
        panic!("expected contact send");
    };
    assert_eq!(ValidationMode::from(mode), ValidationMode::Strict);
}

#[test]
fn contact_send_accepts_presence_mode() {
    let cli = Cli::try_parse_from([
        "mtlresto-cli",
        "contact",
        "send",
        "--name",
        "A",
        "--email",
        "a",
        "--message",
        "hi",
        "--mode",
        "presence",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Contact {
            command: ContactCommands::Send {
                mode: contact::ModeArg::Presence,
                ..
            }
        })
    ));
}

#[test]
fn menus_import_parses_dir_and_options() {
    let cli = Cli::try_parse_from([
        "mtlresto-cli",
        "menus",
        "import",
        "./menus",
        "--concurrency",
        "8",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Menus {
            command: MenuCommands::Import {
                ref dir,
                concurrency: 8,
                dry_run: true
            }
        }) if dir == &PathBuf::from("./menus")
    ));
}

#[test]
fn menu_loading_skips_invalid_files() {
    let dir = scratch_dir("menus");
    std::fs::write(
        dir.join("Café Olimpico.json"),
        r#"[{"section": "Espresso", "items": [{"name": "Latte", "price": "$4.50"}]}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("Joe Beef.json"),
        r#"{"external_menu": "https://menu.example/joe-beef"}"#,
    )
    .unwrap();
    std::fs::write(dir.join("broken.json"), "{not json").unwrap();
    std::fs::write(
        dir.join("placeholder.json"),
        r#"[{"section": "Mains", "items": [{"name": "Unknown Item"}]}]"#,
    )
    .unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let files = menus::menu_files(&dir).unwrap();
    assert_eq!(files.len(), 4);

    let loaded = menus::load_menus(&files);
    assert_eq!(loaded.len(), 2);

    let cafe = loaded
        .iter()
        .find(|m| m.name == "Cafe Olimpico")
        .expect("sanitized cafe name");
    assert_eq!(cafe.status, MenuStatus::Internal);
    assert_eq!(cafe.items[0].description, "No description");

    let joe = loaded
        .iter()
        .find(|m| m.name == "Joe Beef")
        .expect("external menu");
    assert_eq!(joe.status, MenuStatus::External);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn import_with_only_invalid_files_reports_skipped_count() {
    let dir = scratch_dir("menus-invalid");
    std::fs::write(dir.join("broken.json"), "{not json").unwrap();
    std::fs::write(dir.join("empty.json"), "[]").unwrap();

    let pool_config = mtlresto_db::PoolConfig {
        min_connections: 0,
        ..mtlresto_db::PoolConfig::default()
    };
    let pool = mtlresto_db::connect_pool_lazy("postgres://localhost/mtlresto_test", pool_config)
        .expect("lazy pool");

    let err = menus::run_menus(
        &pool,
        MenuCommands::Import {
            dir: dir.clone(),
            concurrency: 2,
            dry_run: false,
        },
    )
    .await
    .expect_err("nothing to import");
    let message = err.to_string();
    assert!(message.contains("all 2 file(s) skipped"), "{message}");
    assert!(!message.contains("failed to import"), "{message}");

    let _ = std::fs::remove_dir_all(&dir);
}
