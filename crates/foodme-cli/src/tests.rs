use super::*;

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["foodme-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["foodme-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["foodme-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn password_generate_defaults_to_sixteen_characters() {
    let cli = Cli::try_parse_from(["foodme-cli", "password", "generate"]).expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Password {
            command: PasswordCommands::Generate { length: 16 }
        })
    ));
}

#[test]
fn search_distance_accepts_place_and_radius() {
    let cli = Cli::try_parse_from([
        "foodme-cli",
        "search",
        "distance",
        "--location",
        "montreal",
        "--radius",
        "1500",
    ])
    .expect("valid args");

    match cli.command {
        Some(Commands::Search {
            command: SearchCommands::Distance { location, radius },
        }) => {
            assert_eq!(location.location.as_deref(), Some("montreal"));
            assert_eq!(radius.as_deref(), Some("1500"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn search_price_accepts_negative_longitude() {
    let cli = Cli::try_parse_from([
        "foodme-cli",
        "search",
        "price",
        "--longitude",
        "-73.623419",
        "--latitude",
        "45.474999",
        "--price",
        "$$",
    ])
    .expect("valid args");

    match cli.command {
        Some(Commands::Search {
            command: SearchCommands::Price { location, price },
        }) => {
            assert_eq!(location.longitude.as_deref(), Some("-73.623419"));
            assert_eq!(location.latitude.as_deref(), Some("45.474999"));
            assert_eq!(price, "$$");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn search_cuisine_requires_cuisine_flag() {
    let result = Cli::try_parse_from(["foodme-cli", "search", "cuisine", "--location", "montreal"]);
    assert!(result.is_err());
}
