use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Catches short flag conflicts and duplicate args in the whole tree
    Cli::command().debug_assert();
}

#[test]
fn test_command_requires_model_or_content() {
    assert!(Cli::try_parse_from(["tb", "command"]).is_err());
    assert!(Cli::try_parse_from(["tb", "command", "demo/models/users.sql"]).is_ok());
    assert!(Cli::try_parse_from(["tb", "command", "--content", "dbt run"]).is_err());
    assert!(Cli::try_parse_from([
        "tb",
        "command",
        "--content",
        "dbt run",
        "--project",
        "demo"
    ])
    .is_ok());
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from([
        "tb",
        "deps",
        "demo/models/users.sql",
        "--target",
        "prod",
        "--vars",
        "{\"env\": \"prod\"}",
    ])
    .unwrap();
    assert_eq!(cli.global.target.as_deref(), Some("prod"));
    assert!(matches!(cli.command, Commands::Deps(_)));
}

#[test]
fn test_execution_date_parses_rfc3339() {
    let cli = Cli::try_parse_from([
        "tb",
        "command",
        "demo/models/users.sql",
        "--execution-date",
        "2024-01-02T03:04:05Z",
    ])
    .unwrap();
    assert_eq!(
        cli.global.execution_date.map(|ts| ts.to_rfc3339()),
        Some("2024-01-02T03:04:05+00:00".to_string())
    );
    assert!(Cli::try_parse_from(["tb", "command", "x.sql", "--execution-date", "yesterday"]).is_err());
}
