//! CLI tests

use clap::{CommandFactory, Parser};

use crate::{Cli, Commands, ConfigAction, OutputFormat};

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["synapse", "build", "graph.json", "--format", "json", "-q"])
        .unwrap();
    assert!(cli.format == OutputFormat::Json);
    assert!(cli.quiet);
    assert!(matches!(cli.command, Commands::Build { output: None, .. }));
}

#[test]
fn test_common_needs_two_entities() {
    assert!(Cli::try_parse_from(["synapse", "common", "g.json", "egfr"]).is_err());
    let cli = Cli::try_parse_from(["synapse", "common", "g.json", "egfr", "kras"]).unwrap();
    match cli.command {
        Commands::Common {
            entities,
            min_degree,
            ..
        } => {
            assert_eq!(entities, vec!["egfr", "kras"]);
            assert_eq!(min_degree, 1);
        }
        _ => panic!("expected common"),
    }
}

#[test]
fn test_filter_types_repeat() {
    let cli = Cli::try_parse_from([
        "synapse", "filter", "g.json", "-t", "GENE", "--type", "DISEASE", "--top-n", "5",
    ])
    .unwrap();
    match cli.command {
        Commands::Filter {
            types,
            top_n,
            min_degree,
            ..
        } => {
            assert_eq!(types, vec!["GENE", "DISEASE"]);
            assert_eq!(top_n, 5);
            assert_eq!(min_degree, 1);
        }
        _ => panic!("expected filter"),
    }
}

#[test]
fn test_config_list_alias() {
    let cli = Cli::try_parse_from(["synapse", "config", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Show
        }
    ));
}
