use clap::Parser;
use trigdep::cli::commands::host::HostCommands;
use trigdep::cli::commands::trigger::TriggerCommands;
use trigdep::cli::{Cli, Commands};

#[test]
fn test_parse_trigger_depend() {
    let cli = Cli::try_parse_from([
        "trigdep",
        "trigger",
        "depend",
        "Apache by HTTP",
        "Apache: has been restarted",
        "--on-owner",
        "Apache by HTTP",
        "--on",
        "Apache: Service is down",
    ])
    .unwrap();

    match cli.command {
        Commands::Trigger(args) => match args.command {
            TriggerCommands::Depend { owner, name, on_owner, on } => {
                assert_eq!(owner, "Apache by HTTP");
                assert_eq!(name, "Apache: has been restarted");
                assert_eq!(on_owner, "Apache by HTTP");
                assert_eq!(on, "Apache: Service is down");
            }
            other => panic!("Wrong trigger command: {other:?}"),
        },
        other => panic!("Wrong top-level command: {other:?}"),
    }
}

#[test]
fn test_parse_trigger_add_defaults() {
    let cli = Cli::try_parse_from(["trigdep", "trigger", "add", "Test host", "CPU is high"]).unwrap();

    match cli.command {
        Commands::Trigger(args) => match args.command {
            TriggerCommands::Add { owner, name, expression, severity } => {
                assert_eq!(owner, "Test host");
                assert_eq!(name, "CPU is high");
                assert!(expression.is_none());
                assert_eq!(severity, "not_classified");
            }
            other => panic!("Wrong trigger command: {other:?}"),
        },
        other => panic!("Wrong top-level command: {other:?}"),
    }
}

#[test]
fn test_parse_host_add_template_with_global_flags() {
    let cli = Cli::try_parse_from([
        "trigdep",
        "host",
        "add",
        "FreeBSD by Zabbix agent",
        "--template",
        "--json",
        "--config",
        "custom.yaml",
    ])
    .unwrap();

    assert!(cli.json);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.yaml")));
    match cli.command {
        Commands::Host(args) => match args.command {
            HostCommands::Add { name, template } => {
                assert_eq!(name, "FreeBSD by Zabbix agent");
                assert!(template);
            }
            other => panic!("Wrong host command: {other:?}"),
        },
        other => panic!("Wrong top-level command: {other:?}"),
    }
}

#[test]
fn test_parse_init_force() {
    let cli = Cli::try_parse_from(["trigdep", "init", "--force"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert!(args.force);
            assert_eq!(args.path, std::path::PathBuf::from("."));
        }
        other => panic!("Wrong top-level command: {other:?}"),
    }
}

#[test]
fn test_depend_requires_target() {
    assert!(Cli::try_parse_from(["trigdep", "trigger", "depend", "Test host", "A"]).is_err());
}

#[test]
fn test_cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
