// CLI引数のパーステスト
use clap::Parser;
use pizza_delivery::cli::{build_config, render_config, Cli, Commands};
use pizza_delivery::PipelineConfig;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_parse_run_with_overrides() {
    let cli = Cli::try_parse_from([
        "pizza_delivery",
        "run",
        "--cooks",
        "2",
        "--drivers",
        "5",
        "--capacity",
        "10",
        "--tick-ms",
        "250",
        "--duration-secs",
        "3",
        "--max-orders",
        "12",
        "--json",
        "--quiet",
    ])
    .unwrap();

    let Commands::Run(args) = cli.command else {
        panic!("Expected run command");
    };
    assert_eq!(args.cooks, Some(2));
    assert!(args.json);
    assert!(args.quiet);

    let config = build_config(&args).unwrap();
    assert_eq!(config.preparation_workers(), 2);
    assert_eq!(config.delivery_workers(), 5);
    assert_eq!(config.intake_capacity(), 10);
    assert_eq!(config.tick_interval(), Duration::from_millis(250));
    assert_eq!(config.run_duration(), Some(Duration::from_secs(3)));
    assert_eq!(config.order_limit(), Some(12));
}

#[test]
fn test_parse_run_defaults() {
    let cli = Cli::try_parse_from(["pizza_delivery", "run"]).unwrap();

    let Commands::Run(args) = cli.command else {
        panic!("Expected run command");
    };
    let config = build_config(&args).unwrap();
    assert_eq!(config.preparation_workers(), 3);
    assert_eq!(config.delivery_workers(), 4);
    assert_eq!(config.run_duration(), Some(Duration::from_secs(20)));
}

#[test]
fn test_until_ctrl_c_conflicts_with_duration() {
    let result = Cli::try_parse_from([
        "pizza_delivery",
        "run",
        "--duration-secs",
        "5",
        "--until-ctrl-c",
    ]);
    assert!(result.is_err());

    let cli = Cli::try_parse_from(["pizza_delivery", "run", "--until-ctrl-c"]).unwrap();
    let Commands::Run(args) = cli.command else {
        panic!("Expected run command");
    };
    assert_eq!(build_config(&args).unwrap().run_duration(), None);
}

#[test]
fn test_show_config_with_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pipeline.json");
    fs::write(&path, r#"{ "batch_size": 9 }"#).unwrap();

    let cli = Cli::try_parse_from([
        "pizza_delivery",
        "show-config",
        "--config",
        path.to_str().unwrap(),
    ])
    .unwrap();

    let Commands::ShowConfig { config } = cli.command else {
        panic!("Expected show-config command");
    };
    let rendered = render_config(config.as_deref()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["batch_size"], 9);
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["pizza_delivery", "scan"]).is_err());
}
