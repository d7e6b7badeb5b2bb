use n8n_api_contract::ExecutionStatus;
use n8n_cli::{
    execution::ExecutionCommands, tag::TagCommands, workflow::read_workflow_input,
    workflow::WorkflowCommands, Cli, Commands, Parser,
};
use n8n_rest_client_mock::MockClient;
use std::io::Write;

#[test]
fn test_cli_parsing_workflow_list() {
    let args = vec!["n8nctl", "workflow", "list"];

    let cli = Cli::try_parse_from(args).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Workflow {
            subcommand: WorkflowCommands::List
        }
    ));
    assert_eq!(cli.global.instance, None);
    assert_eq!(cli.global.log_level, "warn");
}

#[test]
fn test_cli_parsing_global_args_after_subcommand() {
    let args = vec![
        "n8nctl",
        "workflow",
        "get",
        "wf-1",
        "--instance",
        "staging",
        "--config",
        "/etc/n8n/instances.json",
    ];

    let cli = Cli::try_parse_from(args).unwrap();
    assert_eq!(cli.global.instance.as_deref(), Some("staging"));
    assert_eq!(
        cli.global.config.as_deref(),
        Some(std::path::Path::new("/etc/n8n/instances.json"))
    );
    match cli.command {
        Commands::Workflow {
            subcommand: WorkflowCommands::Get(args),
        } => assert_eq!(args.id, "wf-1"),
        _ => panic!("expected workflow get"),
    }
}

#[test]
fn test_cli_parsing_workflow_update() {
    let args = vec![
        "n8nctl", "workflow", "update", "wf-7", "--file", "flow.json",
    ];

    let cli = Cli::try_parse_from(args).unwrap();
    match cli.command {
        Commands::Workflow {
            subcommand: WorkflowCommands::Update { id, file },
        } => {
            assert_eq!(id.id, "wf-7");
            assert_eq!(file.file, std::path::PathBuf::from("flow.json"));
        }
        _ => panic!("expected workflow update"),
    }
}

#[test]
fn test_cli_parsing_workflow_create_requires_file() {
    let args = vec!["n8nctl", "workflow", "create"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn test_cli_parsing_execution_list_filters() {
    let args = vec![
        "n8nctl",
        "execution",
        "list",
        "--workflow-id",
        "wf-1",
        "--status",
        "error",
        "--limit",
        "5",
        "--include-data",
    ];

    let cli = Cli::try_parse_from(args).unwrap();
    match cli.command {
        Commands::Execution {
            subcommand: ExecutionCommands::List(args),
        } => {
            assert_eq!(args.workflow_id.as_deref(), Some("wf-1"));
            assert_eq!(args.status, Some(ExecutionStatus::Error));
            assert_eq!(args.limit, Some(5));
            assert!(args.include_data);
        }
        _ => panic!("expected execution list"),
    }
}

#[test]
fn test_cli_parsing_rejects_unknown_status() {
    let args = vec!["n8nctl", "execution", "list", "--status", "crashed"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn test_cli_parsing_execution_id_must_be_numeric() {
    assert!(Cli::try_parse_from(vec!["n8nctl", "execution", "get", "42"]).is_ok());
    assert!(Cli::try_parse_from(vec!["n8nctl", "execution", "get", "abc"]).is_err());
}

#[test]
fn test_cli_parsing_tag_update() {
    let args = vec!["n8nctl", "tag", "update", "tag-1", "production"];

    let cli = Cli::try_parse_from(args).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Tag {
            subcommand: TagCommands::Update { ref id, ref name }
        } if id == "tag-1" && name == "production"
    ));
}

#[test]
fn test_cli_parsing_instances() {
    let cli = Cli::try_parse_from(vec!["n8nctl", "--mock", "instances"]).unwrap();
    assert!(cli.global.mock);
    assert!(matches!(cli.command, Commands::Instances));
}

#[tokio::test]
async fn test_read_workflow_input_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "name": "From file",
            "nodes": [
                {{"name": "Start", "type": "n8n-nodes-base.manualTrigger"}},
                {{"name": "Log", "type": "n8n-nodes-base.noOp"}}
            ],
            "connections": [{{"source": "Start", "target": "Log"}}]
        }}"#
    )
    .unwrap();

    let input = read_workflow_input(file.path()).await.unwrap();
    assert_eq!(input.name, "From file");
    assert_eq!(input.nodes.len(), 2);
}

#[tokio::test]
async fn test_read_workflow_input_reports_bad_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ nope").unwrap();

    let err = read_workflow_input(file.path()).await.unwrap_err();
    assert!(err.to_string().contains("Invalid workflow definition"));
}

#[tokio::test]
async fn test_workflow_commands_run_against_mock() {
    let api = MockClient::with_demo_data();

    WorkflowCommands::List.run(&api, None).await.unwrap();

    let cli = Cli::try_parse_from(vec!["n8nctl", "workflow", "activate", "wf-2"]).unwrap();
    let Commands::Workflow { subcommand } = cli.command else {
        panic!("expected workflow command");
    };
    subcommand.run(&api, Some("mock")).await.unwrap();

    let cli = Cli::try_parse_from(vec![
        "n8nctl", "workflow", "execute", "wf-2", "--data", r#"{"x": 1}"#,
    ])
    .unwrap();
    let Commands::Workflow { subcommand } = cli.command else {
        panic!("expected workflow command");
    };
    subcommand.run(&api, None).await.unwrap();
}

#[tokio::test]
async fn test_execute_rejects_malformed_run_data() {
    let api = MockClient::with_demo_data();
    let cli = Cli::try_parse_from(vec![
        "n8nctl", "workflow", "execute", "wf-1", "--data", "{oops",
    ])
    .unwrap();
    let Commands::Workflow { subcommand } = cli.command else {
        panic!("expected workflow command");
    };

    let err = subcommand.run(&api, None).await.unwrap_err();
    assert!(err.to_string().contains("--data"));
}

#[tokio::test]
async fn test_unknown_instance_surfaces_api_error() {
    let api = MockClient::with_demo_data();
    let err = TagCommands::Get {
        id: "tag-1".to_string(),
    }
    .run(&api, Some("prod"))
    .await
    .unwrap_err();

    assert!(err.to_string().contains("Instance 'prod' not found"));
}

#[tokio::test]
async fn test_execution_and_tag_commands_run_against_mock() {
    let api = MockClient::with_demo_data();

    let cli = Cli::try_parse_from(vec!["n8nctl", "execution", "list", "--status", "success"])
        .unwrap();
    let Commands::Execution { subcommand } = cli.command else {
        panic!("expected execution command");
    };
    subcommand.run(&api, None).await.unwrap();

    ExecutionCommands::Delete { id: 2 }.run(&api, None).await.unwrap();
    assert!(ExecutionCommands::Get {
        id: 2,
        include_data: false
    }
    .run(&api, None)
    .await
    .is_err());

    TagCommands::Create {
        name: "ops".to_string(),
    }
    .run(&api, None)
    .await
    .unwrap();
    TagCommands::List {
        limit: Some(1),
        cursor: None,
    }
    .run(&api, None)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_mock_flag_connects_without_config() {
    let cli = Cli::try_parse_from(vec!["n8nctl", "--mock", "instances"]).unwrap();
    let api = cli.global.connect().unwrap();

    assert_eq!(api.default_instance(), "mock");
    n8n_cli::instances::run(api.as_ref()).unwrap();
}
