use clap::Parser;
use serial_test::serial;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        public_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["sopforge"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn model_list_defaults_to_the_ordered_fallback() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(settings.llm.models.len(), DEFAULT_MODELS.len());
    assert_eq!(settings.llm.models[0], DEFAULT_MODELS[0]);
    assert!(settings.llm.api_key.is_empty());
}

#[test]
fn blank_model_entries_are_rejected() {
    let mut raw = RawSettings::default();
    raw.llm.models = Some(vec!["   ".to_string()]);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "llm.models",
            ..
        })
    ));
}

#[test]
fn endpoint_gains_a_trailing_slash_for_joining() {
    let mut raw = RawSettings::default();
    raw.llm.endpoint = Some("https://example.test/upstream".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.llm.endpoint.path(), "/upstream/");

    let joined = settings
        .llm
        .endpoint
        .join("v1beta/models/gemini-2.0-flash:generateContent")
        .expect("join");
    assert!(joined.path().starts_with("/upstream/v1beta/"));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.llm.request_timeout_seconds = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "llm.request_timeout_seconds",
            ..
        })
    ));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "sopforge",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--llm-api-key",
        "test-key",
        "--llm-model",
        "gemini-2.0-flash",
        "--llm-model",
        "gemini-1.5-flash",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.llm_api_key.as_deref(), Some("test-key"));
            assert_eq!(
                serve.overrides.llm_models,
                vec!["gemini-2.0-flash", "gemini-1.5-flash"]
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_export_arguments() {
    let args = CliArgs::parse_from([
        "sopforge",
        "export",
        "--format",
        "docx",
        "--output",
        "/tmp/procedure.docx",
        "--completed",
        "step_1",
        "--completed",
        "prev_2",
        "/tmp/sop.json",
    ]);

    match args.command.expect("export command") {
        Command::Export(export) => {
            assert_eq!(export.input, std::path::Path::new("/tmp/sop.json"));
            assert_eq!(export.format, "docx");
            assert_eq!(
                export.output.as_deref(),
                Some(std::path::Path::new("/tmp/procedure.docx"))
            );
            assert_eq!(export.completed, vec!["step_1", "prev_2"]);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
#[serial]
fn explicit_config_file_layers_over_the_baseline() {
    let file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    std::fs::write(
        file.path(),
        "[server]\npublic_port = 8088\n\n[llm]\nmodels = [\"gemini-2.0-flash\"]\n",
    )
    .expect("write config");

    let args = CliArgs::parse_from([
        "sopforge",
        "--config-file",
        file.path().to_str().expect("utf-8 path"),
    ]);
    let settings = load(&args).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 8088);
    assert_eq!(settings.llm.models, vec!["gemini-2.0-flash"]);
    // Keys absent from the explicit file keep their baseline values.
    assert_eq!(settings.logging.level, LevelFilter::INFO);
}

#[test]
#[serial]
fn environment_variables_layer_over_files() {
    // SAFETY: the test is serialized; no other thread touches the
    // environment while the variable is set.
    unsafe { std::env::set_var("SOPFORGE__SERVER__PUBLIC_PORT", "4567") };
    let args = CliArgs::parse_from(["sopforge"]);
    let result = load(&args);
    unsafe { std::env::remove_var("SOPFORGE__SERVER__PUBLIC_PORT") };

    let settings = result.expect("valid settings");
    assert_eq!(settings.server.public_addr.port(), 4567);
}
