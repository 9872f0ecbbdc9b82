use super::*;
use clap::Parser;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).expect("arguments should parse")
}

#[test]
fn chat_is_the_default_command() {
    let args = parse_args(&["omnichat"]);
    assert!(args.command.is_none());
    assert!(!args.env_only);
    assert_eq!(args.model, None);
}

#[test]
fn global_flags_parse_before_subcommands() {
    let args = parse_args(&["omnichat", "--env-only", "-m", "gpt-4o", "say", "hello"]);
    assert_eq!(args.model.as_deref(), Some("gpt-4o"));
    assert!(args.env_only);
    match args.command {
        Some(Commands::Say { prompt }) => assert_eq!(prompt, vec!["hello"]),
        _ => panic!("expected say command"),
    }
}

#[test]
fn say_joins_trailing_words_including_hyphens() {
    let args = parse_args(&["omnichat", "say", "what", "is", "-1?"]);
    match args.command {
        Some(Commands::Say { prompt }) => assert_eq!(prompt.join(" "), "what is -1?"),
        _ => panic!("expected say command"),
    }
}

#[test]
fn log_and_trace_flags_are_captured() {
    let args = parse_args(&[
        "omnichat",
        "-l",
        "chat.log",
        "--trace-log",
        "trace.log",
    ]);
    assert_eq!(args.log.as_deref(), Some("chat.log"));
    assert_eq!(args.trace_log.as_deref(), Some("trace.log"));
}

#[test]
fn set_requires_a_value() {
    assert!(Args::try_parse_from(["omnichat", "set", "model"]).is_err());
    let args = parse_args(&["omnichat", "set", "greeting", "Hi", "there"]);
    match args.command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key, "greeting");
            assert_eq!(value.join(" "), "Hi there");
        }
        _ => panic!("expected set command"),
    }
}

#[test]
fn deauth_accepts_yes_flag() {
    let args = parse_args(&["omnichat", "deauth", "-y"]);
    assert!(matches!(args.command, Some(Commands::Deauth { yes: true })));
}

#[test]
fn apply_set_reports_unknown_keys_and_bad_values() {
    let mut config = Config::default();
    assert_eq!(
        apply_set(&mut config, "model", "gpt-4o").unwrap(),
        ConfigKey::Model
    );
    assert_eq!(config.model.as_deref(), Some("gpt-4o"));

    let err = apply_set(&mut config, "theme", "dark").unwrap_err();
    assert!(err.to_string().contains("Unknown config key: theme"));
    assert!(apply_set(&mut config, "context-window", "many").is_err());
}
