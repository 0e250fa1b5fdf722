use super::*;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }
}

use test_helpers::parse_args;

#[test]
fn no_subcommand_defaults_to_chat() {
    let args = parse_args(&["ollama-assistant"]);
    assert!(args.command.is_none());
    assert!(args.model.is_none());
    assert!(args.base_url.is_none());
}

#[test]
fn global_flags_work_after_subcommand() {
    let argv = [
        "ollama-assistant",
        "explain",
        "--base-url",
        "http://gpu:11434",
        "-m",
        "mistral",
        "borrow",
        "checker",
    ];
    let args = parse_args(&argv);
    assert_eq!(args.base_url.as_deref(), Some("http://gpu:11434"));
    assert_eq!(args.model.as_deref(), Some("mistral"));
    match args.command {
        Some(Commands::Explain { text }) => assert_eq!(text, vec!["borrow", "checker"]),
        _ => panic!("expected explain subcommand for argv={argv:?}"),
    }
}

#[test]
fn set_joins_multi_word_values() {
    let argv = ["ollama-assistant", "set", "system-prompt", "Answer", "in", "French"];
    match parse_args(&argv).command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key, "system-prompt");
            assert_eq!(value.join(" "), "Answer in French");
        }
        _ => panic!("expected set subcommand for argv={argv:?}"),
    }
}

#[test]
fn page_flags_parse_as_paths() {
    let argv = ["ollama-assistant", "chat", "--page", "notes.txt"];
    match parse_args(&argv).command {
        Some(Commands::Chat { page }) => assert_eq!(page, Some(PathBuf::from("notes.txt"))),
        _ => panic!("expected chat subcommand for argv={argv:?}"),
    }

    let argv = ["ollama-assistant", "summarize-page"];
    match parse_args(&argv).command {
        Some(Commands::SummarizePage { page }) => assert!(page.is_none()),
        _ => panic!("expected summarize-page subcommand for argv={argv:?}"),
    }
}

#[test]
fn log_flag_is_global() {
    let args = parse_args(&["ollama-assistant", "--log", "chat.log", "chat"]);
    assert_eq!(args.log, Some(PathBuf::from("chat.log")));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Args::try_parse_from(["ollama-assistant", "auth"]).is_err());
}
