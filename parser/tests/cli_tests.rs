use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use schema_args_parser::{
    BoxError, Cli, Command, Error, Outcome, ParsedArgs, PendingAction, Positional, Presenter,
    Schema, Variadic, Watch,
};
use serde_json::json;

fn parsed(cli: &Cli, argv: &[&str]) -> ParsedArgs {
    match cli.try_parse(argv.iter().copied()) {
        Ok(Outcome::Parsed(args)) => args,
        other => panic!("expected parsed arguments, got {other:?}"),
    }
}

fn failure(cli: &Cli, argv: &[&str]) -> String {
    cli.try_parse(argv.iter().copied())
        .expect_err("parse should fail")
        .to_string()
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[test]
fn port_below_minimum_mentions_bound() {
    let cli = Cli::new().option("port", Schema::number().min(1024.0).max(65535.0));
    let err = failure(&cli, &["--port", "80"]);
    assert!(err.contains("1024"), "{err}");
    assert_eq!(err, "--port must be at least 1024");
}

#[test]
fn array_drops_empty_comma_entries() {
    let cli = Cli::new().option("items", Schema::array(Schema::string()));
    let args = parsed(&cli, &["--items", "a,b,,c"]);
    assert_eq!(args.get("items"), Some(&json!(["a", "b", "c"])));
}

#[test]
fn repeated_array_flags_collect_in_order() {
    let cli = Cli::new().option("tags", Schema::array(Schema::string()));
    let args = parsed(&cli, &["--tags", "a,b", "--tags", "c"]);
    assert_eq!(args.get("tags"), Some(&json!(["a", "b", "c"])));
}

#[test]
fn union_prefers_number() {
    let cli = Cli::new().option(
        "limit",
        Schema::union([Schema::number().into(), Schema::string().into()]),
    );
    let args = parsed(&cli, &["--limit", "42"]);
    assert_eq!(args.get("limit"), Some(&json!(42)));
    let args = parsed(&cli, &["--limit", "all"]);
    assert_eq!(args.get("limit"), Some(&json!("all")));
}

#[test]
fn boolean_or_object_union() {
    let cli = Cli::new().option(
        "cfg",
        Schema::union([
            Schema::boolean().with_default(true).into(),
            Schema::object().field("js", Schema::boolean()).into(),
        ]),
    );

    assert_eq!(parsed(&cli, &["--no-cfg"]).get("cfg"), Some(&json!(false)));
    assert_eq!(parsed(&cli, &[]).get("cfg"), Some(&json!(true)));
    assert_eq!(parsed(&cli, &["--cfg"]).get("cfg"), Some(&json!(true)));
    assert_eq!(
        parsed(&cli, &["--cfg.js"]).get("cfg"),
        Some(&json!({"js": true}))
    );
}

#[test]
fn negation_follows_schema() {
    let cli = Cli::new()
        .option("color", Schema::boolean().with_default(true))
        .option("watch", Schema::boolean())
        .option("name", Schema::string().optional());

    assert_eq!(parsed(&cli, &["--no-color"]).get("color"), Some(&json!(false)));
    assert_eq!(parsed(&cli, &["--no-watch"]).get("watch"), Some(&json!(false)));
    assert_eq!(failure(&cli, &["--no-name"]), "--name cannot be negated");
    assert_eq!(
        failure(&cli, &["--no-color=false"]),
        "--no-color does not take a value"
    );
}

#[test]
fn dotted_paths_build_objects_and_records() {
    let cli = Cli::new()
        .option(
            "server",
            Schema::object()
                .field("host", Schema::string().with_default("localhost"))
                .field("port", Schema::number().int()),
        )
        .option("env", Schema::record(Schema::string()).optional());

    let args = parsed(
        &cli,
        &["--server.port=8080", "--env.\"app.name\"", "demo", "--env.MODE", "dev"],
    );
    assert_eq!(
        args.get("server"),
        Some(&json!({"host": "localhost", "port": 8080}))
    );
    assert_eq!(
        args.get("env"),
        Some(&json!({"app.name": "demo", "MODE": "dev"}))
    );
}

#[test]
fn unknown_nested_key_names_valid_keys() {
    let cli = Cli::new().option(
        "server",
        Schema::object()
            .field("host", Schema::string())
            .field("port", Schema::number()),
    );
    let err = failure(&cli, &["--server.bogus", "x"]);
    assert!(err.contains("\"bogus\""), "{err}");
    assert!(err.contains("Valid keys: host, port"), "{err}");
}

#[test]
fn unknown_option_is_rejected() {
    let cli = Cli::new().option("verbose", Schema::boolean());
    assert_eq!(
        failure(&cli, &["--verbos"]),
        "Unknown option --verbos. Did you mean \"verbose\"?"
    );
}

#[test]
fn options_deserialize_into_structs() {
    #[derive(serde::Deserialize)]
    struct Opts {
        port: u16,
        tags: Vec<String>,
    }

    let cli = Cli::new()
        .option("port", Schema::number().int().with_default(3000))
        .option("tags", Schema::array(Schema::string()).with_default(json!([])));
    let opts: Opts = parsed(&cli, &["--tags", "x,y"]).options_as().unwrap();
    assert_eq!(opts.port, 3000);
    assert_eq!(opts.tags, ["x", "y"]);
}

// ---------------------------------------------------------------------------
// Positionals
// ---------------------------------------------------------------------------

#[test]
fn positionals_then_variadic() {
    let cli = Cli::new()
        .positional(Positional::new("task", Schema::string()))
        .positional(Positional::new("count", Schema::number()))
        .positional(Variadic::new("files", Schema::string()));

    let args = parsed(&cli, &["run", "3", "a", "b"]);
    assert_eq!(args.positionals, vec![json!("run"), json!(3)]);
    assert_eq!(args.rest, vec![json!("a"), json!("b")]);
}

#[test]
fn surplus_arguments_are_rejected() {
    let cli = Cli::new().positional(Positional::new("target", Schema::string()));
    assert_eq!(
        failure(&cli, &["a", "b", "c"]),
        "Too many arguments: \"b\", \"c\" (expected at most 1)"
    );
}

#[test]
fn missing_positional_is_required() {
    let cli = Cli::new().positional(Positional::new("target", Schema::string()));
    let err = failure(&cli, &[]);
    assert!(err.ends_with("is required"), "{err}");
}

#[test]
fn undeclared_positionals_stay_raw() {
    let cli = Cli::new().option("verbose", Schema::boolean());
    let args = parsed(&cli, &["one", "2", "--", "--verbose"]);
    assert_eq!(
        args.positionals,
        vec![json!("one"), json!("2"), json!("--verbose")]
    );
    assert_eq!(args.get("verbose"), Some(&json!(false)));
}

#[test]
fn variadic_must_be_last() {
    let cli = Cli::new()
        .positional(Variadic::new("files", Schema::string()))
        .positional(Positional::new("dest", Schema::string()));
    let err = cli.try_parse(["a"]).unwrap_err();
    assert!(matches!(err, Error::Definition(_)), "{err}");
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn build_command(hits: Arc<AtomicUsize>) -> Command {
    Command::builder("build")
        .describe("Compile")
        .option("release", Schema::boolean())
        .action(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
}

#[test]
fn unknown_command_does_not_fall_through() {
    let hits = Arc::new(AtomicUsize::new(0));
    let cli = Cli::new()
        .option("port", Schema::number())
        .command(build_command(hits.clone()));

    let err = failure(&cli, &["foo"]);
    assert_eq!(err, "Unknown command \"foo\". Available commands: build");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn command_runs_with_its_own_options() {
    let hits = Arc::new(AtomicUsize::new(0));
    let cli = Cli::new().command(build_command(hits.clone()));

    let outcome = cli.try_parse(["build", "--release"]).unwrap();
    assert!(matches!(outcome, Outcome::Command { ref name, pending: None } if name == "build"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let err = failure(&cli, &["build", "--port", "1"]);
    assert!(err.starts_with("Unknown option --port."), "{err}");
}

#[test]
fn command_help_is_routed() {
    let cli = Cli::new().command(build_command(Arc::new(AtomicUsize::new(0))));
    let outcome = cli.try_parse(["build", "--help"]).unwrap();
    assert!(matches!(outcome, Outcome::Help { command: Some(ref name) } if name == "build"));
}

#[test]
fn threaded_action_is_handed_back() {
    let cli = Cli::new().command(
        Command::builder("sync")
            .action(|_| thread::spawn(|| Err::<(), BoxError>("remote unreachable".into())))
            .build()
            .unwrap(),
    );

    let Outcome::Command { pending: Some(pending), .. } = cli.try_parse(["sync"]).unwrap() else {
        panic!("expected a pending action");
    };
    assert_eq!(
        pending.wait().unwrap_err().to_string(),
        "command `sync` failed: remote unreachable"
    );
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl Presenter for Recorder {
    fn help(&self, _cli: &Cli, command: Option<&Command>) {
        let name = command.map(Command::name).unwrap_or("main");
        self.events.borrow_mut().push(format!("help {name}"));
    }

    fn version(&self, version: &str) {
        self.events.borrow_mut().push(format!("version {version}"));
    }

    fn exit(&self, code: i32, error: Option<&Error>) {
        let event = match error {
            Some(err) => format!("exit {code}: {err}"),
            None => format!("exit {code}"),
        };
        self.events.borrow_mut().push(event);
    }

    fn watch(&self, pending: PendingAction) -> Watch {
        self.events
            .borrow_mut()
            .push(format!("watch {}", pending.command()));
        Watch::spawn(pending.command().to_string(), move || pending.wait())
    }
}

#[test]
fn presenter_receives_help_version_and_errors() {
    let cli = Cli::new()
        .with_version("2.0.0")
        .option("port", Schema::number().optional());
    let recorder = Recorder::default();

    assert!(cli.parse_with(["--version"], &recorder).unwrap().args().is_none());
    assert!(cli.parse_with(["-h"], &recorder).unwrap().args().is_none());
    assert!(cli.parse_with(["--port", "x"], &recorder).is_err());
    let parsed = cli.parse_with(["--port", "1"], &recorder).unwrap();
    assert!(!parsed.is_running());
    assert_eq!(parsed.args().and_then(|a| a.get("port")), Some(&json!(1)));

    assert_eq!(
        recorder.events.into_inner(),
        [
            "version 2.0.0",
            "exit 0",
            "help main",
            "exit 0",
            "exit 1: --port must be a number, got \"x\"",
        ]
    );
}

#[test]
fn presenter_watches_running_actions() {
    let cli = Cli::new().command(
        Command::builder("serve")
            .action(|_| thread::spawn(|| Ok::<(), BoxError>(())))
            .build()
            .unwrap(),
    );
    let recorder = Recorder::default();
    let parsed = cli.parse_with(["serve"], &recorder).unwrap();
    assert!(parsed.args().is_none());
    assert!(parsed.is_running());
    parsed.wait().unwrap();
    assert_eq!(recorder.events.into_inner(), ["watch serve"]);
}

#[test]
fn failing_running_action_surfaces_through_wait() {
    let cli = Cli::new().command(
        Command::builder("sync")
            .action(|_| {
                thread::spawn(|| {
                    thread::sleep(std::time::Duration::from_millis(50));
                    Err::<(), BoxError>("remote unreachable".into())
                })
            })
            .build()
            .unwrap(),
    );
    let recorder = Recorder::default();
    let parsed = cli.parse_with(["sync"], &recorder).unwrap();
    assert_eq!(
        parsed.wait().unwrap_err().to_string(),
        "command `sync` failed: remote unreachable"
    );
}

// ---------------------------------------------------------------------------
// Reuse
// ---------------------------------------------------------------------------

#[test]
fn one_cli_parses_concurrently() {
    let cli = Cli::new()
        .option("id", Schema::number().int())
        .option("tags", Schema::array(Schema::string()).optional());

    thread::scope(|scope| {
        for id in 0..8 {
            let cli = &cli;
            scope.spawn(move || {
                let id = id.to_string();
                let args = parsed(cli, &["--id", &id]);
                assert_eq!(args.get("id"), Some(&json!(id.parse::<i64>().unwrap())));
                assert_eq!(args.get("tags"), None);
            });
        }
    });
}
