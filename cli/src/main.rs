use std::path::Path;
use std::process::ExitCode;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use schema_args_core::{SchemaError, Value};
use schema_args_parser::{BoxError, Cli, Command, Error, ParsedArgs, Positional, Schema, Variadic};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    init_tracing();

    let cli = match build_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Errors are already reported by the presenter; only reached with NO_EXIT set.
    let parsed = match cli.parse(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(_) => return ExitCode::FAILURE,
    };

    if let Some(args) = parsed.args() {
        if let Err(err) = print_args(args) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match parsed.wait() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_cli() -> Result<Cli, Error> {
    let deploy = Command::builder("deploy")
        .describe("Deploy a service")
        .option(
            "env",
            Schema::string()
                .choices(["staging", "production"])
                .with_default("staging")
                .alias('e')
                .describe("Target environment"),
        )
        .option(
            "replicas",
            Schema::number().int().min(1.0).with_default(1).alias('r'),
        )
        .option("dry-run", Schema::boolean().alias('n').describe("Print the plan only"))
        .positional(
            Positional::new(
                "service",
                Schema::string()
                    .transform(lowercase_name)
                    .describe("Service to deploy"),
            ),
        )
        .example("schema-args-demo deploy api --env production -r 3")
        .action(run_deploy)
        .build()?;

    let check = Command::builder("check")
        .describe("Check that files exist")
        .option("strict", Schema::boolean().describe("Fail on missing files"))
        .positional(Variadic::new("paths", Schema::string()).describe("Files to check"))
        .action(run_check)
        .build()?;

    let sync = Command::builder("sync")
        .describe("Push state to a remote in the background")
        .option("remote", Schema::string().optional().describe("Remote name"))
        .option(
            "delay",
            Schema::number()
                .int()
                .min(0.0)
                .with_default(200)
                .describe("Milliseconds of simulated work"),
        )
        .action(run_sync)
        .build()?;

    Ok(Cli::new()
        .with_name("schema-args-demo")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_description("Parses its arguments and prints the validated result")
        .option(
            "port",
            Schema::number()
                .int()
                .min(1024.0)
                .max(65535.0)
                .with_default(8080)
                .alias('p')
                .describe("Port to listen on"),
        )
        .option(
            "env",
            Schema::string()
                .choices(["dev", "staging", "production"])
                .optional()
                .describe("Environment name"),
        )
        .option(
            "tags",
            Schema::array(Schema::string())
                .optional()
                .describe("Comma-separated tags"),
        )
        .option(
            "server",
            Schema::object()
                .field("host", Schema::string().with_default("localhost"))
                .field("port", Schema::number().int().optional())
                .optional()
                .describe("Upstream server"),
        )
        .option(
            "cache",
            Schema::union([
                Schema::boolean().with_default(true).into(),
                Schema::object()
                    .field("dir", Schema::string())
                    .field("ttl", Schema::number().positive().optional())
                    .into(),
            ])
            .describe("Enable caching or configure it"),
        )
        .option(
            "output",
            Schema::string()
                .choices(["json", "yaml"])
                .with_default("json")
                .alias('o')
                .describe("Output format"),
        )
        .positional(Variadic::new("files", Schema::string()).describe("Input files"))
        .command(deploy)
        .command(check)
        .command(sync)
        .with_example("schema-args-demo --port 9000 --server.host example.org")
        .with_example("schema-args-demo --cache.dir /tmp/cache -o yaml"))
}

fn lowercase_name(value: Value) -> Result<Value, SchemaError> {
    match value.as_str() {
        Some(name) if name.chars().any(|c| c.is_ascii_uppercase()) => Err(SchemaError::custom(
            format!("service names are lowercase, got \"{name}\""),
        )),
        _ => Ok(value),
    }
}

fn print_args(args: &ParsedArgs) -> Result<(), BoxError> {
    let format = args.get("output").and_then(Value::as_str).unwrap_or("json");
    debug!(format, "printing parsed arguments");
    let rendered = match format {
        "yaml" => serde_yaml::to_string(args)?,
        _ => serde_json::to_string_pretty(args)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeployOptions {
    env: String,
    replicas: u32,
    dry_run: bool,
}

fn run_deploy(args: ParsedArgs) -> Result<(), BoxError> {
    let options: DeployOptions = args.options_as()?;
    let service = args
        .positionals
        .first()
        .and_then(Value::as_str)
        .ok_or("missing service name")?;
    info!(service, env = %options.env, "deploy");

    let plural = if options.replicas == 1 { "replica" } else { "replicas" };
    let prefix = if options.dry_run { "would deploy" } else { "deploying" };
    println!(
        "{prefix} {service} to {} with {} {plural}",
        options.env, options.replicas
    );
    Ok(())
}

fn run_check(args: ParsedArgs) -> Result<(), BoxError> {
    let strict = args.get("strict").and_then(Value::as_bool).unwrap_or(false);
    let mut missing = Vec::new();
    for path in args.rest.iter().filter_map(Value::as_str) {
        if Path::new(path).exists() {
            println!("ok {path}");
        } else {
            println!("missing {path}");
            missing.push(path);
        }
    }
    if strict && !missing.is_empty() {
        return Err(format!("{} missing file(s): {}", missing.len(), missing.join(", ")).into());
    }
    Ok(())
}

fn run_sync(args: ParsedArgs) -> JoinHandle<Result<(), BoxError>> {
    let remote = args.get("remote").and_then(Value::as_str).map(str::to_string);
    let delay = args.get("delay").and_then(Value::as_u64).unwrap_or(0);
    thread::spawn(move || -> Result<(), BoxError> {
        debug!(delay, "sync started");
        thread::sleep(Duration::from_millis(delay));
        let remote = remote.ok_or("remote unreachable")?;
        println!("synced to {remote}");
        Ok(())
    })
}
