//! winsvc - run a Windows service lifecycle operation for a cluster package.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use winsvc_agent::config::Settings;
use winsvc_agent::error::SvcmResult;
use winsvc_agent::package::Package;
use winsvc_agent::services::{ManagerRegistry, Operation};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

/// Options gathered from the command line.
#[derive(Debug, Default)]
struct CliArgs {
    config: Option<String>,
    exec_path: Option<PathBuf>,
    master_ip: Option<String>,
    local_ip: Option<String>,
    positional: Vec<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let cli = match parse_args(&args[1..]) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run '{} --help' for usage", NAME);
            return ExitCode::FAILURE;
        }
    };

    let (operation, pkg_id) = match cli.positional.as_slice() {
        [operation, pkg_id] => match operation.parse::<Operation>() {
            Ok(operation) => (operation, pkg_id.clone()),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        _ => {
            eprintln!("Error: expected <OPERATION> <PACKAGE_ID>");
            return ExitCode::FAILURE;
        }
    };

    let mut settings = match &cli.config {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    apply_overrides(&mut settings, &cli);

    if let Err(e) = init_logging(&settings) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!(operation = %operation, pkg_id = %pkg_id, "Starting {} v{}", NAME, VERSION);

    match run(&settings, operation, &pkg_id) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, operation = %operation, pkg_id = %pkg_id, "Operation failed");
            ExitCode::FAILURE
        }
    }
}

/// Load the package, build its manager and run one operation.
fn run(settings: &Settings, operation: Operation, pkg_id: &str) -> SvcmResult<()> {
    let package = Package::load(
        &settings.paths.repository_root,
        pkg_id,
        &settings.package_files(),
    )?;

    let options = settings.apply(package.manager_options()?);
    let manager = ManagerRegistry::new().create(&settings.manager.kind, options)?;

    if let Some(result) = manager.execute(operation)? {
        print!("{}", result.stdout);
        eprint!("{}", result.stderr);
    }

    Ok(())
}

/// Parse options and positional arguments.
fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };

        let mut value = |name: &str| -> Result<String, String> {
            inline
                .clone()
                .or_else(|| iter.next().cloned())
                .ok_or_else(|| format!("Missing value for {}", name))
        };

        match flag {
            "-c" | "--config" => cli.config = Some(value(flag)?),
            "--exec-path" => cli.exec_path = Some(PathBuf::from(value(flag)?)),
            "--master-ip" => cli.master_ip = Some(value(flag)?),
            "--local-ip" => cli.local_ip = Some(value(flag)?),
            _ if flag.starts_with('-') => return Err(format!("Unknown option: {}", flag)),
            _ => cli.positional.push(arg.clone()),
        }
    }

    Ok(cli)
}

/// Command line options take precedence over the configuration file.
fn apply_overrides(settings: &mut Settings, cli: &CliArgs) {
    if let Some(path) = &cli.exec_path {
        settings.manager.exec_path = Some(path.clone());
    }
    if let Some(ip) = &cli.master_ip {
        settings.cluster.master_ip = Some(ip.clone());
    }
    if let Some(ip) = &cli.local_ip {
        settings.cluster.local_ip = Some(ip.clone());
    }
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Run a Windows service lifecycle operation for a cluster package.

USAGE:
    {} [OPTIONS] <OPERATION> <PACKAGE_ID>

OPERATIONS:
    setup, remove, enable, disable, start, stop, restart, status

OPTIONS:
    -c, --config <PATH>      Path to configuration file
        --exec-path <PATH>   Path to the service control executable
        --master-ip <IP>     Cluster master address for templates
        --local-ip <IP>      Local node address for templates
    -h, --help               Print help information
    -V, --version            Print version information
"#,
        NAME, VERSION, NAME
    );
}

/// Initialize logging based on settings.
fn init_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    match settings.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
