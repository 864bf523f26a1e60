// Robotics team assistant REPL
//
// Checks the environment, loads the settings file, then reads commands from
// standard input until it closes.

use anyhow::{Context, Result};
use clap::Parser;

use cmapi_cli::{
    Assistant, BitbucketClient, Environment, InputReader, ProcessRegistry, Secrets,
    ShellExecutor, console, repl,
};

#[derive(Debug, Parser)]
#[command(name = "cmapi-cli", version, about)]
struct Startup {
    /// Enter the REPL even when environment checks fail
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let startup = Startup::parse();

    console::reset_color();
    console::beep_success();

    let report = match Environment::setup() {
        Ok(report) => report,
        Err(e) => {
            console::fail(&e);
            return Ok(());
        }
    };

    for failure in &report.failures {
        console::fail(failure);
    }
    if !report.is_ok() && !startup.force {
        return Ok(());
    }
    let environment = report.environment;

    let secret_file = environment.secret_file();
    let defaults = Secrets::defaults(&environment.user);
    let secrets = match Secrets::load_or_init(&secret_file, defaults.clone()) {
        Ok(secrets) => secrets,
        Err(e) => {
            console::fail(&e);
            if !startup.force {
                return Ok(());
            }
            Secrets::new(secret_file, defaults)
        }
    };

    let http = reqwest::Client::builder()
        .user_agent(concat!("cmapi-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let registry = ProcessRegistry::new();
    let executor = ShellExecutor::new(registry.clone());

    let mut reader = InputReader::stdin(move |err| {
        log::debug!("Standard input failed: {err}");
        let killed = registry.kill_all();
        log::debug!("Killed {killed} running process(es)");
        std::process::exit(0);
    });

    let mut assistant = Assistant::new(
        executor,
        BitbucketClient::new(http),
        environment,
        secrets,
    );

    repl::run(&mut assistant, &mut reader).await;
    Ok(())
}
