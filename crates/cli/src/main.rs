//! rootshell CLI - run shell commands through each consumption idiom

mod logging;
mod modes;
mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use tokio::runtime::Handle;
use tracing::{debug, info};

use modes::{Mode, Outcome};
use rootshell_core::{retrieve_shell, VERSION};
use rootshell_infra_system::{ProcessShellProvider, ShellConfig};

#[derive(Parser)]
#[command(name = "rootshell")]
#[command(about = "Run shell jobs and consume their outcome", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Shell program commands are piped into
    #[arg(long, global = true, env = "ROOTSHELL_SHELL")]
    shell: Option<String>,

    /// Merge stderr into stdout (env accepts 1/0, true/false, yes/no)
    #[arg(
        long,
        global = true,
        env = "ROOTSHELL_REDIRECT_STDERR",
        value_parser = BoolishValueParser::new()
    )]
    redirect_stderr: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run commands in one job
    Run {
        /// Consumption idiom
        #[arg(short, long, value_enum, default_value_t = Mode::Blocking)]
        mode: Mode,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Require root; on a non-root shell the job reports NOT_EXECUTED
        #[arg(long)]
        su: bool,

        /// Commands, one shell line each (after `--`)
        #[arg(last = true, required = true)]
        commands: Vec<String>,
    },

    /// Start the shell and report its privilege status
    Probe {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn shell_config(&self) -> Result<ShellConfig> {
        let mut config = ShellConfig::from_env().context("Invalid ROOTSHELL_* configuration")?;
        if let Some(shell) = &self.shell {
            config.shell = shellexpand::tilde(shell).into_owned();
        }
        config.redirect_stderr |= self.redirect_stderr;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::init()?;
    let cli = Cli::parse();
    let config = cli.shell_config()?;
    debug!(version = VERSION, shell = %config.shell, "rootshell starting");

    let redirect_stderr = config.redirect_stderr;
    let provider = ProcessShellProvider::new(config.clone(), Handle::current());
    let shell = retrieve_shell(&provider)
        .await
        .with_context(|| format!("No usable shell at '{}'", config.shell))?;

    match cli.command {
        Commands::Run {
            mode,
            json,
            su,
            commands,
        } => {
            let mut job = if su { shell.new_su_job() } else { shell.new_job() };
            for command in &commands {
                job.add(command);
            }
            info!(mode = ?mode, su, commands = commands.len(), "Running job");

            match modes::run(mode, job, redirect_stderr).await? {
                Outcome::Result(result) => {
                    report::print_result(&result, json)?;
                    Ok(ExitCode::from(report::exit_code(&result)))
                }
                Outcome::Completed => {
                    report::print_completed(json);
                    Ok(ExitCode::SUCCESS)
                }
            }
        }

        Commands::Probe { json } => {
            report::print_shell(&config.shell, shell.status(), json);
            Ok(ExitCode::SUCCESS)
        }
    }
}
