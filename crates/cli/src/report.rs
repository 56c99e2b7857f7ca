// Human and JSON rendering of results
use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use rootshell_core::{ExecutionStatus, ShellResult, ShellStatus};

/// Print captured output followed by a status line
pub fn print_result(result: &ShellResult, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    for line in result.out() {
        println!("{}", line);
    }
    for line in result.err() {
        eprintln!("{}", line.red());
    }
    eprintln!("{}", status_line(result));
    Ok(())
}

fn status_line(result: &ShellResult) -> String {
    let timing = format!("({} ms)", result.duration_ms()).dimmed();
    match result.status() {
        ExecutionStatus::Success => format!("{} {}", "✓ Success".green().bold(), timing),
        ExecutionStatus::Failed => format!(
            "{} {}",
            format!("✗ Failed with exit code {}", result.code()).red().bold(),
            timing
        ),
        ExecutionStatus::Killed => format!("{} {}", "✗ Killed by signal".red().bold(), timing),
        ExecutionStatus::NotExecuted => "✗ Not executed".yellow().bold().to_string(),
    }
}

pub fn print_completed(as_json: bool) {
    if as_json {
        println!("{}", json!({ "completed": true }));
    } else {
        eprintln!("{}", "✓ Completed".green().bold());
    }
}

pub fn print_shell(shell: &str, status: ShellStatus, as_json: bool) {
    if as_json {
        println!(
            "{}",
            json!({ "shell": shell, "status": status, "root": status.is_root() })
        );
        return;
    }

    println!("{}", "Shell".cyan().bold());
    println!("  {} {}", "Program:".bold(), shell);
    let status_text = if status.is_root() {
        status.to_string().green()
    } else {
        status.to_string().yellow()
    };
    println!("  {} {}", "Status:".bold(), status_text);
}

/// Process exit code mirroring the result code
pub fn exit_code(result: &ShellResult) -> u8 {
    match result.code() {
        code @ 0..=255 => code as u8,
        _ => 255,
    }
}
