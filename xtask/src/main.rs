use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for phosphor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and doc in that order
    Check,
    /// cargo fmt --check on all crates
    Fmt,
    /// Clippy with warnings denied
    Clippy,
    Test,
    /// Build rustdoc for the workspace
    Doc,
    Build,
    /// Time the render pipeline
    Bench,
    /// Short headless pong run with the final frame printed
    Demo {
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            let tasks: [fn() -> Result<()>; 4] = [fmt, clippy, test, doc];
            for task in tasks {
                task()?;
            }
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Doc => doc()?,
        Commands::Build => cargo("build", &["build", "--workspace"])?,
        Commands::Bench => cargo("bench", &["bench", "-p", "phosphor-render"])?,
        Commands::Demo { seed } => {
            let seed = seed.to_string();
            cargo(
                "demo",
                &[
                    "run", "-p", "phosphor-cli", "--", "pong", "--ticks", "300", "--seed", &seed,
                    "--show",
                ],
            )?
        }
    }

    Ok(())
}

fn fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Result<()> {
    cargo("test", &["test", "--workspace"])
}

fn doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"])
}

fn cargo(task: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{task} failed ({status})");
    }
    Ok(())
}
