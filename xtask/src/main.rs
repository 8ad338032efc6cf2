use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

const WASM_TARGET: &str = "wasm32-unknown-unknown";
const EXTENSION_PACKAGE: &str = "nosleep-extension";
const DIST_DIR: &str = "dist";
const STATIC_DIR: &str = "extension/static";

/// Entry binaries, built without the popup feature
const ENTRY_BINS: &[&str] = &["background", "offscreen"];

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "No Sleep extension task runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the unpacked extension into dist/
    Build {
        /// Debug build (faster, larger wasm)
        #[arg(long)]
        debug: bool,
    },

    /// Run all Rust tests
    Test,

    /// Run clippy linter
    Clippy,

    /// Remove dist/ and cargo build output
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { debug } => build(!debug),
        Commands::Test => test(),
        Commands::Clippy => clippy(),
        Commands::Clean => clean(),
    }
}

fn build(release: bool) -> Result<()> {
    let profile = if release { "release" } else { "debug" };
    let out_dir = format!("target/{}/{}", WASM_TARGET, profile);
    let pkg_dir = format!("{}/pkg", DIST_DIR);

    let _ = fs::remove_dir_all(DIST_DIR);
    fs::create_dir_all(&pkg_dir).context("Failed to create dist directory")?;

    // Entry binaries first: the popup build below overwrites the shared lib
    println!("🔨 Building background and offscreen entries...");
    let mut args = vec![
        "build",
        "-p",
        EXTENSION_PACKAGE,
        "--bins",
        "--no-default-features",
        "--target",
        WASM_TARGET,
    ];
    if release {
        args.push("--release");
    }
    run_cmd("cargo", &args)?;

    for bin in ENTRY_BINS {
        bindgen(&format!("{}/{}.wasm", out_dir, bin), &pkg_dir)?;
    }

    println!("🔨 Building popup...");
    let mut args = vec!["build", "-p", EXTENSION_PACKAGE, "--lib", "--target", WASM_TARGET];
    if release {
        args.push("--release");
    }
    run_cmd("cargo", &args)?;
    bindgen(&format!("{}/nosleep_extension.wasm", out_dir), &pkg_dir)?;

    println!("📦 Copying static assets...");
    copy_dir(Path::new(STATIC_DIR), Path::new(DIST_DIR))?;

    println!("✅ Extension ready in {}/ (load it unpacked from chrome://extensions)", DIST_DIR);
    Ok(())
}

fn bindgen(wasm: &str, out_dir: &str) -> Result<()> {
    println!("🔗 wasm-bindgen {}", wasm);
    run_cmd(
        "wasm-bindgen",
        &["--target", "web", "--no-typescript", "--out-dir", out_dir, wasm],
    )
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("Failed to create {}", to.display()))?;
    for entry in fs::read_dir(from).with_context(|| format!("Failed to read {}", from.display()))? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

fn test() -> Result<()> {
    println!("🧪 Running all tests...");
    run_cmd("cargo", &["test", "--workspace", "--exclude", EXTENSION_PACKAGE])?;
    Ok(())
}

fn clippy() -> Result<()> {
    println!("🔍 Running clippy on native crates (warnings as errors)...");
    run_cmd(
        "cargo",
        &["clippy", "--all-targets", "--", "-D", "warnings"],
    )?;

    println!("🔍 Running clippy on the extension...");
    run_cmd(
        "cargo",
        &[
            "clippy",
            "-p",
            EXTENSION_PACKAGE,
            "--target",
            WASM_TARGET,
            "--",
            "-D",
            "warnings",
        ],
    )?;
    Ok(())
}

fn clean() -> Result<()> {
    println!("🧹 Removing {}/...", DIST_DIR);
    // Ignore error if it was never built
    let _ = fs::remove_dir_all(DIST_DIR);

    println!("🗑️  Running cargo clean...");
    run_cmd("cargo", &["clean"])?;
    Ok(())
}

fn run_cmd(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run: {} {}", program, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("Command failed: {} {}", program, args.join(" "));
    }

    Ok(())
}
