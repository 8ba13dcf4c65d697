use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolmodel_config::{load_for_workspace, ConfigDiagnostics, ToolModelConfig};
use toolmodel_model::{
    encode, read_snapshot_file, write_snapshot_file, ProjectSnapshotFile, SnapshotFormat,
};
use toolmodel_project::{ProjectInfo, ProjectSnapshotAssembler, StaticHostProject};

#[derive(Parser)]
#[command(
    name = "toolmodel",
    version,
    about = "Project build dependency models into portable snapshots"
)]
struct Cli {
    /// Config file (defaults to `toolmodel.toml` discovery in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a snapshot from a JSON host description
    Snapshot(SnapshotArgs),
    /// Summarize a snapshot file written by `snapshot`
    Inspect(InspectArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Bincode,
}

impl From<Format> for SnapshotFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Json => SnapshotFormat::Json,
            Format::Bincode => SnapshotFormat::Bincode,
        }
    }
}

#[derive(Args)]
struct SnapshotArgs {
    /// Host description (JSON)
    host: PathBuf,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Write the snapshot here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also collect Java and Kotlin source sets
    #[arg(long)]
    with_source_sets: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Snapshot file (JSON or bincode)
    snapshot: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Snapshot(args) => snapshot(&config, args),
        Command::Inspect(args) => inspect(args),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<ToolModelConfig> {
    let (config, path, diagnostics) = match explicit {
        Some(path) => {
            let (config, diagnostics) = ToolModelConfig::load_from_path_with_diagnostics(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            (config, Some(path.to_path_buf()), diagnostics)
        }
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            load_for_workspace(&cwd).context("failed to load config")?
        }
    };

    toolmodel_config::init_tracing(&config.logging);
    report_config(path.as_deref(), &diagnostics);
    Ok(config)
}

fn report_config(path: Option<&Path>, diagnostics: &ConfigDiagnostics) {
    if let Some(path) = path {
        tracing::debug!(target: "toolmodel.cli", path = %path.display(), "loaded config");
    }
    diagnostics.log();
}

fn snapshot(config: &ToolModelConfig, args: SnapshotArgs) -> Result<i32> {
    let host = StaticHostProject::from_json_file(&args.host)?;
    let info = ProjectInfo::new(
        Arc::new(host),
        ProjectSnapshotAssembler::new(config.projection.clone()),
    );
    let file = info
        .snapshot_file(args.with_source_sets)
        .with_context(|| format!("failed to project {}", args.host.display()))?;
    let format = SnapshotFormat::from(args.format);

    match &args.out {
        Some(out) => {
            write_snapshot_file(out, &file, format)?;
            println!(
                "wrote {} ({} configurations)",
                out.display(),
                file.project.name_to_configuration.len()
            );
        }
        None => {
            if format == SnapshotFormat::Bincode {
                bail!("bincode output needs --out");
            }
            let bytes = encode(&file, format)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            writeln!(stdout)?;
        }
    }
    Ok(0)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationSummary {
    name: String,
    extends_from: Vec<String>,
    requested: usize,
    resolved_roots: usize,
    resolved_nodes: usize,
    max_depth: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DanglingLinkSummary {
    configuration: String,
    missing: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    schema_version: u32,
    name: String,
    path: String,
    group: String,
    version: String,
    plugins: usize,
    maven_repositories: usize,
    configurations: Vec<ConfigurationSummary>,
    dangling_links: Vec<DanglingLinkSummary>,
    source_sets: usize,
    kotlin_source_sets: usize,
}

impl InspectReport {
    fn new(file: &ProjectSnapshotFile) -> Self {
        let project = &file.project;
        let configurations = project
            .configurations()
            .map(|configuration| ConfigurationSummary {
                name: configuration.name.clone(),
                extends_from: configuration.extends_from.clone(),
                requested: configuration.requested.len(),
                resolved_roots: configuration.resolved.len(),
                resolved_nodes: configuration.resolved_nodes().count(),
                max_depth: configuration.resolved_nodes().map(|node| node.depth).max(),
            })
            .collect();
        let dangling_links = project
            .dangling_links()
            .into_iter()
            .map(|link| DanglingLinkSummary {
                configuration: link.configuration,
                missing: link.missing,
            })
            .collect();

        Self {
            schema_version: file.schema_version,
            name: project.name.clone(),
            path: project.path.clone(),
            group: project.group.clone(),
            version: project.version.clone(),
            plugins: project.plugins.len(),
            maven_repositories: project.maven_repositories.len(),
            configurations,
            dangling_links,
            source_sets: file.source_sets.len(),
            kotlin_source_sets: file.kotlin_source_sets.len(),
        }
    }
}

fn inspect(args: InspectArgs) -> Result<i32> {
    let file = read_snapshot_file(&args.snapshot)?;
    let report = InspectReport::new(&file);
    let exit = if report.dangling_links.is_empty() { 0 } else { 1 };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit);
    }

    println!("project {} ({})", report.path, report.name);
    println!("  coordinates: {}:{}", report.group, report.version);
    println!("  plugins: {}", report.plugins);
    println!("  maven repositories: {}", report.maven_repositories);
    println!("  configurations: {}", report.configurations.len());
    for configuration in &report.configurations {
        println!(
            "    {}: {} requested, {} resolved ({} nodes)",
            configuration.name,
            configuration.requested,
            configuration.resolved_roots,
            configuration.resolved_nodes
        );
        if !configuration.extends_from.is_empty() {
            println!(
                "      extends: {}",
                configuration.extends_from.join(", ")
            );
        }
    }
    if report.source_sets + report.kotlin_source_sets > 0 {
        println!(
            "  source sets: {} java, {} kotlin",
            report.source_sets, report.kotlin_source_sets
        );
    }
    for link in &report.dangling_links {
        println!(
            "  warning: {} extends unknown configuration {}",
            link.configuration, link.missing
        );
    }
    Ok(exit)
}
