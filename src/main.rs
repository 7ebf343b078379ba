// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface generating dashboards from definition files.

use std::{
    env,
    path::{Path, PathBuf},
    process
};

use clap::{Parser, ValueEnum};
use grafana_dashboards::{
    Config, DashboardExporter, DefinitionParser, ElasticSearchExporter, Error, FileExporter,
    GrafanaExporter, ProjectProcessor, load_config, yaml_to_json
};
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = ".grafana/grafana_dashboards.yaml";

/// Generate Grafana dashboards from templated YAML definitions.
#[derive(Debug, Parser)]
#[command(name = "grafana-dashboard-builder", version, about)]
struct Cli {
    /// Definition files or directories to load.
    #[arg(short = 'p', long = "path", value_name = "PATH", required = true, num_args = 1..)]
    paths: Vec<PathBuf>,

    /// Directory receiving generated dashboard files.
    #[arg(short = 'o', long = "out", value_name = "DIR")]
    out: Option<PathBuf>,

    /// Configuration file; defaults to ~/.grafana/grafana_dashboards.yaml.
    #[arg(short = 'c', long = "config", value_name = "PATH", env = "GRAFANA_DASHBOARDS_CONFIG")]
    config: Option<PathBuf>,

    /// YAML mapping overriding the data of every project.
    #[arg(long = "context", value_name = "YAML")]
    context: Option<String>,

    /// Exporters to run; defaults to every configured one.
    #[arg(long = "exporter", value_enum, value_name = "EXPORTER")]
    exporters: Vec<ExporterKind>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExporterKind {
    File,
    Grafana,
    ElasticSearch
}

/// Entry point that reports errors and sets the exit status.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run(Cli::parse()) {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

/// Loads definitions and runs every selected exporter over them.
///
/// # Errors
///
/// Propagates configuration, loading, generation and export failures.
fn run(cli: Cli) -> Result<(), Error> {
    let config_path = cli.config.clone().or_else(default_config_path);
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => Config::default()
    }
    .with_env_overrides(|key| env::var(key).ok());

    let context = merged_context(&config, cli.context.as_deref())?;
    let processor = ProjectProcessor::new(build_exporters(&cli, &config)?);
    let registry = DefinitionParser::new().load_projects(&cli.paths)?;
    let generated = processor.process_projects(&registry, Some(&context))?;
    info!("Generated {} dashboards", generated);
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| Path::new(&home).join(DEFAULT_CONFIG))
}

/// Configuration context overridden by the `--context` mapping.
fn merged_context(config: &Config, overrides: Option<&str>) -> Result<Map<String, Value>, Error> {
    let mut context = config.context.clone();
    let Some(overrides) = overrides.filter(|text| !text.trim().is_empty()) else {
        return Ok(context);
    };
    match yaml_to_json(serde_yaml::from_str(overrides)?, Path::new("."))? {
        Value::Object(entries) => context.extend(entries),
        Value::Null => {}
        other => {
            return Err(Error::validation(format!("--context must be a YAML mapping, found {other}")));
        }
    }
    Ok(context)
}

/// Exporters selected on the command line, or every configured one.
fn build_exporters(cli: &Cli, config: &Config) -> Result<Vec<Box<dyn DashboardExporter>>, Error> {
    let output_folder = cli.out.as_deref().or_else(|| config.output_folder());
    let kinds = if cli.exporters.is_empty() {
        let mut configured = Vec::new();
        if output_folder.is_some() {
            configured.push(ExporterKind::File);
        }
        if config.grafana.is_some() {
            configured.push(ExporterKind::Grafana);
        }
        if config.elastic_search.is_some() {
            configured.push(ExporterKind::ElasticSearch);
        }
        configured
    } else {
        cli.exporters.clone()
    };
    if kinds.is_empty() {
        return Err(Error::validation(
            "no exporter configured, pass --out or configure grafana or elastic-search"
        ));
    }

    let mut exporters: Vec<Box<dyn DashboardExporter>> = Vec::new();
    for kind in kinds {
        let exporter: Box<dyn DashboardExporter> = match kind {
            ExporterKind::File => {
                let folder = output_folder
                    .ok_or_else(|| Error::validation("file exporter requires --out or file.output_folder"))?;
                Box::new(FileExporter::new(folder)?)
            }
            ExporterKind::Grafana => Box::new(GrafanaExporter::from_settings(
                &config.grafana.clone().unwrap_or_default()
            )?),
            ExporterKind::ElasticSearch => Box::new(ElasticSearchExporter::from_settings(
                &config.elastic_search.clone().unwrap_or_default()
            )?)
        };
        exporters.push(exporter);
    }
    Ok(exporters)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use clap::Parser;
    use grafana_dashboards::{Config, Error, parse_config};
    use serde_json::json;

    use super::{Cli, ExporterKind, build_exporters, merged_context, run};

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec![env!("CARGO_PKG_NAME")];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("failed to parse CLI")
    }

    #[test]
    fn cli_accepts_paths_and_exporters() {
        let cli = parse(&[
            "-p", "a.yaml", "dir", "--out", "out", "--exporter", "file", "--exporter", "elastic-search"
        ]);
        assert_eq!(cli.paths.len(), 2);
        assert_eq!(cli.out.as_deref(), Some(Path::new("out")));
        assert_eq!(cli.exporters, vec![ExporterKind::File, ExporterKind::ElasticSearch]);
    }

    #[test]
    fn cli_requires_paths() {
        assert!(Cli::try_parse_from([env!("CARGO_PKG_NAME")]).is_err());
    }

    #[test]
    fn context_argument_overrides_configuration() {
        let config = parse_config("context:\n  env: dev\n  region: eu\n").expect("configuration parses");
        let context = merged_context(&config, Some("env: prod")).expect("context merges");
        assert_eq!(context["env"], json!("prod"));
        assert_eq!(context["region"], json!("eu"));
    }

    #[test]
    fn context_argument_must_be_a_mapping() {
        let error = merged_context(&Config::default(), Some("[1, 2]")).unwrap_err();
        match error {
            Error::Validation {
                message
            } => assert!(message.starts_with("--context must be a YAML mapping")),
            other => panic!("unexpected error variant: {other:?}")
        }
    }

    #[test]
    fn missing_exporters_are_rejected() {
        let cli = parse(&["-p", "defs"]);
        let error = build_exporters(&cli, &Config::default()).err().expect("build_exporters should fail");
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn configured_exporters_are_selected_by_default() {
        let directory = tempfile::tempdir().expect("temp dir");
        let cli = parse(&["-p", "defs"]);
        let config = parse_config(&format!(
            "file:\n  output_folder: {}\ngrafana:\n  host: http://localhost:3000\n",
            directory.path().join("out").display()
        ))
        .expect("configuration parses");
        assert_eq!(build_exporters(&cli, &config).expect("exporters build").len(), 2);
    }

    #[test]
    fn run_writes_dashboards_to_output_folder() {
        let directory = tempfile::tempdir().expect("temp dir");
        let definitions = directory.path().join("defs.yaml");
        fs::write(
            &definitions,
            "- name: ops\n  project:\n    dashboards: ['{env}-overview']\n    env: [dev, prod]\n\
             - name: '{env}-overview'\n  dashboard:\n    title: '{env} overview'\n"
        )
        .expect("write definitions");
        let out = directory.path().join("out");
        let config = directory.path().join("config.yaml");

        run(parse(&[
            "-p",
            definitions.to_str().expect("utf-8 path"),
            "-o",
            out.to_str().expect("utf-8 path"),
            "-c",
            config.to_str().expect("utf-8 path"),
            "--exporter",
            "file"
        ]))
        .expect("run succeeds");

        for env in ["dev", "prod"] {
            let written = fs::read_to_string(out.join("ops").join(format!("{env}-overview.json")))
                .expect("dashboard written");
            let dashboard: serde_json::Value = serde_json::from_str(&written).expect("valid JSON");
            assert_eq!(dashboard["title"], json!(format!("{env} overview")));
        }
    }
}
