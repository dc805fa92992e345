// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Validate command: context, plan, environment gate, execution, report.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use termcolor::StandardStream;

use qgate::adapter::{AdapterRegistry, ExecutionEnv};
use qgate::aggregate::ResultAggregator;
use qgate::cli::Cli;
use qgate::color::resolve_color;
use qgate::context::ContextDetector;
use qgate::detect::{self, ToolDetectionCache};
use qgate::dimension::ScopeSelector;
use qgate::discovery;
use qgate::environment::EnvironmentChecker;
use qgate::error::{Error, ExitCode};
use qgate::executor::ExecutionController;
use qgate::git;
use qgate::plan::{PlanRequest, PlanSelector};
use qgate::process::{self, CancelToken, ProcessRunner, SystemProcessRunner};
use qgate::report::{JsonFormatter, ReportFormatter, ReportTarget, RunReport, TreeFormatter};

/// Run a validation.
pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    let cwd = std::env::current_dir()?;
    let root = git::workdir(&cwd).unwrap_or_else(|| cwd.clone());

    let (config, config_path) = discovery::load_config(cli.config.as_deref(), &cwd)?;

    let context = ContextDetector::new(&root).detect();
    let request = PlanRequest {
        fast: cli.fast,
        scope: ScopeSelector::parse(&cli.scope, &root)?,
        dimensions: cli.dimensions.clone(),
        task: cli.task.clone(),
    };
    let plan = PlanSelector::new(&config).select(&context, &request)?;

    let registry = AdapterRegistry::from_config(&config)?;
    registry.validate_plan(&plan)?;

    if cli.plan {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(ExitCode::Success);
    }

    let runner: Arc<dyn ProcessRunner> = Arc::new(SystemProcessRunner);
    let cache = detection_cache(cli, config_path.as_deref(), &root, &runner);

    let environment = EnvironmentChecker::new(&config, &cache)
        .check(&plan)
        .into_result()?;
    tracing::debug!(
        "environment ok: {} binaries resolved",
        environment.detections.len()
    );

    process::install_interrupt_handler();
    let cancel = CancelToken::with_signals();
    let env = ExecutionEnv {
        root: &root,
        runner: runner.as_ref(),
        cache: &cache,
        cancel: &cancel,
    };
    let results = ExecutionController::new(&registry, env)
        .parallel(cli.parallel(config.run.parallel))
        .jobs(cli.jobs.or(config.run.jobs))
        .execute(&plan);

    if !cli.no_cache {
        let stats = cache.stats();
        tracing::debug!(
            "detection cache: {} hits, {} misses, {} entries",
            stats.hits,
            stats.misses,
            stats.entries
        );
        if let Err(e) = cache.persist(&detect::cache_path(&root)) {
            eprintln!("qgate: warning: failed to write detection cache: {e}");
        }
    }

    let aggregation = ResultAggregator::aggregate(&plan.dimensions, results);
    let cancelled = cancel.is_cancelled();
    let report = RunReport::new(context, plan, aggregation, start.elapsed());

    write_report(cli, &report, &root)?;

    if cancelled {
        eprintln!("qgate: interrupted");
        return Ok(ExitCode::Failed);
    }
    Ok(report.exit_code())
}

/// Load or create the detection cache, resetting it if the manifests changed.
fn detection_cache(
    cli: &Cli,
    config_path: Option<&Path>,
    root: &Path,
    runner: &Arc<dyn ProcessRunner>,
) -> ToolDetectionCache {
    if cli.no_cache {
        return ToolDetectionCache::new(root, Arc::clone(runner));
    }

    let path = detect::cache_path(root);
    let cache = if path.exists() {
        match ToolDetectionCache::load(&path, root, Arc::clone(runner)) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::debug!("detection cache discarded: {e}");
                ToolDetectionCache::new(root, Arc::clone(runner))
            }
        }
    } else {
        ToolDetectionCache::new(root, Arc::clone(runner))
    };

    let content = config_path.and_then(|p| std::fs::read_to_string(p).ok());
    let fingerprint = detect::manifest_fingerprint(root, content.as_deref());
    if cache.sync_manifest(fingerprint) {
        tracing::debug!("detection cache fingerprint {fingerprint:016x}");
    }
    cache
}

/// Write the tree and/or JSON to stdout, and the report file if requested.
fn write_report(cli: &Cli, report: &RunReport, root: &Path) -> anyhow::Result<()> {
    if cli.report.shows_tree() {
        let stdout = StandardStream::stdout(resolve_color());
        let mut tree = TreeFormatter::new(stdout.lock(), cli.format_options());
        tree.write_report(report)?;
    } else {
        JsonFormatter::new(false).format_to(&mut std::io::stdout().lock(), report)?;
    }

    let Some(path) = cli.report.file(root) else {
        return Ok(());
    };
    let Some(formatter) = qgate::report::file_formatter(&cli.report) else {
        return Ok(());
    };
    let content = formatter.format(report)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&path, content).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    if matches!(cli.report, ReportTarget::Html | ReportTarget::HtmlFile(_)) {
        eprintln!("qgate: report written to {}", path.display());
    }
    Ok(())
}
