//! Subcommand handlers

use std::path::{Path, PathBuf};

use markcheck::{Credentials, RowSelection, RunReport, SuiteConfig, WorkbookSink};
use tracing::info;

use crate::commands::{ResetArgs, RunArgs};
use crate::error::{CliError, CliResult};
use crate::output::Reporter;

/// Load the suite configuration, with the workbook path overridden if given
pub fn load_config(path: &Path, workbook: Option<&PathBuf>) -> CliResult<SuiteConfig> {
    if !path.is_file() {
        return Err(CliError::config(format!(
            "config file {} not found",
            path.display()
        )));
    }
    let mut config = SuiteConfig::load(path)?;
    if let Some(workbook) = workbook {
        config.workbook.path.clone_from(workbook);
    }
    Ok(config)
}

/// Credentials from the run arguments; both parts or neither
pub fn credentials(args: &RunArgs) -> CliResult<Option<Credentials>> {
    match (&args.username, &args.password) {
        (Some(username), Some(password)) => Ok(Some(Credentials {
            username: username.clone(),
            password: password.clone(),
        })),
        (None, None) => Ok(None),
        _ => Err(CliError::invalid_argument(
            "--username and --password must be given together",
        )),
    }
}

/// `markcheck reset`
pub fn reset(config_path: &Path, args: &ResetArgs, reporter: &Reporter) -> CliResult<()> {
    let config = load_config(config_path, args.workbook.as_ref())?;
    let cleared = WorkbookSink::new(config.workbook.clone())?.reset()?;
    reporter.info(&format!(
        "Cleared results of {cleared} rows in {}",
        config.workbook.path.display()
    ));
    Ok(())
}

/// `markcheck envs`
pub fn envs(config_path: &Path, reporter: &Reporter) -> CliResult<()> {
    let config = load_config(config_path, None)?;
    for name in config.environments.names() {
        let url = config.environments.resolve(name)?;
        reporter.info(&format!("{name}\t{url}"));
    }
    Ok(())
}

/// `markcheck run`
pub async fn run(config_path: &Path, args: &RunArgs, reporter: &Reporter) -> CliResult<RunReport> {
    let config = load_config(config_path, args.workbook.as_ref())?;
    let selection: RowSelection = args.rows.parse()?;
    let credentials = credentials(args)?;
    config.environments.resolve(&args.env)?;

    if args.reset {
        WorkbookSink::new(config.workbook.clone())?.reset()?;
    }
    let rows = markcheck::WorkbookReader::new(config.workbook.clone())?.rows()?;
    info!(rows = rows.len(), workbook = %config.workbook.path.display(), "test rows loaded");

    let report = drive(&config, args, &rows, selection, credentials.as_ref()).await?;

    for row in &report.rows {
        reporter.row(row);
    }
    reporter.summary(&report);
    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        reporter.info(&format!("Report written to {}", path.display()));
    }
    Ok(report)
}

#[cfg(feature = "browser")]
async fn drive(
    config: &SuiteConfig,
    args: &RunArgs,
    rows: &[markcheck::TestRow],
    selection: RowSelection,
    credentials: Option<&Credentials>,
) -> CliResult<RunReport> {
    use markcheck::{Browser, BrowserConfig, SuiteRunner};

    let mut browser_config = BrowserConfig::default().with_headless(!args.headed);
    if let Some(path) = &args.chromium_path {
        browser_config = browser_config.with_chromium_path(path.to_string_lossy());
    }
    if args.no_sandbox {
        browser_config = browser_config.with_no_sandbox();
    }

    let browser = Browser::launch(browser_config).await?;
    let mut page = browser.new_page().await?;
    let mut sink = WorkbookSink::new(config.workbook.clone())?;
    let runner = SuiteRunner::new(config);

    let result = match runner.prepare(&mut page, &args.env, credentials).await {
        Ok(listing) => {
            runner
                .run(&mut page, &mut sink, &listing, rows, selection)
                .await
        }
        Err(e) => Err(e),
    };
    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
    Ok(result?)
}

#[cfg(not(feature = "browser"))]
async fn drive(
    _config: &SuiteConfig,
    _args: &RunArgs,
    _rows: &[markcheck::TestRow],
    _selection: RowSelection,
    _credentials: Option<&Credentials>,
) -> CliResult<RunReport> {
    Err(CliError::unsupported(
        "Browser support not enabled. Rebuild with --features browser",
    ))
}
