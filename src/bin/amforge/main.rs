//! amforge CLI - convert a CMake-style ISIS tree to autotools

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;

use amforge::ops::{reformat, ReformatOptions, ReformatReport};
use amforge::util::config::{load_config, user_config_path};
use amforge::util::diagnostic::{emit, Diagnostic};
use amforge::util::shell::{format_duration, Shell, Status};
use amforge::ReformatError;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    let Some(source) = cli.source.clone() else {
        print_usage();
        eprintln!("error: the `--source <DIR>` argument is required");
        std::process::exit(1);
    };

    if let Err(e) = run(cli, source, &shell) {
        let invalid_source = matches!(
            e.downcast_ref::<ReformatError>(),
            Some(ReformatError::InvalidSourceTree { .. })
        );
        if invalid_source {
            print_usage();
        }

        match e.downcast_ref::<ReformatError>() {
            Some(err) => emit(&err.to_diagnostic(), shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    let _ = Cli::command().print_help();
    eprintln!();
}

fn run(cli: Cli, source: PathBuf, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("amforge=debug")
    } else if cli.quiet {
        EnvFilter::new("amforge=error")
    } else {
        EnvFilter::new("amforge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let user_config = user_config_path();
    let config = load_config(cli.config.as_deref(), user_config.as_deref())?;

    let opts = ReformatOptions {
        source,
        destination: cli.destination,
        basename: cli.basename,
        build_apps: !cli.no_apps,
        resources: cli.resources,
        package: !cli.skip_package,
        archive_dir: cli.archive_dir,
    };

    shell.status(
        Status::Scanning,
        format!("legacy tree {}", opts.source.display()),
    );
    let start = Instant::now();
    let report = reformat(&opts, &config)?;
    print_report(shell, &opts, &report);
    shell.status(
        Status::Finished,
        format!("in {}", format_duration(start.elapsed())),
    );
    Ok(())
}

fn print_report(shell: &Shell, opts: &ReformatOptions, report: &ReformatReport) {
    shell.status(
        Status::Relocated,
        format!(
            "{} object folders, {} apps, {} headers",
            report.objects, report.apps, report.headers
        ),
    );
    shell.verbose(
        Status::Info,
        format!("families: {}", report.families.join(", ")),
    );
    for fragment in &report.fragments {
        shell.verbose(Status::Generated, fragment.display());
    }
    shell.status(
        Status::Generated,
        format!(
            "{} build files in {}",
            report.fragments.len(),
            opts.destination.display()
        ),
    );
    if !report.configure && !shell.is_quiet() {
        emit(
            &Diagnostic::warning(
                "configure.ac was not generated: no configure.ac.in in the destination",
            )
            .with_suggestion("Ship the template in `<resources>/dist-add` and pass `--resources`"),
            shell.use_color(),
        );
    }
    match &report.archive {
        Some(archive) => shell.status(Status::Packaged, archive.display()),
        None => shell.verbose(Status::Skipped, "packaging"),
    }
}
