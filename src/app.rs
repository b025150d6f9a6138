//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - loads series files into a registry
//! - prints reports/plots or starts the TUI

use clap::Parser;

use crate::cli::{ArticlesArgs, Command, PlotArgs, QueryArgs, SeriesArgs, TuiArgs};
use crate::data::query::{api_query_from_trove_url, series_name_from_trove_url};
use crate::domain::ViewConfig;
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;

/// Entry point for the `trends` binary.
pub fn run() -> Result<(), AppError> {
    // We want `trends` and `trends floods.json` to behave like `trends tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Series(args) => handle_series(args),
        Command::Plot(args) => handle_plot(args),
        Command::Articles(args) => handle_articles(args),
        Command::Query(args) => handle_query(args),
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::File(&args.log_file))?;
    let config = args.view.to_config();
    let registry = pipeline::load_registry_for(&config)?;
    let client = pipeline::article_client_for(&config)?;
    crate::tui::run(registry, client, &config)
}

fn handle_series(args: SeriesArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::Stderr)?;
    let config = ViewConfig {
        export: args.export.clone(),
        ..args.view.to_config()
    };
    let registry = pipeline::load_registry_for(&config)?;

    println!("{}", crate::report::format_registry_summary(&registry, config.metric));
    if args.points {
        for source in registry.iter() {
            println!("{}", crate::report::format_series_table(source, config.metric));
        }
    }

    if let Some(path) = &config.export {
        crate::io::write_series_csv(path, &registry, config.metric)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.save {
        crate::io::write_registry_json(path, &registry)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::Stderr)?;
    let config = ViewConfig {
        plot_width: args.width,
        plot_height: args.height,
        ..args.view.to_config()
    };
    let registry = pipeline::load_registry_for(&config)?;
    let Some(interval) = registry.interval() else {
        return Err(AppError::input("Nothing to plot."));
    };

    let plot = crate::plot::render_ascii_plot(
        &registry.list_series(config.metric),
        interval,
        config.metric,
        config.plot_width,
        config.plot_height,
    );
    println!("{plot}");
    Ok(())
}

fn handle_articles(args: ArticlesArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::Stderr)?;
    let config = ViewConfig {
        files: vec![args.file.clone()],
        endpoint: args.endpoint.clone(),
        ..ViewConfig::default()
    };
    let request = pipeline::article_request_for(&args.file, args.series, args.date)?;
    let client = pipeline::article_client_for(&config)?;

    let outcome = client.fetch(&request).map_err(|err| {
        AppError::new(err.exit_code(), crate::report::fetch_failed_line(&request, &err))
    })?;
    for line in crate::report::article_lines(&request, &outcome) {
        println!("{line}");
    }
    Ok(())
}

fn handle_query(args: QueryArgs) -> Result<(), AppError> {
    crate::logging::init(LogTarget::Stderr)?;
    println!("name: {}", series_name_from_trove_url(&args.url));
    println!("api query: {}", api_query_from_trove_url(&args.url));
    Ok(())
}

/// Rewrite argv so `trends` defaults to `trends tui`.
///
/// Rules:
/// - `trends`                       -> `trends tui`
/// - `trends -m total ...`          -> `trends tui -m total ...`
/// - `trends floods.json ...`       -> `trends tui floods.json ...`
/// - `trends --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "series" | "plot" | "articles" | "query");
    if is_subcommand {
        return argv;
    }

    // A flag or a file path: both are "tui" arguments.
    argv.insert(1, "tui".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_starts_tui() {
        assert_eq!(rewrite_args(argv(&["trends"])), argv(&["trends", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["trends", "floods.json"])),
            argv(&["trends", "tui", "floods.json"])
        );
        assert_eq!(
            rewrite_args(argv(&["trends", "-m", "total"])),
            argv(&["trends", "tui", "-m", "total"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            argv(&["trends", "plot", "a.json"]),
            argv(&["trends", "query", "http://trove.nla.gov.au/newspaper/result?q=x"]),
            argv(&["trends", "--help"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }
}
