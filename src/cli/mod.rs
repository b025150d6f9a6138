//! Command-line parsing for the article-trends viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data and rendering code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Metric, QueryDate, ViewConfig};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "trends", version, about = "Newspaper article counts over time (Trove)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive chart.
    ///
    /// Move between points, switch the metric, and press Enter (or click a
    /// point) to list the matching articles.
    Tui(TuiArgs),
    /// Print a summary and the points of every series (optionally export CSV).
    Series(SeriesArgs),
    /// Render every series as an ASCII plot.
    Plot(PlotArgs),
    /// Fetch the articles behind one point of a series.
    Articles(ArticlesArgs),
    /// Convert a Trove search URL into a series name and API query.
    Query(QueryArgs),
}

/// Options shared by every command that charts series files.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Series files (`.json`, or `.js` written by the old harvester).
    /// Defaults to every series file found under the current directory.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Value to chart.
    #[arg(short = 'm', long, value_enum, default_value_t = Metric::Ratio)]
    pub metric: Metric,

    /// Article endpoint (overrides TROVE_ARTICLES_ENDPOINT).
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Log file (the terminal is taken by the UI).
    #[arg(long, default_value = "trends.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Also print every point of every series.
    #[arg(long)]
    pub points: bool,

    /// Export the series to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Save the loaded sources as JSON (converts legacy `.js` files).
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ArticlesArgs {
    /// Series file the point belongs to.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Query date: `YYYY` for yearly series, `YYYY/MM` for monthly ones.
    #[arg(short = 'd', long, value_parser = parse_query_date)]
    pub date: QueryDate,

    /// Index of the source within the file (for files holding several).
    #[arg(long, default_value_t = 0)]
    pub series: usize,

    /// Article endpoint (overrides TROVE_ARTICLES_ENDPOINT).
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct QueryArgs {
    /// Trove newspaper search URL.
    pub url: String,
}

fn parse_query_date(raw: &str) -> Result<QueryDate, String> {
    raw.parse()
}

impl ViewArgs {
    pub fn to_config(&self) -> ViewConfig {
        ViewConfig {
            files: self.files.clone(),
            metric: self.metric,
            endpoint: self.endpoint.clone(),
            ..ViewConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_articles_date() {
        let cli = Cli::parse_from(["trends", "articles", "floods.json", "--date", "1900/03"]);
        let Command::Articles(args) = cli.command else {
            panic!("expected articles command");
        };
        assert_eq!(args.date, QueryDate::Month(1900, 3));
        assert_eq!(args.series, 0);
    }

    #[test]
    fn rejects_unknown_metric() {
        let res = Cli::try_parse_from(["trends", "plot", "--metric", "count"]);
        assert!(res.is_err());
    }

    #[test]
    fn view_args_default_to_ratio() {
        let cli = Cli::parse_from(["trends", "series", "a.json", "b.json"]);
        let Command::Series(args) = cli.command else {
            panic!("expected series command");
        };
        let config = args.view.to_config();
        assert_eq!(config.metric, Metric::Ratio);
        assert_eq!(config.files.len(), 2);
    }
}
