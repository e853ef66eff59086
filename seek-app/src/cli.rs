use std::path::PathBuf;

use clap::Parser;
use seek_web::SearchParams;

/// Search the web through the Brave Search API.
#[derive(Debug, Parser)]
#[command(name = "seek", version)]
pub struct Args {
    /// Search terms.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// YAML config file; defaults to the per-user config dir when present.
    #[arg(long, env = "SEEK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of results (at most 3).
    #[arg(long)]
    pub count: Option<u32>,

    /// Result offset (at most 3).
    #[arg(long)]
    pub offset: Option<u32>,

    #[arg(long)]
    pub search_lang: Option<String>,

    #[arg(long)]
    pub ui_lang: Option<String>,

    #[arg(long)]
    pub result_filter: Option<String>,

    #[arg(long)]
    pub goggles_id: Option<String>,

    /// `metric` or `imperial`.
    #[arg(long)]
    pub units: Option<String>,

    /// Ask for additional snippets per hit.
    #[arg(long)]
    pub extra_snippets: bool,

    /// Print the whole typed response as JSON instead of one URL per line.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn to_params(&self) -> SearchParams {
        let defaults = SearchParams::new(self.query.join(" "));
        SearchParams {
            count: self.count.or(defaults.count),
            offset: self.offset.or(defaults.offset),
            search_lang: self.search_lang.clone(),
            ui_lang: self.ui_lang.clone(),
            result_filter: self.result_filter.clone(),
            goggles_id: self.goggles_id.clone(),
            units: self.units.clone(),
            extra_snippets: Some(self.extra_snippets),
            ..defaults
        }
    }
}
