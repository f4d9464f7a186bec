use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::ArgMatches;
use tracing::{error, info, warn};

use seqview_core::config::SeqviewConfig;
use seqview_core::events;
use seqview_core::{
    FileSource, FilterSelection, RecordingNavigator, RouteParams, SequenceSource, SequenceView,
    ViewInput,
};

mod facets;
mod list;
mod show;
mod watch;

pub async fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let Some((command, sub_matches)) = matches.subcommand() else {
        error!(event = "cli.command_unknown");
        return Err("Unknown command".into());
    };

    let config = resolve_config(sub_matches);
    events::log_command_started(command, &config);
    let started = Instant::now();

    let result = match command {
        "list" => list::handle_list_command(sub_matches, &config),
        "facets" => facets::handle_facets_command(sub_matches, &config),
        "show" => show::handle_show_command(sub_matches, &config),
        "watch" => watch::handle_watch_command(sub_matches, &config).await,
        _ => {
            error!(event = "cli.command_unknown", command = command);
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        events::log_command_failed(command, e.as_ref());
    }
    events::log_command_finished(command, started.elapsed(), result.is_ok());
    result
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via
/// stderr and the structured log event `cli.config.load_failed`.
fn load_config_with_warning() -> SeqviewConfig {
    match SeqviewConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.seqview/config.toml and ./.seqview/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            SeqviewConfig::default()
        }
    }
}

/// Config hierarchy plus the global `--data` and `--page-size` flags.
fn resolve_config(matches: &ArgMatches) -> SeqviewConfig {
    let mut config = load_config_with_warning();
    if let Some(dir) = matches.get_one::<String>("data") {
        config.source.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(page_size) = matches.get_one::<usize>("page-size") {
        config.source.page_size = Some((*page_size).max(1));
    }
    config
}

fn parse_filters(matches: &ArgMatches) -> Result<Vec<FilterSelection>, Box<dyn std::error::Error>> {
    let Some(raw) = matches.get_many::<String>("filter") else {
        return Ok(Vec::new());
    };
    raw.map(|s| s.parse::<FilterSelection>().map_err(Into::into))
        .collect()
}

fn project_name(matches: &ArgMatches) -> Result<&str, Box<dyn std::error::Error>> {
    matches
        .get_one::<String>("project")
        .map(String::as_str)
        .ok_or_else(|| "Project argument is required".into())
}

/// A view over the file source with the route applied and the first page
/// of sequences loaded.
struct LoadedView {
    source: Arc<FileSource>,
    navigator: Arc<RecordingNavigator>,
    view: SequenceView,
}

impl LoadedView {
    fn open(config: &SeqviewConfig, route: RouteParams) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = config.source.data_dir();
        let source = Arc::new(FileSource::new(data_dir.clone(), config.source.page_size()));
        let navigator = Arc::new(RecordingNavigator::new());
        let mut view = SequenceView::new(
            source.clone(),
            navigator.clone(),
            config.polling.clone(),
        );

        let name = route.project_name.clone().unwrap_or_default();
        view.apply(ViewInput::Route(route));
        let Some(project) = view.project() else {
            return Err(format!(
                "Project '{}' not found (or has no services and stages) in {}",
                name,
                data_dir.display()
            )
            .into());
        };

        source.load_sequences(&project)?;
        let mut loaded = Self {
            source,
            navigator,
            view,
        };
        loaded.sync();
        // Route reconciliation may have widened the list.
        loaded.sync();

        info!(
            event = "cli.view_loaded",
            project = name,
            sequences = loaded.view.sequences().len()
        );
        Ok(loaded)
    }

    /// Feed the source's latest snapshot into the view.
    fn sync(&mut self) {
        let snapshot = self.source.subscribe_sequences().borrow().clone();
        self.view.apply(ViewInput::Sequences(snapshot));
    }
}
