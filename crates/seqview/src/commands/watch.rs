use std::sync::Arc;
use std::time::Duration;

use clap::ArgMatches;
use tracing::{error, info};

use seqview_core::config::{SeqviewConfig, validate_config};
use seqview_core::{FileSource, RecordingNavigator, RouteParams, SequenceView, ViewInput};

use super::{parse_filters, project_name};

pub(super) async fn handle_watch_command(
    matches: &ArgMatches,
    config: &SeqviewConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_name(matches)?;
    let filters = parse_filters(matches)?;
    let duration = matches.get_one::<u64>("duration").copied();

    let mut config = config.clone();
    if let Some(secs) = matches.get_one::<u64>("sequence-interval") {
        config.polling.sequence_list_interval_secs = Some(*secs);
    }
    if let Some(secs) = matches.get_one::<u64>("traces-interval") {
        config.polling.unfinished_traces_interval_secs = Some(*secs);
        config.polling.selected_traces_interval_secs = Some(*secs);
    }
    validate_config(&config)?;

    let route = match matches.get_one::<String>("route") {
        Some(path) => RouteParams::parse_path(path),
        None => RouteParams::project(project),
    };
    if route.project_name.as_deref() != Some(project) {
        return Err(format!("Route does not point into project '{}'", project).into());
    }

    info!(
        event = "cli.watch_started",
        project = project,
        duration_secs = duration
    );

    let source = Arc::new(FileSource::new(
        config.source.data_dir(),
        config.source.page_size(),
    ));
    let navigator = Arc::new(RecordingNavigator::new());
    let mut view = SequenceView::new(source, navigator.clone(), config.polling.clone());

    let (_route_tx, routes) = tokio::sync::watch::channel(route);
    let mut inputs = view.inputs(routes);

    let deadline = async move {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut printer = UpdatePrinter::default();
    let mut filters_applied = false;
    view.start();
    println!("Watching project '{}' (Ctrl-C to stop)", project);

    loop {
        tokio::select! {
            input = inputs.next() => {
                let Some(input) = input else { break };
                let is_route = matches!(input, ViewInput::Route(_));
                view.apply(input);

                if is_route && !filters_applied {
                    if view.project().is_none() {
                        view.shutdown();
                        eprintln!("Failed to watch: project '{}' not found", project);
                        error!(event = "cli.watch_failed", project = project);
                        return Err(format!("Project '{}' not found", project).into());
                    }
                    // A project load resets the filters, so apply ours after it.
                    view.filters_changed(&filters);
                    filters_applied = true;
                }
                printer.print(&view, &navigator);
            }
            _ = &mut deadline => {
                info!(event = "cli.watch_deadline_reached");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!(event = "cli.watch_interrupted");
                break;
            }
        }
    }

    view.shutdown();
    info!(event = "cli.watch_completed", project = project);
    Ok(())
}

/// Prints a status line whenever it differs from the previous one, plus
/// each navigation intent once.
#[derive(Default)]
struct UpdatePrinter {
    last_line: String,
    routes_printed: usize,
}

impl UpdatePrinter {
    fn print(&mut self, view: &SequenceView, navigator: &RecordingNavigator) {
        let history = navigator.history();
        for path in history.iter().skip(self.routes_printed) {
            println!("-> {}", path);
        }
        self.routes_printed = history.len();

        let line = summary_line(view);
        if line != self.last_line {
            println!(
                "[{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                line
            );
            self.last_line = line;
        }
    }
}

fn summary_line(view: &SequenceView) -> String {
    let name = view
        .project()
        .map(|p| p.project_name)
        .unwrap_or_else(|| "-".to_string());
    let total = view.sequences().len();
    let shown = view.filtered_sequences().len();
    let unfinished = view.unfinished_sequences().len();

    let mut line = format!(
        "{}: {} sequences ({} shown, {} unfinished)",
        name, total, shown, unfinished
    );
    if let Some(current) = view.current_sequence() {
        line.push_str(&format!(
            ", selected {} [{}]",
            current.context(),
            current.status().label()
        ));
        if let Some(stage) = view.selected_stage() {
            line.push_str(&format!(" @ {}", stage));
        }
        if view.show_reload_button(current) {
            line.push_str(" (reload manually)");
        }
    }
    line
}
