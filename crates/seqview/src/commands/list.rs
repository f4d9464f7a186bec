use clap::ArgMatches;
use tracing::{error, info};

use seqview_core::config::SeqviewConfig;
use seqview_core::{RouteParams, Sequence, SequenceView};

use super::{LoadedView, parse_filters, project_name};
use crate::table::{SequenceRow, TableFormatter};

/// JSON shape of one listed sequence.
#[derive(serde::Serialize)]
struct SequenceSummary<'a> {
    shkeptncontext: &'a str,
    name: &'a str,
    service: &'a str,
    status: &'static str,
    stages: Vec<&'a str>,
    time: chrono::DateTime<chrono::Utc>,
    offer_reload: bool,
}

impl<'a> SequenceSummary<'a> {
    fn new(view: &SequenceView, sequence: &'a Sequence) -> Self {
        Self {
            shkeptncontext: &sequence.shkeptncontext,
            name: &sequence.name,
            service: &sequence.service,
            status: sequence.status().as_str(),
            stages: sequence.stages(),
            time: sequence.time,
            offer_reload: view.should_offer_manual_reload(sequence),
        }
    }
}

pub(super) fn handle_list_command(
    matches: &ArgMatches,
    config: &SeqviewConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_name(matches)?;
    let json_output = matches.get_flag("json");
    let filters = parse_filters(matches)?;

    info!(
        event = "cli.list_started",
        project = project,
        json_output = json_output,
        filters = filters.len()
    );

    let mut loaded = match LoadedView::open(config, RouteParams::project(project)) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to list sequences: {}", e);
            error!(event = "cli.list_failed", project = project, error = %e);
            return Err(e);
        }
    };

    loaded.view.filters_changed(&filters);
    let all = loaded.view.sequences();
    let shown = loaded.view.filtered(&all);

    if json_output {
        let summaries: Vec<SequenceSummary<'_>> = shown
            .iter()
            .map(|&s| SequenceSummary::new(&loaded.view, s))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if all.is_empty() {
        println!("No sequences found for project '{}'.", project);
    } else if shown.is_empty() {
        println!("No sequences match the given filters.");
    } else {
        println!(
            "Sequences of '{}' ({} of {}):",
            project,
            shown.len(),
            all.len()
        );
        let rows: Vec<SequenceRow<'_>> = shown
            .iter()
            .map(|&s| SequenceRow {
                sequence: s,
                selected: false,
                offer_reload: loaded.view.should_offer_manual_reload(s),
            })
            .collect();
        TableFormatter::new(&shown).print_table(&rows);
    }

    info!(event = "cli.list_completed", project = project, count = shown.len());
    Ok(())
}
