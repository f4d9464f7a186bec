use clap::ArgMatches;
use tracing::{error, info};

use seqview_core::config::SeqviewConfig;
use seqview_core::{RouteParams, Sequence};

use super::{LoadedView, project_name};

#[derive(serde::Serialize)]
struct ShowResponse<'a> {
    sequence: &'a Sequence,
    status: &'static str,
    stage: Option<&'a str>,
    event_id: Option<&'a str>,
    route: Option<String>,
    offer_reload: bool,
    traces_last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

pub(super) fn handle_show_command(
    matches: &ArgMatches,
    config: &SeqviewConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_name(matches)?;
    let context = matches
        .get_one::<String>("context")
        .ok_or("Context argument is required")?;
    let stage = matches.get_one::<String>("stage").map(String::as_str);
    let event_id = matches.get_one::<String>("event").map(String::as_str);
    let json_output = matches.get_flag("json");

    info!(
        event = "cli.show_started",
        project = project,
        shkeptncontext = context
    );

    let mut route = RouteParams::project(project).with_context(context);
    if let Some(stage) = stage {
        route = route.with_stage(stage);
    }
    if let Some(event_id) = event_id {
        route = route.with_event(event_id);
    }

    let mut loaded = match LoadedView::open(config, route) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to show sequence: {}", e);
            error!(event = "cli.show_failed", shkeptncontext = context, error = %e);
            return Err(e);
        }
    };

    // Found only after the list was widened: select it now.
    let selected = loaded.view.current_sequence().map(|s| s.context().to_string());
    if selected.as_deref() != Some(context.as_str()) {
        if let Err(e) = loaded.view.select_sequence(context, stage, event_id) {
            eprintln!("Failed to show sequence: {}", e);
            error!(event = "cli.show_failed", shkeptncontext = context, error = %e);
            return Err(e.into());
        }
    }

    let view = &loaded.view;
    let Some(sequence) = view.current_sequence() else {
        return Err(format!("Sequence '{}' could not be selected", context).into());
    };
    let response = ShowResponse {
        sequence,
        status: sequence.status().as_str(),
        stage: view.selected_stage(),
        event_id: view.selection_state().event_id(),
        route: loaded.navigator.last(),
        offer_reload: view.show_reload_button(sequence),
        traces_last_updated: view.traces_last_updated(sequence),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_sequence(&response);
    }

    info!(event = "cli.show_completed", shkeptncontext = context);
    Ok(())
}

fn print_sequence(response: &ShowResponse<'_>) {
    let sequence = response.sequence;
    println!(
        "Sequence {} ({}) in {}",
        sequence.shkeptncontext, sequence.name, sequence.project
    );
    println!("  Service:  {}", sequence.service);
    println!("  Status:   {}", sequence.status().label());
    println!(
        "  Started:  {}",
        sequence.time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Stages:   {}", sequence.stages().join(", "));
    if let Some(stage) = response.stage {
        println!("  Stage:    {}", stage);
    }
    if let Some(event_id) = response.event_id {
        println!("  Event:    {}", event_id);
    }
    if let Some(route) = &response.route {
        println!("  Route:    {}", route);
    }

    println!("  Traces:");
    for trace in &sequence.traces {
        let marker = if Some(trace.id.as_str()) == response.event_id {
            '>'
        } else {
            ' '
        };
        let result = trace
            .result
            .map(|r| format!(" [{}]", format!("{:?}", r).to_lowercase()))
            .unwrap_or_default();
        println!(
            "   {} {}  {:<10} {}{}",
            marker,
            trace.time.format("%H:%M:%S"),
            trace.stage,
            trace.event_type,
            result
        );
    }

    if response.offer_reload {
        let updated = response
            .traces_last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!();
        println!(
            "Started more than the live window ago: not polled automatically (traces last updated: {}).",
            updated
        );
    }
}
