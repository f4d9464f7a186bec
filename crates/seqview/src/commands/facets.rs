use clap::ArgMatches;
use tracing::{error, info};

use seqview_core::config::SeqviewConfig;
use seqview_core::RouteParams;

use super::{LoadedView, project_name};

pub(super) fn handle_facets_command(
    matches: &ArgMatches,
    config: &SeqviewConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_name(matches)?;
    let json_output = matches.get_flag("json");

    info!(event = "cli.facets_started", project = project);

    let loaded = match LoadedView::open(config, RouteParams::project(project)) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load facets: {}", e);
            error!(event = "cli.facets_failed", project = project, error = %e);
            return Err(e);
        }
    };

    let facets = loaded.view.facets();
    if json_output {
        println!("{}", serde_json::to_string_pretty(facets)?);
    } else {
        for facet in facets.iter().filter(|f| f.show_in_sidebar) {
            let options: Vec<String> = facet
                .options
                .iter()
                .map(|o| {
                    if o.name == o.value {
                        o.value.clone()
                    } else {
                        format!("{} ({})", o.name, o.value)
                    }
                })
                .collect();
            let options = if options.is_empty() {
                "-".to_string()
            } else {
                options.join(", ")
            };
            println!("{:<9} {}", format!("{}:", facet.kind), options);
        }
    }

    info!(event = "cli.facets_completed", project = project);
    Ok(())
}
