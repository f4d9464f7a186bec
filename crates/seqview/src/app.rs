use clap::{Arg, ArgAction, Command};

fn project_arg() -> Arg {
    Arg::new("project")
        .help("Project whose sequences to show")
        .required(true)
        .index(1)
}

fn filter_arg() -> Arg {
    Arg::new("filter")
        .long("filter")
        .short('f')
        .help("Quick filter as Facet=value (Service, Stage, Sequence, Status); repeatable")
        .action(ArgAction::Append)
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

pub fn build_cli() -> Command {
    Command::new("seqview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch and filter the pipeline sequences of a project")
        .long_about("seqview keeps a live view of a project's sequences: it polls the sequence list, refreshes traces of running sequences, and follows the sequence you select. Data is read from a directory with one sub-directory per project.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .short('d')
                .help("Data directory (overrides config, default: ./data)")
                .global(true),
        )
        .arg(
            Arg::new("page-size")
                .long("page-size")
                .help("Number of sequences per page (overrides config)")
                .value_parser(clap::value_parser!(usize))
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List the sequences of a project")
                .arg(project_arg())
                .arg(filter_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("facets")
                .about("Show the filter facets offered for a project")
                .arg(project_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Select one sequence and show its stages and traces")
                .arg(project_arg())
                .arg(
                    Arg::new("context")
                        .help("Context token (shkeptncontext) of the sequence")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("stage")
                        .long("stage")
                        .short('s')
                        .help("Stage to select (default: the sequence's last stage)")
                        .conflicts_with("event"),
                )
                .arg(
                    Arg::new("event")
                        .long("event")
                        .short('e')
                        .help("Trace event id to select"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("watch")
                .about("Keep the view of a project fresh and print every change")
                .arg(project_arg())
                .arg(
                    Arg::new("route")
                        .long("route")
                        .short('r')
                        .help("Start from a route, e.g. /project/demo/sequence/<ctx>/stage/prod"),
                )
                .arg(filter_arg())
                .arg(
                    Arg::new("duration")
                        .long("duration")
                        .help("Stop after this many seconds (default: until Ctrl-C)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("sequence-interval")
                        .long("sequence-interval")
                        .help("Sequence-list refresh period in seconds (overrides config)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("traces-interval")
                        .long("traces-interval")
                        .help("Trace refresh period in seconds for both trace loops (overrides config)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
}
