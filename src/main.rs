use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use mtech_monitor::{commands, OutputMode};

fn monitor_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("SECONDS")
                .help("Sampling interval in seconds (clamped to 0.1-5.0)")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print each snapshot as a JSON line instead of the dashboard")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("samples")
                .short('n')
                .long("samples")
                .value_name("COUNT")
                .help("Stop after COUNT snapshots (JSON mode only)")
                .value_parser(clap::value_parser!(u64))
                .requires("json"),
        )
}

fn cli() -> Command {
    monitor_args(
        Command::new("mtech-monitor")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Live CPU, temperature and memory monitor"),
    )
    .subcommand(monitor_args(
        Command::new("monitor").about("Show the live dashboard (default)"),
    ))
    .subcommand(
        Command::new("config")
            .about("Manage persisted settings (use 'mtech-monitor config --help' for subcommands)")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(Command::new("show").about("Print the current configuration"))
            .subcommand(
                Command::new("set-interval")
                    .about("Set the default sampling interval")
                    .arg(
                        Arg::new("seconds")
                            .help("Interval in seconds (clamped to 0.1-5.0)")
                            .required(true)
                            .index(1)
                            .value_parser(clap::value_parser!(f64)),
                    ),
            )
            .subcommand(Command::new("reset").about("Restore default settings")),
    )
}

fn output_mode(matches: &ArgMatches) -> OutputMode {
    match matches.subcommand() {
        Some(("config", _)) => OutputMode::Stream,
        Some(("monitor", sub_matches)) if sub_matches.get_flag("json") => OutputMode::Stream,
        Some(("monitor", _)) => OutputMode::Dashboard,
        _ if matches.get_flag("json") => OutputMode::Stream,
        _ => OutputMode::Dashboard,
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    mtech_monitor::init_logging(output_mode(&matches));

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => commands::monitor::execute(sub_matches),
        Some(("config", sub_matches)) => commands::config::execute(sub_matches),
        _ => commands::monitor::execute(&matches),
    }
}
