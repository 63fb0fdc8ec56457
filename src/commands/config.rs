use crate::core::Config;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("set-interval", sub_matches)) => set_interval(sub_matches),
        Some(("reset", _)) => reset(),
        _ => {
            println!("Use 'mtech-monitor config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    let path = Config::get_config_path()?;

    println!("{} {}", "Config file:".white(), path.display().to_string().dimmed());
    println!(
        "  {} {}",
        "Refresh interval:".white(),
        format!("{:.1}s", config.interval_secs.seconds()).cyan().bold()
    );
    println!(
        "  {} warning {}%, critical {}%",
        "CPU thresholds:".white(),
        config.thresholds.cpu.warning,
        config.thresholds.cpu.critical
    );
    println!(
        "  {} warning {}%, critical {}%",
        "Memory thresholds:".white(),
        config.thresholds.memory.warning,
        config.thresholds.memory.critical
    );
    println!("  {} {}ms", "Stop timeout:".white(), config.stop_timeout_ms);
    println!("  {} {}ms", "UI refresh:".white(), config.ui_refresh_ms);

    Ok(())
}

fn set_interval(matches: &clap::ArgMatches) -> Result<()> {
    let requested = *matches
        .get_one::<f64>("seconds")
        .context("Seconds argument is required")?;

    let mut config = Config::load()?;
    let stored = config.set_interval(requested);
    config.save()?;

    if stored.seconds() != requested {
        println!(
            "{}",
            format!(
                "⚠️  {}s is outside 0.1-5.0s; stored {}s instead",
                requested,
                stored.seconds()
            )
            .yellow()
        );
    }
    println!(
        "{} {}",
        "Refresh interval set to:".green(),
        format!("{:.1}s", stored.seconds()).cyan().bold()
    );

    Ok(())
}

fn reset() -> Result<()> {
    Config::default().save()?;
    println!("{}", "Configuration reset to defaults.".green());
    Ok(())
}
