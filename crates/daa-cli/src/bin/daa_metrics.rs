use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use daa_cli::{load_detector, Report};
use daa_core::{evaluate, read_log, Metric};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Well-clear metrics for a DAA trajectory log", long_about = None)]
struct Args {
    /// Trajectory log (NAME header, one row per aircraft per timestep)
    file: PathBuf,

    /// Threshold configuration file (defaults to <file>.conf when present).
    /// Thresholds must be declared in SI units ([m], [s] or no unit); files
    /// using [nmi], [ft] or other units are rejected.
    #[arg(long)]
    conf: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only list this metric (tcpa, hmd, vmd, tcoa, taumod, hd, vd)
    #[arg(long, value_parser = parse_metric)]
    metric: Option<Metric>,
}

fn parse_metric(name: &str) -> Result<Metric, String> {
    Metric::from_name(name).ok_or_else(|| format!("unknown metric `{name}`"))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("daa_metrics=info".parse()?)
                .add_directive("daa_cli=info".parse()?)
                .add_directive("daa_core=warn".parse()?),
        )
        .init();

    let args = Args::parse();

    tracing::info!(file = %args.file.display(), "reading data file");
    let encounter = read_log(&args.file)
        .with_context(|| format!("failed to ingest {}", args.file.display()))?;
    let detector = load_detector(&args.file, args.conf.as_deref())
        .context("failed to load thresholds")?;

    if encounter.timestep_count() == 0 {
        tracing::warn!("log has no complete timesteps");
    }

    let metrics = evaluate(&encounter, &detector);
    let report = Report::new(&encounter, &detector, &metrics);
    match args.format {
        Format::Text => print!("{}", report.text(args.metric)),
        Format::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_conf_help_states_si_units() {
        Args::command().debug_assert();
        let command = Args::command();
        let conf = command
            .get_arguments()
            .find(|arg| arg.get_id() == "conf")
            .unwrap();
        let help = conf.get_help().unwrap().to_string();
        assert!(help.contains("SI units"), "{help}");
        assert!(help.contains("[nmi]"), "{help}");
    }
}
