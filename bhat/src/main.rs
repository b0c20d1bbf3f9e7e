use bhat::{bandwidth, transform, Cli, Command, StreamConfig, TransformConfig};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();
    let mut ok = true;

    if matches!(command, Command::All | Command::Transform) {
        match TransformConfig::try_from(&cli.transform).and_then(|config| transform::run(&config)) {
            Ok(report) => {
                print!("{report}");
                ok &= report.gpu.is_ok();
            }
            Err(e) => {
                log::error!("transform benchmark: {e}");
                ok = false
            }
        }
    }

    if matches!(command, Command::All | Command::Stream) {
        match StreamConfig::try_from(&cli.stream).and_then(|config| bandwidth::run(&config)) {
            Ok(reports) => {
                for report in reports {
                    println!("{report}")
                }
            }
            Err(e) => {
                log::error!("bandwidth benchmark: {e}");
                ok = false
            }
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
