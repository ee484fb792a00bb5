//! Print the propagation trace of one rewrite as JSON.
//!
//! Usage: `propagation_trace [KEY] [cushion|guard] [CONFIG.toml]`

use std::process::ExitCode;

use society_core::{trace_propagation, Session, SessionConfig};
use society_rules::{keys, WindprintMode};

fn parse_mode(arg: Option<&str>) -> Option<WindprintMode> {
    match arg.unwrap_or("cushion") {
        "cushion" => Some(WindprintMode::Cushion),
        "guard" => Some(WindprintMode::Guard),
        _ => None,
    }
}

fn load_config(path: Option<&str>) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)?;
            Ok(SessionConfig::from_toml_str(&source)?)
        }
        None => Ok(SessionConfig::default()),
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let key = args.first().map_or(keys::TIMING_WINDOW, String::as_str);
    let mode = parse_mode(args.get(1).map(String::as_str))
        .ok_or("mode must be 'cushion' or 'guard'")?;
    let config = load_config(args.get(2).map(String::as_str))?;

    let mut session = Session::new(config)?;
    let trace = trace_propagation(&mut session, key, mode)?;
    println!("{}", serde_json::to_string_pretty(&trace)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
