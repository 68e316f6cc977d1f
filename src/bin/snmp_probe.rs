//! CLI front-end: replay an offline `snmpwalk` capture through the engine
//! family and report the detected device's health as a Nagios-style exit
//! code. Grounded on `nssct.main`, trimmed to the mock backend (the live
//! SNMP transport is out of scope).

use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;

use snmp_probe_core::backend::mock::MockBackend;
use snmp_probe_core::engine::{BulkEngine, CachingEngine, SimpleEngine};
use snmp_probe_core::plugins::detect;
use snmp_probe_core::report::{Collector, Severity};
use snmp_probe_core::{Controller, Engine};

/// Run detection plugins against a recorded `snmpwalk` capture.
#[derive(Parser, Debug)]
#[command(name = "snmp-probe", version, about)]
struct Args {
    /// Path to a recorded `snmpwalk -On` capture to check against.
    #[arg(long)]
    mock: std::path::PathBuf,

    /// Use the bulk engine, batching up to N additional GETNEXT rows per
    /// GETBULK. Omit to use the simple engine.
    #[arg(long, value_name = "N")]
    bulk: Option<usize>,

    /// Coalesce identical concurrent queries through an object cache.
    #[arg(long)]
    cache: bool,
}

fn run(args: Args, collector: &Collector) -> Result<(), snmp_probe_core::Error> {
    let text = std::fs::read_to_string(&args.mock)
        .map_err(|e| snmp_probe_core::error::BackendError::new(format!("{}: {e}", args.mock.display())))?;
    let backend = MockBackend::from_text(&text)?;

    let engine: Rc<dyn Engine> = match (args.bulk, args.cache) {
        (Some(lookahead), true) => Rc::new(CachingEngine::new(BulkEngine::new(backend, lookahead))),
        (Some(lookahead), false) => Rc::new(BulkEngine::new(backend, lookahead)),
        (None, true) => Rc::new(CachingEngine::new(SimpleEngine::new(backend))),
        (None, false) => Rc::new(SimpleEngine::new(backend)),
    };

    let mut controller = Controller::from_rc(engine, collector.clone());
    let handle = controller.engine();
    let plugin_collector = collector.clone();
    controller.start_plugin("detect", async move {
        detect::detect(handle.as_ref(), &plugin_collector).await
    });
    controller.run();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let collector = Collector::new();

    if let Err(e) = run(args, &collector) {
        collector.add_alert(snmp_probe_core::Alert::new(Severity::Unknown, e.to_string()));
    }

    for alert in collector.alerts() {
        println!("{alert}");
    }

    match collector.state() {
        Severity::Ok => ExitCode::from(0),
        Severity::Warning => ExitCode::from(1),
        Severity::Critical => ExitCode::from(2),
        Severity::Unknown => ExitCode::from(3),
    }
}
