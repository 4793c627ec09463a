use std::time::Instant;

use lane_change::{run_scenario, Settings};

fn main() -> lane_change::Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let telemetry = run_scenario(&settings)?;
    let now = Instant::now();

    for (vehicle, ticks) in telemetry.completed_durations() {
        log::info!("Vehicle {:?} lane change took {} ticks", vehicle, ticks);
    }
    log::info!(
        "Total lane change scheduling time: {:.2} ms",
        1000.0 * telemetry.total_scheduling_time(now).as_secs_f64()
    );

    let report = telemetry.report(now);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
