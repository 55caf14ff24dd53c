use gesture_engine::config::replay::{self, write_json_file};
use gesture_engine::diagnostics::ControlReport;
use gesture_engine::{ControlMode, FrameInput, GestureEngine};
use std::env;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "gesture_replay".to_string());
    let config = replay::parse_cli(&program)?;

    let frames = replay::load_trace(&config.input_path)?;
    if frames.is_empty() {
        return Err(format!("Trace {} has no frames", config.input_path.display()));
    }

    let mut engine = GestureEngine::new(config.engine_params);
    let mut reports: Vec<ControlReport> = Vec::with_capacity(frames.len());
    for frame in frames {
        let report = engine.process_with_diagnostics(FrameInput {
            timestamp_ms: frame.timestamp_ms,
            left: frame.left,
            right: frame.right,
            targets: &frame.targets,
        });
        reports.push(report);
    }

    print_text_summary(&reports);

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &reports)?;
        println!("\nJSON report written to {}", path.display());
    }

    Ok(())
}

fn print_text_summary(reports: &[ControlReport]) {
    let total = reports.len();
    let mut by_mode = [0usize; 5];
    let mut selections = 0usize;
    let mut grabs = 0usize;
    let mut latency_sum = 0.0f64;
    for report in reports {
        let slot = match report.control.mode {
            ControlMode::Idle => 0,
            ControlMode::Acquiring => 1,
            ControlMode::Locked => 2,
            ControlMode::Grabbed => 3,
            ControlMode::Bimanual => 4,
        };
        by_mode[slot] += 1;
        if report.control.selection.is_some() {
            selections += 1;
        }
        if report.control.deltas.grab_started {
            grabs += 1;
        }
        latency_sum += report.control.latency_ms;
    }

    println!("frames: {total}");
    println!(
        "modes:  idle={} acquiring={} locked={} grabbed={} bimanual={}",
        by_mode[0], by_mode[1], by_mode[2], by_mode[3], by_mode[4]
    );
    println!("grabs started: {grabs}");
    println!("selections:    {selections}");
    println!(
        "mean latency:  {:.3} ms",
        latency_sum / total.max(1) as f64
    );

    if let Some(last) = reports.last() {
        println!(
            "final state:   mode={} hover={:?} confidence={:.2}",
            last.control.mode.as_str(),
            last.control.hover,
            last.control.confidence
        );
    }
}
