//! Tabular export of simulation traces.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use mr_sim::{SimulationTrace, TraceRecord};
use serde::Serialize;

use crate::ResultsResult;

pub const CSV_COLUMNS: [&str; 12] = [
    "time_s",
    "power",
    "demand",
    "drum_angle_deg",
    "drum_rate_deg_s",
    "rho_drum",
    "rho_feedback",
    "rho_total",
    "error",
    "command",
    "t_fuel_k",
    "t_mod_k",
];

/// One CSV row, in `CSV_COLUMNS` order.
#[derive(Serialize)]
struct CsvRow {
    time_s: f64,
    power: f64,
    demand: f64,
    drum_angle_deg: f64,
    drum_rate_deg_s: f64,
    rho_drum: f64,
    rho_feedback: f64,
    rho_total: f64,
    error: f64,
    command: f64,
    t_fuel_k: f64,
    t_mod_k: f64,
}

impl From<&TraceRecord> for CsvRow {
    fn from(r: &TraceRecord) -> Self {
        Self {
            time_s: r.time_s,
            power: r.plant.power,
            demand: r.demand,
            drum_angle_deg: r.drum.angle_deg,
            drum_rate_deg_s: r.drum.rate_deg_s,
            rho_drum: r.rho_drum,
            rho_feedback: r.rho_feedback,
            rho_total: r.rho_total,
            error: r.error,
            command: r.command,
            t_fuel_k: r.plant.fuel_temp_k,
            t_mod_k: r.plant.moderator_temp_k,
        }
    }
}

/// Write the header and one row per record to `out`, returning it flushed.
///
/// The header is written explicitly so an empty trace still has one.
pub fn write_trace<W: Write>(out: W, trace: &SimulationTrace) -> ResultsResult<W> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(CSV_COLUMNS)?;
    for r in trace {
        wtr.serialize(CsvRow::from(r))?;
    }
    wtr.flush()?;
    wtr.into_inner().map_err(|e| e.into_error().into())
}

pub fn trace_to_csv(trace: &SimulationTrace) -> ResultsResult<String> {
    let bytes = write_trace(Vec::new(), trace)?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_csv(path: &Path, trace: &SimulationTrace) -> ResultsResult<()> {
    write_trace(File::create(path)?, trace)?;
    Ok(())
}
