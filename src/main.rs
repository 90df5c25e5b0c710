// ========================================================================================
//
//                            THE COROLLA DEMO DRIVER
//
// ========================================================================================
//
// A thin command-line shell around the layout library. It deserializes a chart
// description from TOML, optionally evaluates the SCORE2 risk for an attached
// patient block, renders the declarative scene, and writes it out as JSON for
// whatever plotting backend sits downstream. The library itself never touches
// a file; everything file-shaped lives here.

use clap::Parser;
use corolla::layout::{self, Labels, LayoutOptions, Variable};
use corolla::score2::{self, RiskRegion, Sex};
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(
    name = "corolla",
    version,
    about = "Render a petal-chart scene description from a TOML chart file."
)]
struct Args {
    /// Path to the chart description (layout options, variables, labels).
    chart: PathBuf,

    /// Where to write the scene JSON; stdout when omitted.
    #[clap(long)]
    output: Option<PathBuf>,
}

/// The on-disk chart description.
#[derive(Debug, Deserialize)]
struct ChartSpec {
    #[serde(default)]
    layout: LayoutOptions,
    #[serde(default)]
    labels: Labels,
    variables: Vec<Variable>,
    patient: Option<Patient>,
}

/// Optional patient block; when present the SCORE2 risk is computed and
/// logged alongside the chart.
#[derive(Debug, Deserialize)]
struct Patient {
    risk_region: RiskRegion,
    sex: Sex,
    age: f64,
    smoking: bool,
    sbp: f64,
    total_cholesterol: f64,
    hdl_cholesterol: f64,
}

fn main() {
    env_logger::init();
    if let Err(error) = run(Args::parse()) {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let raw = fs::read_to_string(&args.chart)?;
    let spec: ChartSpec = toml::from_str(&raw)?;

    if let Some(patient) = &spec.patient {
        let risk = score2::ten_year_risk(
            patient.risk_region,
            patient.sex,
            patient.age,
            patient.smoking,
            patient.sbp,
            patient.total_cholesterol,
            patient.hdl_cholesterol,
        );
        info!("SCORE2 ten-year risk: {:.1}%", risk * 100.0);
    }

    let scene = layout::render(&spec.variables, &spec.labels, &spec.layout)?;
    info!(
        "scene ready: {} marks across {} variables",
        scene.marks.len(),
        spec.variables.len()
    );

    let json = serde_json::to_string_pretty(&scene)?;
    match &args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
