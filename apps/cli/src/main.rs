// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wireplan CLI - rule-based electrical auto-placement for CAD drawings.
//!
//! Reads a DXF drawing (or a DWG, with an external converter configured),
//! places lights, switches, fans and sockets, and writes an updated
//! drawing with the placements spliced in.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Parser;

use wireplan_placement::{process, PlacementOptions};

/// Env var holding the DWG->DXF converter command template. `{input}` and
/// `{output}` are substituted with the respective file paths.
const DWG_CONVERTER_ENV: &str = "WIREPLAN_DWG_CONVERTER";

/// Automatic electrical component placement for floor-plan drawings
#[derive(Parser, Debug)]
#[command(name = "wireplan")]
#[command(about = "Place lights, switches, fans and sockets in a CAD floor plan")]
struct Args {
    /// Input drawing (.dxf, or .dwg with a converter configured)
    input: PathBuf,

    /// Output path; defaults to <input>_electrical.dxf
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Lights per room
    #[arg(long, default_value_t = 1)]
    lights: usize,

    /// Switches per door
    #[arg(long, default_value_t = 1)]
    switches: usize,

    /// Fans per room
    #[arg(long, default_value_t = 0)]
    fans: usize,

    /// Skip socket placement
    #[arg(long)]
    no_sockets: bool,

    /// Socket spacing along walls in mm (default 3000)
    #[arg(long)]
    socket_spacing: Option<f64>,

    /// Print run statistics as JSON on stdout
    #[arg(long)]
    stats_json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,wireplan=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let input = prepare_input(&args.input)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&input));

    let options = PlacementOptions {
        lights_per_room: args.lights,
        switches_per_door: args.switches,
        fans_per_room: args.fans,
        sockets_enabled: !args.no_sockets,
        socket_spacing: args.socket_spacing,
    };

    let stats = process(&input, &output, &options)?;

    if args.stats_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "{}: {} rooms, {} placements ({} lights, {} switches, {} fans, {} sockets) -> {}",
            input.display(),
            stats.rooms_detected,
            stats.total_placements,
            stats.placements.lights,
            stats.placements.switches,
            stats.placements.fans,
            stats.placements.sockets,
            output.display(),
        );
    }

    Ok(())
}

/// Resolve the drawing to process. DWG inputs are converted to a sibling
/// DXF via the external converter command; DXF inputs pass through.
fn prepare_input(input: &Path) -> Result<PathBuf> {
    let is_dwg = input
        .extension()
        .map(|e| e.eq_ignore_ascii_case("dwg"))
        .unwrap_or(false);
    if !is_dwg {
        return Ok(input.to_path_buf());
    }

    let converted = input.with_extension("dxf");
    convert_dwg(input, &converted)?;
    Ok(converted)
}

fn convert_dwg(dwg: &Path, dxf: &Path) -> Result<()> {
    let template = match std::env::var(DWG_CONVERTER_ENV) {
        Ok(t) if !t.trim().is_empty() => t,
        _ => bail!(
            "{env} is not configured.\n\
             Set {env} to a DWG->DXF converter command, for example:\n\
             \x20 {env}=\"dwg2dxf {{input}} {{output}}\"\n\
             where 'dwg2dxf' is a small wrapper around ODAFileConverter.",
            env = DWG_CONVERTER_ENV
        ),
    };

    let cmd = template
        .replace("{input}", &dwg.display().to_string())
        .replace("{output}", &dxf.display().to_string());

    tracing::info!(command = %cmd, "converting DWG to DXF");
    let result = Command::new("sh")
        .arg("-c")
        .arg(&cmd)
        .output()
        .with_context(|| format!("failed to spawn converter: {cmd}"))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let stdout = String::from_utf8_lossy(&result.stdout);
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        bail!("DWG conversion failed: {}", detail.trim());
    }
    if !dxf.exists() {
        bail!("converter reported success but {} was not created", dxf.display());
    }
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "drawing".to_string());
    input.with_file_name(format!("{stem}_electrical.dxf"))
}
