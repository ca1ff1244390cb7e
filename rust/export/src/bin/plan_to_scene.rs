// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Convert a saved floor plan into an export archive
//!
//! Reads a plan JSON file, composes the 3D scene, and writes a ZIP
//! containing the GLB model and the door/window schedule.
//!
//! Usage:
//!   plan-to-scene <plan.json> [options]

use std::env;
use std::fs;
use std::path::Path;

use plan3d_export::{export_plan, ExportOptions};
use plan3d_model::PlanState;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct CliArgs {
    plan_path: String,
    output_path: String,
    options: ExportOptions,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        plan_path: args[0].clone(),
        output_path: String::from("scene.zip"),
        options: ExportOptions::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                cli.output_path = args
                    .get(i)
                    .ok_or_else(|| String::from("--output requires a value"))?
                    .clone();
            }
            "--wall-height" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| String::from("--wall-height requires a value"))?;
                cli.options.scene.wall_height = value
                    .parse()
                    .map_err(|_| format!("Invalid wall height: {}", value))?;
            }
            "--roof" => {
                cli.options.scene.show_roof = true;
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(cli)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let cli = parse_args(&args[1..]).unwrap_or_else(|message| {
        eprintln!("Error: {}", message);
        print_usage();
        std::process::exit(1);
    });

    println!("=== Floor Plan to 3D Scene Exporter ===");
    println!();

    // Step 1: Load plan
    println!("[1/3] Loading plan: {}", cli.plan_path);
    let json = fs::read_to_string(&cli.plan_path).unwrap_or_else(|e| {
        eprintln!("Error: Cannot read plan '{}': {}", cli.plan_path, e);
        std::process::exit(1);
    });
    let state: PlanState = serde_json::from_str(&json).unwrap_or_else(|e| {
        eprintln!("Error: Cannot parse plan '{}': {}", cli.plan_path, e);
        std::process::exit(1);
    });
    println!(
        "  Plan: {} walls, {} openings, {} items",
        state.lines.len(),
        state.shapes.len(),
        state.furniture_items.len() + state.ceiling_items.len() + state.wall_items.len()
    );

    // Step 2: Compose and serialize
    println!("[2/3] Composing scene and building archive...");
    println!(
        "  Wall height: {} units, roof: {}",
        cli.options.scene.wall_height,
        if cli.options.scene.show_roof {
            "yes"
        } else {
            "no"
        }
    );
    let archive = export_plan(&state, &cli.options).unwrap_or_else(|e| {
        eprintln!("Error: Export failed: {}", e);
        std::process::exit(1);
    });

    // Step 3: Write output
    println!("[3/3] Writing output: {}", cli.output_path);
    fs::write(Path::new(&cli.output_path), &archive).unwrap_or_else(|e| {
        eprintln!("Error: Cannot write '{}': {}", cli.output_path, e);
        std::process::exit(1);
    });
    println!("  Archive size: {} bytes", archive.len());
    println!();
    println!("Done.");
}

fn print_usage() {
    println!("plan-to-scene: convert a floor plan JSON file into a 3D scene archive");
    println!();
    println!("Usage:");
    println!("  plan-to-scene <plan.json> [options]");
    println!();
    println!("Options:");
    println!("  --output <file>      Output archive path (default: scene.zip)");
    println!("  --wall-height <h>    Wall height in plan units (default: 240)");
    println!("  --roof               Generate a roof slab above the walls");
    println!("  -h, --help           Show this help");
}
