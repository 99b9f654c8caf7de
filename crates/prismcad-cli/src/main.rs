//! prismcad CLI - extrude 2D drawings into STEP solids
//!
//! Converts DXF outlines into extruded STEP solids, and STEP to STL and back.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prismcad_kernel::{
    analyze_loops, dxf_to_step, step_to_stl, stl_to_step, ConversionReport, ConvertSettings,
    NativeKernel,
};
use prismcad_sketch::SamplePoint;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prismcad")]
#[command(about = "Extrude 2D drawings into STEP solids and convert STEP/STL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extrude the closed outlines of a DXF drawing into a STEP file
    Dxf2step {
        /// Input .dxf file
        input: PathBuf,
        /// Output STEP file (default: input with a .step extension)
        output: Option<PathBuf>,
        /// Height of outer outlines; islands get 1.5 times this
        extrude_height: Option<f64>,
        /// Add a plate under the whole drawing
        #[arg(long)]
        base_plate: bool,
        /// Factor applied to drawing coordinates (e.g. 10 for cm to mm)
        #[arg(long)]
        unit_scale: Option<f64>,
        /// Point of each outline tested for nesting (first-vertex or centroid)
        #[arg(long)]
        sample: Option<SamplePoint>,
        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Tessellate a STEP file into a binary STL
    Step2stl {
        /// Input STEP file (.step or .stp)
        input: PathBuf,
        /// Output STL file (default: input with a .stl extension)
        output: Option<PathBuf>,
        /// Uniform scale applied before export (default: 0.001, mm to m)
        scale_factor: Option<f64>,
    },
    /// Rebuild a faceted solid from an STL file and write it as STEP
    Stl2step {
        /// Input STL file (ASCII or binary)
        input: PathBuf,
        /// Output STEP file (default: input with a .step extension)
        output: Option<PathBuf>,
        /// Vertex weld distance (default: 0.1)
        #[arg(short, long)]
        tolerance: Option<f64>,
    },
    /// List the outlines of a DXF drawing with their nesting and heights
    Loops {
        /// Input .dxf file
        input: PathBuf,
        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    run(Cli::parse())
}

/// Filter from `RUST_LOG` directives; `warn` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Dxf2step {
            input,
            output,
            extrude_height,
            base_plate,
            unit_scale,
            sample,
            config,
        } => {
            let mut settings = load_settings(config.as_deref())?;
            if let Some(height) = extrude_height {
                settings.extrude.base_height = height;
            }
            if base_plate {
                settings.extrude.base_plate = true;
            }
            if let Some(scale) = unit_scale {
                settings.import.unit_scale = scale;
            }
            if let Some(sample) = sample {
                settings.classify.sample = sample;
            }
            settings.validate()?;
            let output = output.unwrap_or_else(|| derive_output(&input, "step"));
            convert_dxf(&input, &output, &settings)?;
        }
        Commands::Step2stl {
            input,
            output,
            scale_factor,
        } => {
            let mut settings = ConvertSettings::default();
            if let Some(scale) = scale_factor {
                settings.mesh.scale_factor = scale;
            }
            settings.validate()?;
            let output = output.unwrap_or_else(|| derive_output(&input, "stl"));
            println!("Input:  {}", input.display());
            println!("Output: {}", output.display());
            println!("Scale:  {}", settings.mesh.scale_factor);
            let report = step_to_stl(
                &NativeKernel::new(&settings),
                &input,
                &output,
                settings.mesh.scale_factor,
            )
            .with_context(|| format!("Failed to convert {}", input.display()))?;
            println!(
                "Exported {} solid(s), {} triangles to {}",
                report.solids,
                report.triangles,
                output.display()
            );
        }
        Commands::Stl2step {
            input,
            output,
            tolerance,
        } => {
            let mut settings = ConvertSettings::default();
            if let Some(tolerance) = tolerance {
                settings.mesh.weld_tolerance = tolerance;
            }
            settings.validate()?;
            let output = output.unwrap_or_else(|| derive_output(&input, "step"));
            println!("Input:  {}", input.display());
            println!("Output: {}", output.display());
            let report = stl_to_step(
                &NativeKernel::new(&settings),
                &input,
                &output,
                settings.mesh.weld_tolerance,
            )
            .with_context(|| format!("Failed to convert {}", input.display()))?;
            println!(
                "Exported {} faces from {} triangles to {}",
                report.faces,
                report.triangles,
                output.display()
            );
        }
        Commands::Loops {
            input,
            config,
            json,
        } => {
            let settings = load_settings(config.as_deref())?;
            let report = analyze_loops(&NativeKernel::new(&settings), &input, &settings)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_loops(&report);
            }
        }
    }

    Ok(())
}

fn load_settings(config: Option<&Path>) -> Result<ConvertSettings> {
    match config {
        Some(path) => ConvertSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(ConvertSettings::default()),
    }
}

/// `input` with its extension replaced by `extension`.
fn derive_output(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

fn convert_dxf(input: &Path, output: &Path, settings: &ConvertSettings) -> Result<()> {
    println!("Input:  {}", input.display());
    println!("Output: {}", output.display());
    println!("Extrude height: {}", settings.extrude.base_height);

    let report = dxf_to_step(&NativeKernel::new(settings), input, output, settings)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    for d in &report.diagnostics {
        println!("  skipped {d}");
    }
    println!(
        "Exported {} solid(s) from {} edges to {}",
        report.solids.len(),
        report.edges,
        output.display()
    );
    Ok(())
}

fn print_loops(report: &ConversionReport) {
    println!("{} edges, {} wires", report.edges, report.loops.len());
    for l in &report.loops {
        let area = l.area.map_or("-".to_string(), |a| format!("{a:.3}"));
        let depth = l.depth.map_or("-".to_string(), |d| d.to_string());
        let height = l.height.map_or("-".to_string(), |h| format!("{h}"));
        println!(
            "  Wire{:<4} {:>3} edges  {:<9} area {:>12}  depth {:>2}  height {}",
            l.index, l.edges, l.status, area, depth, height
        );
    }
    for d in &report.diagnostics {
        println!("  skipped {d}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxf::entities::{Entity, EntityType, Line};
    use dxf::enums::AcadVersion;
    use dxf::{Drawing, Point};

    fn write_square(path: &Path, size: f64) {
        let mut drawing = Drawing::new();
        drawing.header.version = AcadVersion::R2000;
        let p = [(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)];
        for i in 0..4 {
            let (a, b) = (p[i], p[(i + 1) % 4]);
            drawing.add_entity(Entity::new(EntityType::Line(Line::new(
                Point::new(a.0, a.1, 0.0),
                Point::new(b.0, b.1, 0.0),
            ))));
        }
        drawing.save_file(path).unwrap();
    }

    #[test]
    fn test_log_filter_follows_rust_log() {
        use tracing::level_filters::LevelFilter;

        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("prismcad_kernel=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_derive_output() {
        assert_eq!(
            derive_output(Path::new("parts/plate.dxf"), "step"),
            PathBuf::from("parts/plate.step")
        );
        assert_eq!(
            derive_output(Path::new("model.step"), "stl"),
            PathBuf::from("model.stl")
        );
    }

    #[test]
    fn test_parse_dxf2step_positionals() {
        let cli = Cli::try_parse_from([
            "prismcad",
            "dxf2step",
            "in.dxf",
            "out.step",
            "2.5",
            "--base-plate",
            "--sample",
            "centroid",
        ])
        .unwrap();
        match cli.command {
            Commands::Dxf2step {
                output,
                extrude_height,
                base_plate,
                sample,
                ..
            } => {
                assert_eq!(output, Some(PathBuf::from("out.step")));
                assert_eq!(extrude_height, Some(2.5));
                assert!(base_plate);
                assert_eq!(sample, Some(SamplePoint::Centroid));
            }
            _ => panic!("expected dxf2step"),
        }
    }

    #[test]
    fn test_missing_input_is_a_usage_error() {
        assert!(Cli::try_parse_from(["prismcad", "dxf2step"]).is_err());
        assert!(Cli::try_parse_from(["prismcad", "dxf2step", "a.dxf", "--sample", "middle"]).is_err());
    }

    #[test]
    fn test_dxf2step_writes_derived_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("square.dxf");
        write_square(&input, 10.0);

        let cli = Cli::try_parse_from(["prismcad", "dxf2step", input.to_str().unwrap()]).unwrap();
        run(cli).unwrap();
        assert!(dir.path().join("square.step").exists());
    }

    #[test]
    fn test_dxf2step_fails_without_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.dxf");
        let mut drawing = Drawing::new();
        drawing.header.version = AcadVersion::R2000;
        drawing.save_file(&input).unwrap();

        let cli = Cli::try_parse_from(["prismcad", "dxf2step", input.to_str().unwrap()]).unwrap();
        assert!(run(cli).is_err());
        assert!(!dir.path().join("empty.step").exists());
    }

    #[test]
    fn test_config_file_and_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("prismcad.toml");
        std::fs::write(&config, "[extrude]\nbase_height = 3.0\nbase_plate = true\n").unwrap();
        let settings = load_settings(Some(&config)).unwrap();
        assert_eq!(settings.extrude.base_height, 3.0);
        assert!(settings.extrude.base_plate);

        let input = dir.path().join("square.dxf");
        write_square(&input, 10.0);
        let cli = Cli::try_parse_from([
            "prismcad",
            "dxf2step",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--unit-scale",
            "0",
        ])
        .unwrap();
        assert!(run(cli).is_err());
    }

    #[test]
    fn test_loops_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("square.dxf");
        write_square(&input, 4.0);
        let cli = Cli::try_parse_from(["prismcad", "loops", input.to_str().unwrap(), "--json"])
            .unwrap();
        run(cli).unwrap();
    }
}
