//! Dataset Preparation Tool
//!
//! Configuration-driven tool that turns a recorded `.npz` bundle (a single
//! recording or a collection) into normalized, windowed training tensors.
//!
//! ## Output Format
//!
//! - **Windows**: `{name}_train_{tensor}.npy`, `{name}_test_{tensor}.npy`
//! - **Metadata**: `{name}_train_metadata.json`, `{name}_test_metadata.json`
//! - **Normalization**: `{name}_norm.json`
//! - **Preprocessed data**: `{name}_train.npz`, `{name}_test.npz`
//!
//! # Usage
//!
//! ```bash
//! # Prepare from TOML config
//! cargo run --release --bin prepare_dataset -- --config run.toml data.npz out/
//!
//! # Generate sample config
//! cargo run --release --bin prepare_dataset -- --generate-config run.toml
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) to see per-stage progress.

use std::path::Path;
use sysid_data::config::ExperimentMetadata;
use sysid_data::prelude::*;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--config" => {
            if args.len() < 5 {
                eprintln!("Error: --config requires <config.toml> <input.npz> <output_dir>");
                std::process::exit(1);
            }
            if let Err(e) = run_from_config(&args[2], &args[3], &args[4]) {
                eprintln!("❌ Preparation failed: {e}");
                std::process::exit(1);
            }
        }
        "--generate-config" => {
            if args.len() < 3 {
                eprintln!("Error: --generate-config requires a path argument");
                std::process::exit(1);
            }
            generate_sample_config(&args[2]);
        }
        "--help" | "-h" => {
            print_usage(&args[0]);
        }
        _ => {
            eprintln!("Unknown argument: {}", args[1]);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        r#"
Dataset Preparation Tool

Usage:
    {program} --config <config.toml> <input.npz> <output_dir>   Prepare a dataset
    {program} --generate-config <path>                          Generate sample config file
    {program} --help                                            Show this help

Examples:
    {program} --generate-config configs/silverbox.toml
    {program} --config configs/silverbox.toml data/silverbox.npz exports/silverbox
"#
    );
}

fn generate_sample_config(path: &str) {
    let sample_config = DataConfig::default().with_metadata(ExperimentMetadata {
        name: "example".to_string(),
        description: Some("Io windows, 25% test split, normalized".to_string()),
        created_at: Some(chrono::Utc::now().to_rfc3339()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        tags: None,
    });

    match sample_config.save_toml(path) {
        Ok(()) => {
            println!("✅ Generated sample config: {path}");
            println!("\nEdit the following fields before running:");
            println!("  - window.na / window.nb / window.nf: history and horizon lengths");
            println!("  - window.format: io | hist_future | state_space | encoder");
            println!("  - split.test_fraction: share of samples held out");
        }
        Err(e) => {
            eprintln!("Error generating config: {e}");
            std::process::exit(1);
        }
    }
}

fn run_from_config(config_path: &str, input: &str, output_dir: &str) -> Result<()> {
    let config = DataConfig::load_toml(config_path)?;
    println!("✅ Loaded configuration: {config_path}");
    println!(
        "   window: {} (na={}, nb={}, nf={}), test_fraction={}, normalize={}",
        config.window.format,
        config.window.na,
        config.window.nb,
        config.window.nf,
        config.split.test_fraction,
        config.preprocess.normalize
    );

    let name = config
        .metadata
        .as_ref()
        .map(|m| m.name.clone())
        .or_else(|| {
            Path::new(input)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "dataset".to_string());

    let pipeline = DataPipeline::from_config(config)?;

    match load_system_data(input)? {
        Loaded::Single(data) => {
            println!("✅ Loaded {data}");
            let output = pipeline.process(&data)?;
            finish(&output, output_dir, &name, pipeline.config())
        }
        Loaded::List(list) => {
            println!("✅ Loaded {list}");
            let output = pipeline.process(&list)?;
            finish(&output, output_dir, &name, pipeline.config())
        }
    }
}

fn finish<D: WindowableSequence>(
    output: &PipelineOutput<D>,
    output_dir: &str,
    name: &str,
    config: &DataConfig,
) -> Result<()> {
    if !output.validation.is_valid() {
        print!("{}", output.validation);
    }
    output.export(output_dir, name, config)?;

    println!();
    println!("✅ Exported to {output_dir}");
    println!("   {}", output.normalizer);
    println!(
        "   train: {} windows, test: {} windows",
        output.train_windows.n_windows(),
        output.test_windows.n_windows()
    );
    Ok(())
}
