use std::path::PathBuf;

use anyhow::{bail, Result};
use droplet_builder::{run, PackagingRequest};

/// Placeholder recorded when the caller supplies no start command.
const DEFAULT_START_COMMAND: &str = "the start command";

fn usage() -> &'static str {
    "Usage:\n  droplet-builder --app-dir <dir> --output-droplet <file> --output-metadata <file> [--start-command <cmd>]"
}

fn main() -> Result<()> {
    let request = parse_args(std::env::args().skip(1))?;

    println!(
        "[droplet-builder] output metadata: {}",
        request.output_metadata.display()
    );
    run(&request)?;
    println!(
        "[droplet-builder] droplet written to '{}'",
        request.output_droplet.display()
    );
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<PackagingRequest> {
    let mut app_dir = None;
    let mut output_droplet = None;
    let mut output_metadata = None;
    let mut start_command = None;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--app-dir" => app_dir = Some(next_value(&mut args, "--app-dir")?),
            "--output-droplet" => {
                output_droplet = Some(next_value(&mut args, "--output-droplet")?)
            }
            "--output-metadata" => {
                output_metadata = Some(next_value(&mut args, "--output-metadata")?)
            }
            "--start-command" => start_command = Some(next_value(&mut args, "--start-command")?),
            other => bail!("unknown argument '{}'\n{}", other, usage()),
        }
    }

    let Some(app_dir) = app_dir else {
        bail!("--app-dir is required\n{}", usage());
    };
    let Some(output_droplet) = output_droplet else {
        bail!("--output-droplet is required\n{}", usage());
    };
    let Some(output_metadata) = output_metadata else {
        bail!("--output-metadata is required\n{}", usage());
    };

    Ok(PackagingRequest {
        app_dir: PathBuf::from(app_dir),
        output_droplet: PathBuf::from(output_droplet),
        output_metadata: PathBuf::from(output_metadata),
        start_command: start_command.unwrap_or_else(|| DEFAULT_START_COMMAND.to_string()),
    })
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    match args.next() {
        Some(value) => Ok(value),
        None => bail!("missing value for {}\n{}", flag, usage()),
    }
}
