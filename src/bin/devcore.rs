// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use clap::Parser;
use devcore::core::device::ScratchPool;
use devcore::core::machine::listing::{render_text, MachineListing};
use devcore::core::machine::{DeviceCatalog, Machine, MachineDescription};
use log::{error, info};
use std::path::PathBuf;

/// Machine device inspector
#[derive(Parser)]
#[command(name = "devcore")]
#[command(about = "Build, start and list the devices of a machine description", long_about = None)]
struct Args {
    /// Path to the machine description (.toml)
    machine: PathBuf,

    /// Number of machine resets to perform after startup
    #[arg(short = 'r', long, default_value = "0")]
    resets: usize,

    /// Print the device list as JSON
    #[arg(long)]
    json: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (RUST_LOG and friends)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    info!("devcore v{}", env!("CARGO_PKG_VERSION"));

    let description = MachineDescription::load(&args.machine).inspect_err(|e| {
        error!("Failed to load {}: {}", args.machine.display(), e);
    })?;

    let config = description
        .build(&DeviceCatalog::builtin())
        .inspect_err(|e| error!("Failed to configure machine {}: {}", description.name, e))?;

    let mut machine = Machine::new(config);

    let startup = match machine.start() {
        Ok(startup) => startup,
        Err(e) => {
            error!("Failed to start machine {}: {}", machine.name(), e);
            machine.exit();
            return Err(e.into());
        }
    };

    for _ in 0..args.resets {
        machine.reset();
    }

    if args.json {
        let listing = MachineListing::new(&machine, Some(startup));
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", render_text(&machine, &mut ScratchPool::new()));
        println!(
            "Started {} devices in {} sweep(s), {} reset(s)",
            startup.devices, startup.sweeps, args.resets
        );
    }

    machine.exit();
    Ok(())
}
