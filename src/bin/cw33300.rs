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
use cw33300::core::config::EmulatorConfig;
use cw33300::core::error::Result;
use cw33300::core::system::System;
use log::{error, info};
use std::path::PathBuf;

/// CW33300 (PlayStation MIPS R3000A) CPU core runner
#[derive(Parser)]
#[command(name = "cw33300")]
#[command(about = "Run a PlayStation BIOS or PSX-EXE on the CW33300 core", long_about = None)]
struct Args {
    /// Path to PlayStation BIOS file (e.g., SCPH1001.BIN)
    #[arg(short = 'b', long)]
    bios: Option<PathBuf>,

    /// PSX-EXE to sideload
    #[arg(short = 'e', long)]
    exe: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short = 'f', long)]
    frames: Option<u32>,

    /// Write an instruction trace to this file
    #[arg(short = 't', long)]
    trace: Option<PathBuf>,

    /// Stop tracing after this many instructions (0 = unlimited)
    #[arg(long)]
    trace_limit: Option<usize>,

    /// Write a save state here when the run finishes
    #[arg(short = 's', long)]
    save_state: Option<PathBuf>,
}

/// Merge the config file, `.env`/environment and command line, in that order
fn build_config(args: &Args) -> Result<EmulatorConfig> {
    let mut config = match &args.config {
        Some(path) => EmulatorConfig::load(path)?,
        None => EmulatorConfig::default(),
    };

    config.apply_env();
    config.apply_overrides(args.bios.clone(), args.exe.clone());

    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    if args.trace.is_some() {
        config.trace.path = args.trace.clone();
    }
    if let Some(limit) = args.trace_limit {
        config.trace.limit = limit;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    let mut system = System::with_config(&config);

    if let Some(bios) = &config.bios {
        info!("Loading BIOS from: {}", bios.display());
        system.load_bios(bios)?;
        info!("BIOS loaded successfully");
    }

    system.reset();

    if let Some(exe) = &config.exe {
        info!("Loading PSX-EXE from: {}", exe.display());
        system.load_exe(exe)?;
    }

    if let Some(path) = &config.trace.path {
        system.enable_tracing(path, config.trace.limit)?;
    }

    info!("Running {} frames...", config.frames);
    let result = system.run_frames(config.frames);
    system.disable_tracing();
    result?;

    info!("Total cycles: {}", system.cycles());
    info!("Final PC: 0x{:08X}", system.pc());

    if let Some(path) = &args.save_state {
        let state = system.save_state("cw33300 command line run");
        state.save_to_file(path)?;
        info!("Save state written to {}", path.display());
    }

    Ok(())
}

fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("cw33300 v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
