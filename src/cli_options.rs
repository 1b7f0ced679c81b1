/*
cli_options.rs

Copyright 2025 Skiddie contributors

This file is part of Skiddie.

Skiddie is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Skiddie is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Skiddie. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Process command-line options.
//!
//! These options are intended for developers tuning the difficulty presets. In command-line mode,
//! Skiddie generates puzzles and prints them in JSON format.
//!
//! # Examples
//!
//! List the games and their presets:
//!
//! ```
//! $ skiddie --ls
//! hash_cracker: easy medium hard
//! port_scanner: easy medium hard
//! ...
//! ```
//!
//! Generate three reproducible port scanner puzzles at the easy level, with their solution:
//!
//! ```
//! $ skiddie -g port_scanner -f easy -c 3 --seed 42 --solution
//! ```
//!
//! Levels can also be given by number, from 0 (easy) to 2 (hard):
//!
//! ```
//! $ skiddie -g hex_editor -f 2
//! ```

use clap::Parser;
use log::debug;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

use skiddie::difficulty::{Difficulty, DifficultyPresets, Parameters};
use skiddie::error::Error;
use skiddie::game::{self, Answer, GameKind, PuzzleInstance};
use skiddie::random::RandomSource;

/// Generate Skiddie puzzles for developers.
#[derive(Parser)]
#[command(about, long_about = None, version)]
struct Args {
    /// List the games and their difficulty presets
    #[arg(long, default_value_t = false)]
    ls: bool,

    /// Game to generate puzzles for
    #[arg(value_enum, short, long, group = "generate")]
    game: Option<GameKind>,

    /// Difficulty preset for the puzzles: a preset name, or a level number (0 to 2)
    #[arg(short = 'f', long, default_value = "medium", requires = "generate")]
    difficulty: String,

    /// Number of puzzles to generate
    #[arg(short, long, default_value_t = 1, requires = "generate")]
    count: usize,

    /// Seed of the first puzzle. The following puzzles use the next seeds
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with user-defined presets
    #[arg(long, value_name = "FILE")]
    presets: Option<PathBuf>,

    /// Include the solution in the output
    #[arg(long, default_value_t = false, requires = "generate")]
    solution: bool,

    /// Print some statistics after generating the puzzles
    #[arg(short, long, default_value_t = false, requires = "generate")]
    summary: bool,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// One generated puzzle, as printed on the standard output.
#[derive(Serialize)]
struct Output<'a> {
    seed: u64,
    puzzle: &'a PuzzleInstance,
    #[serde(skip_serializing_if = "Option::is_none")]
    solution: Option<Answer>,
}

/// Parse and process command-line options. Return the exit code of the program.
pub fn parse() -> u8 {
    let args: Args = Args::parse();

    if args.debug {
        // SAFETY: the program is still single-threaded at that point
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    env_logger::init();

    let presets: DifficultyPresets = match &args.presets {
        Some(path) => match DifficultyPresets::load(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        },
        None => DifficultyPresets::new(),
    };

    //
    // List the games and their presets
    //
    if args.ls {
        for kind in GameKind::ALL {
            println!("{kind}: {}", presets.preset_names(kind).join(" "));
        }
        return 0;
    }

    let Some(kind) = args.game else {
        eprintln!("Error: no game selected. Use --ls to list the available games.");
        return 1;
    };

    let preset: &str = Difficulty::from_level(&args.difficulty)
        .map_or(args.difficulty.as_str(), |d| d.name());
    let params: Parameters = match presets.resolve(kind, preset) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    debug!("Parameters for {kind}: {:?}", params.values());

    let mut total: f32 = 0.0;
    let mut max: f32 = 0.0;
    let mut verified: usize = 0;
    for i in 0..args.count {
        let mut rng: RandomSource = match args.seed {
            Some(s) => RandomSource::seeded(s.wrapping_add(i as u64)),
            None => RandomSource::from_entropy(),
        };
        debug!("Puzzle {i}: seed {}", rng.seed());

        let start: Instant = Instant::now();
        let ret: Result<PuzzleInstance, Error> = game::generate(kind, &params, &mut rng);
        let duration: f32 = start.elapsed().as_secs_f32();

        let puzzle: PuzzleInstance = match ret {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        };
        total += duration;
        if duration > max {
            max = duration;
        }

        let solution: Answer = puzzle.solution();
        if game::verify(&puzzle, &solution) {
            verified += 1;
        } else {
            eprintln!("Bug: the solution of puzzle {i} does not verify");
        }

        let output: Output = Output {
            seed: rng.seed(),
            puzzle: &puzzle,
            solution: args.solution.then_some(solution),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        }
    }

    // Print some stats
    if args.summary {
        println!(
            "
        total time = {}s
      average time = {}s
          max time = {}s
          verified = {}/{}",
            total,
            total / args.count.max(1) as f32,
            max,
            verified,
            args.count
        );
    }
    if verified == args.count { 0 } else { 1 }
}
