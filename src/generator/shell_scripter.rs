/*
shell_scripter.rs

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

//! Shell scripter: type a random shell command line exactly as shown.
//!
//! Command lines are built from a catalog of common commands, with their required arguments, a
//! random selection of options, input and output redirection, and pipes.

use log::debug;
use serde::Serialize;
use std::fmt;

use super::{MAX_ATTEMPTS, regenerate};
use crate::difficulty::{BuiltinPreset, Difficulty, Domain, GameSchema, ParamSpec, ParamValue, Parameters};
use crate::error::{ConfigurationError, Error};
use crate::game::{GameKind, Puzzle};
use crate::random::RandomSource;

/// Highest number of commands chained with pipes, after the first one.
const MAX_PIPELINE_DEPTH: usize = 3;

/// Longest command line, in characters.
const MAX_COMMAND_LENGTH: usize = 200;

const DIR_PATHS: &[&str] = &[
    "~/Documents", "/home/lostatc/Documents", "~/Downloads", "~/Music", "~/Pictures", "~/Videos",
    ".", "/", "/dev", "/dev/mapper", "/etc", "/etc/sysconfig", "/home/lostatc", "/mnt", "/proc",
    "/run", "/sys", "/tmp", "/usr/share", "/usr/local/share", "/var", "/var/log",
];

const FILE_GLOB_PATTERNS: &[&str] = &[
    "\".*\"", "\"*.png\"", "\"*.flac\"", "\"*.log\"", "\"*.pid\"", "\"*.rst\"", "\"*.tar.*\"",
    "\"*.py[cod]\"", "\"*.od[tspgf]\"", "\"*.doc[xm]\"", "\"*.xls[xm]\"",
];

const DELIMITERS: &[&str] = &["\" \"", "\",\"", "\"-\"", "\"_\"", "\"|\"", "\":\""];

const INPUT_FILE_NAMES: &[&str] = &[
    "input.txt", "input_file.txt", "in.txt", "origin.txt", "source.txt", "src.txt", "data.txt",
    "beginning.txt", "start.txt", "info.txt",
];

const OUTPUT_FILE_NAMES: &[&str] = &[
    "output.txt", "output_file.txt", "out.txt", "result.txt", "destination.txt", "dest.txt",
    "file.txt", "end.txt", "finish.txt", "dump.txt",
];

const SMALL_NUMBERS: &[&str] = &["1", "2", "3", "4", "5"];
const MINUTES: &[&str] = &["1", "5", "10", "15", "30", "60", "120"];
const SIZES: &[&str] = &["64", "128", "256", "512", "1K", "4K", "1M"];
const LINES: &[&str] = &["1", "5", "15", "\"-15\"", "20", "\"-20\""];
const COLORS: &[&str] = &["never", "always", "auto"];

/// An argument of a command: one of the names, followed by one of the values.
///
/// Either list can be empty.
struct Argument {
    names: &'static [&'static str],
    values: &'static [&'static str],
}

impl Argument {
    const fn new(names: &'static [&'static str], values: &'static [&'static str]) -> Self {
        Self { names, values }
    }

    /// Render the argument with a random name and value.
    fn random(&self, rng: &mut RandomSource) -> String {
        [self.names, self.values]
            .iter()
            .filter_map(|choices| rng.choice(choices).copied())
            .collect::<Vec<&str>>()
            .join(" ")
    }
}

/// A command of the catalog.
struct Command {
    name: &'static str,

    /// Required arguments, in order.
    positional: &'static [Argument],

    /// Options, chosen at random.
    optional: &'static [Argument],

    /// The command reads standard input, from a file or a pipe.
    redirect_input: bool,

    /// The command writes to standard output, which can go to a file or a pipe.
    redirect_output: bool,
}

const COMMANDS: &[Command] = &[
    Command {
        name: "grep",
        positional: &[Argument::new(
            &["-e", "--regexp"],
            &[
                "\"^[0-9]+$\"", "\"[KMGT](B|iB)\"", "\"[a-f0-9]{6}\"", "\"^https?://\"",
                "\"([r-][w-][x-]){3}\"", "Error", "Exception", "Warning", "NULL", "true",
            ],
        )],
        optional: &[
            Argument::new(&["-E", "--extended-regexp", "-F", "--fixed-strings"], &[]),
            Argument::new(&["-i", "--ignore-case"], &[]),
            Argument::new(&["-v", "--invert-match"], &[]),
            Argument::new(&["-x", "--line-regexp"], &[]),
            Argument::new(&["-c", "--count"], &[]),
            Argument::new(&["--color"], COLORS),
            Argument::new(&["-m", "--max-count"], SMALL_NUMBERS),
            Argument::new(&["-A", "--after-context"], SMALL_NUMBERS),
            Argument::new(&["-B", "--before-context"], SMALL_NUMBERS),
        ],
        redirect_input: true,
        redirect_output: true,
    },
    Command {
        name: "find",
        positional: &[Argument::new(&[], DIR_PATHS)],
        optional: &[
            Argument::new(&["-depth"], &[]),
            Argument::new(&["-maxdepth"], SMALL_NUMBERS),
            Argument::new(&["-mindepth"], SMALL_NUMBERS),
            Argument::new(&["-amin"], MINUTES),
            Argument::new(&["-mmin"], MINUTES),
            Argument::new(&["-empty"], &[]),
            Argument::new(&["-group"], &["root", "lostatc", "wheel", "nobody", "users"]),
            Argument::new(&["-name"], FILE_GLOB_PATTERNS),
            Argument::new(&["-perm"], &["\"/a+w\"", "\"-g+w\"", "\"u=w\"", "\"-220\""]),
            Argument::new(&["-size"], &["50K", "100K", "1M", "50M", "1G"]),
            Argument::new(&["-print"], &[]),
        ],
        redirect_input: false,
        redirect_output: true,
    },
    Command {
        name: "ls",
        positional: &[Argument::new(&[], DIR_PATHS)],
        optional: &[
            Argument::new(&["-a", "--all"], &[]),
            Argument::new(&["-d", "--directory"], &[]),
            Argument::new(&["--hide"], FILE_GLOB_PATTERNS),
            Argument::new(&["-l"], &[]),
            Argument::new(&["-r", "--reverse"], &[]),
            Argument::new(&["-R", "--recursive"], &[]),
            Argument::new(&["--color"], COLORS),
            Argument::new(&["--format"], &["across", "commas", "long", "single-column", "vertical"]),
        ],
        redirect_input: false,
        redirect_output: true,
    },
    Command {
        name: "cut",
        positional: &[],
        optional: &[
            Argument::new(&["-b", "--bytes"], &["\"-4\"", "\"-8\"", "\"1-\"", "\"2-4\""]),
            Argument::new(&["-c", "--characters"], &["1", "\"-10\"", "\"1-5\"", "\"5-\""]),
            Argument::new(&["-f", "--fields"], &["1", "2", "3", "\"2-\"", "\"-3\"", "\"1-2\""]),
            Argument::new(&["-d", "--delimiter"], DELIMITERS),
            Argument::new(&["--complement"], &[]),
            Argument::new(&["-s", "--only-delimited"], &[]),
        ],
        redirect_input: true,
        redirect_output: true,
    },
    Command {
        name: "sort",
        positional: &[],
        optional: &[
            Argument::new(&["-d", "--dictionary-order"], &[]),
            Argument::new(&["-f", "--ignore-case"], &[]),
            Argument::new(&["-n", "--numeric-sort"], &[]),
            Argument::new(&["-r", "--reverse"], &[]),
            Argument::new(&["--sort"], &["general-numeric", "human-numeric", "month", "version"]),
            Argument::new(&["-t", "--field-separator"], DELIMITERS),
            Argument::new(&["-k", "--key"], &["1", "2", "1,2", "2,3", "1.2"]),
        ],
        redirect_input: true,
        redirect_output: true,
    },
    Command {
        name: "head",
        positional: &[],
        optional: &[
            Argument::new(&["-c", "--bytes"], SIZES),
            Argument::new(&["-n", "--lines"], LINES),
            Argument::new(&["-q", "--quiet"], &[]),
            Argument::new(&["-z", "--zero-terminated"], &[]),
        ],
        redirect_input: true,
        redirect_output: true,
    },
    Command {
        name: "tail",
        positional: &[],
        optional: &[
            Argument::new(&["-c", "--bytes"], SIZES),
            Argument::new(&["-f", "--follow"], &["name", "descriptor"]),
            Argument::new(&["-n", "--lines"], LINES),
            Argument::new(&["--pid"], &["451", "1984", "24601", "3141"]),
            Argument::new(&["--retry"], &[]),
            Argument::new(&["-s", "--sleep-interval"], &["0.1", "0.5", "2", "10"]),
        ],
        redirect_input: true,
        redirect_output: true,
    },
    Command {
        name: "cat",
        positional: &[Argument::new(&[], INPUT_FILE_NAMES)],
        optional: &[
            Argument::new(&["-A", "--show-all"], &[]),
            Argument::new(&["-E", "--show-ends"], &[]),
            Argument::new(&["-n", "--number"], &[]),
            Argument::new(&["-s", "--squeeze-blank"], &[]),
            Argument::new(&["-T", "--show-tabs"], &[]),
        ],
        redirect_input: false,
        redirect_output: true,
    },
    Command {
        name: "diff",
        positional: &[
            Argument::new(&[], INPUT_FILE_NAMES),
            Argument::new(&[], OUTPUT_FILE_NAMES),
        ],
        optional: &[
            Argument::new(&["-q", "--brief"], &[]),
            Argument::new(&["-u", "-U", "--unified"], SMALL_NUMBERS),
            Argument::new(&["-y", "--side-by-side"], &[]),
            Argument::new(&["-W", "--width"], &["72", "80", "120"]),
            Argument::new(&["-i", "--ignore-case"], &[]),
            Argument::new(&["--color"], COLORS),
        ],
        redirect_input: false,
        redirect_output: true,
    },
    Command {
        name: "tee",
        positional: &[Argument::new(&[], OUTPUT_FILE_NAMES)],
        optional: &[
            Argument::new(&["-a", "--append"], &[]),
            Argument::new(&["-i", "--ignore-interrupts"], &[]),
            Argument::new(&["--output-error"], &["warn", "warn-nopipe", "exit", "exit-nopipe"]),
        ],
        redirect_input: true,
        redirect_output: true,
    },
    Command {
        name: "uniq",
        positional: &[],
        optional: &[
            Argument::new(&["-c", "--count"], &[]),
            Argument::new(&["-d", "--repeated"], &[]),
            Argument::new(&["-f", "--skip-fields"], SMALL_NUMBERS),
            Argument::new(&["-i", "--ignore-case"], &[]),
            Argument::new(&["-u", "--unique"], &[]),
            Argument::new(&["-w", "--check-chars"], &["1", "5", "10", "20"]),
        ],
        redirect_input: true,
        redirect_output: true,
    },
    Command {
        name: "cp",
        positional: &[
            Argument::new(&[], INPUT_FILE_NAMES),
            Argument::new(&[], OUTPUT_FILE_NAMES),
        ],
        optional: &[
            Argument::new(&["-a", "--archive"], &[]),
            Argument::new(&["--backup"], &["none", "numbered", "existing", "simple"]),
            Argument::new(&["-f", "--force"], &[]),
            Argument::new(&["-n", "--no-clobber"], &[]),
            Argument::new(&["--preserve"], &["mode", "ownership", "timestamps", "all"]),
            Argument::new(&["-S", "--suffix"], &["\".bak\"", "\".old\"", "\".orig\""]),
            Argument::new(&["-u", "--update"], &[]),
        ],
        redirect_input: false,
        redirect_output: false,
    },
    Command {
        name: "rm",
        positional: &[Argument::new(&[], INPUT_FILE_NAMES)],
        optional: &[
            Argument::new(&["-f", "--force"], &[]),
            Argument::new(&["--interactive"], &["never", "once", "always"]),
            Argument::new(&["--one-file-system"], &[]),
            Argument::new(&["-r", "-R", "--recursive"], &[]),
        ],
        redirect_input: false,
        redirect_output: false,
    },
];

pub const SCHEMA: GameSchema = GameSchema {
    parameters: &[
        ParamSpec {
            name: "min_args",
            domain: Domain::Int { min: 0, max: 8 },
            description: "Lowest number of options per command",
        },
        ParamSpec {
            name: "max_args",
            domain: Domain::Int { min: 0, max: 8 },
            description: "Highest number of options per command",
        },
        ParamSpec {
            name: "redirect_probability",
            domain: Domain::Ratio { min: 0.0, max: 1.0 },
            description: "Probability that a command redirects its output",
        },
        ParamSpec {
            name: "pipe_probability",
            domain: Domain::Ratio { min: 0.0, max: 1.0 },
            description: "Probability that a redirection uses a pipe instead of a file",
        },
    ],
    presets: &[
        BuiltinPreset {
            difficulty: Difficulty::Easy,
            values: &[
                ("min_args", ParamValue::Int(0)),
                ("max_args", ParamValue::Int(1)),
                ("redirect_probability", ParamValue::Ratio(0.2)),
                ("pipe_probability", ParamValue::Ratio(0.3)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Medium,
            values: &[
                ("min_args", ParamValue::Int(1)),
                ("max_args", ParamValue::Int(3)),
                ("redirect_probability", ParamValue::Ratio(0.5)),
                ("pipe_probability", ParamValue::Ratio(0.5)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Hard,
            values: &[
                ("min_args", ParamValue::Int(2)),
                ("max_args", ParamValue::Int(5)),
                ("redirect_probability", ParamValue::Ratio(0.8)),
                ("pipe_probability", ParamValue::Ratio(0.6)),
            ],
        },
    ],
};

/// Position of a command in a pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Role {
    /// Standalone command.
    Alone,

    /// Left of a pipe: its output is already redirected.
    Producer,

    /// Right of a pipe: its input is already redirected.
    Consumer,
}

/// Random command line builder.
struct CommandGenerator {
    min_args: i64,
    max_args: i64,
    redirect_probability: f64,
    pipe_probability: f64,
}

impl CommandGenerator {
    /// Build a command line for a command that fits the role.
    ///
    /// `depth` is the number of pipes already around the command.
    fn random(&self, role: Role, depth: usize, rng: &mut RandomSource) -> String {
        let available: Vec<&Command> = COMMANDS
            .iter()
            .filter(|c| match role {
                Role::Alone => true,
                Role::Producer => c.redirect_output,
                Role::Consumer => c.redirect_input,
            })
            .collect();
        let Some(command) = rng.choice(&available).copied() else {
            return String::new();
        };

        // Required arguments, then a random selection of options
        let mut options: Vec<&Argument> = command.optional.iter().collect();
        rng.shuffle(&mut options);
        let count: usize = rng.next_int(self.min_args, self.max_args) as usize;

        let mut line: String = command.name.to_string();
        for argument in command.positional.iter().chain(options.into_iter().take(count)) {
            let text: String = argument.random(rng);
            if !text.is_empty() {
                line.push(' ');
                line.push_str(&text);
            }
        }

        if command.redirect_input && role != Role::Consumer {
            line = if depth < MAX_PIPELINE_DEPTH && rng.chance(self.pipe_probability) {
                format!("{} | {line}", self.random(Role::Producer, depth + 1, rng))
            } else {
                format!("{line} < {}", choose(INPUT_FILE_NAMES, rng))
            };
        }
        if command.redirect_output && role != Role::Producer && rng.chance(self.redirect_probability)
        {
            line = if depth < MAX_PIPELINE_DEPTH && rng.chance(self.pipe_probability) {
                format!("{line} | {}", self.random(Role::Consumer, depth + 1, rng))
            } else if rng.chance(0.5) {
                format!("{line} > {}", choose(OUTPUT_FILE_NAMES, rng))
            } else {
                format!("{line} >> {}", choose(OUTPUT_FILE_NAMES, rng))
            };
        }
        line
    }
}

fn choose(items: &[&'static str], rng: &mut RandomSource) -> &'static str {
    rng.choice(items).copied().unwrap_or_default()
}

/// A shell scripter puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShellScripter {
    command: String,
}

impl ShellScripter {
    /// Command line to type.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Number of commands in the pipeline.
    pub fn num_commands(&self) -> usize {
        self.command.matches(" | ").count() + 1
    }
}

impl Puzzle for ShellScripter {
    const KIND: GameKind = GameKind::ShellScripter;
    type Answer = String;

    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error> {
        let generator: CommandGenerator = CommandGenerator {
            min_args: params.int("min_args")?,
            max_args: params.int("max_args")?,
            redirect_probability: params.ratio("redirect_probability")?,
            pipe_probability: params.ratio("pipe_probability")?,
        };

        if generator.min_args > generator.max_args {
            return Err(ConfigurationError::invalid(
                Self::KIND,
                "min_args",
                format!(
                    "{} is greater than max_args ({})",
                    generator.min_args, generator.max_args
                ),
            )
            .into());
        }

        let puzzle: Self = regenerate(Self::KIND, MAX_ATTEMPTS, rng, |rng| {
            let command: String = generator.random(Role::Alone, 0, rng);
            if command.len() > MAX_COMMAND_LENGTH {
                Err(format!("command line too long ({} characters)", command.len()))
            } else {
                Ok(Self { command })
            }
        })?;
        debug!("Shell scripter: {}", puzzle.command);
        Ok(puzzle)
    }

    fn verify(&self, answer: &String) -> bool {
        *answer == self.command
    }

    fn solution(&self) -> String {
        self.command.clone()
    }
}

impl fmt::Display for ShellScripter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "$ {}", self.command)
    }
}
