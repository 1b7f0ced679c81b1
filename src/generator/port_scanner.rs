/*
port_scanner.rs

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

//! Port scanner: find the port number of an IPv4 socket.
//!
//! Each socket is four address sections and a port. The port is the sum of the sections, but
//! some sections count negatively, and the address only shows their magnitude. The same sign
//! pattern applies to every socket of a puzzle: the player works it out from solved examples,
//! then fills in the blank cell of the challenge socket.
//!
//! ```text
//! 10.7.5.3:5
//! 22.1.9.6:24
//! 5.15.3.2:?
//! ```

use formatx::formatx;
use log::{Level, debug, log_enabled};
use serde::Serialize;
use std::fmt;

use super::{MAX_ATTEMPTS, regenerate};
use crate::difficulty::{BuiltinPreset, Difficulty, Domain, GameSchema, ParamSpec, ParamValue, Parameters};
use crate::error::Error;
use crate::game::{GameKind, Puzzle};
use crate::random::RandomSource;

/// Number of sections in an IPv4 address.
pub const ADDRESS_SECTIONS: usize = 4;

/// Lowest valid port.
pub const MIN_PORT: i64 = 1;

/// Highest valid port (registered ports only).
pub const MAX_PORT: i64 = 49151;

/// Commands used to "scan" the solved socket, with their possible outputs.
const SCAN_COMMAND_TEMPLATES: [(&str, &[&str]); 2] = [
    (
        "$ netcat -zv {ip} {port}",
        &[
            "Connection to {ip} {port} port [{protocol}] succeeded!",
            "nc: connect to {ip} port {port} ({protocol}) failed: Network is unreachable",
        ],
    ),
    (
        "$ nmap -Pn -p {port} {ip}",
        &[
            "Nmap scan report for {ip}\n{port}  open  {protocol}",
            "Nmap scan report for {ip}\n{port}  filtered  {protocol}",
        ],
    ),
];

/// Common protocol names.
const PROTOCOLS: [&str; 16] = [
    "tcp/echo", "udp/echo", "tcp/ftp", "tcp/ssh", "tcp/telnet", "tcp/smtp", "tcp/whois",
    "tcp/http", "tcp/pop3", "udp/ntp", "tcp/irc", "tcp/ldap", "tcp/https", "udp/openvpn",
    "tcp/mysql", "tcp/http-alt",
];

pub const SCHEMA: GameSchema = GameSchema {
    parameters: &[
        ParamSpec {
            name: "examples",
            domain: Domain::Int { min: 1, max: 10 },
            description: "Number of solved sockets shown before the challenge",
        },
        ParamSpec {
            name: "max_section_number",
            domain: Domain::Int { min: 2, max: 9999 },
            description: "Highest magnitude of an address section",
        },
        ParamSpec {
            name: "max_negative_sections",
            domain: Domain::Int {
                min: 0,
                max: (ADDRESS_SECTIONS / 2) as i64,
            },
            description: "Highest number of sections that count negatively",
        },
        ParamSpec {
            name: "hide_any_cell",
            domain: Domain::Int { min: 0, max: 1 },
            description: "Whether the blank can be an address section instead of the port",
        },
    ],
    presets: &[
        BuiltinPreset {
            difficulty: Difficulty::Easy,
            values: &[
                ("examples", ParamValue::Int(4)),
                ("max_section_number", ParamValue::Int(20)),
                ("max_negative_sections", ParamValue::Int(1)),
                ("hide_any_cell", ParamValue::Int(0)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Medium,
            values: &[
                ("examples", ParamValue::Int(3)),
                ("max_section_number", ParamValue::Int(99)),
                ("max_negative_sections", ParamValue::Int(2)),
                ("hide_any_cell", ParamValue::Int(0)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Hard,
            values: &[
                ("examples", ParamValue::Int(2)),
                ("max_section_number", ParamValue::Int(255)),
                ("max_negative_sections", ParamValue::Int(2)),
                ("hide_any_cell", ParamValue::Int(1)),
            ],
        },
    ],
};

/// Sign of each section: `1` or `-1`.
pub type Signs = [i64; ADDRESS_SECTIONS];

/// The cell of the challenge socket that the player must find.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HiddenCell {
    Section(usize),
    Port,
}

/// A socket whose port is the signed sum of its sections.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    /// Signed sections. Only the magnitudes are shown to the player.
    sections: Signs,
}

impl AddressRow {
    /// Create an [`AddressRow`] object from signed sections.
    pub fn new(sections: Signs) -> Self {
        Self { sections }
    }

    /// Port of the socket.
    pub fn port(&self) -> i64 {
        self.sections.iter().sum()
    }

    /// Section magnitudes, as displayed.
    pub fn magnitudes(&self) -> Signs {
        self.sections.map(i64::abs)
    }

    /// Format the address, such as `10.7.5.3`.
    pub fn format_address(&self) -> String {
        self.magnitudes()
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<String>>()
            .join(".")
    }

    /// Format the socket, such as `10.7.5.3:5`. The hidden cell, if any, is shown as `?`.
    pub fn format_socket(&self, hidden: Option<HiddenCell>) -> String {
        let mut cells: Vec<String> = self.magnitudes().iter().map(|m| m.to_string()).collect();
        let mut port: String = self.port().to_string();

        match hidden {
            Some(HiddenCell::Section(i)) => cells[i] = String::from("?"),
            Some(HiddenCell::Port) => port = String::from("?"),
            None => (),
        }
        format!("{}:{}", cells.join("."), port)
    }

    /// Create a random row with the given signs and a port in the valid range.
    ///
    /// Each section is drawn within the bounds that still allow the remaining sections to bring
    /// the port between [`MIN_PORT`] and [`MAX_PORT`].
    fn random(signs: &Signs, max_section_number: i64, rng: &mut RandomSource) -> Self {
        let bounds = |sign: i64| -> (i64, i64) {
            if sign < 0 {
                (-max_section_number, -1)
            } else {
                (0, max_section_number)
            }
        };
        let mut sections: Signs = [0; ADDRESS_SECTIONS];

        for (i, sign) in signs.iter().enumerate() {
            let running_sum: i64 = sections[..i].iter().sum();
            let remaining = &signs[i + 1..];
            let max_possible: i64 = running_sum + remaining.iter().map(|s| bounds(*s).1).sum::<i64>();
            let min_possible: i64 = running_sum + remaining.iter().map(|s| bounds(*s).0).sum::<i64>();
            let (low, high) = bounds(*sign);

            let lower: i64 = (MIN_PORT - max_possible).clamp(low, high);
            let upper: i64 = (MAX_PORT - min_possible).clamp(low, high);
            sections[i] = rng.next_int(lower, upper);
        }
        Self { sections }
    }
}

/// Return the sign vectors that explain the port of every row from the displayed magnitudes.
pub fn infer_signs(rows: &[AddressRow]) -> Vec<Signs> {
    (0..1 << ADDRESS_SECTIONS)
        .map(|bits: usize| {
            let mut signs: Signs = [1; ADDRESS_SECTIONS];
            for (i, s) in signs.iter_mut().enumerate() {
                if bits & (1 << i) != 0 {
                    *s = -1;
                }
            }
            signs
        })
        .filter(|signs| {
            rows.iter().all(|row| {
                let m: Signs = row.magnitudes();
                (0..ADDRESS_SECTIONS).map(|i| signs[i] * m[i]).sum::<i64>() == row.port()
            })
        })
        .collect()
}

/// A port scanner puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PortScanner {
    /// Solved sockets.
    examples: Vec<AddressRow>,

    /// Socket with a blank cell.
    challenge: AddressRow,

    /// Blank cell of the challenge.
    hidden: HiddenCell,

    /// Value of the blank cell.
    answer: i64,

    /// Scan command and its output, displayed once the puzzle is solved.
    filler: String,
}

impl PortScanner {
    /// Solved sockets.
    pub fn examples(&self) -> &[AddressRow] {
        &self.examples
    }

    /// Socket with a blank cell.
    pub fn challenge(&self) -> &AddressRow {
        &self.challenge
    }

    /// Blank cell of the challenge.
    pub fn hidden(&self) -> HiddenCell {
        self.hidden
    }

    /// Scan command and its output, displayed once the puzzle is solved.
    pub fn filler(&self) -> &str {
        &self.filler
    }

    /// Compute the blank cell from the displayed values of the challenge and the given signs.
    ///
    /// Return [`None`] if no magnitude fits.
    fn blank_value(&self, signs: &Signs) -> Option<i64> {
        let m: Signs = self.challenge.magnitudes();
        match self.hidden {
            HiddenCell::Port => Some((0..ADDRESS_SECTIONS).map(|i| signs[i] * m[i]).sum()),
            HiddenCell::Section(k) => {
                let rest: i64 = (0..ADDRESS_SECTIONS)
                    .filter(|i| *i != k)
                    .map(|i| signs[i] * m[i])
                    .sum();
                let value: i64 = signs[k] * (self.challenge.port() - rest);
                (value >= 0).then_some(value)
            }
        }
    }

    /// Build a candidate puzzle and verify that its answer is unique.
    fn attempt(
        examples: usize,
        max_section_number: i64,
        max_negative_sections: i64,
        hide_any_cell: bool,
        rng: &mut RandomSource,
    ) -> Result<Self, String> {
        // Randomly decide which sections count negatively
        let negatives: i64 = rng.next_int(0, max_negative_sections);
        let mut signs: Signs = [1; ADDRESS_SECTIONS];
        for s in signs.iter_mut().take(negatives as usize) {
            *s = -1;
        }
        rng.shuffle(&mut signs);

        let example_rows: Vec<AddressRow> = (0..examples)
            .map(|_| AddressRow::random(&signs, max_section_number, rng))
            .collect();
        let challenge: AddressRow = AddressRow::random(&signs, max_section_number, rng);

        if let Some(row) = example_rows
            .iter()
            .chain([&challenge])
            .find(|r| !(MIN_PORT..=MAX_PORT).contains(&r.port()))
        {
            return Err(format!("port {} out of range", row.port()));
        }

        let hidden: HiddenCell = if hide_any_cell {
            match rng.index(ADDRESS_SECTIONS + 1) {
                i if i < ADDRESS_SECTIONS => HiddenCell::Section(i),
                _ => HiddenCell::Port,
            }
        } else {
            HiddenCell::Port
        };
        let answer: i64 = match hidden {
            HiddenCell::Section(i) => challenge.magnitudes()[i],
            HiddenCell::Port => challenge.port(),
        };

        // The examples must reveal a single sign pattern
        let candidates: Vec<Signs> = infer_signs(&example_rows);
        if candidates.len() != 1 {
            return Err(format!(
                "{} sign patterns match the examples",
                candidates.len()
            ));
        }

        let filler: String = scan_filler(&challenge, rng).map_err(|e| format!("{e:?}"))?;
        let puzzle: Self = Self {
            examples: example_rows,
            challenge,
            hidden,
            answer,
            filler,
        };
        if puzzle.blank_value(&candidates[0]) != Some(answer) {
            return Err(String::from("the blank cell cannot be recomputed"));
        }
        Ok(puzzle)
    }
}

/// Render a scan command and its output for the solved socket.
fn scan_filler(row: &AddressRow, rng: &mut RandomSource) -> Result<String, formatx::Error> {
    let (command, outputs) = SCAN_COMMAND_TEMPLATES[rng.index(SCAN_COMMAND_TEMPLATES.len())];
    let output: &str = outputs[rng.index(outputs.len())];
    let protocol: &str = PROTOCOLS[rng.index(PROTOCOLS.len())];
    let ip: String = row.format_address();
    let port: i64 = row.port();

    Ok(format!(
        "{}\n{}",
        formatx!(command, ip = ip.as_str(), port = port)?,
        formatx!(output, ip = ip.as_str(), port = port, protocol = protocol)?
    ))
}

impl Puzzle for PortScanner {
    const KIND: GameKind = GameKind::PortScanner;
    type Answer = i64;

    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error> {
        let examples: usize = params.usize("examples")?;
        let max_section_number: i64 = params.int("max_section_number")?;
        let max_negative_sections: i64 = params.int("max_negative_sections")?;
        let hide_any_cell: bool = params.flag("hide_any_cell")?;

        let puzzle: Self = regenerate(Self::KIND, MAX_ATTEMPTS, rng, |rng| {
            Self::attempt(
                examples,
                max_section_number,
                max_negative_sections,
                hide_any_cell,
                rng,
            )
        })?;

        if log_enabled!(Level::Debug) {
            for row in &puzzle.examples {
                debug!("    {}", row.format_socket(None));
            }
            debug!("    {}", puzzle.challenge.format_socket(Some(puzzle.hidden)));
        }
        Ok(puzzle)
    }

    fn verify(&self, answer: &i64) -> bool {
        match infer_signs(&self.examples).as_slice() {
            [signs] => self.blank_value(signs) == Some(*answer),
            _ => false,
        }
    }

    fn solution(&self) -> i64 {
        self.answer
    }
}

impl fmt::Display for PortScanner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.examples {
            writeln!(f, "{}", row.format_socket(None))?;
        }
        write!(f, "{}", self.challenge.format_socket(Some(self.hidden)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyPresets;
    use crate::error::ConfigurationError;

    fn generate(preset: &str, seed: u64) -> PortScanner {
        let params = DifficultyPresets::new()
            .resolve(GameKind::PortScanner, preset)
            .unwrap();
        PortScanner::generate(&params, &mut RandomSource::seeded(seed)).unwrap()
    }

    #[test]
    fn shared_signs_give_the_port() {
        let example = AddressRow::new([10, -7, 5, -3]);
        assert_eq!(example.port(), 5);
        assert_eq!(example.format_socket(None), "10.7.5.3:5");

        // The sign pattern carries over to the next socket
        let next = AddressRow::new([5, -15, 3, -2]);
        assert_eq!(next.port(), -9);
        assert_eq!(next.format_socket(Some(HiddenCell::Port)), "5.15.3.2:?");
    }

    #[test]
    fn signs_are_inferred_from_examples() {
        let rows = [
            AddressRow::new([10, -7, 5, -3]),
            AddressRow::new([22, -1, 9, -6]),
        ];
        assert_eq!(infer_signs(&rows), vec![[1, -1, 1, -1]]);

        // A zero section does not reveal its sign
        let rows = [AddressRow::new([10, 0, 5, -3])];
        assert_eq!(infer_signs(&rows).len(), 2);
    }

    #[test]
    fn generated_ports_are_in_range() {
        for seed in 0..20 {
            let p = generate("hard", seed);
            for row in p.examples().iter().chain([p.challenge()]) {
                assert!((MIN_PORT..=MAX_PORT).contains(&row.port()));
                assert!(row.magnitudes().iter().all(|m| *m <= 255));
            }
        }
    }

    #[test]
    fn answer_is_unique() {
        for seed in 0..30 {
            let p = generate("hard", seed);

            assert_eq!(infer_signs(p.examples()).len(), 1);
            assert!(p.verify(&p.solution()));
            for wrong in [p.solution() - 1, p.solution() + 1, -p.solution()] {
                if wrong != p.solution() {
                    assert!(!p.verify(&wrong));
                }
            }
        }
    }

    #[test]
    fn easy_puzzles_hide_the_port() {
        for seed in 0..10 {
            let p = generate("easy", seed);
            assert_eq!(p.hidden(), HiddenCell::Port);
            assert_eq!(p.solution(), p.challenge().port());
            assert!(p.to_string().ends_with(":?"));
        }
    }

    #[test]
    fn filler_mentions_the_socket() {
        let p = generate("medium", 4);
        let address = p.challenge().format_address();

        assert!(p.filler().starts_with("$ "));
        assert!(p.filler().contains(&address));
        assert!(p.filler().contains(&p.challenge().port().to_string()));
    }

    #[test]
    fn at_most_half_of_the_sections_are_negative() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::PortScanner, "hard")
            .unwrap();
        let limit = (ADDRESS_SECTIONS / 2) as i64;

        assert!(params.with("max_negative_sections", ParamValue::Int(limit)).is_ok());
        assert!(matches!(
            params.with("max_negative_sections", ParamValue::Int(limit + 1)),
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn same_seed_same_puzzle() {
        assert_eq!(generate("medium", 11), generate("medium", 11));
    }
}
