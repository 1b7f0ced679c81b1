/*
difficulty.rs

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

//! Difficulty presets.
//!
//! Every game declares the parameters its generator requires in a [`GameSchema`]: the name,
//! the domain of valid values, and a description for each parameter, plus the built-in
//! [`Difficulty`] presets.
//!
//! [`DifficultyPresets`] stores the built-in presets and the presets defined by the user in a
//! JSON file such as:
//!
//! ```json
//! {
//!   "tree_builder": {
//!     "hard": { "nodes": 20 },
//!     "insane": { "depth": 6, "min_branches": 2, "max_branches": 4, "nodes": 30 }
//!   }
//! }
//! ```
//!
//! User data is merged over the built-in presets parameter by parameter: in this example, the
//! hard preset keeps its built-in depth and branches, but uses 20 nodes.
//! All the presets are validated against the schema of their game, and [`DifficultyPresets::resolve`]
//! returns the validated [`Parameters`] that a generator consumes.

use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use strum_macros::FromRepr;

use crate::error::ConfigurationError;
use crate::game::GameKind;
use crate::generator::{
    database_querier, hash_cracker, hex_editor, pattern_finder, port_scanner, shell_scripter,
    tree_builder,
};

/// Built-in difficulty levels.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialOrd,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    FromRepr,
    Default,
)]
#[repr(i32)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Preset name of the difficulty level.
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a built-in level from its name or its number (`0` for easy to `2` for hard).
    ///
    /// Return [`None`] for anything else, such as the name of a user preset.
    pub fn from_level(level: &str) -> Option<Self> {
        let level: String = level.trim().to_lowercase();
        match level.parse::<i32>() {
            Ok(n) => Difficulty::from_repr(n),
            Err(_) => Difficulty::ALL.into_iter().find(|d| d.name() == level),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Valid values for a parameter. Bounds are inclusive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Domain {
    Int { min: i64, max: i64 },
    Ratio { min: f64, max: f64 },
}

/// Declaration of a generator parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub domain: Domain,
    pub description: &'static str,
}

/// Value of a parameter, as found in a preset.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Ratio(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Ratio(v) => write!(f, "{v}"),
        }
    }
}

/// Built-in preset for a difficulty level.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinPreset {
    pub difficulty: Difficulty,
    pub values: &'static [(&'static str, ParamValue)],
}

/// Parameters and built-in presets of a game.
#[derive(Debug, Clone, Copy)]
pub struct GameSchema {
    pub parameters: &'static [ParamSpec],
    pub presets: &'static [BuiltinPreset],
}

impl GameSchema {
    /// Return the declaration of the parameter.
    pub fn parameter(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Return the schema of the game.
pub fn schema(game: GameKind) -> &'static GameSchema {
    match game {
        GameKind::HashCracker => &hash_cracker::SCHEMA,
        GameKind::PortScanner => &port_scanner::SCHEMA,
        GameKind::ShellScripter => &shell_scripter::SCHEMA,
        GameKind::DatabaseQuerier => &database_querier::SCHEMA,
        GameKind::HexEditor => &hex_editor::SCHEMA,
        GameKind::PatternFinder => &pattern_finder::SCHEMA,
        GameKind::TreeBuilder => &tree_builder::SCHEMA,
    }
}

/// Validated parameters for one generator invocation.
///
/// A [`Parameters`] object always holds exactly the parameters that the schema of its game
/// declares, each within its domain.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Parameters {
    game: GameKind,
    values: BTreeMap<String, ParamValue>,
}

impl Parameters {
    /// Validate the values against the schema of the game and create a [`Parameters`] object.
    ///
    /// # Errors
    ///
    /// The method returns an error for unknown parameters, missing parameters, and values
    /// outside of their domain.
    pub fn new(
        game: GameKind,
        values: BTreeMap<String, ParamValue>,
    ) -> Result<Self, ConfigurationError> {
        let schema: &GameSchema = schema(game);
        let mut checked: BTreeMap<String, ParamValue> = BTreeMap::new();

        for (name, value) in values {
            let spec: &ParamSpec =
                schema
                    .parameter(&name)
                    .ok_or_else(|| ConfigurationError::UnknownParameter {
                        game,
                        name: name.clone(),
                    })?;
            let value: ParamValue = check_value(game, spec, value)?;
            checked.insert(name, value);
        }

        if let Some(spec) = schema
            .parameters
            .iter()
            .find(|p| !checked.contains_key(p.name))
        {
            return Err(ConfigurationError::MissingParameter {
                game,
                name: spec.name.to_string(),
            });
        }

        Ok(Self {
            game,
            values: checked,
        })
    }

    /// Game the parameters were validated for.
    pub fn game(&self) -> GameKind {
        self.game
    }

    /// Return all the values.
    pub fn values(&self) -> &BTreeMap<String, ParamValue> {
        &self.values
    }

    /// Return a copy of the parameters with one value replaced.
    ///
    /// # Errors
    ///
    /// Same as [`Parameters::new`].
    pub fn with(&self, name: &str, value: ParamValue) -> Result<Self, ConfigurationError> {
        let mut values: BTreeMap<String, ParamValue> = self.values.clone();
        values.insert(name.to_string(), value);
        Self::new(self.game, values)
    }

    fn get(&self, name: &str) -> Result<ParamValue, ConfigurationError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ConfigurationError::MissingParameter {
                game: self.game,
                name: name.to_string(),
            })
    }

    /// Return an integer parameter.
    pub fn int(&self, name: &str) -> Result<i64, ConfigurationError> {
        match self.get(name)? {
            ParamValue::Int(v) => Ok(v),
            ParamValue::Ratio(_) => Err(ConfigurationError::invalid(
                self.game,
                name,
                "expected an integer",
            )),
        }
    }

    /// Return a non-negative integer parameter as a [`usize`].
    pub fn usize(&self, name: &str) -> Result<usize, ConfigurationError> {
        let v: i64 = self.int(name)?;
        usize::try_from(v)
            .map_err(|_| ConfigurationError::invalid(self.game, name, "must not be negative"))
    }

    /// Return a ratio parameter.
    pub fn ratio(&self, name: &str) -> Result<f64, ConfigurationError> {
        match self.get(name)? {
            ParamValue::Ratio(v) => Ok(v),
            ParamValue::Int(v) => Ok(v as f64),
        }
    }

    /// Return an integer parameter used as a switch: any non-zero value is `true`.
    pub fn flag(&self, name: &str) -> Result<bool, ConfigurationError> {
        Ok(self.int(name)? != 0)
    }
}

/// Verify that the value belongs to the domain of the parameter and normalize its type.
fn check_value(
    game: GameKind,
    spec: &ParamSpec,
    value: ParamValue,
) -> Result<ParamValue, ConfigurationError> {
    match spec.domain {
        Domain::Int { min, max } => {
            let v: i64 = match value {
                ParamValue::Int(v) => v,
                ParamValue::Ratio(r) if r.is_finite() && r.fract() == 0.0 => r as i64,
                ParamValue::Ratio(r) => {
                    return Err(ConfigurationError::invalid(
                        game,
                        spec.name,
                        format!("{r} is not an integer"),
                    ));
                }
            };
            if v < min || v > max {
                return Err(ConfigurationError::invalid(
                    game,
                    spec.name,
                    format!("{v} is not between {min} and {max}"),
                ));
            }
            Ok(ParamValue::Int(v))
        }
        Domain::Ratio { min, max } => {
            let v: f64 = match value {
                ParamValue::Int(v) => v as f64,
                ParamValue::Ratio(r) => r,
            };
            if !v.is_finite() || v < min || v > max {
                return Err(ConfigurationError::invalid(
                    game,
                    spec.name,
                    format!("{v} is not between {min} and {max}"),
                ));
            }
            Ok(ParamValue::Ratio(v))
        }
    }
}

/// Raw preset data: preset name to parameter values.
type GamePresets = BTreeMap<String, BTreeMap<String, ParamValue>>;

/// Built-in and user-defined presets for all the games.
#[derive(Debug, Clone)]
pub struct DifficultyPresets {
    data: BTreeMap<GameKind, GamePresets>,
}

impl Default for DifficultyPresets {
    fn default() -> Self {
        Self::new()
    }
}

impl DifficultyPresets {
    /// Create a [`DifficultyPresets`] object with only the built-in presets.
    pub fn new() -> Self {
        let mut data: BTreeMap<GameKind, GamePresets> = BTreeMap::new();

        for game in GameKind::ALL {
            let presets: GamePresets = schema(game)
                .presets
                .iter()
                .map(|p| {
                    (
                        p.difficulty.name().to_string(),
                        p.values
                            .iter()
                            .map(|(name, value)| (name.to_string(), *value))
                            .collect(),
                    )
                })
                .collect();
            data.insert(game, presets);
        }
        Self { data }
    }

    /// Create a [`DifficultyPresets`] object from the built-in presets and the user presets
    /// stored in the given file.
    ///
    /// A missing file is not an error: the file has not been created yet.
    ///
    /// # Errors
    ///
    /// The method returns an error when the file cannot be read or parsed, or when a preset is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let mut presets: Self = Self::new();

        match fs::read_to_string(path) {
            Ok(json) => {
                debug!("Loading user presets from {}", path.display());
                presets.merge_json(&json)?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No user presets in {}", path.display());
            }
            Err(e) => return Err(e.into()),
        }
        Ok(presets)
    }

    /// Merge user presets, in JSON format, over the current presets.
    ///
    /// Nothing is merged if any of the presets is invalid.
    ///
    /// # Errors
    ///
    /// The method returns an error when the JSON cannot be parsed, when it references an unknown
    /// game, or when a merged preset does not validate.
    pub fn merge_json(&mut self, json: &str) -> Result<(), ConfigurationError> {
        let user: BTreeMap<String, GamePresets> = serde_json::from_str(json)?;
        let mut data: BTreeMap<GameKind, GamePresets> = self.data.clone();

        for (game_name, presets) in user {
            let game: GameKind = game_name.parse()?;
            let game_presets: &mut GamePresets = data.entry(game).or_default();

            for (preset_name, values) in presets {
                let preset: &mut BTreeMap<String, ParamValue> = game_presets
                    .entry(preset_name.trim().to_lowercase())
                    .or_default();
                preset.extend(values);
                Parameters::new(game, preset.clone())?;
            }
        }
        self.data = data;
        Ok(())
    }

    /// Write all the presets to the given file, in JSON format.
    ///
    /// # Errors
    ///
    /// The method returns an error if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), ConfigurationError> {
        let by_name: BTreeMap<&str, &GamePresets> =
            self.data.iter().map(|(g, p)| (g.name(), p)).collect();
        let json: String = serde_json::to_string_pretty(&by_name)?;

        fs::write(path, json)?;
        debug!("Presets saved in {}", path.display());
        Ok(())
    }

    /// Add or replace a preset.
    ///
    /// # Errors
    ///
    /// The method returns an error if the preset does not validate against the game schema.
    pub fn insert(
        &mut self,
        game: GameKind,
        preset: &str,
        values: BTreeMap<String, ParamValue>,
    ) -> Result<(), ConfigurationError> {
        Parameters::new(game, values.clone())?;
        self.data
            .entry(game)
            .or_default()
            .insert(preset.trim().to_lowercase(), values);
        Ok(())
    }

    /// Return the validated parameters of a preset. The preset name is case-insensitive.
    ///
    /// # Errors
    ///
    /// The method returns an error if the preset does not exist or does not validate.
    pub fn resolve(&self, game: GameKind, preset: &str) -> Result<Parameters, ConfigurationError> {
        let values: &BTreeMap<String, ParamValue> = self
            .data
            .get(&game)
            .and_then(|p| p.get(&preset.trim().to_lowercase()))
            .ok_or_else(|| {
                warn!("Unknown preset {preset} for {game}");
                ConfigurationError::UnknownPreset {
                    game,
                    preset: preset.to_string(),
                }
            })?;
        Parameters::new(game, values.clone())
    }

    /// Return the preset names of the game: the built-in levels first, then the user presets.
    pub fn preset_names(&self, game: GameKind) -> Vec<String> {
        let Some(presets) = self.data.get(&game) else {
            return Vec::new();
        };
        let mut names: Vec<String> = Difficulty::ALL
            .iter()
            .map(|d| d.name().to_string())
            .filter(|n| presets.contains_key(n))
            .collect();
        let custom: Vec<String> = presets
            .keys()
            .filter(|k| !names.contains(k))
            .cloned()
            .collect();
        names.extend(custom);
        names
    }

    /// Return the name and description of each parameter of the game.
    pub fn descriptions(&self, game: GameKind) -> Vec<(&'static str, &'static str)> {
        schema(game)
            .parameters
            .iter()
            .map(|p| (p.name, p.description))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_from_names_and_numbers() {
        assert_eq!(Difficulty::from_level("0"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_level(" 2 "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_level("Medium"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_level("3"), None);
        assert_eq!(Difficulty::from_level("-1"), None);
        assert_eq!(Difficulty::from_level("insane"), None);
    }

    #[test]
    fn builtin_presets_are_valid() {
        let presets = DifficultyPresets::new();

        for game in GameKind::ALL {
            assert_eq!(presets.preset_names(game), vec!["easy", "medium", "hard"]);
            for name in presets.preset_names(game) {
                let params = presets.resolve(game, &name).unwrap();
                assert_eq!(params.game(), game);
                assert_eq!(params.values().len(), schema(game).parameters.len());
            }
        }
    }

    #[test]
    fn preset_names_are_case_insensitive() {
        let presets = DifficultyPresets::new();
        let a = presets.resolve(GameKind::HexEditor, "HARD").unwrap();
        let b = presets.resolve(GameKind::HexEditor, "hard").unwrap();

        assert_eq!(a, b);
        assert!(matches!(
            presets.resolve(GameKind::HexEditor, "nightmare"),
            Err(ConfigurationError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn unknown_and_missing_parameters_are_rejected() {
        let presets = DifficultyPresets::new();
        let params = presets.resolve(GameKind::TreeBuilder, "easy").unwrap();

        let mut values = params.values().clone();
        values.insert("colour".to_string(), ParamValue::Int(3));
        assert!(matches!(
            Parameters::new(GameKind::TreeBuilder, values),
            Err(ConfigurationError::UnknownParameter { .. })
        ));

        let mut values = params.values().clone();
        values.remove("depth");
        assert!(matches!(
            Parameters::new(GameKind::TreeBuilder, values),
            Err(ConfigurationError::MissingParameter { .. })
        ));
    }

    #[test]
    fn values_outside_their_domain_are_rejected() {
        let presets = DifficultyPresets::new();
        let params = presets.resolve(GameKind::HexEditor, "easy").unwrap();

        assert!(matches!(
            params.with("width", ParamValue::Int(-3)),
            Err(ConfigurationError::InvalidValue { .. })
        ));
        assert!(params.with("width", ParamValue::Ratio(4.5)).is_err());
        assert!(params.with("branch_probability", ParamValue::Ratio(1.5)).is_err());

        // Integral values are accepted for ratios, and integral floats for integers
        let p = params.with("branch_probability", ParamValue::Int(1)).unwrap();
        assert_eq!(p.ratio("branch_probability").unwrap(), 1.0);
        let p = params.with("width", ParamValue::Ratio(5.0)).unwrap();
        assert_eq!(p.usize("width").unwrap(), 5);
    }

    #[test]
    fn user_presets_merge_over_builtin_presets() {
        let mut presets = DifficultyPresets::new();
        let builtin = presets.resolve(GameKind::TreeBuilder, "hard").unwrap();

        presets
            .merge_json(
                r#"{
                    "tree_builder": {
                        "Hard": { "nodes": 20 },
                        "insane": { "depth": 6, "min_branches": 2, "max_branches": 4, "nodes": 30 }
                    }
                }"#,
            )
            .unwrap();

        let hard = presets.resolve(GameKind::TreeBuilder, "hard").unwrap();
        assert_eq!(hard.int("nodes").unwrap(), 20);
        assert_eq!(hard.int("depth").unwrap(), builtin.int("depth").unwrap());
        assert_eq!(
            presets.preset_names(GameKind::TreeBuilder),
            vec!["easy", "medium", "hard", "insane"]
        );
    }

    #[test]
    fn invalid_user_presets_are_not_merged() {
        let mut presets = DifficultyPresets::new();

        let err = presets
            .merge_json(r#"{ "tree_builder": { "custom": { "depth": 2 } } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingParameter { .. }));
        assert!(presets.resolve(GameKind::TreeBuilder, "custom").is_err());

        let err = presets.merge_json(r#"{ "solitaire": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownGame(_)));

        let err = presets.merge_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigurationError::Json(_)));
    }

    #[test]
    fn presets_survive_a_write_and_load() {
        let path = std::env::temp_dir().join(format!(
            "skiddie-presets-{}.json",
            std::process::id()
        ));
        let mut presets = DifficultyPresets::new();
        let mut values = presets
            .resolve(GameKind::PatternFinder, "easy")
            .unwrap()
            .values()
            .clone();
        values.insert("choices".to_string(), ParamValue::Int(7));
        presets
            .insert(GameKind::PatternFinder, "Mine", values)
            .unwrap();

        presets.write(&path).unwrap();
        let loaded = DifficultyPresets::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        let mine = loaded.resolve(GameKind::PatternFinder, "mine").unwrap();
        assert_eq!(mine.int("choices").unwrap(), 7);
    }

    #[test]
    fn missing_preset_file_gives_builtin_presets() {
        let path = std::env::temp_dir().join("skiddie-this-file-does-not-exist.json");
        let presets = DifficultyPresets::load(&path).unwrap();

        assert!(presets.resolve(GameKind::PortScanner, "medium").is_ok());
    }
}
