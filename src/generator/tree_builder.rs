/*
tree_builder.rs

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

//! Tree builder: rebuild a tree from its closure table.
//!
//! A closure table lists every (ancestor, descendant, distance) triple of a tree, including the
//! node itself at distance 0. The player gets the table and the shape of the tree without the
//! node names, and must name every node:
//!
//! ```text
//! ?             Ancestor  Descendant  Distance
//! ├─?           Hamburg   Berlin      2
//! │ └─?         Hamburg   Hamburg     0
//! └─?           Hanover   Berlin      1
//!               ...
//! ```

use log::{Level, debug, log_enabled};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::{MAX_ATTEMPTS, regenerate};
use crate::difficulty::{BuiltinPreset, Difficulty, Domain, GameSchema, ParamSpec, ParamValue, Parameters};
use crate::error::{ConfigurationError, Error};
use crate::game::{GameKind, Puzzle};
use crate::random::RandomSource;

/// Node names.
pub const CITY_NAMES: [&str; 30] = [
    "Berlin", "Hamburg", "Munich", "Cologne", "Frankfurt", "Stuttgart", "Dortmund", "Essen",
    "Leipzig", "Bremen", "Dresden", "Hanover", "Nuremberg", "Duisburg", "Bochum", "Wuppertal",
    "Bielefeld", "Bonn", "Mannheim", "Augsburg", "Wiesbaden", "Chemnitz", "Kiel", "Aachen",
    "Halle", "Krefeld", "Rostock", "Kassel", "Hagen", "Hammelburg",
];

/// Max number of growth steps before the candidate tree is dropped.
const MAX_GROWTH_STEPS: usize = 10_000;

const VERTICAL_STRING: &str = "│ ";
const TEE_STRING: &str = "├─";
const ANGLE_STRING: &str = "└─";

pub const SCHEMA: GameSchema = GameSchema {
    parameters: &[
        ParamSpec {
            name: "depth",
            domain: Domain::Int { min: 1, max: 6 },
            description: "Number of levels below the root",
        },
        ParamSpec {
            name: "min_branches",
            domain: Domain::Int { min: 0, max: 4 },
            description: "Number of children a node gets when it grows",
        },
        ParamSpec {
            name: "max_branches",
            domain: Domain::Int { min: 1, max: 5 },
            description: "Highest number of children of a node",
        },
        ParamSpec {
            name: "nodes",
            domain: Domain::Int {
                min: 2,
                max: CITY_NAMES.len() as i64,
            },
            description: "Number of nodes in the tree",
        },
    ],
    presets: &[
        BuiltinPreset {
            difficulty: Difficulty::Easy,
            values: &[
                ("depth", ParamValue::Int(2)),
                ("min_branches", ParamValue::Int(1)),
                ("max_branches", ParamValue::Int(3)),
                ("nodes", ParamValue::Int(5)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Medium,
            values: &[
                ("depth", ParamValue::Int(3)),
                ("min_branches", ParamValue::Int(1)),
                ("max_branches", ParamValue::Int(3)),
                ("nodes", ParamValue::Int(10)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Hard,
            values: &[
                ("depth", ParamValue::Int(4)),
                ("min_branches", ParamValue::Int(2)),
                ("max_branches", ParamValue::Int(4)),
                ("nodes", ParamValue::Int(16)),
            ],
        },
    ],
};

/// One row of the closure table.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClosureRow {
    pub ancestor: String,
    pub descendant: String,
    pub distance: usize,
}

/// Names of the nodes, one per position of the [`TreeShape`].
pub type TreeLabels = Vec<String>;

/// Shape of a tree without node names.
///
/// Positions are in depth-first order, so the root is at position 0 and a parent always comes
/// before its children.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TreeShape {
    /// Parent position of each position; [`None`] for the root.
    parents: Vec<Option<usize>>,
}

impl TreeShape {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Parent position of each position.
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Ancestors of the node, the parent first.
    pub fn ancestors(&self, position: usize) -> Vec<usize> {
        let mut ancestors: Vec<usize> = Vec::new();
        let mut current: Option<usize> = self.parents.get(position).copied().flatten();

        while let Some(p) = current {
            ancestors.push(p);
            current = self.parents[p];
        }
        ancestors
    }

    /// Whether the node is the last child of its parent. The root is a last child.
    fn is_last_child(&self, position: usize) -> bool {
        match self.parents[position] {
            None => true,
            Some(parent) => !self.parents[position + 1..].contains(&Some(parent)),
        }
    }

    /// Closure table of the shape with the given names.
    pub fn closure(&self, labels: &[String]) -> Vec<ClosureRow> {
        (0..self.len())
            .flat_map(|descendant| {
                std::iter::once(descendant)
                    .chain(self.ancestors(descendant))
                    .enumerate()
                    .map(move |(distance, ancestor)| ClosureRow {
                        ancestor: labels[ancestor].clone(),
                        descendant: labels[descendant].clone(),
                        distance,
                    })
            })
            .collect()
    }

    /// Format the tree with box-drawing characters, one line per position.
    ///
    /// Without names, each node is shown as `?`.
    pub fn format(&self, labels: Option<&[String]>) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(self.len());

        for position in 0..self.len() {
            let mut line: String = String::new();
            let ancestors: Vec<usize> = self.ancestors(position);

            if !ancestors.is_empty() {
                // Vertical lines for the ancestors below the root
                for ancestor in ancestors[..ancestors.len() - 1].iter().rev() {
                    line.push_str(if self.is_last_child(*ancestor) {
                        "  "
                    } else {
                        VERTICAL_STRING
                    });
                }
                line.push_str(if self.is_last_child(position) {
                    ANGLE_STRING
                } else {
                    TEE_STRING
                });
            }
            line.push_str(labels.map_or("?", |l| l[position].as_str()));
            lines.push(line);
        }
        lines.join("\n")
    }
}

/// Tree under construction: node names and children, by node ID.
struct Tree {
    labels: Vec<String>,
    children: Vec<Vec<usize>>,
    depths: Vec<usize>,
}

impl Tree {
    fn new(root: String) -> Self {
        Self {
            labels: vec![root],
            children: vec![Vec::new()],
            depths: vec![0],
        }
    }

    fn add_child(&mut self, parent: usize, label: String) -> usize {
        let id: usize = self.labels.len();
        self.labels.push(label);
        self.children.push(Vec::new());
        self.depths.push(self.depths[parent] + 1);
        self.children[parent].push(id);
        id
    }

    /// Shape and names in depth-first order.
    fn flatten(&self) -> (TreeShape, TreeLabels) {
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(self.labels.len());
        let mut labels: TreeLabels = Vec::with_capacity(self.labels.len());
        let mut stack: Vec<(usize, Option<usize>)> = vec![(0, None)];

        while let Some((id, parent)) = stack.pop() {
            let position: usize = parents.len();
            parents.push(parent);
            labels.push(self.labels[id].clone());
            for child in self.children[id].iter().rev() {
                stack.push((*child, Some(position)));
            }
        }
        (TreeShape { parents }, labels)
    }
}

/// Settings of the random tree.
struct Growth {
    depth: usize,
    min_branches: usize,
    max_branches: usize,
    nodes: usize,
}

impl Growth {
    /// Give the node its minimum number of children, then recursively do the same for them,
    /// without exceeding the depth, the branching or the node count.
    fn grow_minimum(&self, tree: &mut Tree, node: usize, pool: &mut Vec<String>) {
        let min_children: usize = self.min_branches.max(1);

        if tree.children[node].len() >= self.max_branches || tree.depths[node] >= self.depth {
            return;
        }

        let mut new_children: Vec<usize> = Vec::with_capacity(min_children);
        for _ in 0..min_children {
            if tree.labels.len() >= self.nodes || tree.children[node].len() >= self.max_branches {
                break;
            }
            let Some(label) = pool.pop() else {
                break;
            };
            new_children.push(tree.add_child(node, label));
        }
        for child in new_children {
            self.grow_minimum(tree, child, pool);
        }
    }

    /// Pick a node by walking down random branches to a random depth.
    ///
    /// Each branch has the same chance to be selected whatever its size.
    fn random_node(&self, tree: &Tree, rng: &mut RandomSource) -> usize {
        let stop_depth: usize = rng.next_int(0, self.depth as i64) as usize;
        let mut current: usize = 0;

        while tree.depths[current] < stop_depth {
            match rng.choice(&tree.children[current]) {
                Some(child) => current = *child,
                None => break,
            }
        }
        current
    }

    fn attempt(&self, rng: &mut RandomSource) -> Result<(TreeShape, TreeLabels), String> {
        let mut pool: Vec<String> = CITY_NAMES.iter().map(|c| c.to_string()).collect();
        rng.shuffle(&mut pool);

        let root: String = pool.pop().ok_or("no node names")?;
        let mut tree: Tree = Tree::new(root);
        self.grow_minimum(&mut tree, 0, &mut pool);

        let mut steps: usize = 0;
        while tree.labels.len() < self.nodes {
            steps += 1;
            if steps > MAX_GROWTH_STEPS {
                return Err(format!("tree stuck at {} nodes", tree.labels.len()));
            }
            let node: usize = self.random_node(&tree, rng);
            self.grow_minimum(&mut tree, node, &mut pool);
        }
        debug!("Tree builder: {} growth steps", steps);
        Ok(tree.flatten())
    }
}

/// A tree builder puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TreeBuilder {
    shape: TreeShape,

    /// Closure table, grouped by ancestor in random order.
    table: Vec<ClosureRow>,

    /// Node names of the generated tree.
    solution: TreeLabels,
}

impl TreeBuilder {
    /// Shape to label.
    pub fn shape(&self) -> &TreeShape {
        &self.shape
    }

    /// Closure table.
    pub fn table(&self) -> &[ClosureRow] {
        &self.table
    }
}

impl Puzzle for TreeBuilder {
    const KIND: GameKind = GameKind::TreeBuilder;
    type Answer = TreeLabels;

    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error> {
        let growth: Growth = Growth {
            depth: params.usize("depth")?,
            min_branches: params.usize("min_branches")?,
            max_branches: params.usize("max_branches")?,
            nodes: params.usize("nodes")?,
        };

        if growth.min_branches > growth.max_branches {
            return Err(ConfigurationError::invalid(
                Self::KIND,
                "min_branches",
                format!(
                    "{} is greater than max_branches ({})",
                    growth.min_branches, growth.max_branches
                ),
            )
            .into());
        }
        let capacity: usize = (0..=growth.depth as u32)
            .map(|d| growth.max_branches.saturating_pow(d))
            .fold(0, usize::saturating_add);
        if capacity < growth.nodes {
            return Err(ConfigurationError::invalid(
                Self::KIND,
                "nodes",
                format!(
                    "a tree of depth {} with {} branches holds at most {capacity} nodes",
                    growth.depth, growth.max_branches
                ),
            )
            .into());
        }

        let (shape, solution) = regenerate(Self::KIND, MAX_ATTEMPTS, rng, |rng| growth.attempt(rng))?;

        // Shuffle the rows, but keep them grouped by ancestor
        let mut table: Vec<ClosureRow> = shape.closure(&solution);
        rng.shuffle(&mut table);
        table.sort_by(|a, b| a.ancestor.cmp(&b.ancestor));

        if log_enabled!(Level::Debug) {
            for line in shape.format(Some(&solution)).lines() {
                debug!("    {line}");
            }
        }
        Ok(Self {
            shape,
            table,
            solution,
        })
    }

    fn verify(&self, answer: &TreeLabels) -> bool {
        if answer.len() != self.shape.len() {
            return false;
        }
        let names: BTreeSet<&String> = answer.iter().collect();
        if names.len() != answer.len() {
            debug!("Tree builder: duplicated names");
            return false;
        }

        let expected: BTreeSet<ClosureRow> = self.table.iter().cloned().collect();
        let given: BTreeSet<ClosureRow> = self.shape.closure(answer).into_iter().collect();
        expected == given
    }

    fn solution(&self) -> TreeLabels {
        self.solution.clone()
    }
}

impl fmt::Display for TreeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}\n", self.shape.format(None))?;
        writeln!(f, "{:<12}{:<12}Distance", "Ancestor", "Descendant")?;
        let rows: Vec<String> = self
            .table
            .iter()
            .map(|r| format!("{:<12}{:<12}{}", r.ancestor, r.descendant, r.distance))
            .collect();
        write!(f, "{}", rows.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyPresets;

    fn labels(names: &[&str]) -> TreeLabels {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Hamburg -> {Hanover -> {Berlin}, Munich}
    fn scenario() -> TreeBuilder {
        let shape = TreeShape {
            parents: vec![None, Some(0), Some(1), Some(0)],
        };
        let solution = labels(&["Hamburg", "Hanover", "Berlin", "Munich"]);
        TreeBuilder {
            table: shape.closure(&solution),
            shape,
            solution,
        }
    }

    fn row(ancestor: &str, descendant: &str, distance: usize) -> ClosureRow {
        ClosureRow {
            ancestor: ancestor.to_string(),
            descendant: descendant.to_string(),
            distance,
        }
    }

    #[test]
    fn closure_lists_every_ancestor() {
        let p = scenario();

        assert_eq!(p.table().len(), 4 + 3 + 1);
        assert!(p.table().contains(&row("Hamburg", "Berlin", 2)));
        assert!(p.table().contains(&row("Hanover", "Berlin", 1)));
        assert!(p.table().contains(&row("Munich", "Munich", 0)));
        assert!(!p.table().iter().any(|r| r.ancestor == "Munich" && r.descendant == "Berlin"));
    }

    #[test]
    fn labels_are_checked_against_the_table() {
        let p = scenario();

        assert!(p.verify(&labels(&["Hamburg", "Hanover", "Berlin", "Munich"])));
        assert!(!p.verify(&labels(&["Hamburg", "Munich", "Berlin", "Hanover"])));
        assert!(!p.verify(&labels(&["Hamburg", "Hanover", "Berlin"])));
        assert!(!p.verify(&labels(&["Hamburg", "Hanover", "Hanover", "Munich"])));
    }

    #[test]
    fn shape_is_drawn_with_box_characters() {
        let p = scenario();

        assert_eq!(
            p.shape().format(Some(&p.solution())),
            "Hamburg\n├─Hanover\n│ └─Berlin\n└─Munich"
        );
        assert_eq!(p.shape().format(None), "?\n├─?\n│ └─?\n└─?");
    }

    #[test]
    fn generated_trees_follow_the_parameters() {
        let presets = DifficultyPresets::new();
        for preset in ["easy", "medium", "hard"] {
            let params = presets.resolve(GameKind::TreeBuilder, preset).unwrap();
            let nodes = params.usize("nodes").unwrap();
            let depth = params.usize("depth").unwrap();
            let max_branches = params.usize("max_branches").unwrap();

            for seed in 0..10 {
                let p = TreeBuilder::generate(&params, &mut RandomSource::seeded(seed)).unwrap();
                let shape = p.shape();

                assert_eq!(shape.len(), nodes);
                assert!((0..shape.len()).all(|n| shape.ancestors(n).len() <= depth));
                assert!((0..shape.len()).all(|n| {
                    shape.parents().iter().filter(|p| **p == Some(n)).count() <= max_branches
                }));
                assert!(p.verify(&p.solution()));
            }
        }
    }

    #[test]
    fn every_node_but_the_root_has_one_parent_row() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::TreeBuilder, "hard")
            .unwrap();
        let p = TreeBuilder::generate(&params, &mut RandomSource::seeded(9)).unwrap();
        let names = p.solution();

        for name in &names {
            let parents = p
                .table()
                .iter()
                .filter(|r| &r.descendant == name && r.distance == 1)
                .count();
            assert_eq!(parents, usize::from(name != &names[0]));
        }
    }

    #[test]
    fn too_many_nodes_for_the_shape() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::TreeBuilder, "easy")
            .unwrap()
            .with("depth", ParamValue::Int(1))
            .unwrap()
            .with("nodes", ParamValue::Int(10))
            .unwrap();

        assert!(matches!(
            TreeBuilder::generate(&params, &mut RandomSource::seeded(0)),
            Err(Error::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }
}
