//! Checks that the pixi tables of a `pyproject.toml` mirror its dependency groups.
//!
//! The `runtime` dependency group is compared with `[tool.pixi.dependencies]`; every pixi feature
//! `G` is compared with the dependency group `G`. Groups with no pixi feature table are not pixi
//! environments and are skipped. Requirements are compared after removing spaces, and a pixi entry
//! `name = "spec"` stands for the requirement `namespec`.
//!
//! ```rust
//! use pixi_sync::Manifest;
//!
//! let manifest: Manifest = r#"
//!     [dependency-groups]
//!     runtime = ["alpha >= 1"]
//!
//!     [tool.pixi.dependencies]
//!     alpha = ">=1"
//! "#
//! .parse()
//! .unwrap();
//! assert!(manifest.differences().unwrap().is_empty());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Dependency group mirrored by `[tool.pixi.dependencies]`.
pub const RUNTIME_GROUP: &str = "runtime";

/// First line of a failed check's report.
pub const REPORT_HEADER: &str = "Pixi configuration is out of sync with dependency groups:";

/// How to bring the tables back in sync.
pub const FIX_INSTRUCTIONS: &str = "Fix instructions:
  1. Regenerate the pixi tables from the dependency groups, e.g.
     pixi run --environment=lint generate-pixi > /tmp/pixi-sections.toml
  2. Copy the updated [tool.pixi.*] blocks from that output back into pyproject.toml
  3. Re-run pixi run lint to confirm the hook passes.";

/// Errors raised while reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The manifest cannot be read.
    #[error("failed to read manifest `{}`: {source}", .path.display())]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or has an unexpected shape.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// An `include-group` names a group that does not exist.
    #[error("dependency group `{group}` includes unknown group `{missing}`")]
    UnknownGroup {
        /// Including group.
        group: String,
        /// Name that did not resolve.
        missing: String,
    },

    /// Groups include each other.
    #[error("dependency groups include each other: {0}")]
    IncludeCycle(String),
}

// =============================================================================
// Manifest
// =============================================================================

/// The parts of a `pyproject.toml` the check reads.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "dependency-groups")]
    groups: BTreeMap<String, Vec<GroupEntry>>,
    #[serde(default)]
    tool: Tool,
}

#[derive(Debug, Default, Deserialize)]
struct Tool {
    #[serde(default)]
    pixi: Pixi,
}

#[derive(Debug, Default, Deserialize)]
struct Pixi {
    #[serde(default)]
    dependencies: BTreeMap<String, PixiSpec>,
    #[serde(default)]
    feature: BTreeMap<String, Feature>,
}

#[derive(Debug, Default, Deserialize)]
struct Feature {
    #[serde(default)]
    dependencies: BTreeMap<String, PixiSpec>,
}

/// One entry of a dependency group.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupEntry {
    Requirement(String),
    Include {
        #[serde(rename = "include-group")]
        include_group: String,
    },
}

/// A pixi dependency: `">=1"` or `{ version = ">=1", channel = "..." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PixiSpec {
    Version(String),
    Table {
        #[serde(default)]
        version: Option<String>,
    },
}

impl PixiSpec {
    fn version(&self) -> &str {
        match self {
            PixiSpec::Version(v) => v,
            PixiSpec::Table { version } => version.as_deref().unwrap_or(""),
        }
    }
}

/// Removes every space so that `alpha >= 1` and `alpha>=1` compare equal.
pub fn canon(requirement: &str) -> String {
    requirement.replace(' ', "")
}

fn pixi_entries(table: &BTreeMap<String, PixiSpec>) -> Vec<String> {
    table
        .iter()
        .map(|(name, spec)| canon(&format!("{name}{}", spec.version())))
        .collect()
}

impl FromStr for Manifest {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl Manifest {
    /// Reads and parses the manifest at `path`.
    ///
    /// # Errors
    /// * [`SyncError::Read`] if the file cannot be read
    /// * [`SyncError::Parse`] if it is not a valid manifest
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SyncError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("read manifest {}", path.display());
        content.parse()
    }

    /// Requirements of group `name` with `include-group` entries expanded; empty when absent.
    pub fn group(&self, name: &str) -> Result<Vec<String>, SyncError> {
        let mut stack = Vec::new();
        self.expand(name, &mut stack)
    }

    fn expand(&self, name: &str, stack: &mut Vec<String>) -> Result<Vec<String>, SyncError> {
        if stack.iter().any(|g| g == name) {
            stack.push(name.to_string());
            return Err(SyncError::IncludeCycle(stack.join(" -> ")));
        }
        let Some(entries) = self.groups.get(name) else {
            return Ok(Vec::new());
        };
        stack.push(name.to_string());
        let mut requirements = Vec::new();
        for entry in entries {
            match entry {
                GroupEntry::Requirement(r) => requirements.push(canon(r)),
                GroupEntry::Include { include_group } => {
                    if !self.groups.contains_key(include_group) {
                        return Err(SyncError::UnknownGroup {
                            group: name.to_string(),
                            missing: include_group.clone(),
                        });
                    }
                    requirements.extend(self.expand(include_group, stack)?);
                }
            }
        }
        stack.pop();
        Ok(requirements)
    }

    /// One comparison per pixi table: the runtime table, then every feature in name order.
    ///
    /// Dependency groups without a `tool.pixi.feature` table are left alone; a feature table
    /// without a group is compared against an empty group.
    pub fn checks(&self) -> Result<Vec<RequirementSet>, SyncError> {
        let mut checks = vec![RequirementSet {
            table: "tool.pixi.dependencies".to_string(),
            expected: self.group(RUNTIME_GROUP)?,
            actual: pixi_entries(&self.tool.pixi.dependencies),
        }];

        for (feature, table) in &self.tool.pixi.feature {
            checks.push(RequirementSet {
                table: format!("tool.pixi.feature.{feature}.dependencies"),
                expected: self.group(feature)?,
                actual: pixi_entries(&table.dependencies),
            });
        }
        let skipped = self
            .groups
            .keys()
            .filter(|g| *g != RUNTIME_GROUP && !self.tool.pixi.feature.contains_key(*g))
            .count();
        tracing::debug!(
            "comparing {} pixi tables, {skipped} dependency groups have no pixi feature",
            checks.len()
        );
        Ok(checks)
    }

    /// Every difference across all tables; empty when in sync.
    pub fn differences(&self) -> Result<Vec<String>, SyncError> {
        Ok(self
            .checks()?
            .iter()
            .flat_map(RequirementSet::differences)
            .collect())
    }
}

// =============================================================================
// Comparison
// =============================================================================

/// Requirements a pixi table should hold against those it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementSet {
    /// Dotted table name, e.g. `tool.pixi.feature.lint.dependencies`.
    pub table: String,
    /// Canonical requirements from the dependency group.
    pub expected: Vec<String>,
    /// Canonical requirements from the pixi table.
    pub actual: Vec<String>,
}

impl RequirementSet {
    /// Report lines for this table, sorted within each line.
    pub fn differences(&self) -> Vec<String> {
        let expected: BTreeSet<String> = self.expected.iter().map(|r| canon(r)).collect();
        let actual: BTreeSet<String> = self.actual.iter().map(|r| canon(r)).collect();

        let mut messages = Vec::new();
        let missing: Vec<&str> = expected.difference(&actual).map(String::as_str).collect();
        let extra: Vec<&str> = actual.difference(&expected).map(String::as_str).collect();
        if !missing.is_empty() {
            messages.push(format!("missing from {}: {}", self.table, missing.join(", ")));
        }
        if !extra.is_empty() {
            messages.push(format!("extra entries in {}: {}", self.table, extra.join(", ")));
        }
        if messages.is_empty() && sorted(&self.expected) != sorted(&self.actual) {
            messages.push(format!(
                "ordering differs for {}; consider aligning sorted output",
                self.table
            ));
        }
        messages
    }
}

fn sorted(requirements: &[String]) -> Vec<String> {
    let mut out: Vec<String> = requirements.iter().map(|r| canon(r)).collect();
    out.sort();
    out
}

/// The text printed for a failed check.
pub fn render_report(differences: &[String]) -> String {
    let mut out = String::from(REPORT_HEADER);
    out.push('\n');
    for line in differences {
        out.push_str("  - ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(FIX_INSTRUCTIONS);
    out
}
