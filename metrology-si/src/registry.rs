//! Unit registry: symbols and names resolved to [`SiUnit`]s.
//!
//! The registry maps a symbol (`"m"`) or a name (`"meter"`) to a [`UnitDef`] carrying the unit's
//! dimension and its scale to the coherent SI unit. Prefixable units also resolve under every SI
//! prefix (`"km"`, `"kilometer"`).
//!
//! # Conversion Formula
//!
//! Each unit stores `scale`, the value of one unit expressed in the coherent SI unit of its
//! dimension:
//! ```text
//! v_si  = v_src * src.scale
//! v_dst = v_si / dst.scale
//! ```
//!
//! # Configuration
//!
//! Extra units are declared in TOML as an array of `[[unit]]` tables, either through an
//! expression over already-known units or through an explicit scale and dimension label:
//!
//! ```toml
//! [[unit]]
//! symbol = "ft"
//! name = "foot"
//! aliases = ["feet"]
//! definition = "0.3048*m"
//!
//! [[unit]]
//! symbol = "kn"
//! name = "knot"
//! scale = 0.514444
//! dimension = "velocity"
//! ```
//!
//! Invalid entries are skipped with a warning; malformed TOML is an error.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrology_apis_core::ConversionError;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::dimension::SiDimension;
use crate::expr;
use crate::unit::SiUnit;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while building a [`UnitRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The configuration file cannot be read.
    #[error("failed to read unit registry file `{}`: {source}", .path.display())]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for a registry.
    #[error("failed to parse unit registry: {0}")]
    Parse(#[from] toml::de::Error),

    /// A symbol or name is already taken.
    #[error("unit `{0}` is already defined")]
    Duplicate(String),

    /// A symbol that the expression grammar could not refer to.
    #[error("invalid unit symbol `{0}`")]
    InvalidSymbol(String),

    /// A scale that is not a positive finite number.
    #[error("unit `{symbol}` has invalid scale {scale}")]
    InvalidScale {
        /// Unit symbol.
        symbol: String,
        /// Rejected scale.
        scale: f64,
    },

    /// A definition or dimension label that does not resolve.
    #[error("unit `{symbol}`: {source}")]
    Definition {
        /// Unit symbol.
        symbol: String,
        /// Why resolution failed.
        #[source]
        source: ConversionError,
    },

    /// Mutually exclusive keys were both given.
    #[error("unit `{0}`: `definition` excludes `scale` and `dimension`")]
    Conflicting(String),

    /// Neither a definition nor a dimension was given.
    #[error("unit `{0}`: either `definition` or `dimension` is required")]
    Underspecified(String),
}

// =============================================================================
// Unit Definitions
// =============================================================================

/// Metadata of one registered unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    /// Symbol used in expressions (`"m"`).
    pub symbol: String,
    /// Lowercase name (`"meter"`).
    pub name: String,
    /// Additional names (`"metre"`).
    pub aliases: Vec<String>,
    /// Dimension the unit measures.
    pub dimension: SiDimension,
    /// Value of one unit in the coherent SI unit of `dimension`.
    pub scale: f64,
    /// Whether SI prefixes apply.
    pub prefixable: bool,
}

impl UnitDef {
    /// Unprefixable definition with no aliases.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        scale: f64,
        dimension: SiDimension,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            aliases: Vec::new(),
            dimension,
            scale,
            prefixable: false,
        }
    }

    /// Allows SI prefixes.
    pub fn prefixable(mut self) -> Self {
        self.prefixable = true;
        self
    }

    /// Adds an alternative name.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.push(name.into());
        self
    }

    /// The unit this definition describes.
    pub fn unit(&self) -> SiUnit {
        SiUnit::new(self.symbol.clone(), self.scale, self.dimension)
    }

    fn prefixed(&self, prefix: &Prefix) -> SiUnit {
        SiUnit::new(
            format!("{}{}", prefix.symbol, self.symbol),
            prefix.factor * self.scale,
            self.dimension,
        )
    }
}

struct Prefix {
    symbol: &'static str,
    name: &'static str,
    factor: f64,
}

/// SI prefixes; multi-character symbols precede their single-character heads.
const PREFIXES: &[Prefix] = &[
    Prefix { symbol: "Q", name: "quetta", factor: 1e30 },
    Prefix { symbol: "R", name: "ronna", factor: 1e27 },
    Prefix { symbol: "Y", name: "yotta", factor: 1e24 },
    Prefix { symbol: "Z", name: "zetta", factor: 1e21 },
    Prefix { symbol: "E", name: "exa", factor: 1e18 },
    Prefix { symbol: "P", name: "peta", factor: 1e15 },
    Prefix { symbol: "T", name: "tera", factor: 1e12 },
    Prefix { symbol: "G", name: "giga", factor: 1e9 },
    Prefix { symbol: "M", name: "mega", factor: 1e6 },
    Prefix { symbol: "k", name: "kilo", factor: 1e3 },
    Prefix { symbol: "h", name: "hecto", factor: 1e2 },
    Prefix { symbol: "da", name: "deca", factor: 1e1 },
    Prefix { symbol: "d", name: "deci", factor: 1e-1 },
    Prefix { symbol: "c", name: "centi", factor: 1e-2 },
    Prefix { symbol: "m", name: "milli", factor: 1e-3 },
    Prefix { symbol: "µ", name: "micro", factor: 1e-6 },
    Prefix { symbol: "μ", name: "micro", factor: 1e-6 },
    Prefix { symbol: "u", name: "micro", factor: 1e-6 },
    Prefix { symbol: "n", name: "nano", factor: 1e-9 },
    Prefix { symbol: "p", name: "pico", factor: 1e-12 },
    Prefix { symbol: "f", name: "femto", factor: 1e-15 },
    Prefix { symbol: "a", name: "atto", factor: 1e-18 },
    Prefix { symbol: "z", name: "zepto", factor: 1e-21 },
    Prefix { symbol: "y", name: "yocto", factor: 1e-24 },
    Prefix { symbol: "r", name: "ronto", factor: 1e-27 },
    Prefix { symbol: "q", name: "quecto", factor: 1e-30 },
];

fn builtin_defs() -> Vec<UnitDef> {
    use SiDimension as D;
    vec![
        // Base units
        UnitDef::new("m", "meter", 1.0, D::LENGTH).prefixable().alias("metre"),
        UnitDef::new("g", "gram", 1e-3, D::MASS).prefixable().alias("gramme"),
        UnitDef::new("s", "second", 1.0, D::TIME).prefixable(),
        UnitDef::new("A", "ampere", 1.0, D::CURRENT).prefixable(),
        UnitDef::new("K", "kelvin", 1.0, D::TEMPERATURE).prefixable(),
        UnitDef::new("mol", "mole", 1.0, D::AMOUNT).prefixable(),
        UnitDef::new("cd", "candela", 1.0, D::LUMINOSITY).prefixable(),
        // Named derived units
        UnitDef::new("Hz", "hertz", 1.0, D::FREQUENCY).prefixable(),
        UnitDef::new("N", "newton", 1.0, D::FORCE).prefixable(),
        UnitDef::new("Pa", "pascal", 1.0, D::PRESSURE).prefixable(),
        UnitDef::new("J", "joule", 1.0, D::ENERGY).prefixable(),
        UnitDef::new("W", "watt", 1.0, D::POWER).prefixable(),
        UnitDef::new("C", "coulomb", 1.0, D::CHARGE).prefixable(),
        UnitDef::new("V", "volt", 1.0, D::VOLTAGE).prefixable(),
        UnitDef::new("Ω", "ohm", 1.0, D::RESISTANCE).prefixable(),
        UnitDef::new("L", "liter", 1e-3, D::VOLUME).prefixable().alias("litre"),
        UnitDef::new("eV", "electronvolt", 1.602_176_634e-19, D::ENERGY).prefixable(),
        // Time
        UnitDef::new("min", "minute", 60.0, D::TIME),
        UnitDef::new("h", "hour", 3_600.0, D::TIME),
        UnitDef::new("d", "day", 86_400.0, D::TIME),
        UnitDef::new("yr", "year", 365.25 * 86_400.0, D::TIME).alias("julian_year"),
        // Length
        UnitDef::new("au", "astronomical_unit", 1.495_978_707e11, D::LENGTH),
        UnitDef::new("ly", "light_year", 9.460_730_472_580_8e15, D::LENGTH),
        UnitDef::new("pc", "parsec", 3.085_677_581_491_367_3e16, D::LENGTH).prefixable(),
        UnitDef::new("in", "inch", 0.0254, D::LENGTH),
        UnitDef::new("ft", "foot", 0.3048, D::LENGTH).alias("feet"),
        UnitDef::new("mi", "mile", 1_609.344, D::LENGTH),
        // Mass
        UnitDef::new("t", "tonne", 1_000.0, D::MASS),
        UnitDef::new("lb", "pound", 0.453_592_37, D::MASS),
        // Dimensionless
        UnitDef::new("rad", "radian", 1.0, D::DIMENSIONLESS).prefixable(),
        UnitDef::new("deg", "degree", PI / 180.0, D::DIMENSIONLESS).alias("°"),
        UnitDef::new("%", "percent", 0.01, D::DIMENSIONLESS),
    ]
}

fn valid_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    match chars.next() {
        Some('%') => symbol.len() == 1,
        Some(c) if c.is_alphabetic() || c == '_' || c == '°' => {
            chars.all(|c| c.is_alphabetic() || c == '_')
        }
        _ => false,
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Symbol/name → [`UnitDef`] table with SI prefix resolution.
///
/// ```rust
/// use metrology_apis_core::Unit;
/// use metrology_si::{SiDimension, UnitRegistry};
///
/// let registry = UnitRegistry::builtin();
/// let speed = registry.parse_unit("km/h").unwrap();
/// assert_eq!(speed.dimension(), SiDimension::VELOCITY);
/// assert!((speed.scale() - 1.0 / 3.6).abs() < 1e-15);
/// assert_eq!(registry.parse_unit("kilometers").unwrap(), registry.parse_unit("km").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    defs: Vec<UnitDef>,
    by_symbol: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl UnitRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in SI table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for def in builtin_defs() {
            if let Err(err) = registry.define(def) {
                log::warn!("skipping built-in unit: {err}");
            }
        }
        registry
    }

    /// Built-in table extended with the `[[unit]]` entries of `text`.
    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::builtin();
        registry.extend_from_toml_str(text)?;
        Ok(registry)
    }

    /// Built-in table extended with the `[[unit]]` entries of the file at `path`.
    ///
    /// # Errors
    /// * [`RegistryError::Read`] if the file cannot be read
    /// * [`RegistryError::Parse`] if it is not valid TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading unit registry from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Adds the `[[unit]]` entries of `text`, returning how many were accepted.
    ///
    /// Entries are resolved in order, so later definitions may use earlier ones.
    pub fn extend_from_toml_str(&mut self, text: &str) -> Result<usize, RegistryError> {
        let file: RegistryFile = toml::from_str(text)?;
        let total = file.units.len();
        let mut added = 0;
        for entry in file.units {
            let symbol = entry.symbol.clone();
            match entry.resolve(self).and_then(|def| self.define(def)) {
                Ok(()) => added += 1,
                Err(err) => log::warn!("skipping unit `{symbol}`: {err}"),
            }
        }
        log::debug!("registered {added} of {total} configured units");
        Ok(added)
    }

    /// Registers one unit.
    ///
    /// # Errors
    /// * [`RegistryError::InvalidSymbol`] if the symbol cannot appear in an expression
    /// * [`RegistryError::InvalidScale`] if the scale is not positive and finite
    /// * [`RegistryError::Duplicate`] if the symbol or a name is taken
    pub fn define(&mut self, def: UnitDef) -> Result<(), RegistryError> {
        if !valid_symbol(&def.symbol) {
            return Err(RegistryError::InvalidSymbol(def.symbol));
        }
        if !(def.scale.is_finite() && def.scale > 0.0) {
            return Err(RegistryError::InvalidScale {
                symbol: def.symbol,
                scale: def.scale,
            });
        }
        let names: Vec<String> = std::iter::once(&def.name)
            .chain(def.aliases.iter())
            .map(|n| n.to_lowercase())
            .collect();
        if self.by_symbol.contains_key(&def.symbol)
            || names.iter().any(|n| self.by_name.contains_key(n))
        {
            return Err(RegistryError::Duplicate(def.symbol));
        }

        let index = self.defs.len();
        self.by_symbol.insert(def.symbol.clone(), index);
        for name in names {
            self.by_name.insert(name, index);
        }
        self.defs.push(def);
        Ok(())
    }

    /// Definition registered under exactly `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&UnitDef> {
        self.by_symbol.get(symbol).map(|&i| &self.defs[i])
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitDef> + '_ {
        self.defs.iter()
    }

    /// Number of definitions (prefixed forms not counted).
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    fn by_name(&self, name: &str) -> Option<&UnitDef> {
        let lower = name.to_lowercase();
        self.by_name
            .get(&lower)
            .or_else(|| lower.strip_suffix('s').and_then(|n| self.by_name.get(n)))
            .map(|&i| &self.defs[i])
    }

    /// Resolves one symbol or name, with prefixes, to a unit.
    ///
    /// Exact symbols win over names, names over prefixed forms.
    pub fn lookup(&self, token: &str) -> Result<SiUnit, ConversionError> {
        if let Some(def) = self.get(token).or_else(|| self.by_name(token)) {
            return Ok(def.unit());
        }
        for prefix in PREFIXES {
            if let Some(def) = token
                .strip_prefix(prefix.symbol)
                .and_then(|rest| self.get(rest))
                .filter(|def| def.prefixable)
            {
                return Ok(def.prefixed(prefix));
            }
        }
        let lower = token.to_lowercase();
        for prefix in PREFIXES {
            if let Some(def) = lower
                .strip_prefix(prefix.name)
                .and_then(|rest| self.by_name(rest))
                .filter(|def| def.prefixable)
            {
                return Ok(def.prefixed(prefix));
            }
        }
        Err(ConversionError::UnknownUnit(token.to_string()))
    }

    /// Parses a unit expression such as `"kg*m/s**2"`; `""` and `"1"` are dimensionless.
    pub fn parse_unit(&self, expression: &str) -> Result<SiUnit, ConversionError> {
        expr::parse(expression, |token| self.lookup(token))
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "unit")]
    units: Vec<UnitEntry>,
}

/// One `[[unit]]` table.
#[derive(Debug, Deserialize)]
struct UnitEntry {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default)]
    dimension: Option<String>,
    #[serde(default)]
    prefixable: bool,
}

impl UnitEntry {
    fn resolve(self, registry: &UnitRegistry) -> Result<UnitDef, RegistryError> {
        let definition_error = |source| RegistryError::Definition {
            symbol: self.symbol.clone(),
            source,
        };
        let (scale, dimension) = match (&self.definition, self.scale, &self.dimension) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(RegistryError::Conflicting(self.symbol));
            }
            (Some(definition), None, None) => {
                let unit = registry.parse_unit(definition).map_err(definition_error)?;
                (unit.scale(), metrology_apis_core::Unit::dimension(&unit))
            }
            (None, scale, Some(label)) => {
                let dimension = SiDimension::from_label(label).map_err(definition_error)?;
                (scale.unwrap_or(1.0), dimension)
            }
            (None, _, None) => return Err(RegistryError::Underspecified(self.symbol)),
        };
        Ok(UnitDef {
            name: self.name.unwrap_or_else(|| self.symbol.clone()),
            symbol: self.symbol,
            aliases: self.aliases,
            dimension,
            scale,
            prefixable: self.prefixable,
        })
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<UnitRegistry>> = Lazy::new(|| {
    let registry = UnitRegistry::builtin();
    log::debug!("built default unit registry with {} units", registry.len());
    Arc::new(registry)
});

/// Shared built-in registry, built on first use.
pub fn default_registry() -> Arc<UnitRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}
