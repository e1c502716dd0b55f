//! The SI namespace: coercions into [`SiDimension`], [`SiUnit`] and [`SiQuantity`].

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use metrology_apis_core::{
    ApiVersion, CapabilitySet, ConversionError, DimensionArg, HasMetrologyNamespace, Introspect,
    MetrologyNamespace, QuantityArg, SupportedVersions, UnitArg, VersionError,
};

use crate::dimension::SiDimension;
use crate::quantity::{Rescale, SiQuantity};
use crate::registry::{default_registry, UnitRegistry};
use crate::unit::SiUnit;

/// API versions this crate implements.
pub static SUPPORTED_VERSIONS: SupportedVersions = SupportedVersions::new(&["1.0"]);

/// Coercion functions over the SI types, for quantities carrying `V` values.
///
/// Unit expressions are resolved through the namespace's [`UnitRegistry`]; the default is the
/// shared built-in table.
///
/// ```rust
/// use metrology_apis_core::{MetrologyNamespace, QuantityArg, Quantity};
/// use metrology_si::SiNamespace;
///
/// let ns = SiNamespace::<f64>::new();
/// let km = ns.asunit("km".into()).unwrap();
/// let m = ns.asunit("m".into()).unwrap();
///
/// let d = ns.asquantity(QuantityArg::Value(2.0), &km).unwrap();
/// let d = ns.asquantity(QuantityArg::Quantity(d), &m).unwrap();
/// assert_eq!(*d.value(), 2000.0);
/// ```
pub struct SiNamespace<V = f64> {
    registry: Arc<UnitRegistry>,
    version: ApiVersion,
    _value: PhantomData<fn() -> V>,
}

impl<V> SiNamespace<V> {
    /// Latest version over the default registry.
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }

    /// Latest version over `registry`.
    pub fn with_registry(registry: Arc<UnitRegistry>) -> Self {
        Self {
            registry,
            version: SUPPORTED_VERSIONS
                .latest()
                .unwrap_or_else(|| ApiVersion::from_components([1, 0])),
            _value: PhantomData,
        }
    }

    /// Namespace for `api_version`, or the latest version when `None`.
    ///
    /// # Errors
    ///
    /// [`VersionError`] when the token is malformed or not in [`SUPPORTED_VERSIONS`].
    pub fn for_version(api_version: Option<&str>) -> Result<Self, VersionError> {
        Self::new().versioned(api_version)
    }

    fn versioned(mut self, api_version: Option<&str>) -> Result<Self, VersionError> {
        self.version = SUPPORTED_VERSIONS.resolve(api_version)?;
        Ok(self)
    }

    /// Registry used by [`MetrologyNamespace::asunit`].
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }
}

impl<V> Default for SiNamespace<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for SiNamespace<V> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            version: self.version.clone(),
            _value: PhantomData,
        }
    }
}

impl<V> fmt::Debug for SiNamespace<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiNamespace")
            .field("version", &self.version)
            .field("units", &self.registry.len())
            .finish()
    }
}

impl<V: Rescale> MetrologyNamespace for SiNamespace<V> {
    type Value = V;
    type Dimension = SiDimension;
    type Unit = SiUnit;
    type Quantity = SiQuantity<V>;

    fn api_version(&self) -> ApiVersion {
        self.version.clone()
    }

    fn asdimension(&self, obj: DimensionArg<'_, SiDimension>) -> Result<SiDimension, ConversionError> {
        match obj {
            DimensionArg::Label(label) => SiDimension::from_label(label),
            DimensionArg::Dimension(dim) => Ok(dim),
        }
    }

    fn asunit(&self, obj: UnitArg<'_, SiUnit>) -> Result<SiUnit, ConversionError> {
        match obj {
            UnitArg::Label(label) => self.registry.parse_unit(label),
            UnitArg::Unit(unit) => Ok(unit),
        }
    }

    /// Raw values are tagged; quantities are converted into `unit`.
    fn asquantity(
        &self,
        obj: QuantityArg<SiQuantity<V>, V>,
        unit: &SiUnit,
    ) -> Result<SiQuantity<V>, ConversionError> {
        match obj {
            QuantityArg::Value(value) => Ok(SiQuantity::new(value, unit.clone())),
            QuantityArg::Quantity(quantity) => quantity.to(unit),
        }
    }
}

/// A namespace discovers itself, keeping its registry.
impl<V: Rescale> HasMetrologyNamespace for SiNamespace<V> {
    type Namespace = SiNamespace<V>;

    fn metrology_namespace(&self, api_version: Option<&str>) -> Result<SiNamespace<V>, VersionError> {
        self.clone().versioned(api_version)
    }
}

impl<V: Rescale> Introspect for SiNamespace<V> {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of_namespace::<Self>().union(&CapabilitySet::of_discoverable::<Self>())
    }
}
