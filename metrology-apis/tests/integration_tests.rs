//! Contract-level behaviour of the reference implementation, exercised through generic code.

use approx::assert_relative_eq;
use metrology_apis::si::{SiDimension, SiNamespace, SiQuantity, SiUnit};
use metrology_apis::{
    CapabilitySet, ConversionError, Dimension, HasMetrologyNamespace, Introspect,
    MetrologyNamespace, Operation, Protocol, Quantity, QuantityArg, Unit, VersionError,
    API_VERSION,
};
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Generic consumers
// ─────────────────────────────────────────────────────────────────────────────

/// Coerces `label` and checks it against `dimension` using only the object's namespace.
fn unit_has_dimension<T>(obj: &T, label: &str, dimension: &str) -> bool
where
    T: HasMetrologyNamespace,
{
    let ns = match obj.metrology_namespace(None) {
        Ok(ns) => ns,
        Err(_) => return false,
    };
    match (ns.asunit(label.into()), ns.asdimension(dimension.into())) {
        (Ok(unit), Ok(dim)) => unit.dimension() == dim,
        _ => false,
    }
}

fn square<D: Dimension>(d: &D) -> D {
    d.powi(2)
}

fn ns() -> SiNamespace {
    SiNamespace::new()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn metre_has_length_dimension() {
    let ns = ns();
    assert_eq!(
        ns.asunit("m".into()).unwrap().dimension(),
        ns.asdimension("length".into()).unwrap()
    );
    assert!(unit_has_dimension(&SiDimension::LENGTH, "m", "length"));
    assert!(unit_has_dimension(&SiUnit::one(), "km/h", "velocity"));
    assert!(!unit_has_dimension(&SiUnit::one(), "s", "length"));
}

#[test]
fn tagged_value_and_unit_composition() {
    let ns = ns();
    let m = ns.asunit("m".into()).unwrap();
    let s = ns.asunit("s".into()).unwrap();

    let one_m = ns.asquantity(QuantityArg::Value(1.0), &m).unwrap();
    assert_eq!(*one_m.value(), 1.0);
    assert_eq!(one_m.unit(), &m);

    let one_s = ns.asquantity(QuantityArg::Value(1.0), &s).unwrap();
    let speed = one_m.div(&one_s).unwrap();
    assert_eq!(speed.unit(), &(m / s));
}

#[test]
fn quantity_conformance_requires_eq() {
    let caps = CapabilitySet::of_protocol(Protocol::Quantity).without(Operation::Eq);
    let err = Protocol::Quantity.check(&caps).unwrap_err();
    assert_eq!(err.missing, vec![Operation::Eq]);

    let q = SiQuantity::new(1.0, SiUnit::one());
    assert!(q.check_conformance(Protocol::Quantity).is_ok());
}

#[test]
fn quantity_conformance_depends_on_the_value_type() {
    let err = Protocol::Quantity
        .check(&CapabilitySet::of_quantity::<SiQuantity<u32>>())
        .unwrap_err();
    assert_eq!(err.missing, vec![Operation::Neg]);
    assert!(Protocol::Quantity.conforms(&CapabilitySet::of_quantity::<SiQuantity<i64>>()));

    let samples = SiQuantity::new(vec![1.0, 2.0], SiUnit::one());
    let err = samples.check_conformance(Protocol::Quantity).unwrap_err();
    assert!(err.missing.contains(&Operation::Add));
    assert!(samples.check_conformance(Protocol::HasMetrologyNamespace).is_ok());
}

#[test]
fn unknown_api_version_is_rejected() {
    let q = SiQuantity::new(1.0, SiUnit::one());
    match q.metrology_namespace(Some("9999.1")) {
        Err(VersionError::Unsupported { requested, supported }) => {
            assert_eq!(requested, "9999.1");
            assert_eq!(supported, "1.0");
        }
        other => panic!("expected an unsupported version, got {other:?}"),
    }
    assert!(matches!(
        SiDimension::LENGTH.metrology_namespace(Some("1.x")),
        Err(VersionError::Malformed(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Contract properties
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn implementation_speaks_the_current_api() {
    assert_eq!(ns().api_version().to_string(), API_VERSION);
}

#[test]
fn discovery_is_idempotent() {
    let q = SiQuantity::new(2.0, "km".parse().unwrap());
    let a = q.metrology_namespace(Some("1.0")).unwrap();
    let b = q.metrology_namespace(Some("1.0")).unwrap();
    assert_eq!(a.api_version(), b.api_version());
    for label in ["m", "kg*m/s**2", "mi/h", "%"] {
        assert_eq!(a.asunit(label.into()).unwrap(), b.asunit(label.into()).unwrap());
    }
    assert_eq!(
        a.asunit("furlong".into()).unwrap_err(),
        b.asunit("furlong".into()).unwrap_err()
    );
}

#[test]
fn every_si_type_conforms() {
    let ns = ns();
    let m = ns.asunit("m".into()).unwrap();
    let q = ns.asquantity(QuantityArg::Value(1.0), &m).unwrap();

    assert!(SiDimension::FORCE.check_conformance(Protocol::Dimension).is_ok());
    assert!(m.check_conformance(Protocol::Unit).is_ok());
    assert!(q.check_conformance(Protocol::Quantity).is_ok());
    assert!(ns.check_conformance(Protocol::MetrologyNamespace).is_ok());
    for obj in [
        SiDimension::FORCE.capabilities(),
        m.capabilities(),
        q.capabilities(),
        ns.capabilities(),
    ] {
        assert!(Protocol::HasMetrologyNamespace.conforms(&obj));
    }
}

#[test]
fn quantity_accessors_are_stable() {
    let q = SiQuantity::new(7.5_f64, "N".parse().unwrap());
    assert!(q.equals(&q).unwrap());
    assert_eq!(q.value(), q.value());
    assert_eq!(q.unit(), q.unit());
    assert_eq!(q.unit().dimension(), SiDimension::FORCE);
}

#[test]
fn namespaces_never_cross_types() {
    let ns = ns();
    assert!(matches!(
        ns.asunit_any(&3.0_f64),
        Err(ConversionError::UnsupportedType { target: "unit" })
    ));
    assert!(matches!(
        ns.asdimension_any(&SiUnit::one()),
        Err(ConversionError::UnsupportedType { target: "dimension" })
    ));
}

#[test]
fn squares_through_the_generic_contract() {
    assert_eq!(square(&SiDimension::LENGTH), SiDimension::AREA);
    let m: SiUnit = "m".parse().unwrap();
    assert_eq!(m.powi(2).unwrap(), "m**2".parse::<SiUnit>().unwrap());
    assert_relative_eq!("km".parse::<SiUnit>().unwrap().powi(2).unwrap().scale(), 1e6);
}

#[test]
fn quantities_serialize_with_their_unit() {
    let q = SiQuantity::new(9.81, "m/s**2".parse().unwrap());
    let json = serde_json::to_string(&q).unwrap();
    assert_eq!(json, r#"{"value":9.81,"unit":"m/s^2"}"#);
    let back: SiQuantity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, q);
}

// ─────────────────────────────────────────────────────────────────────────────
// Property tests
// ─────────────────────────────────────────────────────────────────────────────

const LABELS: &[&str] = &["m", "km", "s", "h", "kg", "N", "J", "W", "Pa", "Hz", "mol", "K"];

fn si_unit() -> impl Strategy<Value = SiUnit> {
    proptest::sample::select(LABELS).prop_map(|label| label.parse::<SiUnit>().unwrap())
}

proptest! {
    #[test]
    fn prop_dimension_product_commutes(a in si_unit(), b in si_unit()) {
        let (da, db) = (a.dimension(), b.dimension());
        prop_assert_eq!(da * db, db * da);
        prop_assert_eq!((da / db) * db, da);
        prop_assert!(da.powi(0).is_dimensionless());
    }

    #[test]
    fn prop_powi_is_repeated_multiplication(a in si_unit(), n in 0i32..5) {
        let d = a.dimension();
        let repeated = (0..n).fold(SiDimension::dimensionless(), |acc, _| acc * d);
        prop_assert_eq!(d.powi(n), repeated);
    }

    #[test]
    fn prop_unit_dimension_is_multiplicative(a in si_unit(), b in si_unit()) {
        prop_assert_eq!(a.multiply(&b).dimension(), a.dimension() * b.dimension());
    }

    #[test]
    fn prop_asquantity_roundtrips(value in -1e9f64..1e9, u in si_unit()) {
        let ns = ns();
        let first = ns.asquantity(QuantityArg::Value(value), &u).unwrap();
        let again = ns.asquantity(QuantityArg::Value(*first.value()), &u).unwrap();
        prop_assert_eq!(again, first);
    }
}
