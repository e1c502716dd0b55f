//! Smoke check: a library quantity is usable through the generic contract alone.
//!
//! Run with: cargo run -p metrology-apis --example smoke

use core::fmt::Display;

use metrology_apis::si::SiQuantity;
use metrology_apis::ops::CanEq;
use metrology_apis::Quantity;

fn show_eq<Q>(q: &Q, same: &Q::Rebind<Q::Value>)
where
    Q: Quantity,
    Q::Value: CanEq,
    <Q::Value as CanEq>::Output: Display,
{
    match q.equals(same) {
        Ok(eq) => println!("{eq}"),
        Err(err) => println!("error: {err}"),
    }
}

fn show_unit<Q>(q: &Q)
where
    Q: Quantity,
    Q::Unit: Display,
{
    println!("{}", q.unit());
}

fn show_value<Q>(q: &Q)
where
    Q: Quantity,
    Q::Value: Display,
{
    println!("{}", q.value());
}

fn main() {
    let q = SiQuantity::new(1.0, "m".parse().unwrap());
    show_eq(&q, &q);
    show_unit(&q);
    show_value(&q);
}
