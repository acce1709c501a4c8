//! Host-evaluated transcendentals. The registry is keyed by
//! (intrinsic name, result type, argument types) and populated once
//! from what the Rust host provides. A missing entry is not an error;
//! the folder reports "cannot be folded on host" and leaves the call.
//!
//! Rust's standard library covers the inverse/hyperbolic trigonometric
//! family, exp/log/sqrt, atan2, and hypot. The Bessel, erf, and gamma
//! families have no host binding, so those names stay unregistered.

use ff_core::types::{Kind, TypeCategory};
use ff_core::value::{ComplexValue, RealValue, Scalar};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

pub type HostProcedure = Arc<dyn Fn(&[&Scalar]) -> Option<Scalar> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HostKey {
    name: String,
    result: (TypeCategory, Kind),
    args: Vec<(TypeCategory, Kind)>,
}

pub struct HostIntrinsicLibrary {
    procedures: HashMap<HostKey, HostProcedure>,
}

/// Real kinds the host can evaluate at full precision.
const HOST_REAL_KINDS: &[Kind] = &[4, 8];

const UNARY_REAL: &[(&str, fn(f64) -> f64)] = &[
    ("acos", f64::acos),
    ("acosh", f64::acosh),
    ("asin", f64::asin),
    ("asinh", f64::asinh),
    ("atan", f64::atan),
    ("atanh", f64::atanh),
    ("cos", f64::cos),
    ("cosh", f64::cosh),
    ("exp", f64::exp),
    ("log", f64::ln),
    ("log10", f64::log10),
    ("sin", f64::sin),
    ("sinh", f64::sinh),
    ("sqrt", f64::sqrt),
    ("tan", f64::tan),
    ("tanh", f64::tanh),
];

// atan2 registers under "atan": the folder queries the two-argument
// form by that name.
const BINARY_REAL: &[(&str, fn(f64, f64) -> f64)] = &[
    ("atan", f64::atan2),
    ("hypot", f64::hypot),
    ("mod", |a, b| a % b),
];

const UNARY_COMPLEX: &[(&str, fn(f64, f64) -> (f64, f64))] = &[
    ("sqrt", complex_sqrt),
    ("exp", complex_exp),
    ("log", complex_log),
];

impl HostIntrinsicLibrary {
    pub fn new() -> Self {
        let mut library = Self {
            procedures: HashMap::new(),
        };
        for &kind in HOST_REAL_KINDS {
            for &(name, f) in UNARY_REAL {
                library.register_unary_real(name, kind, f);
            }
            for &(name, f) in BINARY_REAL {
                library.register_binary_real(name, kind, f);
            }
            for &(name, f) in UNARY_COMPLEX {
                library.register_unary_complex(name, kind, f);
            }
            library.register_complex_abs(kind);
        }
        tracing::debug!(
            "host intrinsic library registered {} procedures",
            library.procedures.len()
        );
        library
    }

    /// The process-wide registry, built on first use.
    pub fn shared() -> Arc<HostIntrinsicLibrary> {
        static SHARED: Lazy<Arc<HostIntrinsicLibrary>> =
            Lazy::new(|| Arc::new(HostIntrinsicLibrary::new()));
        SHARED.clone()
    }

    pub fn procedure(
        &self,
        name: &str,
        result: (TypeCategory, Kind),
        args: &[(TypeCategory, Kind)],
    ) -> Option<HostProcedure> {
        self.procedures
            .get(&HostKey {
                name: name.to_string(),
                result,
                args: args.to_vec(),
            })
            .cloned()
    }

    fn register(&mut self, key: HostKey, procedure: HostProcedure) {
        self.procedures.insert(key, procedure);
    }

    fn register_unary_real(&mut self, name: &str, kind: Kind, f: fn(f64) -> f64) {
        self.register(
            HostKey {
                name: name.to_string(),
                result: (TypeCategory::Real, kind),
                args: vec![(TypeCategory::Real, kind)],
            },
            Arc::new(move |args| {
                let x = args.first()?.as_real()?;
                Some(Scalar::Real(RealValue::new(kind, f(x.value()))))
            }),
        );
    }

    fn register_binary_real(&mut self, name: &str, kind: Kind, f: fn(f64, f64) -> f64) {
        self.register(
            HostKey {
                name: name.to_string(),
                result: (TypeCategory::Real, kind),
                args: vec![(TypeCategory::Real, kind), (TypeCategory::Real, kind)],
            },
            Arc::new(move |args| {
                let x = args.first()?.as_real()?;
                let y = args.get(1)?.as_real()?;
                Some(Scalar::Real(RealValue::new(kind, f(x.value(), y.value()))))
            }),
        );
    }

    fn register_unary_complex(&mut self, name: &str, kind: Kind, f: fn(f64, f64) -> (f64, f64)) {
        self.register(
            HostKey {
                name: name.to_string(),
                result: (TypeCategory::Complex, kind),
                args: vec![(TypeCategory::Complex, kind)],
            },
            Arc::new(move |args| {
                let z = args.first()?.as_complex()?;
                let (re, im) = f(z.re().value(), z.im().value());
                Some(Scalar::Complex(ComplexValue::new(
                    RealValue::new(kind, re),
                    RealValue::new(kind, im),
                )))
            }),
        );
    }

    fn register_complex_abs(&mut self, kind: Kind) {
        self.register(
            HostKey {
                name: "abs".to_string(),
                result: (TypeCategory::Real, kind),
                args: vec![(TypeCategory::Complex, kind)],
            },
            Arc::new(move |args| {
                let z = args.first()?.as_complex()?;
                Some(Scalar::Real(RealValue::new(
                    kind,
                    z.re().value().hypot(z.im().value()),
                )))
            }),
        );
    }
}

impl Default for HostIntrinsicLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn complex_sqrt(re: f64, im: f64) -> (f64, f64) {
    let r = re.hypot(im);
    let root_re = ((r + re) / 2.0).sqrt();
    let root_im = ((r - re) / 2.0).sqrt();
    (root_re, if im < 0.0 { -root_im } else { root_im })
}

fn complex_exp(re: f64, im: f64) -> (f64, f64) {
    let magnitude = re.exp();
    (magnitude * im.cos(), magnitude * im.sin())
}

fn complex_log(re: f64, im: f64) -> (f64, f64) {
    (re.hypot(im).ln(), im.atan2(re))
}
