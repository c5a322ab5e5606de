//! Activation functions for NEAT networks.
//!
//! Node genes refer to their transfer function by name. The names are resolved
//! through an [`ActivationRegistry`], which ships with the standard set below and
//! accepts user-registered functions under new names.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A pure scalar transfer function.
pub type ActivationFn = fn(f64) -> f64;

/// Inputs to the transcendental functions are clamped to this magnitude.
const TRANSCENDENTAL_CLAMP: f64 = 60.0;

/// Lower bound applied before taking the natural log.
const LOG_FLOOR: f64 = 1e-7;

/// Errors raised when looking up activation functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    /// No function is registered under the requested name.
    #[error("no such activation function: {0:?}")]
    Unknown(String),
}

/// The standard activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Logistic sigmoid: f(z) = 1 / (1 + e^(-z)), z clamped to [-60, 60]
    Sigmoid,
    /// Hyperbolic tangent, z clamped to [-60, 60]
    Tanh,
    /// Sine, z clamped to [-60, 60]
    Sin,
    /// Normal density: f(z) = e^(-z²/2) / √(2π), z clamped to [-60, 60]
    Gauss,
    /// Rectified linear unit: z if z > 0 else 0
    Relu,
    /// f(z) = z
    Identity,
    /// z clamped to [-1, 1]
    Clamped,
    /// 1/z, with 0 mapped to 0
    Inv,
    /// Natural log of max(z, 1e-7)
    Log,
    /// e^z, z clamped to [-60, 60]
    Exp,
    /// |z|
    Abs,
    /// max(0, 1 - |z|)
    Hat,
    /// z²
    Square,
    /// z³
    Cube,
}

impl Activation {
    /// All standard activation functions.
    pub const ALL: [Self; 14] = [
        Self::Sigmoid,
        Self::Tanh,
        Self::Sin,
        Self::Gauss,
        Self::Relu,
        Self::Identity,
        Self::Clamped,
        Self::Inv,
        Self::Log,
        Self::Exp,
        Self::Abs,
        Self::Hat,
        Self::Square,
        Self::Cube,
    ];

    /// The configuration name of this function.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Sin => "sin",
            Self::Gauss => "gauss",
            Self::Relu => "relu",
            Self::Identity => "identity",
            Self::Clamped => "clamped",
            Self::Inv => "inv",
            Self::Log => "log",
            Self::Exp => "exp",
            Self::Abs => "abs",
            Self::Hat => "hat",
            Self::Square => "square",
            Self::Cube => "cube",
        }
    }

    /// The plain function pointer for this activation.
    #[must_use]
    pub fn function(self) -> ActivationFn {
        match self {
            Self::Sigmoid => sigmoid,
            Self::Tanh => tanh,
            Self::Sin => sin,
            Self::Gauss => gauss,
            Self::Relu => relu,
            Self::Identity => identity,
            Self::Clamped => clamped,
            Self::Inv => inv,
            Self::Log => log,
            Self::Exp => exp,
            Self::Abs => abs,
            Self::Hat => hat,
            Self::Square => square,
            Self::Cube => cube,
        }
    }

    /// Apply this activation function to an input value.
    #[inline]
    #[must_use]
    pub fn apply(self, z: f64) -> f64 {
        (self.function())(z)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = ActivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| ActivationError::Unknown(s.to_string()))
    }
}

#[inline]
fn clamp_transcendental(z: f64) -> f64 {
    z.clamp(-TRANSCENDENTAL_CLAMP, TRANSCENDENTAL_CLAMP)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-clamp_transcendental(z)).exp())
}

fn tanh(z: f64) -> f64 {
    clamp_transcendental(z).tanh()
}

fn sin(z: f64) -> f64 {
    clamp_transcendental(z).sin()
}

fn gauss(z: f64) -> f64 {
    let z = clamp_transcendental(z);
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn relu(z: f64) -> f64 {
    if z > 0.0 {
        z
    } else {
        0.0
    }
}

fn identity(z: f64) -> f64 {
    z
}

fn clamped(z: f64) -> f64 {
    z.clamp(-1.0, 1.0)
}

fn inv(z: f64) -> f64 {
    if z == 0.0 {
        0.0
    } else {
        1.0 / z
    }
}

fn log(z: f64) -> f64 {
    z.max(LOG_FLOOR).ln()
}

fn exp(z: f64) -> f64 {
    clamp_transcendental(z).exp()
}

fn abs(z: f64) -> f64 {
    z.abs()
}

fn hat(z: f64) -> f64 {
    (1.0 - z.abs()).max(0.0)
}

fn square(z: f64) -> f64 {
    z * z
}

fn cube(z: f64) -> f64 {
    z * z * z
}

/// Named lookup table of activation functions.
///
/// [`Default`] yields a registry holding every [`Activation`] under its
/// configuration name. Registering an existing name replaces the previous
/// function.
#[derive(Clone)]
pub struct ActivationRegistry {
    functions: HashMap<String, ActivationFn>,
}

impl ActivationRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Store `function` under `name`. Last writer wins.
    pub fn register(&mut self, name: impl Into<String>, function: ActivationFn) {
        self.functions.insert(name.into(), function);
    }

    /// Look up the function registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Unknown`] if nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<ActivationFn, ActivationError> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| ActivationError::Unknown(name.to_string()))
    }

    /// Whether a function is registered under `name`.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for ActivationRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        for activation in Activation::ALL {
            registry.register(activation.name(), activation.function());
        }
        registry
    }
}

impl fmt::Debug for ActivationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationRegistry")
            .field("names", &self.names())
            .finish()
    }
}
