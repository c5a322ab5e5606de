//! Genome configuration.
//!
//! [`GenomeConfig`] is the parameter set consumed by genome construction and
//! the compatibility distance. It derives `serde` so any format can populate
//! it; missing fields fall back to [`Default`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activation::{Activation, ActivationRegistry};

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("genome needs a positive number of inputs")]
    NoInputs,
    #[error("genome needs a positive number of outputs")]
    NoOutputs,
    #[error("activation function {0:?} is not registered")]
    UnknownActivation(String),
    #[error("{name} must be a finite non-negative number, got {value}")]
    InvalidCoefficient { name: &'static str, value: f64 },
    #[error("probability {name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
}

/// Configuration for genome creation and speciation distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeConfig {
    /// Number of input nodes (excluding bias).
    pub num_inputs: usize,
    /// Number of output nodes.
    pub num_outputs: usize,
    /// Activation functions available to hidden and output nodes.
    pub activation_functions: Vec<String>,
    /// Activation given to output nodes of randomly created genomes.
    pub output_activation: String,
    /// Random initial weights are drawn from [-weight_range, weight_range].
    pub weight_range: f64,
    /// Coefficient for excess genes (and node differences) in compatibility distance.
    pub excess_coefficient: f64,
    /// Coefficient for disjoint genes in compatibility distance.
    pub disjoint_coefficient: f64,
    /// Coefficient for mean weight difference of matching links.
    pub weight_coefficient: f64,
    /// Probability of adding a new node during mutation.
    pub add_node_prob: f64,
    /// Probability of adding a new link during mutation.
    pub add_link_prob: f64,
    /// Probability of mutating a link weight.
    pub weight_mutation_prob: f64,
    /// Probability of completely replacing a weight.
    pub weight_replace_prob: f64,
    /// Probability of toggling a link's enabled state.
    pub toggle_enabled_prob: f64,
    /// Probability of mutating a node's activation function.
    pub activation_mutation_prob: f64,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            num_inputs: 2,
            num_outputs: 2,
            activation_functions: vec![
                Activation::Sigmoid.name().to_string(),
                Activation::Relu.name().to_string(),
                Activation::Tanh.name().to_string(),
            ],
            output_activation: Activation::Sigmoid.name().to_string(),
            weight_range: 1.0,
            excess_coefficient: 1.0,
            disjoint_coefficient: 1.0,
            weight_coefficient: 1.0,
            add_node_prob: 0.03,
            add_link_prob: 0.05,
            weight_mutation_prob: 0.8,
            weight_replace_prob: 0.1,
            toggle_enabled_prob: 0.01,
            activation_mutation_prob: 0.1,
        }
    }
}

impl GenomeConfig {
    /// Default configuration with the given input and output counts.
    #[must_use]
    pub fn with_io(num_inputs: usize, num_outputs: usize) -> Self {
        Self {
            num_inputs,
            num_outputs,
            ..Default::default()
        }
    }

    /// Check the input/output counts only.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoInputs`] or [`ConfigError::NoOutputs`] for zero counts.
    pub fn check_shape(&self) -> Result<(), ConfigError> {
        if self.num_inputs == 0 {
            return Err(ConfigError::NoInputs);
        }
        if self.num_outputs == 0 {
            return Err(ConfigError::NoOutputs);
        }
        Ok(())
    }

    /// Check the numeric fields: coefficients and `weight_range` must be finite
    /// and non-negative, probabilities must lie in `[0, 1]`.
    ///
    /// Needs no registry, so genome construction runs it on every config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidCoefficient`] or [`ConfigError::InvalidProbability`]
    /// for the first offending field, in field order.
    pub fn check_values(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("weight_range", self.weight_range),
            ("excess_coefficient", self.excess_coefficient),
            ("disjoint_coefficient", self.disjoint_coefficient),
            ("weight_coefficient", self.weight_coefficient),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCoefficient { name, value });
            }
        }

        for (name, value) in [
            ("add_node_prob", self.add_node_prob),
            ("add_link_prob", self.add_link_prob),
            ("weight_mutation_prob", self.weight_mutation_prob),
            ("weight_replace_prob", self.weight_replace_prob),
            ("toggle_enabled_prob", self.toggle_enabled_prob),
            ("activation_mutation_prob", self.activation_mutation_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        Ok(())
    }

    /// Validate every field against `registry`.
    ///
    /// # Errors
    ///
    /// The first violated constraint: shape, then activation names, then
    /// [`check_values`](Self::check_values).
    pub fn validate(&self, registry: &ActivationRegistry) -> Result<(), ConfigError> {
        self.check_shape()?;

        for name in self
            .activation_functions
            .iter()
            .chain(std::iter::once(&self.output_activation))
        {
            if !registry.is_registered(name) {
                return Err(ConfigError::UnknownActivation(name.clone()));
            }
        }

        self.check_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let registry = ActivationRegistry::default();
        assert_eq!(GenomeConfig::default().validate(&registry), Ok(()));
    }

    #[test]
    fn test_shape_requires_inputs_and_outputs() {
        assert_eq!(
            GenomeConfig::with_io(0, 2).check_shape(),
            Err(ConfigError::NoInputs)
        );
        assert_eq!(
            GenomeConfig::with_io(2, 0).check_shape(),
            Err(ConfigError::NoOutputs)
        );
        assert_eq!(GenomeConfig::with_io(3, 1).check_shape(), Ok(()));
    }

    #[test]
    fn test_unknown_activation_rejected() {
        let registry = ActivationRegistry::default();
        let config = GenomeConfig {
            activation_functions: vec!["sigmoid".into(), "swish".into()],
            ..GenomeConfig::default()
        };
        assert_eq!(
            config.validate(&registry),
            Err(ConfigError::UnknownActivation("swish".into()))
        );

        let config = GenomeConfig {
            output_activation: "swish".into(),
            ..GenomeConfig::default()
        };
        assert!(config.validate(&registry).is_err());
    }

    #[test]
    fn test_probability_bounds() {
        let registry = ActivationRegistry::default();
        let config = GenomeConfig {
            toggle_enabled_prob: 1.5,
            ..GenomeConfig::default()
        };
        assert_eq!(
            config.validate(&registry),
            Err(ConfigError::InvalidProbability {
                name: "toggle_enabled_prob",
                value: 1.5
            })
        );

        let config = GenomeConfig {
            add_node_prob: -0.1,
            ..GenomeConfig::default()
        };
        assert!(config.validate(&registry).is_err());
    }

    #[test]
    fn test_negative_coefficient_rejected() {
        let registry = ActivationRegistry::default();
        let config = GenomeConfig {
            disjoint_coefficient: -1.0,
            ..GenomeConfig::default()
        };
        assert!(matches!(
            config.validate(&registry),
            Err(ConfigError::InvalidCoefficient {
                name: "disjoint_coefficient",
                ..
            })
        ));

        let config = GenomeConfig {
            weight_coefficient: f64::NAN,
            ..GenomeConfig::default()
        };
        assert!(config.validate(&registry).is_err());
    }

    #[test]
    fn test_check_values_needs_no_registry() {
        assert_eq!(GenomeConfig::default().check_values(), Ok(()));

        let config = GenomeConfig {
            excess_coefficient: -5.0,
            ..GenomeConfig::default()
        };
        assert_eq!(
            config.check_values(),
            Err(ConfigError::InvalidCoefficient {
                name: "excess_coefficient",
                value: -5.0
            })
        );

        // unknown names are not its concern
        let config = GenomeConfig {
            output_activation: "swish".into(),
            ..GenomeConfig::default()
        };
        assert_eq!(config.check_values(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GenomeConfig =
            serde_json::from_str(r#"{"num_inputs": 3, "weight_coefficient": 0.4}"#).unwrap();
        assert_eq!(config.num_inputs, 3);
        assert_eq!(config.num_outputs, GenomeConfig::default().num_outputs);
        assert!((config.weight_coefficient - 0.4).abs() < 1e-12);
    }
}
