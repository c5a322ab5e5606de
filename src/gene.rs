//! Gene types for NEAT genomes.
//!
//! This module defines the fundamental building blocks of NEAT networks:
//! - [`NodeGene`]: Represents neurons in the network
//! - [`LinkGene`]: Represents weighted connections between nodes
//!
//! Identifiers are unsigned, so negative node ids and innovation numbers
//! cannot be expressed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activation::{Activation, ActivationRegistry};

/// Identifier of a node within a genome.
pub type NodeId = usize;

/// Lineage marker of a link gene, used to align homologous links.
pub type Innovation = u64;

/// Id reserved for the implicit bias node, whose value is always 1.0.
pub const BIAS_NODE_ID: NodeId = 0;

/// Errors raised when constructing a single gene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneError {
    /// A link may not connect a node to itself.
    #[error("link {0} -> {0} is a self-loop")]
    SelfLoop(NodeId),
    /// The activation name is not present in the registry.
    #[error("node {id} uses unknown activation function {name:?}")]
    UnknownActivation {
        /// The offending node.
        id: NodeId,
        /// The unresolved activation name.
        name: String,
    },
    /// The bias node is implicit and cannot be supplied as a gene.
    #[error("bias node cannot be created explicitly (requested id {0})")]
    ExplicitBias(NodeId),
}

/// The role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Input node - receives external values, no activation applied.
    Input,
    /// Output node - produces final network output.
    Output,
    /// Hidden node - internal processing node added through mutation.
    Hidden,
    /// Bias node - always outputs 1.0. Only ever the implicit node 0.
    Bias,
}

/// A node gene representing a neuron in the NEAT network.
///
/// Deserialization rejects the bias role and resets inputs to the identity
/// activation. Activation names of other nodes are resolved when a phenotype
/// is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord")]
pub struct NodeGene {
    id: NodeId,
    role: NodeRole,
    activation: String,
}

impl NodeGene {
    /// Create an input node. Inputs always carry the identity activation.
    #[must_use]
    pub fn input(id: NodeId) -> Self {
        Self {
            id,
            role: NodeRole::Input,
            activation: Activation::Identity.name().to_string(),
        }
    }

    /// Create a node gene with the given role and activation name.
    ///
    /// The activation is ignored for [`NodeRole::Input`].
    ///
    /// # Errors
    ///
    /// - [`GeneError::ExplicitBias`] for [`NodeRole::Bias`]
    /// - [`GeneError::UnknownActivation`] if an output or hidden node names an
    ///   activation that `registry` does not know
    pub fn new(
        id: NodeId,
        role: NodeRole,
        activation: &str,
        registry: &ActivationRegistry,
    ) -> Result<Self, GeneError> {
        match role {
            NodeRole::Input => Ok(Self::input(id)),
            NodeRole::Bias => Err(GeneError::ExplicitBias(id)),
            NodeRole::Output | NodeRole::Hidden => {
                if !registry.is_registered(activation) {
                    return Err(GeneError::UnknownActivation {
                        id,
                        name: activation.to_string(),
                    });
                }
                Ok(Self {
                    id,
                    role,
                    activation: activation.to_string(),
                })
            }
        }
    }

    /// Create an output node.
    ///
    /// # Errors
    ///
    /// See [`NodeGene::new`].
    pub fn output(
        id: NodeId,
        activation: &str,
        registry: &ActivationRegistry,
    ) -> Result<Self, GeneError> {
        Self::new(id, NodeRole::Output, activation, registry)
    }

    /// Create a hidden node.
    ///
    /// # Errors
    ///
    /// See [`NodeGene::new`].
    pub fn hidden(
        id: NodeId,
        activation: &str,
        registry: &ActivationRegistry,
    ) -> Result<Self, GeneError> {
        Self::new(id, NodeRole::Hidden, activation, registry)
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Name of the activation function applied to this node's input sum.
    #[must_use]
    pub fn activation(&self) -> &str {
        &self.activation
    }
}

/// A link gene representing a weighted connection between two nodes.
///
/// Disabled links are skipped during evaluation but still take part in
/// compatibility distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LinkRecord")]
pub struct LinkGene {
    src: NodeId,
    sink: NodeId,
    weight: f64,
    enabled: bool,
    innovation: Innovation,
}

impl LinkGene {
    /// Create an enabled link.
    ///
    /// # Errors
    ///
    /// Returns [`GeneError::SelfLoop`] if `src == sink`.
    pub fn new(
        src: NodeId,
        sink: NodeId,
        weight: f64,
        innovation: Innovation,
    ) -> Result<Self, GeneError> {
        if src == sink {
            return Err(GeneError::SelfLoop(src));
        }
        Ok(Self {
            src,
            sink,
            weight,
            enabled: true,
            innovation,
        })
    }

    /// Builder-style enabled flag.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn src(&self) -> NodeId {
        self.src
    }

    #[must_use]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// The (src, sink) pair.
    #[must_use]
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.src, self.sink)
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Unvalidated wire form of a [`NodeGene`].
#[derive(Deserialize)]
struct NodeRecord {
    id: NodeId,
    role: NodeRole,
    activation: String,
}

impl TryFrom<NodeRecord> for NodeGene {
    type Error = GeneError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        match record.role {
            NodeRole::Input => Ok(NodeGene::input(record.id)),
            NodeRole::Bias => Err(GeneError::ExplicitBias(record.id)),
            NodeRole::Output | NodeRole::Hidden => Ok(Self {
                id: record.id,
                role: record.role,
                activation: record.activation,
            }),
        }
    }
}

/// Unvalidated wire form of a [`LinkGene`].
#[derive(Deserialize)]
struct LinkRecord {
    src: NodeId,
    sink: NodeId,
    weight: f64,
    enabled: bool,
    innovation: Innovation,
}

impl TryFrom<LinkRecord> for LinkGene {
    type Error = GeneError;

    fn try_from(record: LinkRecord) -> Result<Self, Self::Error> {
        Ok(LinkGene::new(record.src, record.sink, record.weight, record.innovation)?
            .with_enabled(record.enabled))
    }
}
