//! Feed-forward phenotype for NEAT genomes.
//!
//! A [`Phenotype`] is compiled once from a validated [`Genome`] and then
//! evaluated any number of times. Node values live in a scratch buffer indexed
//! directly by node id, with slot 0 holding the bias.

use std::collections::HashMap;

use thiserror::Error;

use crate::activation::{ActivationError, ActivationFn, ActivationRegistry};
use crate::gene::{NodeGene, NodeId, BIAS_NODE_ID};
use crate::genome::Genome;
use crate::topology::FeedForwardLayers;

/// Errors raised while compiling or evaluating a phenotype.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhenotypeError {
    /// Wrong number of input values.
    #[error("expected {expected} inputs, got {found}")]
    InputArity { expected: usize, found: usize },
    /// Output buffer of the wrong length.
    #[error("expected an output buffer of length {expected}, got {found}")]
    OutputArity { expected: usize, found: usize },
    /// A node names an activation the registry cannot resolve.
    #[error(transparent)]
    Activation(#[from] ActivationError),
}

/// One compiled node: its activation and enabled incoming (source, weight) pairs.
#[derive(Debug, Clone)]
pub struct NodeEval {
    pub node: NodeId,
    pub activation: ActivationFn,
    pub inputs: Vec<(NodeId, f64)>,
}

/// A compiled, evaluation-ready feed-forward network.
#[derive(Debug, Clone)]
pub struct Phenotype {
    layers: FeedForwardLayers,
    node_evals: Vec<NodeEval>,
    input_ids: Vec<NodeId>,
    output_ids: Vec<NodeId>,
    values: Vec<f64>,
}

impl Phenotype {
    /// Compile `genome` with the standard activation functions.
    ///
    /// # Errors
    ///
    /// Returns [`PhenotypeError::Activation`] if a placed node uses a name the
    /// default registry does not know.
    pub fn new(genome: &Genome) -> Result<Self, PhenotypeError> {
        Self::with_registry(genome, &ActivationRegistry::default())
    }

    /// Compile `genome`, resolving activation names through `registry`.
    ///
    /// Nodes that the layering never places are skipped and logged; their
    /// buffer slots read 0 during evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`PhenotypeError::Activation`] if a placed node's activation is
    /// not registered.
    pub fn with_registry(
        genome: &Genome,
        registry: &ActivationRegistry,
    ) -> Result<Self, PhenotypeError> {
        let layers = FeedForwardLayers::build(genome);

        let mut incoming: HashMap<NodeId, Vec<(NodeId, f64)>> = HashMap::new();
        for link in genome.links().iter().filter(|l| l.enabled()) {
            incoming
                .entry(link.sink())
                .or_default()
                .push((link.src(), link.weight()));
        }
        let genes: HashMap<NodeId, &NodeGene> = genome.node_genes().map(|n| (n.id(), n)).collect();

        let mut node_evals = Vec::new();
        for node in layers.placed() {
            let Some(gene) = genes.get(&node) else {
                continue;
            };
            node_evals.push(NodeEval {
                node,
                activation: registry.resolve(gene.activation())?,
                inputs: incoming.remove(&node).unwrap_or_default(),
            });
        }

        let input_ids = genome.input_ids();
        let output_ids = genome.output_ids();

        let max_id = node_evals
            .iter()
            .flat_map(|e| std::iter::once(e.node).chain(e.inputs.iter().map(|&(src, _)| src)))
            .chain(input_ids.iter().copied())
            .chain(output_ids.iter().copied())
            .max()
            .unwrap_or(BIAS_NODE_ID);

        if !layers.omitted().is_empty() {
            tracing::warn!(
                omitted = ?layers.omitted(),
                "phenotype leaves nodes out of evaluation"
            );
        }
        tracing::debug!(
            layers = layers.depth(),
            nodes = node_evals.len(),
            buffer = max_id + 1,
            "compiled phenotype"
        );

        Ok(Self {
            layers,
            node_evals,
            input_ids,
            output_ids,
            values: vec![0.0; max_id + 1],
        })
    }

    /// Run one forward pass, writing the outputs into `outputs`.
    ///
    /// The buffer is reset first, so each call is independent of the previous one.
    ///
    /// # Errors
    ///
    /// [`PhenotypeError::InputArity`] or [`PhenotypeError::OutputArity`] if a
    /// slice has the wrong length. Nothing is written in that case.
    pub fn evaluate_into(
        &mut self,
        inputs: &[f64],
        outputs: &mut [f64],
    ) -> Result<(), PhenotypeError> {
        if inputs.len() != self.input_ids.len() {
            return Err(PhenotypeError::InputArity {
                expected: self.input_ids.len(),
                found: inputs.len(),
            });
        }
        if outputs.len() != self.output_ids.len() {
            return Err(PhenotypeError::OutputArity {
                expected: self.output_ids.len(),
                found: outputs.len(),
            });
        }

        let values = &mut self.values;
        values.fill(0.0);
        values[BIAS_NODE_ID] = 1.0;
        for (&id, &value) in self.input_ids.iter().zip(inputs) {
            values[id] = value;
        }

        for eval in &self.node_evals {
            let sum: f64 = eval.inputs.iter().map(|&(src, w)| values[src] * w).sum();
            values[eval.node] = (eval.activation)(sum);
        }

        for (out, &id) in outputs.iter_mut().zip(&self.output_ids) {
            *out = values[id];
        }
        Ok(())
    }

    /// Run one forward pass and return the output values in output-node order.
    ///
    /// # Errors
    ///
    /// [`PhenotypeError::InputArity`] if `inputs` does not have one value per input node.
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<Vec<f64>, PhenotypeError> {
        let mut outputs = vec![0.0; self.output_ids.len()];
        self.evaluate_into(inputs, &mut outputs)?;
        Ok(outputs)
    }

    #[must_use]
    pub fn layers(&self) -> &[Vec<NodeId>] {
        self.layers.layers()
    }

    /// Hidden and output nodes excluded from evaluation.
    #[must_use]
    pub fn omitted_nodes(&self) -> &[NodeId] {
        self.layers.omitted()
    }

    /// Compiled nodes in evaluation order.
    #[must_use]
    pub fn node_evals(&self) -> &[NodeEval] {
        &self.node_evals
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.input_ids.len()
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.output_ids.len()
    }

    /// Length of the value buffer: one past the largest node id referenced.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.values.len()
    }
}
