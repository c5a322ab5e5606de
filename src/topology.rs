//! Feed-forward layering of a genome's enabled links.
//!
//! Starting from the inputs and the bias, each layer holds every node whose
//! enabled predecessors have all been placed in earlier layers. Nodes that
//! can never satisfy that rule (unreachable nodes, or nodes on a cycle) are
//! left out of every layer and reported as omitted.
//!
//! ## Determinism
//!
//! Each layer is sorted by node id, so the evaluation order depends only on
//! the genome's structure and never on hash iteration order.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::gene::{LinkGene, NodeGene, NodeId, BIAS_NODE_ID};
use crate::genome::Genome;

/// Evaluation layers computed from a genome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedForwardLayers {
    layers: Vec<Vec<NodeId>>,
    omitted: Vec<NodeId>,
}

impl FeedForwardLayers {
    /// Layer the graph given by `links`, treating `inputs` and the bias as
    /// already evaluated.
    ///
    /// `links` are (src, sink) pairs and should contain enabled links only.
    /// Terminates on any input: every round either grows the placed set or stops.
    #[must_use]
    pub fn compute(inputs: &[NodeId], links: &[(NodeId, NodeId)]) -> Vec<Vec<NodeId>> {
        let mut predecessors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for &(src, sink) in links {
            predecessors.entry(sink).or_default().push(src);
        }

        let mut visited: HashSet<NodeId> = inputs
            .iter()
            .copied()
            .chain(std::iter::once(BIAS_NODE_ID))
            .collect();
        let mut layers = Vec::new();

        loop {
            let mut candidates: BTreeSet<NodeId> = links
                .iter()
                .filter(|(src, sink)| visited.contains(src) && !visited.contains(sink))
                .map(|&(_, sink)| sink)
                .collect();

            candidates.retain(|node| {
                predecessors
                    .get(node)
                    .is_some_and(|preds| preds.iter().all(|p| visited.contains(p)))
            });

            if candidates.is_empty() {
                break;
            }

            let layer: Vec<NodeId> = candidates.into_iter().collect();
            visited.extend(layer.iter().copied());
            layers.push(layer);
        }

        layers
    }

    /// Layer a genome over its enabled links.
    ///
    /// Hidden and output nodes that end up in no layer are recorded in
    /// [`omitted`](Self::omitted), in genome order.
    #[must_use]
    pub fn build(genome: &Genome) -> Self {
        let enabled: Vec<(NodeId, NodeId)> = genome
            .links()
            .iter()
            .filter(|l| l.enabled())
            .map(LinkGene::endpoints)
            .collect();
        let layers = Self::compute(&genome.input_ids(), &enabled);

        let placed: HashSet<NodeId> = layers.iter().flatten().copied().collect();
        let omitted = genome
            .hidden_genes()
            .iter()
            .chain(genome.output_genes())
            .map(NodeGene::id)
            .filter(|id| !placed.contains(id))
            .collect();

        Self { layers, omitted }
    }

    #[must_use]
    pub fn layers(&self) -> &[Vec<NodeId>] {
        &self.layers
    }

    /// Hidden and output nodes that were never placed.
    #[must_use]
    pub fn omitted(&self) -> &[NodeId] {
        &self.omitted
    }

    /// Placed nodes in evaluation order.
    pub fn placed(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.layers.iter().flatten().copied()
    }

    /// Number of layers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Index of the layer holding `node`, if it was placed.
    #[must_use]
    pub fn layer_of(&self, node: NodeId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.contains(&node))
    }
}
