//! Node id and innovation number allocation.
//!
//! Counters live in an [`IdAllocator`] value instead of process-wide statics,
//! so each evolutionary run (or test) owns its own numbering. Share one
//! allocator across every genome of a run to keep innovation numbers comparable;
//! construct genomes from several threads by wrapping it in a lock.

use serde::{Deserialize, Serialize};

use crate::activation::ActivationRegistry;
use crate::gene::{GeneError, Innovation, LinkGene, NodeGene, NodeId, NodeRole, BIAS_NODE_ID};
use crate::genome::Genome;

/// Monotonic source of node ids and innovation numbers.
///
/// Node ids start at 1 because id 0 is the implicit bias node. Innovation
/// numbers start at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_node: NodeId,
    next_innovation: Innovation,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_node: BIAS_NODE_ID + 1,
            next_innovation: 0,
        }
    }

    /// Resume numbering from explicit starting points.
    ///
    /// A `next_node` of 0 is bumped to 1 so the bias id is never handed out.
    #[must_use]
    pub fn starting_at(next_node: NodeId, next_innovation: Innovation) -> Self {
        Self {
            next_node: next_node.max(BIAS_NODE_ID + 1),
            next_innovation,
        }
    }

    /// Take the next node id.
    pub fn next_node_id(&mut self) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        id
    }

    /// Take the next innovation number.
    pub fn next_innovation(&mut self) -> Innovation {
        let innovation = self.next_innovation;
        self.next_innovation += 1;
        innovation
    }

    /// The id the next call to [`next_node_id`](Self::next_node_id) returns.
    #[must_use]
    pub fn peek_node_id(&self) -> NodeId {
        self.next_node
    }

    /// The number the next call to [`next_innovation`](Self::next_innovation) returns.
    #[must_use]
    pub fn peek_innovation(&self) -> Innovation {
        self.next_innovation
    }

    /// Create a node gene with a fresh id.
    ///
    /// No id is consumed if the gene is rejected.
    ///
    /// # Errors
    ///
    /// See [`NodeGene::new`].
    pub fn node(
        &mut self,
        role: NodeRole,
        activation: &str,
        registry: &ActivationRegistry,
    ) -> Result<NodeGene, GeneError> {
        let gene = NodeGene::new(self.next_node, role, activation, registry)?;
        self.next_node += 1;
        Ok(gene)
    }

    /// Create an enabled link gene with a fresh innovation number.
    ///
    /// No innovation number is consumed if the gene is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`GeneError::SelfLoop`] if `src == sink`.
    pub fn link(&mut self, src: NodeId, sink: NodeId, weight: f64) -> Result<LinkGene, GeneError> {
        let gene = LinkGene::new(src, sink, weight, self.next_innovation)?;
        self.next_innovation += 1;
        Ok(gene)
    }

    /// Advance both counters past every id and innovation used by `genome`.
    ///
    /// Call this after reconstructing genomes from stored genes so that later
    /// allocations never collide with them.
    pub fn observe(&mut self, genome: &Genome) {
        if let Some(max_id) = genome.node_genes().map(NodeGene::id).max() {
            self.next_node = self.next_node.max(max_id + 1);
        }
        if let Some(max_inn) = genome.links().iter().map(LinkGene::innovation).max() {
            self.next_innovation = self.next_innovation.max(max_inn + 1);
        }
    }
}
