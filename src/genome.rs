//! NEAT genome: node and link genes plus their structural invariants.
//!
//! A [`Genome`] is only ever handed out after validation, so every accessor
//! can rely on these invariants:
//!
//! 1. node ids are unique (and none uses the bias id 0)
//! 2. no two links join the same pair of nodes, in either direction
//! 3. every link endpoint is an existing node or the bias
//! 4. no link sinks into an input or the bias
//! 5. the input/output gene counts match the configuration

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activation::ActivationRegistry;
use crate::config::{ConfigError, GenomeConfig};
use crate::gene::{GeneError, LinkGene, NodeGene, NodeId, NodeRole, BIAS_NODE_ID};
use crate::innovation::IdAllocator;

/// Errors raised when a genome fails construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gene(#[from] GeneError),
    #[error("node id 0 is reserved for the bias node")]
    ReservedNodeId,
    #[error("genome has duplicate node id {0}")]
    DuplicateNodeId(NodeId),
    #[error("genome has duplicate link between {src} and {sink}")]
    DuplicateLink { src: NodeId, sink: NodeId },
    #[error("link {src} -> {sink} connects to missing node {missing}")]
    MissingNode {
        src: NodeId,
        sink: NodeId,
        missing: NodeId,
    },
    #[error("link {src} -> {sink} sinks into an input")]
    SinkIsInput { src: NodeId, sink: NodeId },
    #[error("link {src} -> 0 sinks into the bias")]
    SinkIsBias { src: NodeId },
    #[error("expected {expected} input genes, found {found}")]
    InputCountMismatch { expected: usize, found: usize },
    #[error("expected {expected} output genes, found {found}")]
    OutputCountMismatch { expected: usize, found: usize },
}

/// A NEAT genome: node genes partitioned by role, and link genes.
///
/// Constructed either from explicit genes with [`Genome::new`] or as a
/// fully-connected minimal network with [`Genome::random`]. Fitness is the only
/// field that may change after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GenomeRecord", into = "GenomeRecord")]
pub struct Genome {
    config: GenomeConfig,
    input_genes: Vec<NodeGene>,
    hidden_genes: Vec<NodeGene>,
    output_genes: Vec<NodeGene>,
    links: Vec<LinkGene>,
    n_links: usize,
    fitness: f64,
}

impl Genome {
    /// Build a genome from explicit node and link genes.
    ///
    /// Nodes are partitioned by role keeping their relative order; links are
    /// kept exactly as given.
    ///
    /// # Errors
    ///
    /// The first violated invariant, checked in the order listed in the module
    /// docs. No partially valid genome is ever returned.
    pub fn new(
        config: &GenomeConfig,
        nodes: Vec<NodeGene>,
        links: Vec<LinkGene>,
    ) -> Result<Self, GenomeError> {
        config.check_shape()?;
        config.check_values()?;

        let mut genome = Self {
            config: config.clone(),
            input_genes: Vec::with_capacity(config.num_inputs),
            hidden_genes: Vec::new(),
            output_genes: Vec::with_capacity(config.num_outputs),
            n_links: links.len(),
            links,
            fitness: 0.0,
        };

        for gene in nodes {
            match gene.role() {
                NodeRole::Input => genome.input_genes.push(gene),
                NodeRole::Hidden => genome.hidden_genes.push(gene),
                NodeRole::Output => genome.output_genes.push(gene),
                NodeRole::Bias => return Err(GeneError::ExplicitBias(gene.id()).into()),
            }
        }

        if let Err(err) = genome.validate() {
            tracing::debug!(error = %err, "rejected genome");
            return Err(err);
        }
        Ok(genome)
    }

    /// Create a minimal fully-connected genome.
    ///
    /// Inputs always get ids `1..=num_inputs` and outputs the next
    /// `num_outputs` ids, so every random genome built from one configuration
    /// shares its input and output nodes. For every output, one link from the
    /// bias is added followed by one link from each input. Weights are uniform
    /// in `[-weight_range, weight_range]`.
    ///
    /// Only innovation numbers are drawn from `ids`; its node counter is then
    /// moved past the input and output ids.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not pass [`GenomeConfig::validate`] against
    /// `registry`.
    pub fn random<R: Rng>(
        config: &GenomeConfig,
        registry: &ActivationRegistry,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Result<Self, GenomeError> {
        config.validate(registry)?;

        let first_output = BIAS_NODE_ID + 1 + config.num_inputs;
        let inputs: Vec<NodeGene> = (BIAS_NODE_ID + 1..first_output)
            .map(NodeGene::input)
            .collect();
        let outputs = (first_output..first_output + config.num_outputs)
            .map(|id| NodeGene::output(id, &config.output_activation, registry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut links = Vec::with_capacity(config.num_outputs * (config.num_inputs + 1));
        for output in &outputs {
            let weight = random_weight(rng, config.weight_range);
            links.push(ids.link(BIAS_NODE_ID, output.id(), weight)?);
            for input in &inputs {
                let weight = random_weight(rng, config.weight_range);
                links.push(ids.link(input.id(), output.id(), weight)?);
            }
        }

        let nodes = inputs.into_iter().chain(outputs).collect();
        let genome = Self::new(config, nodes, links)?;
        ids.observe(&genome);
        tracing::debug!(
            inputs = config.num_inputs,
            outputs = config.num_outputs,
            links = genome.n_links,
            "created random genome"
        );
        Ok(genome)
    }

    fn validate(&self) -> Result<(), GenomeError> {
        if self.node_genes().any(|n| n.id() == BIAS_NODE_ID) {
            return Err(GenomeError::ReservedNodeId);
        }
        if let Some(id) = self.find_duplicate_node_id() {
            return Err(GenomeError::DuplicateNodeId(id));
        }
        if let Some((src, sink)) = self.find_duplicate_link() {
            return Err(GenomeError::DuplicateLink { src, sink });
        }
        self.check_links_have_valid_nodes()?;

        if self.input_genes.len() != self.config.num_inputs {
            return Err(GenomeError::InputCountMismatch {
                expected: self.config.num_inputs,
                found: self.input_genes.len(),
            });
        }
        if self.output_genes.len() != self.config.num_outputs {
            return Err(GenomeError::OutputCountMismatch {
                expected: self.config.num_outputs,
                found: self.output_genes.len(),
            });
        }
        Ok(())
    }

    fn find_duplicate_node_id(&self) -> Option<NodeId> {
        let mut seen = HashSet::with_capacity(self.node_count());
        self.node_genes()
            .map(NodeGene::id)
            .find(|&id| !seen.insert(id))
    }

    /// First link whose unordered endpoint pair was already seen.
    fn find_duplicate_link(&self) -> Option<(NodeId, NodeId)> {
        let mut seen = HashSet::with_capacity(self.links.len());
        self.links
            .iter()
            .map(LinkGene::endpoints)
            .find(|&(src, sink)| !seen.insert((src.min(sink), src.max(sink))))
    }

    /// Checks that links only touch existing nodes and never sink into
    /// inputs or the bias.
    fn check_links_have_valid_nodes(&self) -> Result<(), GenomeError> {
        let inputs: HashSet<NodeId> = self.input_genes.iter().map(NodeGene::id).collect();
        let known: HashSet<NodeId> = self
            .node_genes()
            .map(NodeGene::id)
            .chain(std::iter::once(BIAS_NODE_ID))
            .collect();

        for link in &self.links {
            let (src, sink) = link.endpoints();
            for endpoint in [src, sink] {
                if !known.contains(&endpoint) {
                    return Err(GenomeError::MissingNode {
                        src,
                        sink,
                        missing: endpoint,
                    });
                }
            }
            if inputs.contains(&sink) {
                return Err(GenomeError::SinkIsInput { src, sink });
            }
            if sink == BIAS_NODE_ID {
                return Err(GenomeError::SinkIsBias { src });
            }
        }
        Ok(())
    }

    /// Whether two node genes share an id. Always false for a constructed genome.
    #[must_use]
    pub fn has_duplicate_node_ids(&self) -> bool {
        self.find_duplicate_node_id().is_some()
    }

    /// Whether two links join the same pair of nodes in either direction.
    /// Always false for a constructed genome.
    #[must_use]
    pub fn has_duplicate_links(&self) -> bool {
        self.find_duplicate_link().is_some()
    }

    /// Compatibility distance to another genome, used for speciation.
    ///
    /// The genome with more links is aligned against the other (ties keep
    /// `self` first). Node differences, excess and disjoint links, and the mean
    /// weight difference of matching links are combined with the coefficients
    /// of `self`'s configuration. Identical genomes are exactly 0 apart.
    #[must_use]
    pub fn distance(&self, other: &Genome) -> f64 {
        let (g1, g2) = if other.links.len() > self.links.len() {
            (other, self)
        } else {
            (self, other)
        };
        let config = &self.config;

        // Node genes: one pass keyed by id over the symmetric difference.
        let g2_nodes: HashMap<NodeId, &str> = g2
            .node_genes()
            .map(|n| (n.id(), n.activation()))
            .collect();
        let mut excess_nodes = 0usize;
        let mut activation_diff = 0usize;
        let mut common_nodes = 0usize;
        for node in g1.node_genes() {
            match g2_nodes.get(&node.id()) {
                Some(&activation) => {
                    common_nodes += 1;
                    if activation != node.activation() {
                        activation_diff += 1;
                    }
                }
                None => excess_nodes += 1,
            }
        }
        excess_nodes += g2_nodes.len() - common_nodes;

        let most_nodes = g1.node_count().max(g2_nodes.len()).max(1) as f64;
        let mut distance =
            config.excess_coefficient * (excess_nodes + activation_diff) as f64 / most_nodes;

        // Link genes, aligned by endpoints.
        if !g1.links.is_empty() {
            let n_genes = g1.links.len() as f64;
            let g2_links: HashMap<(NodeId, NodeId), &LinkGene> =
                g2.links.iter().map(|l| (l.endpoints(), l)).collect();
            let max_innovation_g2 = g2.links.iter().map(LinkGene::innovation).max();

            let mut weight_diff = 0.0;
            let mut matching = 0usize;
            let mut disjoint = 0usize;
            let mut excess = 0usize;

            for link1 in &g1.links {
                match g2_links.get(&link1.endpoints()) {
                    Some(link2) => {
                        weight_diff += (link1.weight() - link2.weight()).abs();
                        matching += 1;
                        if link1.enabled() != link2.enabled() {
                            weight_diff += 1.0;
                        }
                    }
                    None => match max_innovation_g2 {
                        Some(max) if link1.innovation() > max => excess += 1,
                        _ => disjoint += 1,
                    },
                }
            }
            disjoint += g2.links.len().saturating_sub(matching);

            distance += config.excess_coefficient * excess as f64 / n_genes;
            distance += config.disjoint_coefficient * disjoint as f64 / n_genes;
            if matching > 0 {
                distance += config.weight_coefficient * (weight_diff / matching as f64);
            }
        }

        distance
    }

    /// Complexity: (hidden node count, enabled link count).
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        let enabled_links = self.links.iter().filter(|l| l.enabled()).count();
        (self.hidden_genes.len(), enabled_links)
    }

    /// Node gene with the given id. The bias id 0 is never stored and yields `None`.
    #[must_use]
    pub fn node_by_id(&self, id: NodeId) -> Option<&NodeGene> {
        if id == BIAS_NODE_ID {
            return None;
        }
        self.node_genes().find(|n| n.id() == id)
    }

    /// Link gene from `src` to `sink`, if present.
    #[must_use]
    pub fn link_by_src_sink(&self, src: NodeId, sink: NodeId) -> Option<&LinkGene> {
        self.links
            .iter()
            .find(|l| l.src() == src && l.sink() == sink)
    }

    /// Role of a node id, including the implicit bias.
    #[must_use]
    pub fn role_of(&self, id: NodeId) -> Option<NodeRole> {
        if id == BIAS_NODE_ID {
            return Some(NodeRole::Bias);
        }
        self.node_by_id(id).map(NodeGene::role)
    }

    /// All node genes: inputs, then hidden, then outputs.
    pub fn node_genes(&self) -> impl Iterator<Item = &NodeGene> + '_ {
        self.input_genes
            .iter()
            .chain(&self.hidden_genes)
            .chain(&self.output_genes)
    }

    /// Number of stored node genes (the bias is not counted).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.input_genes.len() + self.hidden_genes.len() + self.output_genes.len()
    }

    #[must_use]
    pub fn input_genes(&self) -> &[NodeGene] {
        &self.input_genes
    }

    #[must_use]
    pub fn hidden_genes(&self) -> &[NodeGene] {
        &self.hidden_genes
    }

    #[must_use]
    pub fn output_genes(&self) -> &[NodeGene] {
        &self.output_genes
    }

    /// Input node ids in registration order.
    #[must_use]
    pub fn input_ids(&self) -> Vec<NodeId> {
        self.input_genes.iter().map(NodeGene::id).collect()
    }

    /// Output node ids in registration order.
    #[must_use]
    pub fn output_ids(&self) -> Vec<NodeId> {
        self.output_genes.iter().map(NodeGene::id).collect()
    }

    #[must_use]
    pub fn links(&self) -> &[LinkGene] {
        &self.links
    }

    /// Number of link genes, enabled or not.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.n_links
    }

    #[must_use]
    pub fn config(&self) -> &GenomeConfig {
        &self.config
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

fn random_weight<R: Rng>(rng: &mut R, range: f64) -> f64 {
    rng.random::<f64>() * 2.0 * range - range
}

/// Wire form of a [`Genome`]; deserialization re-runs full validation.
#[derive(Serialize, Deserialize)]
struct GenomeRecord {
    config: GenomeConfig,
    nodes: Vec<NodeGene>,
    links: Vec<LinkGene>,
    #[serde(default)]
    fitness: f64,
}

impl From<Genome> for GenomeRecord {
    fn from(genome: Genome) -> Self {
        let Genome {
            config,
            input_genes,
            hidden_genes,
            output_genes,
            links,
            fitness,
            ..
        } = genome;
        Self {
            config,
            nodes: input_genes
                .into_iter()
                .chain(hidden_genes)
                .chain(output_genes)
                .collect(),
            links,
            fitness,
        }
    }
}

impl TryFrom<GenomeRecord> for Genome {
    type Error = GenomeError;

    fn try_from(record: GenomeRecord) -> Result<Self, Self::Error> {
        let mut genome = Genome::new(&record.config, record.nodes, record.links)?;
        genome.fitness = record.fitness;
        Ok(genome)
    }
}
