//! # NEAT Genome
//!
//! The genome core of NeuroEvolution of Augmenting Topologies (NEAT):
//! validated genomes, the speciation distance between them, and compilation
//! into feed-forward phenotypes that can be evaluated repeatedly.
//!
//! ## Features
//!
//! - **Validated genomes**: a [`Genome`] cannot exist with duplicate ids,
//!   duplicate links, dangling endpoints or links into inputs and the bias
//! - **Owned numbering**: node ids and innovation numbers come from an
//!   [`IdAllocator`] owned by the caller instead of process-wide counters
//! - **Named activations**: genes store activation names, resolved through an
//!   [`ActivationRegistry`] that can be extended with custom functions
//! - **Layered phenotypes**: enabled links are layered into a topological
//!   order; nodes that cannot be ordered are left out and reported
//!
//! ## Quick Start
//!
//! ```rust
//! use neat_genome::{ActivationRegistry, Genome, GenomeConfig, IdAllocator, Phenotype};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = GenomeConfig::with_io(2, 1);
//! let registry = ActivationRegistry::default();
//! let mut ids = IdAllocator::new();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//!
//! let a = Genome::random(&config, &registry, &mut ids, &mut rng).unwrap();
//! let b = Genome::random(&config, &registry, &mut ids, &mut rng).unwrap();
//! assert_eq!(a.input_ids(), b.input_ids());
//! assert!(a.distance(&b) >= 0.0);
//!
//! let mut phenotype = Phenotype::new(&a).unwrap();
//! let output = phenotype.evaluate(&[0.5, -0.5]).unwrap();
//! assert_eq!(output.len(), 1);
//! ```
//!
//! ## Architecture
//!
//! ### Bias node
//!
//! Node id 0 is the bias. It is never stored as a gene, always evaluates to
//! 1.0, and may only appear as the source of a link.
//!
//! ### Evaluation buffer
//!
//! A [`Phenotype`] keeps one value per node id, sized one past the largest
//! id it references. The buffer is cleared on every call, so evaluation has
//! no memory between calls.

pub mod activation;
pub mod config;
pub mod evaluator;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod topology;

// Re-exports for convenience
pub use activation::{Activation, ActivationError, ActivationFn, ActivationRegistry};
pub use config::{ConfigError, GenomeConfig};
pub use evaluator::{NodeEval, Phenotype, PhenotypeError};
pub use gene::{GeneError, Innovation, LinkGene, NodeGene, NodeId, NodeRole, BIAS_NODE_ID};
pub use genome::{Genome, GenomeError};
pub use innovation::IdAllocator;
pub use topology::FeedForwardLayers;
