//! Integration tests for neat-genome.

use neat_genome::{
    Activation, ActivationRegistry, Genome, GenomeConfig, GenomeError, IdAllocator, LinkGene,
    NodeGene, NodeId, NodeRole, Phenotype, PhenotypeError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn link(src: NodeId, sink: NodeId, weight: f64, innovation: u64) -> LinkGene {
    LinkGene::new(src, sink, weight, innovation).unwrap()
}

fn io_nodes(activation: &str) -> Vec<NodeGene> {
    let registry = ActivationRegistry::default();
    vec![
        NodeGene::input(1),
        NodeGene::input(2),
        NodeGene::output(3, activation, &registry).unwrap(),
        NodeGene::output(4, activation, &registry).unwrap(),
    ]
}

fn identity_genome() -> Genome {
    let links = vec![
        link(1, 3, 1.0, 0),
        link(2, 3, 1.0, 1),
        link(1, 4, 1.0, 2),
        link(2, 4, 1.0, 3),
        link(0, 3, 1.0, 4),
        link(0, 4, 1.0, 5),
    ];
    Genome::new(&GenomeConfig::with_io(2, 2), io_nodes("identity"), links).unwrap()
}

#[test]
fn test_identity_network_adds_bias_and_inputs() {
    let mut phenotype = Phenotype::new(&identity_genome()).unwrap();
    assert_eq!(phenotype.evaluate(&[1.0, 1.0]).unwrap(), vec![3.0, 3.0]);
}

#[test]
fn test_identity_network_rejects_three_inputs() {
    let mut phenotype = Phenotype::new(&identity_genome()).unwrap();
    let result = phenotype.evaluate(&[1.0, 1.0, 1.0]);
    assert_eq!(
        result,
        Err(PhenotypeError::InputArity {
            expected: 2,
            found: 3
        })
    );
}

#[test]
fn test_repeated_bias_link_is_malformed() {
    let links = vec![link(0, 3, 1.0, 0), link(0, 3, 1.0, 1)];
    let err = Genome::new(&GenomeConfig::with_io(2, 2), io_nodes("sigmoid"), links).unwrap_err();
    assert!(matches!(err, GenomeError::DuplicateLink { src: 0, sink: 3 }));
}

#[test]
fn test_link_from_output_into_input_is_malformed() {
    let links = vec![link(3, 2, 1.0, 0)];
    let err = Genome::new(&GenomeConfig::with_io(2, 2), io_nodes("sigmoid"), links).unwrap_err();
    assert!(matches!(err, GenomeError::SinkIsInput { src: 3, sink: 2 }));
    assert!(err.to_string().contains("sinks into an input"));
}

#[test]
fn test_random_population_is_valid_and_evaluable() {
    let config = GenomeConfig::with_io(4, 3);
    let registry = ActivationRegistry::default();
    let mut ids = IdAllocator::new();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let population: Vec<Genome> = (0..10)
        .map(|_| Genome::random(&config, &registry, &mut ids, &mut rng).unwrap())
        .collect();

    for genome in &population {
        assert_eq!(genome.size(), (0, 3 * 5));
        assert!(!genome.has_duplicate_links());

        let mut phenotype = Phenotype::new(genome).unwrap();
        let output = phenotype.evaluate(&[0.5, -0.5, 0.25, 1.0]).unwrap();
        assert_eq!(output.len(), 3);
        // sigmoid outputs
        assert!(output.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    for a in &population {
        assert_eq!(a.distance(a), 0.0);
        for b in &population {
            assert!(a.distance(b) >= 0.0);
        }
    }
}

#[test]
fn test_distance_grows_with_weight_differences() {
    let config = GenomeConfig::with_io(2, 2);
    let base = identity_genome();

    let mut links = base.links().to_vec();
    links[0].set_weight(1.5);
    let nudged = Genome::new(&config, io_nodes("identity"), links.clone()).unwrap();

    links[1].set_weight(3.0);
    let shifted = Genome::new(&config, io_nodes("identity"), links).unwrap();

    let near = base.distance(&nudged);
    let far = base.distance(&shifted);
    assert!(near > 0.0);
    assert!(far > near);
}

#[test]
fn test_distance_uses_callers_coefficients() {
    let scaled = GenomeConfig {
        weight_coefficient: 10.0,
        ..GenomeConfig::with_io(2, 2)
    };
    let base = identity_genome();
    let mut links = base.links().to_vec();
    links[0].set_weight(2.0);
    let other = Genome::new(&scaled, io_nodes("identity"), links).unwrap();

    // mean weight difference over 6 matching links is 1/6
    assert!((base.distance(&other) - 1.0 / 6.0).abs() < 1e-12);
    assert!((other.distance(&base) - 10.0 / 6.0).abs() < 1e-12);
}

#[test]
fn test_disabled_link_changes_phenotype_not_gene_count() {
    let mut links = identity_genome().links().to_vec();
    links[4].set_enabled(false);
    let genome = Genome::new(&GenomeConfig::with_io(2, 2), io_nodes("identity"), links).unwrap();

    assert_eq!(genome.link_count(), 6);
    assert_eq!(genome.size(), (0, 5));

    let mut phenotype = Phenotype::new(&genome).unwrap();
    assert_eq!(phenotype.evaluate(&[1.0, 1.0]).unwrap(), vec![2.0, 3.0]);
}

#[test]
fn test_hidden_nodes_evaluated_in_layer_order() {
    let registry = ActivationRegistry::default();
    let mut nodes = io_nodes("identity");
    nodes.push(NodeGene::hidden(5, "square", &registry).unwrap());
    nodes.push(NodeGene::hidden(6, "abs", &registry).unwrap());

    // 1 -> 5 -> 6 -> 3, with 2 feeding 6 and 4 directly
    let links = vec![
        link(1, 5, 1.0, 0),
        link(5, 6, -1.0, 1),
        link(2, 6, 1.0, 2),
        link(6, 3, 2.0, 3),
        link(2, 4, 0.5, 4),
    ];
    let genome = Genome::new(&GenomeConfig::with_io(2, 2), nodes, links).unwrap();
    let mut phenotype = Phenotype::new(&genome).unwrap();

    assert_eq!(phenotype.layers(), &[vec![4, 5], vec![6], vec![3]]);
    // 3 = 2 * |2 - 3^2| = 14, 4 = 0.5 * 2
    assert_eq!(phenotype.evaluate(&[3.0, 2.0]).unwrap(), vec![14.0, 1.0]);
}

#[test]
fn test_custom_activation_end_to_end() {
    let mut registry = ActivationRegistry::default();
    registry.register("negate", |x| -x);

    let config = GenomeConfig {
        output_activation: "negate".into(),
        weight_range: 0.0,
        ..GenomeConfig::with_io(2, 1)
    };
    config.validate(&registry).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let genome = Genome::random(&config, &registry, &mut IdAllocator::new(), &mut rng).unwrap();
    assert_eq!(genome.output_genes()[0].activation(), "negate");

    let mut phenotype = Phenotype::with_registry(&genome, &registry).unwrap();
    let output = phenotype.evaluate(&[1.0, 2.0]).unwrap();
    assert_eq!(output.len(), 1);
    assert!(output[0].abs() < 1e-12);
}

#[test]
fn test_deserialized_genome_continues_numbering() {
    let config = GenomeConfig::with_io(2, 1);
    let registry = ActivationRegistry::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut ids = IdAllocator::new();
    let genome = Genome::random(&config, &registry, &mut ids, &mut rng).unwrap();

    let json = serde_json::to_string(&genome).unwrap();
    let restored: Genome = serde_json::from_str(&json).unwrap();

    let mut resumed = IdAllocator::new();
    resumed.observe(&restored);
    assert_eq!(resumed, ids);

    let hidden = resumed
        .node(NodeRole::Hidden, Activation::Tanh.name(), &registry)
        .unwrap();
    assert!(restored.node_by_id(hidden.id()).is_none());
}

#[test]
fn test_tampered_json_is_rejected() {
    let json = r#"{
        "config": {"num_inputs": 1, "num_outputs": 1},
        "nodes": [
            {"id": 1, "role": "Input", "activation": "identity"},
            {"id": 2, "role": "Output", "activation": "sigmoid"}
        ],
        "links": [
            {"src": 2, "sink": 0, "weight": 1.0, "enabled": true, "innovation": 0}
        ]
    }"#;
    let err = serde_json::from_str::<Genome>(json).unwrap_err();
    assert!(err.to_string().contains("sinks into the bias"));

    let json = r#"{
        "config": {"num_inputs": 1, "num_outputs": 1},
        "nodes": [
            {"id": 1, "role": "Input", "activation": "identity"},
            {"id": 2, "role": "Output", "activation": "sigmoid"}
        ],
        "links": [
            {"src": 1, "sink": 2, "weight": 0.5, "enabled": true, "innovation": 0}
        ],
        "fitness": 3.5
    }"#;
    let genome: Genome = serde_json::from_str(json).unwrap();
    assert_eq!(genome.fitness(), 3.5);
    assert_eq!(genome.link_by_src_sink(1, 2).map(LinkGene::weight), Some(0.5));
}

#[test]
fn test_stored_input_activation_does_not_affect_distance() {
    let json = r#"{
        "config": {"num_inputs": 1, "num_outputs": 1},
        "nodes": [
            {"id": 1, "role": "Input", "activation": "sigmoid"},
            {"id": 2, "role": "Output", "activation": "sigmoid"}
        ],
        "links": [
            {"src": 1, "sink": 2, "weight": 0.5, "enabled": true, "innovation": 0}
        ]
    }"#;
    let loaded: Genome = serde_json::from_str(json).unwrap();
    assert_eq!(loaded.input_genes()[0].activation(), "identity");

    let registry = ActivationRegistry::default();
    let built = Genome::new(
        &GenomeConfig::with_io(1, 1),
        vec![
            NodeGene::input(1),
            NodeGene::output(2, "sigmoid", &registry).unwrap(),
        ],
        vec![link(1, 2, 0.5, 0)],
    )
    .unwrap();
    assert_eq!(loaded.distance(&built), 0.0);
    assert_eq!(built.distance(&loaded), 0.0);
}
