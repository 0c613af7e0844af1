//! S2 — Implicit J2 plasticity (spec.md §8).

use mfront_core::config::GeneratorConfig;
use mfront_core::dsl::handlers::default_registry;
use mfront_core::process;

const SOURCE: &str = r#"
    @Behaviour J2Plasticity;
    @DSL Implicit;
    @Epsilon 1e-10;
    @Theta 1;
    @Gradient StrainStensor eto;
    @ThermodynamicForce StressStensor sig;
    @StateVariable StrainStensor eel;
    @StateVariable real p;
    @Integrator {
        feel = deel - deto + dp*n;
        fp = dp - dt*g(seq);
        dfeel_ddeel = Stensor4::Id();
        dfeel_ddp = n;
        dfp_ddeel = dg_dseq*dseq_ddeel;
        dfp_ddp = 1;
    }
"#;

#[test]
fn emits_the_three_headers_with_a_jacobian_matrix_member() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
    assert!(names.iter().any(|n| n.ends_with("J2Plasticity.hxx")));
    assert!(names.iter().any(|n| n.ends_with("J2PlasticityBehaviourData.hxx")));
    assert!(names.iter().any(|n| n.ends_with("J2PlasticityIntegrationData.hxx")));

    let header = files.iter().find(|f| f.relative_path.ends_with("J2Plasticity.hxx")).unwrap();
    assert!(header.contents.contains("tmatrix<"));
    assert!(header.contents.contains("jacobian;"));
}

#[test]
fn computefdf_embeds_the_integrator_body_verbatim() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("J2Plasticity.hxx")).unwrap();

    assert!(header.contents.contains("bool computeFdF(){"));
    assert!(header.contents.contains("feel = deel - deto + dp*n;"));
    assert!(header.contents.contains("fp = dp - dt*g(seq);"));
}

#[test]
fn validated_epsilon_and_theta_reach_the_emitted_class() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("J2Plasticity.hxx")).unwrap();

    assert!(header.contents.contains("static constexpr double epsilon = "));
    assert!(header.contents.contains("static constexpr double theta = 1;"));
}

#[test]
fn jacobian_blocks_for_eel_and_p_are_disjoint() {
    use mfront_core::implicit::layout::{blocks_are_disjoint, jacobian_blocks, UnknownVectorLayout};

    let mut parser = mfront_core::Parser::new(SOURCE).unwrap();
    let registry = default_registry();
    parser.process(&registry).unwrap();
    let data = parser.description.behaviour_data(mfront_core::ModellingHypothesis::Undefined);
    let integration_variables = data.integration_variables();
    let layout = UnknownVectorLayout::build(&integration_variables);
    let blocks = jacobian_blocks(&layout);
    // eel x eel, eel x p, p x eel, p x p.
    assert_eq!(blocks.len(), 4);
    assert!(blocks_are_disjoint(&blocks));
}
