//! S3 — Mises plastic flow specialisation (spec.md §8).

use mfront_core::config::GeneratorConfig;
use mfront_core::dsl::handlers::default_registry;
use mfront_core::process;

const SOURCE: &str = r#"
    @Behaviour PlasticFlow;
    @DSL IsotropicPlasticMisesFlow;
    @Gradient StrainStensor eto;
    @ThermodynamicForce StressStensor sig;
    @FlowRule {
        f = seq - R0 - H*p;
        df_dseq = 1;
        df_dp = -H;
    }
"#;

#[test]
fn flow_rule_declares_eel_and_p_as_state_variables() {
    let mut parser = mfront_core::Parser::new(SOURCE).unwrap();
    let registry = default_registry();
    parser.process(&registry).unwrap();
    let data = parser.description.behaviour_data(mfront_core::ModellingHypothesis::Undefined);
    assert!(data.find_by_name("eel").is_some());
    assert!(data.find_by_name("p").is_some());
}

#[test]
fn emitted_integrator_embeds_the_flow_rule_closed_over_the_canned_residual() {
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(SOURCE, &registry, &config).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("PlasticFlow.hxx")).unwrap();

    assert!(header.contents.contains("f = seq - R0 - H*p;"));
    assert!(header.contents.contains("df_dseq = 1;"));
    assert!(header.contents.contains("df_dp = -H;"));
    // The plastic variant's residual closure divides the criterion by young.
    assert!(header.contents.contains("fp = f/young;"));
}

#[test]
fn consistent_tangent_operator_is_emitted_and_marked_symmetric() {
    let mut parser = mfront_core::Parser::new(SOURCE).unwrap();
    let registry = default_registry();
    parser.process(&registry).unwrap();
    let data = parser.description.behaviour_data(mfront_core::ModellingHypothesis::Undefined);
    assert!(data.flags.has_consistent_tangent_operator);
    assert!(data.flags.is_tangent_operator_symmetric);

    let config = GeneratorConfig::default();
    let files = mfront_core::Emitter::new(&config).emit(&parser.description).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("PlasticFlow.hxx")).unwrap();
    assert!(header.contents.contains("bool computeConsistentTangentOperator(){"));
    assert!(header.contents.contains("Dt = De"));
}
