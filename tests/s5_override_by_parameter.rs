//! S5 — Override by parameter (spec.md §8).

use mfront_core::config::GeneratorConfig;
use mfront_core::dsl::handlers::default_registry;
use mfront_core::Parser;

const SOURCE: &str = r#"
    @Behaviour Elastic;
    @Parameter stress young;
    young.setDefaultValue(195.0);
"#;

#[test]
fn override_installed_before_parsing_wins_over_the_declared_default() {
    let mut parser = Parser::new(SOURCE).unwrap();
    parser.description.parameter_overrides.override_by_a_parameter("young", 210.0);

    let registry = default_registry();
    parser.process(&registry).unwrap();

    let young = parser
        .description
        .behaviour_data(mfront_core::ModellingHypothesis::Undefined)
        .find_by_name("young")
        .unwrap();
    assert_eq!(young.default_value.as_ref().unwrap().scalar.as_deref(), Some("210"));
}

#[test]
fn overridden_parameters_map_reports_the_installed_override() {
    let mut parser = Parser::new(SOURCE).unwrap();
    parser.description.parameter_overrides.override_by_a_parameter("young", 210.0);
    let registry = default_registry();
    parser.process(&registry).unwrap();

    let overridden = parser.description.parameter_overrides.overridden();
    assert_eq!(overridden.get("young"), Some(&210.0));
}

#[test]
fn override_reaches_the_emitted_constexpr_value() {
    let mut parser = Parser::new(SOURCE).unwrap();
    parser.description.parameter_overrides.override_by_a_parameter("young", 210.0);
    let registry = default_registry();
    parser.process(&registry).unwrap();

    let config = GeneratorConfig::default();
    let files = mfront_core::Emitter::new(&config).emit(&parser.description).unwrap();
    let header = files.iter().find(|f| f.relative_path.ends_with("Elastic.hxx")).unwrap();
    assert!(header.contents.contains("young = 210;"));
    assert!(!header.contents.contains("195"));
}
