//! S6 — `@AxialGrowth` rejected under isotropic symmetry (spec.md §8).

use mfront_core::dsl::handlers::default_registry;
use mfront_core::{process, ErrorKind, GeneratorConfig};

#[test]
fn axial_growth_under_default_isotropic_symmetry_is_rejected() {
    let source = r#"
        @Behaviour Elastic;
        @ExternalStateVariable real esv;
        @AxialGrowth esv;
    "#;
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let err = process(source, &registry, &config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InconsistentDeclaration(_)));
}

#[test]
fn axial_growth_under_orthotropic_symmetry_is_accepted() {
    let source = r#"
        @Behaviour Elastic;
        @OrthotropicBehaviour;
        @ExternalStateVariable real esv;
        @AxialGrowth esv;
    "#;
    let registry = default_registry();
    let config = GeneratorConfig::default();
    let files = process(source, &registry, &config).unwrap();
    assert_eq!(files.len(), 3);
}
