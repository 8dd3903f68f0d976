use view_forecast::assembly::{assemble_with_report, MISSING_FEATURE_DEFAULT};
use view_forecast::features::FeatureBag;
use view_forecast::{assemble_vector, CanonicalFeatureSchema, ForecastError};

fn schema(names: &[&str]) -> CanonicalFeatureSchema {
    CanonicalFeatureSchema::new(names.iter().map(|name| name.to_string()).collect()).unwrap()
}

#[test]
fn empty_bag_yields_a_full_length_default_vector() {
    let schema = schema(&["a", "b", "c"]);
    let assembly = assemble_with_report(&FeatureBag::new(), &schema);

    assert_eq!(assembly.vector.len(), 3);
    assert!(assembly
        .vector
        .values()
        .iter()
        .all(|value| *value == MISSING_FEATURE_DEFAULT));
    assert_eq!(assembly.missing, vec!["a", "b", "c"]);
}

#[test]
fn vector_follows_schema_order_and_ignores_extras() {
    let mut bag = FeatureBag::new();
    bag.set("a", 1.0);
    bag.set("b", 2.0);
    bag.set("extra", 99.0);
    bag.set_category("channel_size", "small");

    let schema = schema(&["b", "a", "c"]);
    let assembly = assemble_with_report(&bag, &schema);

    assert_eq!(assembly.vector.values(), &[2.0, 1.0, 0.0]);
    assert_eq!(assembly.missing, vec!["c"]);
    assert_eq!(assembly.ignored, 1);
}

#[test]
fn non_finite_values_never_reach_the_vector() {
    let mut bag = FeatureBag::new();
    bag.set("a", f64::NAN);
    bag.set("b", f64::NEG_INFINITY);

    let vector = assemble_vector(&bag, &schema(&["a", "b"]));
    assert_eq!(vector.values(), &[0.0, 0.0]);
}

#[test]
fn duplicate_names_are_rejected() {
    let result = CanonicalFeatureSchema::new(vec!["a".to_string(), "a".to_string()]);
    assert!(matches!(result, Err(ForecastError::SchemaMismatch(_))));

    let parsed: Result<CanonicalFeatureSchema, _> = serde_json::from_str(r#"["x", "y", "x"]"#);
    assert!(parsed.is_err());
}

#[test]
fn schema_from_bags_is_the_sorted_union_of_numeric_keys() {
    let mut first = FeatureBag::new();
    first.set("zeta", 1.0);
    first.set("alpha", 1.0);
    first.set_category("label", "x");
    let mut second = FeatureBag::new();
    second.set("mid", 1.0);
    second.set("alpha", 2.0);

    let schema = CanonicalFeatureSchema::from_bags([&first, &second]);
    assert_eq!(schema.names(), &["alpha", "mid", "zeta"]);
    assert_eq!(schema.position("mid"), Some(1));
    assert_eq!(schema.position("label"), None);
}

#[test]
fn fingerprint_depends_on_order() {
    let forward = schema(&["a", "b"]);
    let reversed = schema(&["b", "a"]);

    assert_eq!(forward.fingerprint(), schema(&["a", "b"]).fingerprint());
    assert_ne!(forward.fingerprint(), reversed.fingerprint());
    assert_ne!(schema(&["ab"]).fingerprint(), schema(&["a", "b"]).fingerprint());
    assert_eq!(forward.fingerprint().len(), 64);
}

#[test]
fn schema_persists_as_a_json_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feature_names.json");
    let original = schema(&["title_length", "publish_hour"]);
    original.write(&path).unwrap();

    let raw: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw, vec!["title_length", "publish_hour"]);
    assert_eq!(CanonicalFeatureSchema::load(&path).unwrap(), original);
}
