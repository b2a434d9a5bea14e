use phono_model::{builtin, Model, ModelError, Sound};
use pretty_assertions::assert_eq;

fn mipa() -> &'static Model {
    builtin::shared_mipa().expect("bundled model loads")
}

fn sound(grapheme: &str) -> Sound<'static> {
    Sound::from_grapheme(mipa(), grapheme).expect("grapheme decodes")
}

#[test]
fn voicing_p_gives_b() {
    let p = sound("p");
    let b = p.with_additions(&["voiced"]).unwrap();
    assert_eq!(b.grapheme().unwrap(), "b");
    assert_eq!(b, sound("b"));
    // The original sound is untouched
    assert_eq!(p.grapheme().unwrap(), "p");
}

#[test]
fn edit_applies_removals_then_additions() {
    let edited = sound("p\u{2b0}").edit("-aspirated +voiced").unwrap();
    assert_eq!(edited.to_string(), "b");

    let unchanged = sound("p").edit("-aspirated").unwrap();
    assert_eq!(unchanged, sound("p"));
}

#[test]
fn exclusivity_holds_after_overrides() {
    let s = sound("s")
        .with_additions(&["voiced", "voiceless", "postalveolar"])
        .unwrap();
    assert_eq!(s.grapheme().unwrap(), "ʃ");
    assert_eq!(s.feature("phonation").unwrap(), Some("voiceless"));
    assert_eq!(s.feature("place").unwrap(), Some("postalveolar"));
}

#[test]
fn removals_yield_partial_sounds() {
    let partial = sound("b").with_removals(&["voiced"]).unwrap();
    assert_eq!(partial.description(), "bilabial plosive consonant");
    assert_eq!(partial.feature("phonation").unwrap(), None);

    let rendering = partial.rendering().unwrap();
    assert!(rendering.is_degraded());
    assert_eq!(Sound::from_grapheme(mipa(), rendering.as_str()).unwrap(), partial);
}

#[test]
fn constraint_violations_are_errors() {
    assert!(matches!(
        sound("b").with_additions(&["ejective"]),
        Err(ModelError::ConstraintViolation { ref value, .. }) if value == "ejective"
    ));
    assert!(matches!(
        sound("a").with_additions(&["aspirated"]),
        Err(ModelError::ConstraintViolation { .. })
    ));
    assert!(matches!(
        sound("p").with_additions(&["sonorant"]),
        Err(ModelError::UnknownValue(_))
    ));
}

#[test]
fn descriptions_build_sounds() {
    let b = Sound::from_description(mipa(), "voiced bilabial plosive consonant").unwrap();
    assert_eq!(b, sound("b"));
    assert_eq!(b.description(), "voiced bilabial plosive consonant");

    let feature_dict = b.feature_dict();
    assert_eq!(feature_dict.len(), 4);
    assert_eq!(feature_dict["manner"], "plosive");

    assert!(matches!(
        Sound::from_description(mipa(), "voiced voiceless consonant"),
        Err(ModelError::FeatureConflict { .. })
    ));
}

#[test]
fn feature_lookup() {
    let a = sound("a");
    assert_eq!(a.feature("height").unwrap(), Some("open"));
    assert_eq!(a.feature("phonation").unwrap(), None);
    assert!(matches!(
        a.feature("colour"),
        Err(ModelError::UnknownFeature(_))
    ));
}

#[test]
fn subsets_and_classes() {
    let consonant = sound("C");
    let p = sound("p");
    assert!(consonant.is_class());
    assert!(!p.is_class());
    assert!(consonant.is_subset_of(&p));
    assert!(p.is_superset_of(&consonant));
    assert!(!p.is_subset_of(&consonant));
    assert!(!sound("V").is_subset_of(&p));
}

#[test]
fn sounds_from_different_models_differ() {
    let other = builtin::mipa().unwrap();
    let local = Sound::from_grapheme(&other, "p").unwrap();
    assert_ne!(local, sound("p"));
    assert!(!local.is_subset_of(&sound("p")));
    assert_eq!(local.bundle(), sound("p").bundle());
}

#[test]
fn display_shows_grapheme() {
    let long = sound("a").with_additions(&["long"]).unwrap();
    assert_eq!(long.to_string(), "a\u{2d0}");
    assert_eq!(format!("{}", sound("t\u{361}s")), "t\u{361}s");
}
