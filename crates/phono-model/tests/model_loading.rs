use phono_model::{builtin, ConstraintPolicy, Model, ModelBuilder, ModelError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FEATURES: &str = "\
# tiny test model
FEATURE\tVALUE\tRANK\tPREFIX\tSUFFIX\tCONSTRAINT
type\tconsonant\t9\t\t\t
type\tvowel\t9\t\t\t
phonation\tvoiced\t5\t\t\t
phonation\tvoiceless\t5\t\t\t
place\tbilabial\t6\t\t\tconsonant
manner\tplosive\t7\t\t\tconsonant
aspiration\taspirated\t2\t\tU+02B0\tconsonant -voiced
";

const SOUNDS: &str = "\
GRAPHEME\tDESCRIPTION\tCLASS
p\tvoiceless bilabial plosive consonant\tfalse
b\tvoiced bilabial plosive consonant\tfalse
V\tvowel\ttrue
";

fn write_model(dir: &Path, features: &str, sounds: &str) {
    fs::write(dir.join("model.tsv"), features).unwrap();
    fs::write(dir.join("sounds.tsv"), sounds).unwrap();
}

fn load(features: &str, sounds: &str) -> phono_model::Result<Model> {
    ModelBuilder::new("test").build_from_tables(features, sounds)
}

#[test]
fn loads_model_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("tiny");
    fs::create_dir(&dir).unwrap();
    write_model(&dir, FEATURES, SOUNDS);

    let model = Model::load_dir(&dir).unwrap();
    assert_eq!(model.name(), "tiny");
    assert_eq!(model.config().policy, ConstraintPolicy::Reject);
    assert_eq!(model.inventory().len(), 3);
    assert_eq!(model.encode(&model.decode("p\u{2b0}").unwrap()).unwrap(), "p\u{2b0}");
}

#[test]
fn config_file_overrides_builder_config() {
    let temp = TempDir::new().unwrap();
    write_model(temp.path(), FEATURES, SOUNDS);
    fs::write(
        temp.path().join("config.toml"),
        "policy = \"drop\"\nqueries_include_classes = false\n",
    )
    .unwrap();

    let model = ModelBuilder::new("configured").load_dir(temp.path()).unwrap();
    assert_eq!(model.name(), "configured");
    assert_eq!(model.config().policy, ConstraintPolicy::Drop);
    assert!(!model.config().queries_include_classes);
    assert_eq!(model.config().max_affix_depth, 8);

    // Dropped instead of rejected
    let b = model.decode("b").unwrap();
    let aspirated = model.resolve(&b, &["aspirated"], &[] as &[&str]).unwrap();
    assert_eq!(aspirated, b);
    assert_eq!(model.values_to_graphemes("vowel").unwrap(), Vec::<String>::new());
}

#[test]
fn invalid_config_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_model(temp.path(), FEATURES, SOUNDS);

    fs::write(temp.path().join("config.toml"), "policy = \"ignore\"\n").unwrap();
    assert!(matches!(
        Model::load_dir(temp.path()),
        Err(ModelError::InvalidConfig(_))
    ));

    fs::write(temp.path().join("config.toml"), "max_affix_depth = 0\n").unwrap();
    assert!(matches!(
        Model::load_dir(temp.path()),
        Err(ModelError::InvalidConfig(_))
    ));
}

#[test]
fn missing_tables_are_io_errors() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("model.tsv"), FEATURES).unwrap();
    assert!(matches!(
        Model::load_dir(temp.path()),
        Err(ModelError::Io(_))
    ));
}

#[test]
fn duplicate_values_abort_loading() {
    let features = format!("{FEATURES}manner\tvoiced\t7\t\t\t\n");
    assert!(matches!(
        load(&features, SOUNDS),
        Err(ModelError::DuplicateValue { ref value, ref feature, .. })
            if value == "voiced" && feature == "phonation"
    ));
}

#[test]
fn undefined_constraint_names_abort_loading() {
    let features = format!("{FEATURES}release\tunreleased\t3\t\tU+031A\tplosive -glide\n");
    assert!(matches!(
        load(&features, SOUNDS),
        Err(ModelError::MalformedConstraint { ref reason, .. }) if reason.contains("glide")
    ));
}

#[test]
fn invalid_inventory_rows_abort_loading() {
    let duplicate = format!("{SOUNDS}p\tvoiceless bilabial plosive consonant\tfalse\n");
    assert!(matches!(
        load(FEATURES, &duplicate),
        Err(ModelError::DuplicateGrapheme(g)) if g == "p"
    ));

    let same_sound = format!("{SOUNDS}P\tvoiceless bilabial plosive consonant\tfalse\n");
    assert!(matches!(
        load(FEATURES, &same_sound),
        Err(ModelError::DuplicateBundle { ref previous, .. }) if previous == "p"
    ));

    let violating = format!("{SOUNDS}\u{25b}\tbilabial vowel\tfalse\n");
    let err = load(FEATURES, &violating).unwrap_err();
    let ModelError::InvalidEntry { grapheme, source } = err else {
        panic!("expected an entry error");
    };
    assert_eq!(grapheme, "\u{25b}");
    assert!(matches!(*source, ModelError::ConstraintViolation { .. }));

    let conflicting = format!("{SOUNDS}x\tvoiced voiceless consonant\tfalse\n");
    assert!(matches!(
        load(FEATURES, &conflicting),
        Err(ModelError::InvalidEntry { source, .. })
            if matches!(*source, ModelError::FeatureConflict { .. })
    ));

    let unknown = format!("{SOUNDS}x\tglottal consonant\tfalse\n");
    assert!(matches!(
        load(FEATURES, &unknown),
        Err(ModelError::InvalidEntry { source, .. })
            if matches!(*source, ModelError::UnknownValue(_))
    ));

    let reserved = format!("{SOUNDS}p[x]\tvoiced consonant\tfalse\n");
    assert!(matches!(
        load(FEATURES, &reserved),
        Err(ModelError::InvalidGrapheme(_))
    ));
}

#[test]
fn bundled_tables_load_from_disk() {
    let temp = TempDir::new().unwrap();
    let (features, sounds) = builtin::mipa_tables();
    write_model(temp.path(), features, sounds);

    let model = ModelBuilder::new("mipa").load_dir(temp.path()).unwrap();
    let bundled = builtin::shared_mipa().unwrap();
    assert_eq!(model.to_string(), bundled.to_string());
    assert_eq!(model.decode("b").unwrap(), bundled.decode("b").unwrap());
}
