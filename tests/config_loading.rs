// tests/config_loading.rs

use std::fs;
use std::path::{Path, PathBuf};

use dagsim::config::{
    discover_workflows, load_sim_config, load_workflow, resolve_sim_config, WorkflowFile,
};
use dagsim::dag::SchedulingPolicy;
use dagsim::errors::DagsimError;
use dagsim_test_utils::builders::WorkflowBuilder;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

const DIAMOND: &str = r#"
[[job]]
id = "ID00000"
namespace = "Montage"
name = "mProjectPP"
runtime = 13.5

[[job]]
id = "ID00001"
namespace = "Montage"
name = "mDiffFit"
runtime = 2.0

[[job]]
id = "ID00002"
runtime = 4

[[child]]
ref = "ID00001"
parents = ["ID00000"]

[[child]]
ref = "ID00002"
parents = ["ID00000", "ID00001"]
"#;

#[test]
fn workflow_name_falls_back_to_file_stem() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "montage_25.toml", DIAMOND);

    let wf = load_workflow(&path).unwrap();
    assert_eq!(wf.name(), "montage_25");
    assert_eq!(wf.job.len(), 3);
    assert_eq!(wf.child.len(), 2);
    assert_eq!(wf.job[0].namespace, "Montage");
    assert_eq!(wf.job[2].runtime, 4.0);
    assert_eq!(wf.child[1].parents, vec!["ID00000", "ID00001"]);
}

#[test]
fn explicit_workflow_name_wins() {
    let tmp = TempDir::new().unwrap();
    let contents = format!("[workflow]\nname = \"Montage 25\"\n{DIAMOND}");
    let path = write(tmp.path(), "m.toml", &contents);

    assert_eq!(load_workflow(&path).unwrap().name(), "Montage 25");
}

#[test]
fn cyclic_workflow_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "cycle.toml",
        r#"
[[job]]
id = "a"
runtime = 1.0

[[job]]
id = "b"
runtime = 1.0

[[child]]
ref = "b"
parents = ["a"]

[[child]]
ref = "a"
parents = ["b"]
"#,
    );

    match load_workflow(&path) {
        Err(DagsimError::DagCycle(msg)) => assert!(msg.contains("cycle detected"), "{msg}"),
        other => panic!("expected DagCycle, got {other:?}"),
    }
}

#[test]
fn unknown_parent_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "orphan.toml",
        r#"
[[job]]
id = "a"
runtime = 1.0

[[child]]
ref = "a"
parents = ["ghost"]
"#,
    );

    match load_workflow(&path) {
        Err(DagsimError::ConfigError(msg)) => assert!(msg.contains("unknown parent 'ghost'"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn duplicate_ids_and_bad_runtimes_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let dup = write(
        tmp.path(),
        "dup.toml",
        "[[job]]\nid = \"a\"\nruntime = 1.0\n\n[[job]]\nid = \"a\"\nruntime = 2.0\n",
    );
    let negative = write(
        tmp.path(),
        "neg.toml",
        "[[job]]\nid = \"a\"\nruntime = -1.0\n",
    );
    let empty = write(tmp.path(), "empty.toml", "[workflow]\nname = \"nothing\"\n");

    for path in [dup, negative, empty] {
        assert!(
            matches!(load_workflow(&path), Err(DagsimError::ConfigError(_))),
            "{} should be rejected",
            path.display()
        );
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "broken.toml", "[[job]\nid = ");

    assert!(matches!(load_workflow(&path), Err(DagsimError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let result = load_workflow(tmp.path().join("nope.toml"));
    assert!(matches!(result, Err(DagsimError::IoError(_))));
}

#[test]
fn empty_sim_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "Dagsim.toml", "");

    let sim = load_sim_config(&path).unwrap();
    assert_eq!(sim.simulation.inter_cycle_delay, 600.0);
    assert_eq!(sim.simulation.length_scale, 1_000.0);
    assert_eq!(sim.simulation.policies, SchedulingPolicy::ALL.to_vec());
    assert_eq!(sim.worker_tier.len(), 3);
    assert_eq!(sim.worker_count(), 12);
    let speeds: Vec<f64> = sim.worker_tier.iter().map(|t| t.mips).collect();
    assert_eq!(speeds, vec![800.0, 1_200.0, 1_600.0]);
}

#[test]
fn sim_config_overrides() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "Dagsim.toml",
        r#"
[simulation]
inter_cycle_delay = 30
policies = ["stb", "srf"]

[[worker_tier]]
mips = 2000
count = 2
"#,
    );

    let sim = load_sim_config(&path).unwrap();
    assert_eq!(sim.simulation.inter_cycle_delay, 30.0);
    assert_eq!(sim.simulation.length_scale, 1_000.0);
    assert_eq!(
        sim.simulation.policies,
        vec![SchedulingPolicy::Stb, SchedulingPolicy::Srf]
    );
    assert_eq!(sim.worker_count(), 2);
}

#[test]
fn invalid_sim_config_values_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let cases = [
        ("zero_delay.toml", "[simulation]\ninter_cycle_delay = 0\n"),
        ("zero_scale.toml", "[simulation]\nlength_scale = 0\n"),
        ("no_policy.toml", "[simulation]\npolicies = []\n"),
        ("zero_count.toml", "[[worker_tier]]\nmips = 800\ncount = 0\n"),
        ("zero_mips.toml", "[[worker_tier]]\nmips = 0\ncount = 1\n"),
    ];

    for (name, contents) in cases {
        let path = write(tmp.path(), name, contents);
        assert!(
            matches!(load_sim_config(&path), Err(DagsimError::ConfigError(_))),
            "{name} should be rejected"
        );
    }
}

#[test]
fn unknown_policy_name_fails_to_parse() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "Dagsim.toml", "[simulation]\npolicies = [\"fifo\"]\n");

    assert!(matches!(load_sim_config(&path), Err(DagsimError::TomlError(_))));
}

#[test]
fn explicit_sim_config_must_exist() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.toml");

    assert!(matches!(
        resolve_sim_config(Some(missing.as_path())),
        Err(DagsimError::IoError(_))
    ));
}

#[test]
fn discovery_walks_directories_for_toml() {
    let tmp = TempDir::new().unwrap();
    let b = write(tmp.path(), "b.toml", DIAMOND);
    let a = write(tmp.path(), "nested/a.toml", DIAMOND);
    write(tmp.path(), "notes.txt", "not a workflow");
    let explicit = write(tmp.path(), "extra/c.dax", DIAMOND);

    let found = discover_workflows(&[
        tmp.path().to_path_buf(),
        explicit.clone(),
        b.clone(),
    ])
    .unwrap();

    let mut expected = vec![a, b, explicit];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn discovery_rejects_missing_paths() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.toml", DIAMOND);
    let missing = tmp.path().join("nonexistent");

    match discover_workflows(&[tmp.path().to_path_buf(), missing]) {
        Err(DagsimError::ConfigError(msg)) => assert!(msg.contains("does not exist"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn raw_builder_output_goes_through_validation() {
    let raw = WorkflowBuilder::new("loop")
        .job("a", 1.0)
        .job("b", 1.0)
        .job("c", 1.0)
        .child("b", &["a"])
        .child("c", &["b"])
        .child("a", &["c"])
        .build_raw();

    assert!(matches!(WorkflowFile::try_from(raw), Err(DagsimError::DagCycle(_))));

    let raw = WorkflowBuilder::new("self").job("a", 1.0).child("a", &["a"]).build_raw();
    assert!(matches!(WorkflowFile::try_from(raw), Err(DagsimError::ConfigError(_))));
}
