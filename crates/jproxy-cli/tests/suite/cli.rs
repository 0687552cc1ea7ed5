use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use jproxy_test_utils::classfile::ACC_PUBLIC;
use jproxy_test_utils::{write_class_dir, AnnotationSpec, ClassSpec, ElementSpec, MemberSpec};
use predicates::prelude::*;

const JAVA4CPP: &str = "com/github/loicoudot/java4cpp/Java4Cpp";

fn jproxy() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jproxy"));
    cmd.env_remove("JPROXY_CONFIG_PATH").env_remove("RUST_LOG");
    cmd
}

/// Runs `args` with config discovery rooted at `project`.
fn jproxy_in(project: &TempDir, args: &[&str]) -> Command {
    let mut cmd = jproxy();
    cmd.args(args);
    cmd.arg("--path").arg(project.path());
    cmd
}

fn shapes_project() -> TempDir {
    let project = TempDir::new().unwrap();
    write_class_dir(
        project.child("classes").path(),
        &[
            ClassSpec::new("com/acme/Shape")
                .extends("com/acme/Base")
                .annotated(
                    AnnotationSpec::new(JAVA4CPP).with("superclass", ElementSpec::Bool(true)),
                )
                .method(MemberSpec::new(ACC_PUBLIC, "<init>", "()V"))
                .method(MemberSpec::new(ACC_PUBLIC, "area", "()D"))
                .method(MemberSpec::new(ACC_PUBLIC, "name", "()Ljava/lang/String;"))
                .method(
                    MemberSpec::new(ACC_PUBLIC, "debug", "()V").annotated(AnnotationSpec::new(
                        "com/github/loicoudot/java4cpp/Java4CppNoWrappe",
                    )),
                ),
            ClassSpec::new("com/acme/Base").method(MemberSpec::new(
                ACC_PUBLIC,
                "center",
                "()Lcom/acme/Point;",
            )),
            ClassSpec::new("com/acme/Point"),
        ],
    )
    .unwrap();
    project
}

fn classes_arg(project: &TempDir) -> String {
    project.child("classes").path().display().to_string()
}

#[test]
fn help_lists_subcommands() {
    jproxy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("explain"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn plan_prints_every_type_in_discovery_order() {
    let project = shapes_project();
    let classes = classes_arg(&project);

    let output = jproxy_in(&project, &["plan", "--classpath", &classes])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    let shape = stdout.find("com.acme.Shape -> Shape (explicit)").unwrap();
    let base = stdout.find("com.acme.Base -> Base (structural)").unwrap();
    let point = stdout.find("com.acme.Point -> Point (referential)").unwrap();
    assert!(shape < base && base < point, "{stdout}");
    assert!(stdout.contains("  extends com.acme.Base"));
    assert!(stdout.contains("  + method area()D -> area"));
    assert!(stdout.contains("  - method debug()V"));
    assert!(stdout.contains("plan: 3 types, 0 warnings"));
}

#[test]
fn plan_json_is_machine_readable() {
    let project = shapes_project();
    let classes = classes_arg(&project);

    let output = jproxy_in(&project, &["plan", "--classpath", &classes, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let names: Vec<_> = value["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["key"]["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["com.acme.Shape", "com.acme.Base", "com.acme.Point"]);
    assert_eq!(value["types"][0]["structural_parent"]["name"], "com.acme.Base");
}

#[test]
fn explicit_roots_override_annotation_discovery() {
    let project = shapes_project();
    let classes = classes_arg(&project);

    jproxy_in(
        &project,
        &["plan", "--classpath", &classes, "--root", "com.acme.Point"],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("com.acme.Point -> Point (explicit)"))
    .stdout(predicate::str::contains("plan: 1 types"));
}

#[test]
fn explain_shows_one_type_and_its_children() {
    let project = shapes_project();
    let classes = classes_arg(&project);

    jproxy_in(&project, &["explain", "com.acme.Base", "--classpath", &classes])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.Base -> Base (structural)"))
        .stdout(predicate::str::contains("inherited by com.acme.Shape"))
        .stdout(predicate::str::contains("com.acme.Point ->").not());

    jproxy_in(&project, &["explain", "com.acme.Nope", "--classpath", &classes])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not part of the wrap plan"));
}

#[test]
fn graph_fixture_feeds_the_planner() {
    let project = TempDir::new().unwrap();
    let graph = project.child("graph.json");
    graph
        .write_str(
            r#"{
  "classes": [
    {
      "internal_name": "com/acme/a/Node",
      "access_flags": 1,
      "annotations": [{ "type_descriptor": "Lcom/github/loicoudot/java4cpp/Java4Cpp;" }]
    },
    {
      "internal_name": "com/acme/b/Node",
      "access_flags": 1,
      "annotations": [{ "type_descriptor": "Lcom/github/loicoudot/java4cpp/Java4Cpp;" }]
    }
  ]
}"#,
        )
        .unwrap();
    let graph_arg = graph.path().display().to_string();

    jproxy_in(&project, &["plan", "--graph", &graph_arg])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("proxy name `Node`"));

    project
        .child("jproxy.toml")
        .write_str("[naming]\ncollision_scope = \"package\"\n")
        .unwrap();
    jproxy_in(&project, &["plan", "--graph", &graph_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("plan: 2 types"));
}

#[test]
fn nested_names_collide_unless_scoped_by_enclosing_type() {
    let project = TempDir::new().unwrap();
    let graph = project.child("graph.json");
    let outer = |name: &str| {
        format!(
            r#"{{
      "internal_name": "com/acme/{name}",
      "access_flags": 1,
      "annotations": [{{ "type_descriptor": "Lcom/github/loicoudot/java4cpp/Java4Cpp;" }}],
      "inner_classes": [{{
        "inner_class": "com/acme/{name}$Builder",
        "outer_class": "com/acme/{name}",
        "inner_name": "Builder",
        "access_flags": 9
      }}]
    }},
    {{ "internal_name": "com/acme/{name}$Builder", "access_flags": 1 }}"#
        )
    };
    graph
        .write_str(&format!(
            "{{\"classes\": [{}, {}]}}",
            outer("Request"),
            outer("Response")
        ))
        .unwrap();
    let graph_arg = graph.path().display().to_string();

    jproxy_in(&project, &["plan", "--graph", &graph_arg])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("proxy name `Builder`"));

    project
        .child("jproxy.toml")
        .write_str("[naming]\ncollision_scope = \"enclosing\"\n")
        .unwrap();
    jproxy_in(&project, &["plan", "--graph", &graph_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.Response$Builder -> Builder (referential)"))
        .stdout(predicate::str::contains("plan: 4 types"));
}

#[test]
fn config_file_drives_name_escaping() {
    let project = shapes_project();
    let classes = classes_arg(&project);
    project
        .child("jproxy.toml")
        .write_str("[naming]\nescape_suffix = \"Fn\"\nreserved_words = [\"area\"]\n")
        .unwrap();

    jproxy_in(&project, &["plan", "--classpath", &classes])
        .assert()
        .success()
        .stdout(predicate::str::contains("+ method area()D -> areaFn"));
}

#[test]
fn planner_errors_exit_with_one() {
    let project = shapes_project();
    let classes = classes_arg(&project);

    jproxy_in(
        &project,
        &["plan", "--classpath", &classes, "--root", "com.acme.Missing"],
    )
    .assert()
    .code(1)
    .stderr(predicate::str::contains("com.acme.Missing"));
}

#[test]
fn usage_failures_exit_with_two() {
    let project = TempDir::new().unwrap();
    jproxy_in(&project, &["plan"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to plan"));

    let missing = project.child("nope").path().display().to_string();
    jproxy_in(&project, &["plan", "--classpath", &missing])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn invalid_config_blocks_planning() {
    let project = shapes_project();
    let classes = classes_arg(&project);
    project
        .child("jproxy.toml")
        .write_str("[naming]\nescape_suffix = \"\"\n")
        .unwrap();

    jproxy_in(&project, &["plan", "--classpath", &classes])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("naming.escape_suffix"));

    jproxy_in(&project, &["config"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error: naming.escape_suffix: must not be empty"));
}

#[test]
fn config_json_reports_effective_values() {
    let project = TempDir::new().unwrap();
    project
        .child("jproxy.toml")
        .write_str("[naming]\nescape_suffix = \"X\"\ntypo = 1\n")
        .unwrap();

    let output = jproxy_in(&project, &["config", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["config"]["naming"]["escape_suffix"], "X");
    assert_eq!(value["diagnostics"]["unknown_keys"][0], "naming.typo");
    assert!(value["path"].as_str().unwrap().ends_with("jproxy.toml"));
}
