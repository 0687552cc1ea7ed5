use jproxy_classpath::{ClassGraph, ClassGraphFixture, ClassIndex, ClasspathEntry, ClasspathError};
use jproxy_test_utils::classfile::ACC_PUBLIC;
use jproxy_test_utils::{write_jar, ClassDirFixture, ClassSpec, MemberSpec};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn indexes_class_directories_in_sorted_order() {
    let fixture = ClassDirFixture::new(&[
        ClassSpec::new("com/acme/b/Second"),
        ClassSpec::new("com/acme/a/First"),
        ClassSpec::new("com/acme/package-info"),
    ]);

    let index = ClassIndex::build(&[ClasspathEntry::from_path(fixture.path())]).unwrap();
    let names: Vec<_> = index.binary_names().collect();
    assert_eq!(names, vec!["com.acme.a.First", "com.acme.b.Second"]);
    assert!(index.class("com.acme.package-info").is_none());
}

#[test]
fn indexes_jars_and_skips_metadata_entries() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("lib.jar");
    write_jar(&jar, &[ClassSpec::new("com/acme/InJar")]).unwrap();

    let entry = ClasspathEntry::from_path(&jar);
    assert!(matches!(entry, ClasspathEntry::Jar(_)));
    let index = ClassIndex::build(&[entry]).unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.class("com.acme.InJar").is_some());
}

#[test]
fn first_classpath_entry_wins_on_duplicates() {
    let first = ClassDirFixture::new(&[ClassSpec::new("com/acme/Dupe")
        .method(MemberSpec::new(ACC_PUBLIC, "fromFirst", "()V"))]);
    let second = ClassDirFixture::new(&[ClassSpec::new("com/acme/Dupe")
        .method(MemberSpec::new(ACC_PUBLIC, "fromSecond", "()V"))]);

    let index = ClassIndex::build(&[
        ClasspathEntry::ClassDir(first.path().to_path_buf()),
        ClasspathEntry::ClassDir(second.path().to_path_buf()),
    ])
    .unwrap();

    let stub = index.class("com.acme.Dupe").unwrap();
    assert_eq!(stub.methods[0].name, "fromFirst");
}

#[test]
fn json_fixture_round_trips_through_disk() {
    let fixture = ClassDirFixture::new(&[
        ClassSpec::new("com/acme/A").implements("java/lang/Runnable"),
    ]);
    let index = ClassIndex::build(&[ClasspathEntry::from_path(fixture.path())]).unwrap();

    let tmp = TempDir::new().unwrap();
    let json = tmp.path().join("graph.json");
    std::fs::write(&json, serde_json::to_string(&index.to_fixture()).unwrap()).unwrap();

    let reloaded = ClassIndex::load_json(&json).unwrap();
    assert_eq!(reloaded.class("com.acme.A"), index.class("com.acme.A"));
}

#[test]
fn fixture_stubs_fill_gaps_without_shadowing_the_classpath() {
    let classes = ClassDirFixture::new(&[ClassSpec::new("com/acme/A")]);
    let mut index = ClassIndex::build(&[ClasspathEntry::from_path(classes.path())]).unwrap();

    let tmp = TempDir::new().unwrap();
    let json = tmp.path().join("graph.json");
    std::fs::write(
        &json,
        r#"{"classes": [
            {"internal_name": "com/acme/A", "access_flags": 0},
            {"internal_name": "com/acme/B", "access_flags": 1}
        ]}"#,
    )
    .unwrap();

    let fixture = ClassGraphFixture::load(&json).unwrap();
    let added: Vec<bool> = fixture
        .classes
        .into_iter()
        .map(|stub| index.insert_if_absent(stub))
        .collect();
    assert_eq!(added, vec![false, true]);
    assert_eq!(index.class("com.acme.A").unwrap().access_flags, ACC_PUBLIC);
    assert_eq!(index.len(), 2);

    std::fs::write(&json, "{").unwrap();
    assert!(matches!(
        ClassGraphFixture::load(&json),
        Err(ClasspathError::Json { .. })
    ));
}

#[test]
fn corrupt_classfile_reports_its_origin() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Broken.class"), b"not a class").unwrap();

    let err = ClassIndex::build(&[ClasspathEntry::ClassDir(tmp.path().to_path_buf())])
        .expect_err("corrupt classfile should fail indexing");
    match err {
        ClasspathError::ClassFile { origin, .. } => assert!(origin.ends_with("Broken.class")),
        other => panic!("unexpected error: {other}"),
    }
}
