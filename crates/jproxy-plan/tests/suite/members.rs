use jproxy_classfile::access::{ACC_BRIDGE, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC};
use jproxy_plan::{MemberDescriptor, MemberKind, PlanDiagnostic, TypeDescriptor};
use pretty_assertions::assert_eq;

use super::support::*;

fn summary(descriptor: &TypeDescriptor) -> Vec<(MemberKind, &str, &str, bool)> {
    descriptor
        .members
        .iter()
        .map(|m| (m.kind, m.source_name.as_str(), m.proxy_name.as_str(), m.included))
        .collect()
}

fn member<'a>(descriptor: &'a TypeDescriptor, source_name: &str) -> &'a MemberDescriptor {
    descriptor
        .members
        .iter()
        .find(|m| m.source_name == source_name)
        .unwrap_or_else(|| panic!("no member {source_name}"))
}

#[test]
fn all_true_wraps_every_public_member_except_no_wrap() {
    let graph = graph(vec![
        class("com/acme/Widget")
            .java4cpp(&[])
            .constructor("()V")
            .method("draw", "()V")
            .method_with(ACC_PUBLIC, "debug", "()V", &[no_wrap()])
            .method_with(ACC_PRIVATE, "secret", "()V", &[])
            .method_with(ACC_PUBLIC | ACC_SYNTHETIC, "access$000", "()V", &[])
            .method_with(ACC_PUBLIC | ACC_BRIDGE, "compareTo", "(Ljava/lang/Object;)I", &[])
            .method_with(ACC_STATIC, "<clinit>", "()V", &[])
            .inner("Part")
            .static_field("DEFAULT", "I", &[]),
        class("com/acme/Widget$Part"),
    ]);

    let plan = plan(&graph, &["com.acme.Widget"]).unwrap();
    let widget = plan.get(&key("com.acme.Widget")).unwrap();
    assert_eq!(
        summary(widget),
        vec![
            (MemberKind::Constructor, "<init>", "Widget", true),
            (MemberKind::Method, "draw", "draw", true),
            (MemberKind::Method, "debug", "debug", false),
            (MemberKind::InnerType, "Part", "Part", true),
            (MemberKind::StaticField, "DEFAULT", "DEFAULT", false),
        ]
    );
    assert!(plan.contains(&key("com.acme.Widget$Part")));
    assert!(plan.diagnostics().is_empty());
}

#[test]
fn static_fields_off_with_one_wrapped_field() {
    let graph = graph(vec![class("com/acme/Consts")
        .java4cpp(&[])
        .static_field("ONE", "I", &[])
        .static_field("TWO", "Lcom/acme/Value;", &[wrap()])
        .static_field("THREE", "Lcom/acme/Other;", &[]),
        class("com/acme/Value"),
    ]);

    let plan = plan(&graph, &["com.acme.Consts"]).unwrap();
    let consts = plan.get(&key("com.acme.Consts")).unwrap();
    let included: Vec<_> = consts.included_members().map(|m| m.source_name.as_str()).collect();
    assert_eq!(included, vec!["TWO"]);
    assert!(member(consts, "THREE").referenced_types.is_empty());
    assert_eq!(plan_names(&plan), vec!["com.acme.Consts", "com.acme.Value"]);
}

#[test]
fn all_false_wraps_only_marked_members() {
    let graph = graph(vec![
        class("com/acme/Sparse")
            .java4cpp(&[("all", flag(false)), ("staticFields", flag(true))])
            .constructor("(Lcom/acme/Config;)V")
            .method_with(ACC_PUBLIC, "run", "(Lcom/acme/Job;)V", &[wrap()])
            .method("skip", "(Lcom/acme/Unused;)V")
            .static_field("LIMIT", "J", &[])
            .static_field("HIDDEN", "J", &[no_wrap()]),
        class("com/acme/Job"),
    ]);

    let plan = plan(&graph, &["com.acme.Sparse"]).unwrap();
    let sparse = plan.get(&key("com.acme.Sparse")).unwrap();
    let included: Vec<_> = sparse.included_members().map(|m| m.source_name.as_str()).collect();
    assert_eq!(included, vec!["run", "LIMIT"]);
    assert_eq!(plan_names(&plan), vec!["com.acme.Sparse", "com.acme.Job"]);
}

#[test]
fn conflicting_markers_wrap_and_warn() {
    let graph = graph(vec![class("com/acme/Torn")
        .java4cpp(&[("all", flag(false))])
        .method_with(ACC_PUBLIC, "both", "()V", &[no_wrap(), wrap()])]);

    let plan = plan(&graph, &["com.acme.Torn"]).unwrap();
    let torn = plan.get(&key("com.acme.Torn")).unwrap();
    assert!(member(torn, "both").included);
    assert_eq!(
        plan.diagnostics(),
        &[PlanDiagnostic::ConflictingMemberOverride {
            owner: key("com.acme.Torn"),
            member: "both()V".to_string(),
            kind: MemberKind::Method,
        }]
    );
}

#[test]
fn proxy_names_are_renamed_then_escaped_once() {
    let graph = graph(vec![class("com/acme/Store")
        .java4cpp(&[("name", string("class"))])
        .constructor("()V")
        .method("delete", "()V")
        .method_with(ACC_PUBLIC, "getSize", "()I", &[wrap_as("size")])
        .method_with(ACC_PUBLIC, "doRemove", "()V", &[wrap_as("register")])]);

    let plan = plan(&graph, &["com.acme.Store"]).unwrap();
    let store = plan.get(&key("com.acme.Store")).unwrap();
    assert_eq!(store.proxy_name, "class_");
    let names: Vec<_> = store.members.iter().map(|m| m.proxy_name.as_str()).collect();
    assert_eq!(names, vec!["class_", "delete_", "size", "register_"]);
}

#[test]
fn constructor_rename_is_ignored_with_a_warning() {
    let graph = graph(vec![class("com/acme/Made").java4cpp(&[]).method_with(
        ACC_PUBLIC,
        "<init>",
        "()V",
        &[wrap_as("create")],
    )]);

    let plan = plan(&graph, &["com.acme.Made"]).unwrap();
    let made = plan.get(&key("com.acme.Made")).unwrap();
    assert_eq!(made.members[0].proxy_name, "Made");
    assert!(matches!(
        &plan.diagnostics()[0],
        PlanDiagnostic::IgnoredConstructorRename { rename, .. } if rename == "create"
    ));
}

#[test]
fn native_types_and_primitives_are_not_referenced() {
    let graph = graph(vec![
        class("com/acme/Text")
            .java4cpp(&[])
            .method("join", "([Ljava/lang/String;C)Ljava/lang/String;")
            .method("split", "(Ljava/lang/String;)[Lcom/acme/Piece;"),
        class("com/acme/Piece"),
    ]);

    let plan = plan(&graph, &["com.acme.Text"]).unwrap();
    let text = plan.get(&key("com.acme.Text")).unwrap();
    assert!(member(text, "join").referenced_types.is_empty());
    assert_eq!(
        member(text, "split").referenced_types.iter().collect::<Vec<_>>(),
        vec![&key("com.acme.Piece")]
    );
    assert_eq!(plan_names(&plan), vec!["com.acme.Text", "com.acme.Piece"]);
}

#[test]
fn annotated_inner_type_counts_as_wrapped() {
    let graph = graph(vec![
        class("com/acme/Tree")
            .java4cpp(&[("all", flag(false))])
            .inner("Node")
            .inner("Cursor"),
        class("com/acme/Tree$Node").java4cpp(&[("name", string("TreeNode"))]),
        class("com/acme/Tree$Cursor"),
    ]);

    let plan = plan(&graph, &["com.acme.Tree"]).unwrap();
    let tree = plan.get(&key("com.acme.Tree")).unwrap();
    assert_eq!(
        summary(tree),
        vec![
            (MemberKind::InnerType, "Node", "TreeNode", true),
            (MemberKind::InnerType, "Cursor", "Cursor", false),
        ]
    );
    assert_eq!(
        plan.get(&key("com.acme.Tree$Node")).unwrap().proxy_name,
        "TreeNode"
    );
    assert!(!plan.contains(&key("com.acme.Tree$Cursor")));
}

#[test]
fn excluded_members_do_not_pull_types_in() {
    let graph = graph(vec![class("com/acme/Lean")
        .java4cpp(&[])
        .method_with(ACC_PUBLIC, "heavy", "()Lcom/acme/NotInGraph;", &[no_wrap()])]);

    let plan = plan(&graph, &["com.acme.Lean"]).unwrap();
    assert_eq!(plan.len(), 1);
}

#[test]
fn object_in_signatures_is_never_proxied() {
    let graph = graph(vec![class("com/acme/Point")
        .java4cpp(&[])
        .method("equals", "(Ljava/lang/Object;)Z")
        .method("box", "()[Ljava/lang/Object;")
        .static_field("ORIGIN", "Ljava/lang/Object;", &[wrap()])]);

    let plan = plan(&graph, &["com.acme.Point"]).unwrap();
    let point = plan.get(&key("com.acme.Point")).unwrap();
    assert!(member(point, "equals").included);
    assert!(point
        .members
        .iter()
        .all(|m| m.referenced_types.is_empty()));
    assert_eq!(plan_names(&plan), vec!["com.acme.Point"]);
}

#[test]
fn wrapped_inner_type_rename_names_the_type_too() {
    let graph = graph(vec![
        class("com/acme/Map").java4cpp(&[]).inner("Entry"),
        class("com/acme/Map$Entry").annotated(wrap_as("MapEntry")),
    ]);

    let plan = plan(&graph, &["com.acme.Map"]).unwrap();
    let map = plan.get(&key("com.acme.Map")).unwrap();
    assert_eq!(member(map, "Entry").proxy_name, "MapEntry");
    assert_eq!(
        plan.get(&key("com.acme.Map$Entry")).unwrap().proxy_name,
        "MapEntry"
    );
}
