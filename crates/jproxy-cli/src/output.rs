use anyhow::Result;
use serde::Serialize;

use jproxy_plan::{DiscoveryMode, MemberKind, TypeDescriptor, WrapPlan};

use crate::ConfigReport;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

fn mode_label(mode: DiscoveryMode) -> &'static str {
    match mode {
        DiscoveryMode::Explicit => "explicit",
        DiscoveryMode::StructuralOnly => "structural",
        DiscoveryMode::ReferentialOnly => "referential",
    }
}

fn kind_label(kind: MemberKind) -> &'static str {
    match kind {
        MemberKind::Method => "method",
        MemberKind::Constructor => "constructor",
        MemberKind::InnerType => "inner",
        MemberKind::StaticField => "field",
    }
}

fn print_descriptor(descriptor: &TypeDescriptor) {
    println!(
        "{} -> {} ({})",
        descriptor.key,
        descriptor.proxy_name,
        mode_label(descriptor.discovery_mode)
    );
    if let Some(parent) = &descriptor.structural_parent {
        println!("  extends {parent}");
    }
    for interface in &descriptor.structural_interfaces {
        println!("  implements {interface}");
    }
    for member in &descriptor.members {
        if member.included {
            println!(
                "  + {} {}{} -> {}",
                kind_label(member.kind),
                member.source_name,
                signature_suffix(member.kind, &member.descriptor),
                member.proxy_name
            );
        } else {
            println!(
                "  - {} {}{}",
                kind_label(member.kind),
                member.source_name,
                signature_suffix(member.kind, &member.descriptor)
            );
        }
    }
}

fn signature_suffix(kind: MemberKind, descriptor: &str) -> &str {
    match kind {
        MemberKind::Method | MemberKind::Constructor => descriptor,
        MemberKind::InnerType | MemberKind::StaticField => "",
    }
}

fn print_warnings(plan: &WrapPlan) {
    for diagnostic in plan.diagnostics() {
        println!("warning: {diagnostic}");
    }
}

pub(crate) fn print_plan(plan: &WrapPlan, json: bool) -> Result<()> {
    if json {
        return print_json(plan);
    }

    for descriptor in plan.iter() {
        print_descriptor(descriptor);
    }
    print_warnings(plan);
    println!(
        "plan: {} types, {} warnings",
        plan.len(),
        plan.diagnostics().len()
    );
    Ok(())
}

#[derive(Serialize)]
struct Explanation<'a> {
    #[serde(flatten)]
    descriptor: &'a TypeDescriptor,
    structural_children: Vec<String>,
}

pub(crate) fn print_explain(
    plan: &WrapPlan,
    descriptor: &TypeDescriptor,
    json: bool,
) -> Result<()> {
    let children: Vec<String> = plan
        .structural_children(&descriptor.key)
        .map(|child| child.key.to_string())
        .collect();
    if json {
        return print_json(&Explanation {
            descriptor,
            structural_children: children,
        });
    }

    print_descriptor(descriptor);
    for child in &children {
        println!("  inherited by {child}");
    }
    for diagnostic in plan
        .diagnostics()
        .iter()
        .filter(|d| d.owner() == &descriptor.key)
    {
        println!("warning: {diagnostic}");
    }
    Ok(())
}

pub(crate) fn print_config(report: &ConfigReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    match &report.path {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: (defaults)"),
    }
    let config = &report.config;
    println!("naming.escape_suffix = {:?}", config.naming.escape_suffix);
    println!("naming.reserved_words = {:?}", config.naming.reserved_words);
    println!(
        "naming.collision_scope = {}",
        serde_json::to_string(&config.naming.collision_scope)?
    );
    for (java, native) in config.native_types() {
        println!("mappings.{java:?} = {native:?}");
    }
    println!("logging.level = {:?}", config.logging.level);

    let diagnostics = &report.diagnostics;
    for key in &diagnostics.unknown_keys {
        println!("warning: unknown key `{key}`");
    }
    for warning in &diagnostics.warnings {
        println!("warning: {warning}");
    }
    for error in &diagnostics.errors {
        println!("error: {error}");
    }
    Ok(())
}
