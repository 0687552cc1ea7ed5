use jproxy_classfile::access::{ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC};
use jproxy_classfile::{Annotation, ClassStub, ConstValue, ElementValue, FieldStub, InnerClassInfo, MethodStub};
use jproxy_classpath::ClassIndex;
use jproxy_plan::{CppNameMapping, PlanError, PlanOptions, Planner, TypeKey, WrapPlan};

pub const JAVA4CPP: &str = "Lcom/github/loicoudot/java4cpp/Java4Cpp;";
pub const WRAPPE: &str = "Lcom/github/loicoudot/java4cpp/Java4CppWrappe;";
pub const NO_WRAPPE: &str = "Lcom/github/loicoudot/java4cpp/Java4CppNoWrappe;";

pub fn flag(value: bool) -> ElementValue {
    ElementValue::Const(ConstValue::Boolean(value))
}

pub fn string(value: &str) -> ElementValue {
    ElementValue::Const(ConstValue::String(value.to_string()))
}

/// Class literals, given as internal names.
pub fn classes(names: &[&str]) -> ElementValue {
    ElementValue::Array(
        names
            .iter()
            .map(|name| ElementValue::Class(format!("L{name};")))
            .collect(),
    )
}

pub fn wrap() -> Annotation {
    Annotation::new(WRAPPE)
}

pub fn wrap_as(name: &str) -> Annotation {
    Annotation::new(WRAPPE).with_element("value", string(name))
}

pub fn no_wrap() -> Annotation {
    Annotation::new(NO_WRAPPE)
}

pub fn key(name: &str) -> TypeKey {
    TypeKey::new(name, 0)
}

pub struct StubBuilder(ClassStub);

/// A public class extending `java.lang.Object`, named by its internal name.
pub fn class(internal_name: &str) -> StubBuilder {
    StubBuilder(ClassStub {
        internal_name: internal_name.to_string(),
        access_flags: ACC_PUBLIC,
        super_class: Some("java/lang/Object".to_string()),
        interfaces: Vec::new(),
        arity: 0,
        annotations: Vec::new(),
        inner_classes: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
    })
}

pub fn interface(internal_name: &str) -> StubBuilder {
    let mut builder = class(internal_name);
    builder.0.access_flags = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
    builder
}

impl StubBuilder {
    pub fn extends(mut self, super_class: &str) -> Self {
        self.0.super_class = Some(super_class.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.0.interfaces.push(interface.to_string());
        self
    }

    pub fn arity(mut self, arity: u8) -> Self {
        self.0.arity = arity;
        self
    }

    /// `@Java4Cpp` with the given elements.
    pub fn java4cpp(mut self, elements: &[(&str, ElementValue)]) -> Self {
        let annotation = elements
            .iter()
            .fold(Annotation::new(JAVA4CPP), |annotation, (name, value)| {
                annotation.with_element(*name, value.clone())
            });
        self.0.annotations.push(annotation);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.0.annotations.push(annotation);
        self
    }

    pub fn method(self, name: &str, descriptor: &str) -> Self {
        self.method_with(ACC_PUBLIC, name, descriptor, &[])
    }

    pub fn method_with(
        mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        annotations: &[Annotation],
    ) -> Self {
        self.0.methods.push(MethodStub {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: annotations.to_vec(),
        });
        self
    }

    pub fn constructor(self, descriptor: &str) -> Self {
        self.method("<init>", descriptor)
    }

    pub fn static_field(mut self, name: &str, descriptor: &str, annotations: &[Annotation]) -> Self {
        self.0.fields.push(FieldStub {
            access_flags: ACC_PUBLIC | ACC_STATIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: annotations.to_vec(),
        });
        self
    }

    /// Declares `<this>$<simple>` as a public member class.
    pub fn inner(mut self, simple_name: &str) -> Self {
        let outer = self.0.internal_name.clone();
        self.0.inner_classes.push(InnerClassInfo {
            inner_class: format!("{outer}${simple_name}"),
            outer_class: Some(outer),
            inner_name: Some(simple_name.to_string()),
            access_flags: ACC_PUBLIC | ACC_STATIC,
        });
        self
    }

    pub fn build(self) -> ClassStub {
        self.0
    }
}

pub fn graph(stubs: Vec<StubBuilder>) -> ClassIndex {
    ClassIndex::from_stubs(stubs.into_iter().map(StubBuilder::build))
}

pub fn naming() -> CppNameMapping {
    CppNameMapping::new().with_native_type("java.lang.String", "std::string")
}

pub fn plan(graph: &ClassIndex, roots: &[&str]) -> Result<WrapPlan, PlanError> {
    plan_with(graph, roots, PlanOptions::default())
}

pub fn plan_with(
    graph: &ClassIndex,
    roots: &[&str],
    options: PlanOptions,
) -> Result<WrapPlan, PlanError> {
    let naming = naming();
    let planner = Planner::new(graph, &naming).with_options(options);
    let roots: Vec<TypeKey> = roots.iter().map(|name| planner.key(name)).collect();
    planner.resolve(&roots)
}

pub fn plan_names(plan: &WrapPlan) -> Vec<&str> {
    plan.keys().map(TypeKey::name).collect()
}
