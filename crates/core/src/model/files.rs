//! Project files: class-family source files and configuration files.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    AccessModifier, Annotation, ClassRole, Component, ComponentRef, Endpoint, Field, FileKind,
    Import, Method, MethodCall, RestCall,
};

/// A class, interface, enum or record and everything declared in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFile {
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub file_type: FileKind,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub class_role: ClassRole,
    #[serde(default)]
    pub protection: AccessModifier,
    #[serde(default, alias = "final")]
    pub is_final: bool,
    #[serde(default, alias = "abstract")]
    pub is_abstract: bool,
    #[serde(default, alias = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub implemented_types: BTreeSet<String>,
    #[serde(default)]
    pub extended_types: BTreeSet<String>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Call sites in source order. Order is significant and never normalized.
    #[serde(default)]
    pub method_calls: Vec<MethodCall>,
    /// Enum constants in declaration order (enums only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_types: Vec<String>,
}

impl ClassFile {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        package_name: impl Into<String>,
        file_type: FileKind,
        class_role: ClassRole,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            file_type,
            package_name: package_name.into(),
            class_role,
            protection: AccessModifier::PackagePrivate,
            is_final: false,
            is_abstract: false,
            is_static: false,
            imports: Vec::new(),
            implemented_types: BTreeSet::new(),
            extended_types: BTreeSet::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            annotations: Vec::new(),
            method_calls: Vec::new(),
            enum_types: Vec::new(),
        }
    }

    /// `package.Class`, or just the class name for the default package.
    pub fn qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package_name, self.name)
        }
    }

    /// Endpoints declared by this class. Empty unless the role exposes endpoints.
    pub fn endpoints(&self) -> Vec<&Endpoint> {
        if !self.class_role.exposes_endpoints() {
            return Vec::new();
        }
        self.methods.iter().filter_map(Method::as_endpoint).collect()
    }

    /// Outbound REST calls in source order.
    pub fn rest_calls(&self) -> Vec<&RestCall> {
        self.method_calls.iter().filter_map(MethodCall::as_rest_call).collect()
    }

    /// Every component owned by this class.
    pub fn components(&self) -> Vec<ComponentRef<'_>> {
        let mut out = Vec::new();
        out.extend(self.imports.iter().map(ComponentRef::Import));
        out.extend(self.annotations.iter().map(ComponentRef::Annotation));
        out.extend(self.fields.iter().map(ComponentRef::Field));
        out.extend(self.methods.iter().map(ComponentRef::Method));
        for method in &self.methods {
            out.extend(method.decl().parameters.iter().map(ComponentRef::Parameter));
        }
        out.extend(self.method_calls.iter().map(ComponentRef::MethodCall));
        out
    }

    /// Rewrite the denormalized owner name on every method and call site.
    pub fn set_microservice_name(&mut self, name: &str) {
        for method in &mut self.methods {
            method.decl_mut().microservice_name = name.to_string();
        }
        for call in &mut self.method_calls {
            call.site_mut().microservice_name = name.to_string();
        }
    }

    /// True when every method and call site carries `name` as owner.
    pub fn owner_name_is(&self, name: &str) -> bool {
        self.methods.iter().all(|m| m.decl().microservice_name == name)
            && self.method_calls.iter().all(|c| c.site().microservice_name == name)
    }

    /// Sort ID-keyed component sets and drop exact repeats (same ID and line range).
    ///
    /// Method calls keep their source order.
    pub fn normalize(&mut self) {
        normalize_set(&mut self.imports);
        normalize_set(&mut self.annotations);
        normalize_set(&mut self.fields);
        normalize_set(&mut self.methods);
    }
}

/// Overloads share an id; the line range keeps them apart.
fn normalize_set<T: Component>(items: &mut Vec<T>) {
    items.sort_by_cached_key(|item| (item.id(), item.member().location));
    items.dedup_by(|a, b| a.id() == b.id() && a.member().location == b.member().location);
}

/// A non-source file (YAML, Dockerfile, build descriptor, ...) with a generic payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default = "config_kind")]
    pub file_type: FileKind,
    /// Nested key/value-and-list payload, normalized upstream.
    #[serde(default)]
    pub data: Value,
}

fn config_kind() -> FileKind {
    FileKind::Config
}

impl ConfigFile {
    pub fn new(path: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self { name: name.into(), path: path.into(), file_type: FileKind::Config, data }
    }
}

/// Any file tracked by the IR. Identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProjectFile {
    #[serde(rename = "JClass", alias = "JInterface", alias = "JEnum", alias = "JRecord")]
    Class(ClassFile),
    #[serde(rename = "ConfigFile")]
    Config(ConfigFile),
}

impl ProjectFile {
    pub fn path(&self) -> &str {
        match self {
            ProjectFile::Class(c) => &c.path,
            ProjectFile::Config(c) => &c.path,
        }
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        match self {
            ProjectFile::Class(c) => c.path = path.into(),
            ProjectFile::Config(c) => c.path = path.into(),
        }
    }

    /// Logical name (class name or file name).
    pub fn name(&self) -> &str {
        match self {
            ProjectFile::Class(c) => &c.name,
            ProjectFile::Config(c) => &c.name,
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            ProjectFile::Class(c) => c.file_type,
            ProjectFile::Config(_) => FileKind::Config,
        }
    }

    pub fn as_class(&self) -> Option<&ClassFile> {
        match self {
            ProjectFile::Class(c) => Some(c),
            ProjectFile::Config(_) => None,
        }
    }

    pub fn as_config(&self) -> Option<&ConfigFile> {
        match self {
            ProjectFile::Config(c) => Some(c),
            ProjectFile::Class(_) => None,
        }
    }

    /// Propagate the owner name onto owned methods/calls. Config files carry none.
    pub fn set_microservice_name(&mut self, name: &str) {
        if let ProjectFile::Class(c) = self {
            c.set_microservice_name(name);
        }
    }

    pub fn owner_name_is(&self, name: &str) -> bool {
        match self {
            ProjectFile::Class(c) => c.owner_name_is(name),
            ProjectFile::Config(_) => true,
        }
    }

    pub fn normalize(&mut self) {
        if let ProjectFile::Class(c) = self {
            c.normalize();
        }
    }

    /// Decode an upstream payload.
    ///
    /// Accepts either a tagged document (`type`) or a bare one discriminated only by
    /// `fileType`. Returns `None` for empty or unparseable payloads.
    pub fn from_payload(data: &Value) -> Option<ProjectFile> {
        let obj = data.as_object()?;
        if obj.is_empty() {
            return None;
        }
        if obj.contains_key("type") {
            if let Ok(file) = serde_json::from_value::<ProjectFile>(data.clone()) {
                return Some(file);
            }
        }
        let kind = obj.get("fileType").and_then(Value::as_str).and_then(FileKind::from_tag)?;
        if kind.is_class_family() {
            serde_json::from_value::<ClassFile>(data.clone()).ok().map(ProjectFile::Class)
        } else {
            serde_json::from_value::<ConfigFile>(data.clone()).ok().map(ProjectFile::Config)
        }
    }
}
