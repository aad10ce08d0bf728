//! Code-level components owned by class-family files.
//!
//! Every component carries the same identity header (`Member`): owning package,
//! owning class, member name and source line range. Identity is the
//! dot-joined `package.Class.name`; call sites append their line range because a
//! class may invoke the same target from several statements.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AccessModifier, HttpMethod};

/// Source line range of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub start_line: i32,
    pub end_line: i32,
}

impl Location {
    /// Marker used when the extractor could not report a range.
    pub const UNKNOWN: Location = Location { start_line: -1, end_line: -1 };

    pub fn new(start_line: i32, end_line: i32) -> Self {
        Self { start_line, end_line }
    }
}

/// Stable structural identity of a component.
///
/// The string form is part of the external contract: snapshots produced
/// independently are diffed by comparing these keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// `package.Class.name`
    pub fn member(package_name: &str, class_name: &str, name: &str) -> Self {
        Self([package_name, class_name, name].join("."))
    }

    /// `package.Class.name[start-end]`
    pub fn call_site(package_name: &str, class_name: &str, name: &str, location: Location) -> Self {
        let mut id = Self::member(package_name, class_name, name).0;
        id.push_str(&format!("[{}-{}]", location.start_line, location.end_line));
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity header shared by all components.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Member {
    pub fn new(
        name: impl Into<String>,
        package_name: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package_name: package_name.into(),
            class_name: class_name.into(),
            location: None,
        }
    }

    /// Build a header from a qualified `package.Class` owner name.
    ///
    /// The last dot separates package from class; without a dot the whole string
    /// is the package and the class name is empty.
    pub fn qualified(name: impl Into<String>, package_and_class: &str) -> Self {
        let (package_name, class_name) = match package_and_class.rfind('.') {
            Some(idx) => (&package_and_class[..idx], &package_and_class[idx + 1..]),
            None => (package_and_class, ""),
        };
        Self::new(name, package_name, class_name)
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Location, or `Location::UNKNOWN` when absent.
    pub fn location_or_unknown(&self) -> Location {
        self.location.unwrap_or(Location::UNKNOWN)
    }
}

/// Common surface of every component kind.
pub trait Component {
    fn member(&self) -> &Member;

    /// Call sites include their line range in the identity key.
    fn is_call_site(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        &self.member().name
    }

    fn id(&self) -> ComponentId {
        let m = self.member();
        if self.is_call_site() {
            ComponentId::call_site(&m.package_name, &m.class_name, &m.name, m.location_or_unknown())
        } else {
            ComponentId::member(&m.package_name, &m.class_name, &m.name)
        }
    }
}

/// An annotation with its string-valued attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(flatten)]
    pub member: Member,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(member: Member) -> Self {
        Self { member, attributes: BTreeMap::new() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Comma-delimited `key=value` rendering of the attributes.
    pub fn contents(&self) -> String {
        self.attributes.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",")
    }
}

impl Component for Annotation {
    fn member(&self) -> &Member {
        &self.member
    }
}

/// A class-level field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(flatten)]
    pub member: Member,
    #[serde(default)]
    pub field_type: String,
    #[serde(default)]
    pub protection: AccessModifier,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub initializer: String,
}

impl Component for Field {
    fn member(&self) -> &Member {
        &self.member
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(flatten)]
    pub member: Member,
    #[serde(default)]
    pub parameter_type: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub is_variable_parameter: bool,
}

impl Component for Parameter {
    fn member(&self) -> &Member {
        &self.member
    }
}

/// An import statement; the member name is `importPackage.importObject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    #[serde(flatten)]
    pub member: Member,
    pub import_package: String,
    pub import_object: String,
    #[serde(default)]
    pub is_static: bool,
}

impl Import {
    pub fn new(import_package: &str, import_object: &str, package_and_class: &str) -> Self {
        Self {
            member: Member::qualified(format!("{import_package}.{import_object}"), package_and_class),
            import_package: import_package.to_string(),
            import_object: import_object.to_string(),
            is_static: false,
        }
    }

    /// True for wildcard imports (`com.example.*`).
    pub fn imports_entire_package(&self) -> bool {
        self.import_object == "*"
    }
}

impl Component for Import {
    fn member(&self) -> &Member {
        &self.member
    }
}

/// Fields shared by plain methods and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDecl {
    #[serde(flatten)]
    pub member: Member,
    #[serde(default)]
    pub protection: AccessModifier,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: String,
    /// Denormalized name of the owning microservice; maintained by the IR primitives.
    #[serde(default)]
    pub microservice_name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, alias = "abstract")]
    pub is_abstract: bool,
    #[serde(default, alias = "static")]
    pub is_static: bool,
    #[serde(default, alias = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub thrown_exceptions: Vec<String>,
}

impl MethodDecl {
    pub fn new(member: Member) -> Self {
        Self { member, ..Self::default() }
    }
}

/// A method reachable as an inbound REST operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(flatten)]
    pub method: MethodDecl,
    /// URL template; path variables appear as `{?}`.
    pub url: String,
    pub http_method: HttpMethod,
}

/// A declared method, possibly specialized as an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Method {
    #[serde(rename = "Method")]
    Plain(MethodDecl),
    Endpoint(Endpoint),
}

impl Method {
    pub fn decl(&self) -> &MethodDecl {
        match self {
            Method::Plain(decl) => decl,
            Method::Endpoint(endpoint) => &endpoint.method,
        }
    }

    pub fn decl_mut(&mut self) -> &mut MethodDecl {
        match self {
            Method::Plain(decl) => decl,
            Method::Endpoint(endpoint) => &mut endpoint.method,
        }
    }

    pub fn as_endpoint(&self) -> Option<&Endpoint> {
        match self {
            Method::Endpoint(endpoint) => Some(endpoint),
            Method::Plain(_) => None,
        }
    }
}

impl Component for Method {
    fn member(&self) -> &Member {
        &self.decl().member
    }
}

/// Fields shared by plain method calls and REST calls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSite {
    #[serde(flatten)]
    pub member: Member,
    /// Text before the `.` at the call site (variable or static owner).
    #[serde(default)]
    pub object_name: String,
    /// Resolved simple type of `object_name`.
    #[serde(default)]
    pub object_type: String,
    /// Name of the method containing this call.
    #[serde(default)]
    pub called_from: String,
    /// Raw argument text.
    #[serde(default)]
    pub parameter_contents: String,
    /// Denormalized name of the owning microservice; maintained by the IR primitives.
    #[serde(default)]
    pub microservice_name: String,
}

impl CallSite {
    pub fn new(member: Member) -> Self {
        Self { member, ..Self::default() }
    }
}

/// A call site that performs an outbound REST invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestCall {
    #[serde(flatten)]
    pub call: CallSite,
    pub url: String,
    pub http_method: HttpMethod,
}

/// A method invocation, possibly specialized as a REST call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MethodCall {
    #[serde(rename = "MethodCall")]
    Plain(CallSite),
    RestCall(RestCall),
}

impl MethodCall {
    pub fn site(&self) -> &CallSite {
        match self {
            MethodCall::Plain(site) => site,
            MethodCall::RestCall(rest) => &rest.call,
        }
    }

    pub fn site_mut(&mut self) -> &mut CallSite {
        match self {
            MethodCall::Plain(site) => site,
            MethodCall::RestCall(rest) => &mut rest.call,
        }
    }

    pub fn as_rest_call(&self) -> Option<&RestCall> {
        match self {
            MethodCall::RestCall(rest) => Some(rest),
            MethodCall::Plain(_) => None,
        }
    }

    /// True when this call targets `method`: same microservice, receiver type equal
    /// to the method's class, same name.
    pub fn targets(&self, method: &Method) -> bool {
        let site = self.site();
        let decl = method.decl();
        site.microservice_name == decl.microservice_name
            && site.object_type == decl.member.class_name
            && site.member.name == decl.member.name
    }
}

impl Component for MethodCall {
    fn member(&self) -> &Member {
        &self.site().member
    }

    fn is_call_site(&self) -> bool {
        true
    }
}

/// Borrowed view over any component kind.
#[derive(Debug, Clone, Copy)]
pub enum ComponentRef<'a> {
    Annotation(&'a Annotation),
    Field(&'a Field),
    Method(&'a Method),
    MethodCall(&'a MethodCall),
    Parameter(&'a Parameter),
    Import(&'a Import),
}

impl Component for ComponentRef<'_> {
    fn member(&self) -> &Member {
        match self {
            ComponentRef::Annotation(c) => c.member(),
            ComponentRef::Field(c) => c.member(),
            ComponentRef::Method(c) => c.member(),
            ComponentRef::MethodCall(c) => c.member(),
            ComponentRef::Parameter(c) => c.member(),
            ComponentRef::Import(c) => c.member(),
        }
    }

    fn is_call_site(&self) -> bool {
        matches!(self, ComponentRef::MethodCall(_))
    }
}
