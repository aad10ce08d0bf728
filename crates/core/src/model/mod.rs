//! Core data model (IR) for a multi-service system.
//!
//! The model is a single owned graph:
//! - `System` is the root and owns every file through an arena keyed by path.
//! - `Microservice` marks a service boundary (a normalized root directory).
//! - `ProjectFile` is either a class-family file or a config file.
//! - Components (methods, fields, annotations, calls, ...) live inside class files.
//!
//! Ownership is never stored on the entities themselves. `System` keeps a separate
//! owner index (file path -> owner) that only its mutation primitives touch, so
//! equality of files and components stays purely structural.

pub mod components;
pub mod document;
pub mod files;
pub mod system;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use components::{
    Annotation, CallSite, Component, ComponentId, ComponentRef, Endpoint, Field, Import, Location,
    Member, Method, MethodCall, MethodDecl, Parameter, RestCall,
};
pub use document::{MicroserviceDocument, SystemDocument};
pub use files::{ClassFile, ConfigFile, ProjectFile};
pub use system::{Microservice, Owner, System};

/// Error type for IR mutation primitives and invariant checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IrError {
    /// A file with the same path is already present somewhere in the system.
    #[error("Duplicate file path: {0}")]
    DuplicatePath(String),

    /// No microservice is registered at the given root.
    #[error("Unknown microservice root: {0}")]
    UnknownMicroservice(String),

    /// A microservice is already registered at the given root.
    #[error("Microservice already exists at root: {0}")]
    DuplicateMicroservice(String),

    /// Two service roots would contain one another.
    #[error("Service root {candidate} overlaps existing root {existing}")]
    OverlappingBoundary { existing: String, candidate: String },

    /// A file was assigned to a service whose root does not contain it.
    #[error("File {path} lies outside service root {root}")]
    OutsideBoundary { path: String, root: String },

    /// A structural invariant does not hold.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

/// Convenience result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

/// Discriminant for project files, carried as `fileType` in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FileKind {
    #[serde(rename = "JCLASS")]
    Class,
    #[serde(rename = "JINTERFACE")]
    Interface,
    #[serde(rename = "JENUM")]
    Enum,
    #[serde(rename = "JRECORD")]
    Record,
    #[serde(rename = "CONFIG")]
    Config,
}

impl FileKind {
    /// True for every member of the class family (class, interface, enum, record).
    pub fn is_class_family(self) -> bool {
        !matches!(self, FileKind::Config)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Class => "JCLASS",
            FileKind::Interface => "JINTERFACE",
            FileKind::Enum => "JENUM",
            FileKind::Record => "JRECORD",
            FileKind::Config => "CONFIG",
        }
    }

    /// Decode the `fileType` tag used by upstream extractors.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "JCLASS" => Some(FileKind::Class),
            "JINTERFACE" => Some(FileKind::Interface),
            "JENUM" => Some(FileKind::Enum),
            "JRECORD" => Some(FileKind::Record),
            "CONFIG" => Some(FileKind::Config),
            _ => None,
        }
    }
}

/// Architectural role of a class, assigned upstream by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassRole {
    Controller,
    Service,
    Repository,
    RepRestRsc,
    Entity,
    FeignClient,
    #[default]
    Unknown,
}

impl ClassRole {
    /// Roles whose methods may be exposed as inbound REST endpoints.
    pub fn exposes_endpoints(self) -> bool {
        matches!(self, ClassRole::Controller | ClassRole::RepRestRsc)
    }
}

/// HTTP verb of an endpoint or outbound REST call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    #[default]
    None,
    All,
}

/// Declared visibility of a class or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessModifier {
    Public,
    Protected,
    Private,
    #[default]
    PackagePrivate,
}
