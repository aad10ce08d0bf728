//! Full scan of a checked-out repository into a fresh [`System`].
//!
//! Boundary discovery seeds the microservices; each file under a service root
//! is handed to the first [`Extractor`] that accepts it. Source-language parsing
//! is not done here: callers register their own extractors for class-family
//! files next to the built-in [`ConfigExtractor`].

pub mod formats;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::boundary::{discover_roots, file_name};
use crate::config::ScanConfig;
use crate::model::{ConfigFile, IrError, Microservice, ProjectFile, System};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Repository root {0} does not exist or is not a directory")]
    InvalidRoot(PathBuf),
    #[error("I/O error under {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Model(#[from] IrError),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Per-file extraction failure. The scan loop logs these and moves on.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed content: {0}")]
    Format(String),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Turns one file on disk into a [`ProjectFile`].
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, path: &Path) -> bool;

    /// `repo_path` is the repository-relative path the file will be stored under.
    /// `Ok(None)` means the file is accepted but carries nothing worth keeping.
    fn extract(&self, path: &Path, repo_path: &str) -> ExtractResult<Option<ProjectFile>>;
}

/// Ordered set of extractors; the first one that accepts a path handles it.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self { extractors: Vec::new() }
    }

    pub fn register<E: Extractor + 'static>(&mut self, extractor: E) -> &mut Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn find(&self, path: &Path) -> Option<&dyn Extractor> {
        self.extractors.iter().find(|e| e.accepts(path)).map(|e| &**e)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }
}

/// Registry with the built-in config extractor configured from `config`.
pub fn default_extractor_registry(config: &ScanConfig) -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register(ConfigExtractor::from_config(config));
    registry
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Dockerfile,
    Maven,
    Gradle,
}

/// Normalizes YAML, Dockerfiles, Maven and Gradle descriptors into config files.
#[derive(Debug, Clone)]
pub struct ConfigExtractor {
    extensions: Vec<String>,
    file_names: Vec<String>,
}

impl Default for ConfigExtractor {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ConfigExtractor {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self { extensions: config.config_extensions.clone(), file_names: config.config_file_names.clone() }
    }

    fn format_of(&self, path: &Path) -> Option<ConfigFormat> {
        let name = path.file_name()?.to_str()?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let listed = self.file_names.iter().any(|n| n == name);
        if self.extensions.iter().any(|e| e.eq_ignore_ascii_case(extension)) {
            return Some(ConfigFormat::Yaml);
        }
        if !listed {
            return None;
        }
        Some(if name == "Dockerfile" || name.starts_with("Dockerfile.") {
            ConfigFormat::Dockerfile
        } else if name.ends_with(".xml") {
            ConfigFormat::Maven
        } else if name.ends_with(".gradle") || name.ends_with(".gradle.kts") {
            ConfigFormat::Gradle
        } else {
            ConfigFormat::Yaml
        })
    }
}

impl Extractor for ConfigExtractor {
    fn name(&self) -> &'static str {
        "config"
    }

    fn accepts(&self, path: &Path) -> bool {
        self.format_of(path).is_some()
    }

    fn extract(&self, path: &Path, repo_path: &str) -> ExtractResult<Option<ProjectFile>> {
        let Some(format) = self.format_of(path) else {
            return Ok(None);
        };
        let text =
            fs::read_to_string(path).map_err(|source| ExtractError::Io { path: path.to_path_buf(), source })?;
        let data = match format {
            ConfigFormat::Yaml => formats::yaml_to_value(&text)?,
            ConfigFormat::Dockerfile => formats::dockerfile_to_value(&text),
            ConfigFormat::Maven => formats::xml_to_value(text.trim())?,
            ConfigFormat::Gradle => formats::gradle_to_value(&text),
        };
        let file = ConfigFile::new(repo_path, file_name(repo_path), data);
        Ok(Some(ProjectFile::Config(file)))
    }
}

/// Repository-relative POSIX path (`/svc-a/pom.xml`); the root itself is `""`.
pub(crate) fn repo_relative(repo_root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(repo_root).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        out.push('/');
        out.push_str(component.as_os_str().to_str()?);
    }
    Some(out)
}

pub(crate) fn ensure_repo_root(repo_root: &Path) -> ScanResult<()> {
    if repo_root.is_dir() {
        Ok(())
    } else {
        Err(ScanError::InvalidRoot(repo_root.to_path_buf()))
    }
}

/// Build a [`System`] from scratch out of the tree at `repo_root`.
///
/// Files outside every discovered service root are not recorded. Per-file
/// extraction failures are logged and skipped.
pub fn scan_repository(
    repo_root: &Path,
    commit_id: &str,
    config: &ScanConfig,
    registry: &ExtractorRegistry,
) -> ScanResult<System> {
    ensure_repo_root(repo_root)?;
    let rules = config.rules();
    let roots = discover_roots(repo_root, &rules, &config.ignored_dirs)?;

    let mut system = System::new(config.system_name.clone(), commit_id);
    for (root, name) in &roots {
        system.insert_microservice(Microservice::new(name.clone(), root))?;
    }

    let mut extracted = 0usize;
    let mut skipped = 0usize;
    let walker = WalkDir::new(repo_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e, &config.ignored_dirs));
    for entry in walker {
        let entry = entry.map_err(|err| ScanError::Io {
            path: err.path().map(Path::to_path_buf).unwrap_or_else(|| repo_root.to_path_buf()),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(repo_path) = repo_relative(repo_root, entry.path()) else {
            continue;
        };
        let Some(owner) = system.resolve_owner(&repo_path).map(|ms| ms.path.clone()) else {
            continue;
        };
        let Some(extractor) = registry.find(entry.path()) else {
            debug!("No extractor for {repo_path}");
            continue;
        };
        match extractor.extract(entry.path(), &repo_path) {
            Ok(Some(file)) => match system.attach(file, &owner) {
                Ok(()) => extracted += 1,
                Err(err) => {
                    warn!("Could not record {repo_path}: {err}");
                    skipped += 1;
                }
            },
            Ok(None) => debug!("{} produced nothing for {repo_path}", extractor.name()),
            Err(err) => {
                warn!("{} failed on {repo_path}: {err}", extractor.name());
                skipped += 1;
            }
        }
    }

    info!(
        "Scanned {}: {} services, {extracted} files recorded, {skipped} skipped",
        repo_root.display(),
        system.microservice_count()
    );
    Ok(system)
}

pub(crate) fn is_ignored_dir(entry: &walkdir::DirEntry, ignored_dirs: &[String]) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(|name| ignored_dirs.iter().any(|d| d == name))
}
