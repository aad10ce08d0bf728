use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::document::SystemDocument;
use super::{ClassFile, Endpoint, IrError, IrResult, ProjectFile, RestCall};
use crate::boundary::{is_strictly_under, is_under, normalize_path};

/// A service boundary: a named root directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microservice {
    pub name: String,
    pub path: String,
}

impl Microservice {
    pub fn new(name: impl Into<String>, path: &str) -> Self {
        Self { name: name.into(), path: normalize_path(path) }
    }

    /// True when `path` lies inside this service's root.
    pub fn contains(&self, path: &str) -> bool {
        is_under(path, &self.path)
    }
}

/// Who owns a file: a microservice (by root) or the orphan pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Service(String),
    Orphan,
}

/// Root of the IR.
///
/// Files live in a single arena keyed by path; `owners` maps each path to exactly
/// one owner. Only the primitives below mutate either map, and each one leaves
/// the system in a state that passes [`System::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SystemDocument", into = "SystemDocument")]
pub struct System {
    name: String,
    commit_id: String,
    microservices: BTreeMap<String, Microservice>,
    files: BTreeMap<String, ProjectFile>,
    owners: BTreeMap<String, Owner>,
}

impl System {
    pub fn new(name: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_id: commit_id.into(),
            microservices: BTreeMap::new(),
            files: BTreeMap::new(),
            owners: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    pub fn set_commit_id(&mut self, commit_id: impl Into<String>) {
        self.commit_id = commit_id.into();
    }

    // ---- queries -------------------------------------------------------------

    /// Microservices in root order.
    pub fn microservices(&self) -> impl Iterator<Item = &Microservice> {
        self.microservices.values()
    }

    pub fn microservice(&self, root: &str) -> Option<&Microservice> {
        self.microservices.get(root)
    }

    pub fn microservice_count(&self) -> usize {
        self.microservices.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn orphan_count(&self) -> usize {
        self.owners.values().filter(|o| **o == Owner::Orphan).count()
    }

    /// Every file in path order, regardless of owner.
    pub fn files(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.values()
    }

    /// Files owned by the microservice at `root`, in path order.
    pub fn files_of<'a>(&'a self, root: &'a str) -> impl Iterator<Item = &'a ProjectFile> + 'a {
        self.files_where(move |owner| matches!(owner, Owner::Service(r) if r == root))
    }

    /// Files in the orphan pool, in path order.
    pub fn orphans(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files_where(|owner| *owner == Owner::Orphan)
    }

    fn files_where<'a, F>(&'a self, pred: F) -> impl Iterator<Item = &'a ProjectFile> + 'a
    where
        F: Fn(&Owner) -> bool + 'a,
    {
        self.owners.iter().filter(move |entry| pred(entry.1)).filter_map(move |(path, _)| self.files.get(path))
    }

    pub fn owner_of(&self, path: &str) -> Option<&Owner> {
        self.owners.get(path)
    }

    /// Look up a file anywhere in the system, owned or orphaned.
    pub fn find_file(&self, path: &str) -> Option<&ProjectFile> {
        self.files.get(path)
    }

    pub fn find_class(&self, path: &str) -> Option<&ClassFile> {
        self.find_file(path).and_then(ProjectFile::as_class)
    }

    /// Name of the microservice that owns the file at `path`.
    pub fn microservice_name_of(&self, path: &str) -> Option<&str> {
        match self.owners.get(path)? {
            Owner::Service(root) => self.microservices.get(root).map(|ms| ms.name.as_str()),
            Owner::Orphan => None,
        }
    }

    /// Deepest microservice whose root contains `path`.
    ///
    /// Roots are pairwise non-overlapping, so at most one can match; picking the
    /// longest keeps the answer stable even while a batch is being applied.
    pub fn resolve_owner(&self, path: &str) -> Option<&Microservice> {
        self.microservices.values().filter(|ms| ms.contains(path)).max_by_key(|ms| ms.path.len())
    }

    /// Endpoints of every owned class, in path order.
    pub fn all_endpoints(&self) -> Vec<&Endpoint> {
        self.owned_classes().flat_map(ClassFile::endpoints).collect()
    }

    /// REST calls of every owned class, in path order.
    pub fn all_rest_calls(&self) -> Vec<&RestCall> {
        self.owned_classes().flat_map(ClassFile::rest_calls).collect()
    }

    fn owned_classes(&self) -> impl Iterator<Item = &ClassFile> {
        self.files_where(|owner| matches!(owner, Owner::Service(_))).filter_map(ProjectFile::as_class)
    }

    // ---- mutation primitives -------------------------------------------------

    /// Register a microservice. Its root must not overlap any existing root.
    pub fn insert_microservice(&mut self, microservice: Microservice) -> IrResult<()> {
        let root = microservice.path.clone();
        if self.microservices.contains_key(&root) {
            return Err(IrError::DuplicateMicroservice(root));
        }
        if let Some(existing) =
            self.microservices.keys().find(|r| is_under(&root, r) || is_under(r, &root))
        {
            return Err(IrError::OverlappingBoundary { existing: existing.clone(), candidate: root });
        }
        self.microservices.insert(root, microservice);
        self.debug_verify();
        Ok(())
    }

    /// Orphan every file of the microservice at `root`, then drop it.
    ///
    /// Returns the removed microservice and how many files were orphaned.
    pub fn remove_microservice(&mut self, root: &str) -> IrResult<(Microservice, usize)> {
        let orphaned = self.orphanize(root)?;
        let removed = self.microservices.remove(root).ok_or_else(|| IrError::UnknownMicroservice(root.to_string()))?;
        self.debug_verify();
        Ok((removed, orphaned))
    }

    /// Attach a file to the microservice at `root`, stamping its owner name.
    pub fn attach(&mut self, mut file: ProjectFile, root: &str) -> IrResult<()> {
        let path = file.path().to_string();
        if self.files.contains_key(&path) {
            return Err(IrError::DuplicatePath(path));
        }
        let ms = self.microservices.get(root).ok_or_else(|| IrError::UnknownMicroservice(root.to_string()))?;
        if !is_under(&path, root) {
            return Err(IrError::OutsideBoundary { path, root: root.to_string() });
        }
        file.normalize();
        file.set_microservice_name(&ms.name);
        self.owners.insert(path.clone(), Owner::Service(root.to_string()));
        self.files.insert(path, file);
        self.debug_verify();
        Ok(())
    }

    /// Place a file in the orphan pool with its owner name cleared.
    pub fn add_orphan(&mut self, mut file: ProjectFile) -> IrResult<()> {
        let path = file.path().to_string();
        if self.files.contains_key(&path) {
            return Err(IrError::DuplicatePath(path));
        }
        file.normalize();
        file.set_microservice_name("");
        self.owners.insert(path.clone(), Owner::Orphan);
        self.files.insert(path, file);
        self.debug_verify();
        Ok(())
    }

    /// Remove a file from wherever it lives. Absent paths are a no-op.
    pub fn detach(&mut self, path: &str) -> Option<(ProjectFile, Owner)> {
        let file = self.files.remove(path)?;
        let owner = self.owners.remove(path).unwrap_or(Owner::Orphan);
        self.debug_verify();
        Some((file, owner))
    }

    /// Move every file of the microservice at `root` into the orphan pool.
    pub fn orphanize(&mut self, root: &str) -> IrResult<usize> {
        if !self.microservices.contains_key(root) {
            return Err(IrError::UnknownMicroservice(root.to_string()));
        }
        let mut moved = 0;
        for (path, owner) in self.owners.iter_mut() {
            if matches!(owner, Owner::Service(r) if r == root) {
                *owner = Owner::Orphan;
                if let Some(file) = self.files.get_mut(path) {
                    file.set_microservice_name("");
                }
                moved += 1;
            }
        }
        self.debug_verify();
        Ok(moved)
    }

    /// Move every orphan whose path lies under `root` into that microservice.
    pub fn adopt(&mut self, root: &str) -> IrResult<usize> {
        let name = match self.microservices.get(root) {
            Some(ms) => ms.name.clone(),
            None => return Err(IrError::UnknownMicroservice(root.to_string())),
        };
        let mut moved = 0;
        for (path, owner) in self.owners.iter_mut() {
            if *owner == Owner::Orphan && is_under(path, root) {
                *owner = Owner::Service(root.to_string());
                if let Some(file) = self.files.get_mut(path) {
                    file.set_microservice_name(&name);
                }
                moved += 1;
            }
        }
        self.debug_verify();
        Ok(moved)
    }

    // ---- invariants ----------------------------------------------------------

    /// Verify the structural invariants of the IR.
    ///
    /// - every file path appears once and is owned by exactly one owner
    /// - service owners refer to registered microservices that contain the file
    /// - service roots are pairwise non-overlapping
    /// - owned methods/calls carry their owner's name, orphans carry none
    pub fn check_invariants(&self) -> IrResult<()> {
        if self.files.len() != self.owners.len() {
            return Err(IrError::InvariantViolation(format!(
                "{} files but {} ownership entries",
                self.files.len(),
                self.owners.len()
            )));
        }
        for (path, file) in &self.files {
            if file.path() != path {
                return Err(IrError::InvariantViolation(format!(
                    "file stored at {path} reports path {}",
                    file.path()
                )));
            }
            let expected_name = match self.owners.get(path) {
                None => return Err(IrError::InvariantViolation(format!("file {path} has no owner"))),
                Some(Owner::Orphan) => "",
                Some(Owner::Service(root)) if !is_under(path, root) => {
                    return Err(IrError::OutsideBoundary { path: path.clone(), root: root.clone() })
                }
                Some(Owner::Service(root)) => match self.microservices.get(root) {
                    Some(ms) => ms.name.as_str(),
                    None => {
                        return Err(IrError::InvariantViolation(format!(
                            "file {path} owned by unknown root {root}"
                        )))
                    }
                },
            };
            if !file.owner_name_is(expected_name) {
                return Err(IrError::InvariantViolation(format!(
                    "file {path} does not carry owner name '{expected_name}'"
                )));
            }
        }
        for root in self.microservices.keys() {
            if let Some(inner) = self.microservices.keys().find(|other| is_strictly_under(other, root)) {
                return Err(IrError::OverlappingBoundary { existing: root.clone(), candidate: inner.clone() });
            }
        }
        Ok(())
    }

    fn debug_verify(&self) {
        if cfg!(debug_assertions) {
            let result = self.check_invariants();
            debug_assert!(result.is_ok(), "IR invariant broken: {result:?}");
        }
    }
}
