//! On-disk shape of a system snapshot.
//!
//! The snapshot nests files under their microservice and keeps orphans in a
//! separate list. Loading goes through the same primitives as merging, so a
//! document that repeats a path or overlaps two roots is rejected.

use serde::{Deserialize, Serialize};

use super::{IrError, Microservice, ProjectFile, System};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDocument {
    pub name: String,
    #[serde(rename = "commitID", alias = "commitId", default)]
    pub commit_id: String,
    #[serde(default)]
    pub microservices: Vec<MicroserviceDocument>,
    #[serde(default)]
    pub orphans: Vec<ProjectFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroserviceDocument {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
}

impl TryFrom<SystemDocument> for System {
    type Error = IrError;

    fn try_from(doc: SystemDocument) -> Result<Self, Self::Error> {
        let mut system = System::new(doc.name, doc.commit_id);
        let mut owned = Vec::new();
        for ms in doc.microservices {
            let microservice = Microservice::new(ms.name, &ms.path);
            let root = microservice.path.clone();
            system.insert_microservice(microservice)?;
            owned.push((root, ms.files));
        }
        for (root, files) in owned {
            for file in files {
                system.attach(file, &root)?;
            }
        }
        for file in doc.orphans {
            system.add_orphan(file)?;
        }
        system.check_invariants()?;
        Ok(system)
    }
}

impl From<System> for SystemDocument {
    fn from(system: System) -> Self {
        let microservices = system
            .microservices()
            .map(|ms| MicroserviceDocument {
                name: ms.name.clone(),
                path: ms.path.clone(),
                files: system.files_of(&ms.path).cloned().collect(),
            })
            .collect();
        let orphans = system.orphans().cloned().collect();
        SystemDocument { name: system.name().to_string(), commit_id: system.commit_id().to_string(), microservices, orphans }
    }
}
