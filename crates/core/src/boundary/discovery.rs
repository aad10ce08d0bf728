use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use walkdir::WalkDir;

use super::{fallback_service_name, resolve_roots, BoundaryRules};
use crate::scan::formats::{is_maven_aggregator, settings_gradle_root_name, xml_to_value};
use crate::scan::{ensure_repo_root, is_ignored_dir, repo_relative, ScanError, ScanResult};

enum Descriptor {
    /// A service with this declared name (or none).
    Service(Option<String>),
    /// A Maven aggregator; never a boundary itself.
    Aggregator,
}

/// Walk `repo_root` and return the resolved service roots with their names.
///
/// Keys are repository-relative roots (`/svc-a`, or `""` for the repository
/// root itself). Directories named in `ignored_dirs` are not descended.
pub fn discover_roots(
    repo_root: &Path,
    rules: &BoundaryRules,
    ignored_dirs: &[String],
) -> ScanResult<BTreeMap<String, String>> {
    ensure_repo_root(repo_root)?;
    let mut candidates = BTreeMap::new();

    let walker = WalkDir::new(repo_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e, ignored_dirs));
    for entry in walker {
        let entry = entry.map_err(|err| ScanError::Io {
            path: err.path().map(Path::to_path_buf).unwrap_or_else(|| repo_root.to_path_buf()),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !rules.is_descriptor(name) {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let Some(root) = repo_relative(repo_root, dir) else {
            continue;
        };
        match read_descriptor(entry.path()) {
            Descriptor::Aggregator => debug!("Skipping aggregator descriptor {}", entry.path().display()),
            Descriptor::Service(declared) => {
                let service = declared.unwrap_or_else(|| fallback_service_name(&root));
                debug!("Candidate root {root:?} ({service}) from {name}");
                candidates.entry(root).or_insert(service);
            }
        }
    }

    let roots = resolve_roots(candidates);
    info!("Discovered {} service roots under {}", roots.len(), repo_root.display());
    Ok(roots)
}

fn read_descriptor(path: &Path) -> Descriptor {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with(".xml") {
        let pom = fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|text| xml_to_value(text.trim()).map_err(|err| err.to_string()));
        return match pom {
            Ok(pom) if is_maven_aggregator(&pom) => Descriptor::Aggregator,
            Ok(pom) => Descriptor::Service(
                pom.pointer("/project/artifactId")
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            ),
            Err(err) => {
                warn!("Could not read {}: {err}", path.display());
                Descriptor::Service(None)
            }
        };
    }
    if name.ends_with(".gradle") || name.ends_with(".gradle.kts") {
        let declared = path
            .parent()
            .into_iter()
            .flat_map(|dir| [dir.join("settings.gradle"), dir.join("settings.gradle.kts")])
            .find_map(|settings| fs::read_to_string(settings).ok())
            .and_then(|text| settings_gradle_root_name(&text));
        return Descriptor::Service(declared);
    }
    Descriptor::Service(None)
}
