//! Project manifest scan.
//!
//! Solution files are not parsed: a `.sln`/`.slnx` path only selects the
//! directory whose `.csproj` files get listed.

use std::path::Path;

use crate::error::{SurgeonError, SurgeonResult};
use crate::index::{PROJECT_GLOB, ScanOptions, collect_files};
use crate::model::{ProjectNode, ScanReport};

const SOLUTION_EXTENSIONS: &[&str] = &["sln", "slnx"];

/// One [`ProjectNode`] per `.csproj` under `root` (a directory or a
/// solution file). Manifests that fail to read or parse still produce a node,
/// with no dependencies, and are noted in `skipped`.
pub fn list_projects(root: &Path, options: &ScanOptions) -> SurgeonResult<ScanReport<ProjectNode>> {
    if !root.exists() {
        return Err(SurgeonError::FileNotFound {
            path: root.to_path_buf(),
        });
    }

    let scan_dir = if root.is_dir() {
        root
    } else if is_solution(root) {
        root.parent().unwrap_or_else(|| Path::new("."))
    } else {
        return Err(SurgeonError::argument(format!(
            "{} is neither a directory nor a solution file",
            root.display()
        )));
    };

    let manifests = collect_files(scan_dir, PROJECT_GLOB, options)?;
    let mut report = ScanReport {
        results: Vec::with_capacity(manifests.results.len()),
        skipped: manifests.skipped,
    };

    for path in manifests.results {
        let dependencies = match read_references(&path) {
            Ok(deps) => deps,
            Err(reason) => {
                report.skip(&path, reason);
                Vec::new()
            }
        };
        report.results.push(ProjectNode {
            name: file_stem(&path.to_string_lossy()),
            path,
            dependencies,
        });
    }

    tracing::debug!(
        root = %root.display(),
        projects = report.results.len(),
        "project scan finished"
    );
    Ok(report)
}

fn is_solution(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOLUTION_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// Names of the projects referenced by `<ProjectReference Include="..."/>`.
fn read_references(path: &Path) -> Result<Vec<String>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let doc = roxmltree::Document::parse(&text).map_err(|e| format!("malformed manifest: {e}"))?;

    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("ProjectReference"))
        .filter_map(|n| n.attribute("Include"))
        .map(file_stem)
        .filter(|name| !name.is_empty())
        .collect())
}

/// `..\Core\Core.csproj` → `Core`; both separators are accepted since
/// manifests written on Windows use backslashes.
fn file_stem(reference: &str) -> String {
    let file = reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference);
    file.rsplit_once('.')
        .map_or(file, |(stem, _)| stem)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;

    const APP_MANIFEST: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <ProjectReference Include="..\Core\Core.csproj" />
    <ProjectReference Include="../Data/Data.csproj" />
  </ItemGroup>
</Project>"#;

    fn layout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (rel, body) in [
            ("App/App.csproj", APP_MANIFEST),
            ("Core/Core.csproj", "<Project Sdk=\"Microsoft.NET.Sdk\" />"),
            ("Broken/Broken.csproj", "<Project><ItemGroup>"),
            ("Core/obj/Stale.csproj", "<Project />"),
        ] {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            std::fs::write(path, body).expect("write");
        }
        std::fs::write(dir.path().join("All.sln"), "Microsoft Visual Studio Solution File")
            .expect("write");
        dir
    }

    #[test]
    fn lists_projects_and_references() {
        let dir = layout();
        let report = list_projects(dir.path(), &ScanOptions::default()).expect("scan");
        let names: Vec<&str> = report.results.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["App", "Broken", "Core"]);
        assert_eq!(report.results[0].dependencies, vec!["Core", "Data"]);
        assert!(report.results[2].dependencies.is_empty());
    }

    #[test]
    fn malformed_manifest_is_tolerated_and_recorded() {
        let dir = layout();
        let report = list_projects(dir.path(), &ScanOptions::default()).expect("scan");
        let broken = &report.results[1];
        assert_eq!(broken.name, "Broken");
        assert!(broken.dependencies.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, dir.path().join("Broken/Broken.csproj"));
    }

    #[test]
    fn solution_file_scans_its_directory() {
        let dir = layout();
        let report =
            list_projects(&dir.path().join("All.sln"), &ScanOptions::default()).expect("scan");
        assert_eq!(report.results.len(), 3);
    }

    #[test]
    fn other_files_and_missing_paths_fail() {
        let dir = layout();
        let err = list_projects(&dir.path().join("App/App.csproj"), &ScanOptions::default())
            .expect_err("not a solution");
        assert_eq!(err.kind(), ErrorKind::ArgumentError);
        let err = list_projects(&dir.path().join("nope"), &ScanOptions::default())
            .expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn stems_accept_both_separators() {
        assert_eq!(file_stem(r"..\Core\Core.csproj"), "Core");
        assert_eq!(file_stem("../My.Lib/My.Lib.csproj"), "My.Lib");
        assert_eq!(file_stem("Plain"), "Plain");
    }
}
