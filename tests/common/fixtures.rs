use std::fs;
use std::path::{Path, PathBuf};

/// Root of the checked-in C# fixtures
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Load a fixture by its path below tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Copy the `.cs` fixtures below `subdir` into `dest`, keeping their layout
pub fn copy_fixtures(subdir: &str, dest: &Path) {
    let root = fixtures_dir().join(subdir);
    copy_tree(&root, &root, dest);
}

fn copy_tree(root: &Path, dir: &Path, dest: &Path) {
    for entry in fs::read_dir(dir).expect("Failed to read fixtures directory") {
        let path = entry.expect("Failed to read directory entry").path();
        if path.is_dir() {
            copy_tree(root, &path, dest);
        } else if path.extension().and_then(|e| e.to_str()) == Some("cs") {
            let target = dest.join(path.strip_prefix(root).unwrap());
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::copy(&path, &target).unwrap();
        }
    }
}
