//! Source tree fixtures and archive inspection helpers

use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

/// Path and content of a file in a fixture tree.
pub type FixtureFile<'a> = (&'a str, &'a str);

/// Creates a temporary tree containing `files`, creating parent directories as needed.
pub fn create_tree(files: &[FixtureFile<'_>]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    dir
}

/// Tree from the canonical scenario: one kept file, a VCS dir and a dependency dir.
pub fn scenario_tree() -> TempDir {
    create_tree(&[
        ("a.txt", "hello"),
        (".git/config", "cfg"),
        ("node_modules/x.js", "0123456789"),
    ])
}

/// A typical agent project with a few excluded artifacts.
pub fn project_tree() -> TempDir {
    create_tree(&[
        ("Dockerfile", "FROM python:3.12\nCOPY . /app\n"),
        ("agent.py", "print('agent')\n"),
        ("requirements.txt", "livekit-agents\n"),
        ("prompts/system.md", "You are helpful.\n"),
        ("prompts/examples/greeting.md", "Hello!\n"),
        ("local.env", "API_KEY=secret\n"),
        (".git/HEAD", "ref: refs/heads/main\n"),
        ("node_modules/dep/index.js", "module.exports = {}\n"),
        ("cache/blob.bin", "0123456789abcdef0123456789abcdef"),
    ])
}

/// Unpacks a tar.gz buffer into entry name -> content (directories map to empty content).
pub fn unpack_entries(archive: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = tar::Archive::new(GzDecoder::new(archive));
    let mut entries = BTreeMap::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = String::from_utf8(entry.path_bytes().into_owned()).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        entries.insert(name, content);
    }
    entries
}

/// Names of the file (non-directory) entries in a tar.gz buffer.
pub fn file_entry_names(archive: &[u8]) -> Vec<String> {
    unpack_entries(archive)
        .into_keys()
        .filter(|name| !name.ends_with('/'))
        .collect()
}

/// Reads every file under `root` into relative path -> content.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}
