use std::{
    env::{split_paths, var_os},
    fs,
    path::{Path, PathBuf},
    process::Command,
};

pub use find_cuda_helper::{find_cuda_root, include_cuda};

/// Library directories of a toolkit, in the order the linker is pointed at them.
const LIB_DIRS: &[&str] = &["lib64", "lib", "lib/x64", "targets/x86_64-linux/lib"];

/// Finds the directory holding the cufft library.
///
/// Returns `Some(None)` when the library is only visible through the system loader cache,
/// so no extra link search path is needed.
pub fn find_cufft(toolkit: impl AsRef<Path>) -> Option<Option<PathBuf>> {
    let toolkit = toolkit.as_ref();
    if !toolkit.join("include/cufft.h").is_file() {
        return None;
    }
    if let Some(dir) = LIB_DIRS
        .iter()
        .map(|dir| toolkit.join(dir))
        .find(|dir| has_cufft(dir))
    {
        return Some(Some(dir));
    }
    if in_ldconfig("libcufft.so") {
        return Some(None);
    }
    split_paths(&var_os("LIBRARY_PATH").unwrap_or_default())
        .chain(split_paths(&var_os("LD_LIBRARY_PATH").unwrap_or_default()))
        .find(|dir| has_cufft(dir))
        .map(Some)
}

fn has_cufft(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(|entry| entry.ok())
        .any(|entry| match entry.file_name().to_str() {
            Some(name) => name == "cufft.lib" || name.starts_with("libcufft.so"),
            None => false,
        })
}

fn in_ldconfig(lib: &str) -> bool {
    if !cfg!(target_os = "linux") {
        return false;
    }
    Command::new("ldconfig")
        .arg("-p")
        .output()
        .is_ok_and(|output| String::from_utf8_lossy(&output.stdout).contains(lib))
}

#[test]
fn test_find() {
    let Some(root) = find_cuda_root() else {
        println!("cuda not exist");
        return;
    };
    println!("cuda root = {}", root.display());
    let Some(cufft) = find_cufft(&root) else {
        println!("cufft not exist");
        return;
    };
    let Some(cufft) = cufft else {
        println!("find cufft in ldconfig path");
        return;
    };
    println!("cufft lib = {}", cufft.display())
}

#[test]
fn test_not_a_toolkit() {
    let dir = std::env::temp_dir().join("search-cuda-tools-empty");
    fs::create_dir_all(&dir).unwrap();
    assert_eq!(find_cufft(&dir), None);
    assert!(!has_cufft(&dir));
}
