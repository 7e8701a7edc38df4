//! Recursive discovery the way a sync engine drives the VIO layer
//!
//! The walker below is engine-side code: it branches on the native error
//! of each failed open to decide whether to skip, record, or abort.

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use vio_fs::{Context, Error, LocalVio, Result, Vio};
use vio_test_utils::ScratchDir;

#[derive(Debug, Default)]
struct Discovery {
    files: Vec<String>,
    dirs: Vec<String>,
    /// Relative path and native error code of directories skipped.
    skipped: Vec<(String, Option<i32>)>,
    vanished: Vec<String>,
}

fn discover<V: Vio>(vio: &V, ctx: &Context, root: &str) -> Result<Discovery> {
    let mut discovery = Discovery::default();
    walk(vio, ctx, root.trim_end_matches('/'), "", &mut discovery)?;
    discovery.files.sort();
    discovery.dirs.sort();
    Ok(discovery)
}

fn walk<V: Vio>(
    vio: &V,
    ctx: &Context,
    root: &str,
    rel: &str,
    discovery: &mut Discovery,
) -> Result<()> {
    let path = if rel.is_empty() {
        root.to_string()
    } else {
        format!("{root}/{rel}")
    };

    let entries = match vio.read_all(ctx, &path) {
        Ok(entries) => entries,
        Err(err @ Error::AccessDenied { .. }) => {
            discovery.skipped.push((rel.to_string(), err.raw_os_error()));
            return Ok(());
        }
        Err(Error::NotFound { .. }) => {
            discovery.vanished.push(rel.to_string());
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    for entry in entries {
        let child = if rel.is_empty() {
            entry.name.clone()
        } else {
            format!("{rel}/{}", entry.name)
        };
        if entry.is_dir() {
            discovery.dirs.push(child.clone());
            walk(vio, ctx, root, &child, discovery)?;
        } else {
            discovery.files.push(child);
        }
    }
    Ok(())
}

#[fixture]
fn tree() -> ScratchDir {
    let scratch = ScratchDir::with_test_dir();
    scratch.create_dir("this/is/a/mkdirs/test");
    scratch.write_file("file.txt", "top");
    scratch.write_file("this/one.txt", "1");
    scratch.write_file("this/is/two.txt", "2");
    scratch.write_file("this/is/a/mkdirs/test/deep.txt", "deep");
    scratch
}

#[rstest]
fn discovers_every_file_and_directory(tree: ScratchDir) {
    let discovery = discover(&LocalVio::new(), &Context::new(), &tree.test_dir_str()).unwrap();

    assert_eq!(
        discovery.files,
        vec![
            "file.txt",
            "this/is/a/mkdirs/test/deep.txt",
            "this/is/two.txt",
            "this/one.txt",
        ]
    );
    assert_eq!(
        discovery.dirs,
        vec!["this", "this/is", "this/is/a", "this/is/a/mkdirs", "this/is/a/mkdirs/test"]
    );
    assert!(discovery.skipped.is_empty());
}

#[cfg(unix)]
#[rstest]
fn unreadable_subtree_is_skipped_with_native_code(tree: ScratchDir) {
    if vio_test_utils::is_root() {
        eprintln!("Skipping test: running as root bypasses permission checks");
        return;
    }
    let locked = tree.test_dir().join("this/is");
    let _guard = tree.restrict(&locked, 0o000);

    let discovery = discover(&LocalVio::new(), &Context::new(), &tree.test_dir_str()).unwrap();

    assert_eq!(discovery.skipped, vec![("this/is".to_string(), Some(libc::EACCES))]);
    assert_eq!(discovery.files, vec!["file.txt", "this/one.txt"]);
}

#[test]
fn missing_root_is_reported_as_vanished() {
    let scratch = ScratchDir::new();

    let discovery = discover(&LocalVio::new(), &Context::new(), &scratch.test_dir_str()).unwrap();

    assert_eq!(discovery.vanished, vec![String::new()]);
    assert!(discovery.files.is_empty());
}

#[test]
fn encoding_failures_abort_the_walk() {
    let err = discover(&LocalVio::new(), &Context::new(), "/tmp/csync\0test").unwrap_err();
    assert!(matches!(err, Error::Encoding { .. }));
}
