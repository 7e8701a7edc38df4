//! Directory VIO scenarios against a `csync_test` scratch directory
//!
//! Each test gets its own scratch parent (setup) which is removed when the
//! fixture drops (teardown).

use pretty_assertions::assert_eq;
use vio_fs::{Context, closedir, opendir, readdir};
use vio_test_utils::{ScratchDir, logging};

#[test]
fn opendir_on_readable_directory() {
    logging::init();
    let scratch = ScratchDir::with_test_dir();
    let ctx = Context::new();

    let mut dh = opendir(&ctx, &scratch.test_dir_str()).ok();
    assert!(dh.is_some());

    let rc = closedir(&ctx, dh.as_mut());
    assert_eq!(rc, 0);
}

#[cfg(unix)]
#[test]
fn opendir_without_read_permission() {
    logging::init();
    if vio_test_utils::is_root() {
        eprintln!("Skipping test: running as root bypasses permission checks");
        return;
    }
    let scratch = ScratchDir::new();
    let dir = scratch.create_test_dir(0o300);
    // Restored to rwxr-xr-x before the scratch parent is removed.
    let _restore = scratch.restrict(&dir, 0o300);
    let ctx = Context::new();

    let result = opendir(&ctx, &scratch.test_dir_str());

    let err = result.expect_err("open must fail without read permission");
    assert_eq!(err.raw_os_error(), Some(libc::EACCES));
}

#[test]
fn closedir_null() {
    let ctx = Context::new();
    let rc = closedir(&ctx, None);
    assert_eq!(rc, -1);
}

#[test]
fn readdir_yields_an_entry() {
    logging::init();
    let scratch = ScratchDir::with_test_dir();
    scratch.write_file("file.txt", "content");
    let ctx = Context::new();

    let mut dh = opendir(&ctx, &scratch.test_dir_str()).unwrap();

    let dirent = readdir(&ctx, &mut dh).unwrap();
    assert!(dirent.is_some());
    assert_eq!(dirent.unwrap().name, "file.txt");

    let rc = closedir(&ctx, Some(&mut dh));
    assert_eq!(rc, 0);
}

#[test]
fn readdir_on_empty_directory_is_exhausted_not_failed() {
    let scratch = ScratchDir::with_test_dir();
    let ctx = Context::new();

    let mut dh = opendir(&ctx, &scratch.test_dir_str()).unwrap();

    assert!(readdir(&ctx, &mut dh).unwrap().is_none());
    assert_eq!(closedir(&ctx, Some(&mut dh)), 0);
}

#[test]
fn closedir_twice() {
    let scratch = ScratchDir::with_test_dir();
    let ctx = Context::new();
    let mut dh = opendir(&ctx, &scratch.test_dir_str()).unwrap();

    assert_eq!(closedir(&ctx, Some(&mut dh)), 0);
    assert_eq!(closedir(&ctx, Some(&mut dh)), -1);
    let err = readdir(&ctx, &mut dh).unwrap_err();
    assert!(err.is_misuse());
}
