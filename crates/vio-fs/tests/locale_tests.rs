//! Conversions under a switched locale
//!
//! Kept in its own test binary with a single test: changing `LC_CTYPE`
//! affects every thread in the process.

#[cfg(target_os = "linux")]
#[test]
fn environment_locale_enables_multibyte_paths() {
    use vio_fs::{Context, LocalVio, Vio, locale, to_native};
    use vio_test_utils::ScratchDir;

    let name = "café-日記.txt";
    let scratch = ScratchDir::with_test_dir();
    scratch.write_file(name, "content");
    scratch.create_dir("café");
    let ctx = Context::new();
    let vio = LocalVio::new();

    // Rust starts in the C locale, whatever the environment says.
    let before = locale::active_codeset();
    if !before.is_utf8() {
        assert!(to_native(name).is_err(), "{before} should not encode {name}");
        let entries = vio.read_all(&ctx, &scratch.test_dir_str()).unwrap();
        assert!(entries.iter().any(|e| e.original_path.is_some()));
    }

    // SAFETY: this binary runs a single test, so no other thread reads the
    // environment while it changes.
    unsafe { std::env::set_var("LC_ALL", "C.UTF-8") };
    let Some(codeset) = locale::set_from_environment() else {
        eprintln!("Skipping test: C.UTF-8 locale is not available");
        return;
    };
    assert!(codeset.is_utf8());
    assert_eq!(locale::active_codeset(), codeset);

    let native = to_native(name).unwrap();
    assert_eq!(native.as_bytes(), name.as_bytes());
    assert_eq!(native.to_canonical().unwrap(), name);

    let mut entries = vio.read_all(&ctx, &scratch.test_dir_str()).unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "café");
    assert_eq!(entries[1].name, name);
    assert_eq!(entries[1].size, 7);
    assert!(entries.iter().all(|e| e.is_complete()));

    let dir = format!("{}café", scratch.test_dir_str());
    let mut handle = vio.opendir(&ctx, &dir).unwrap();
    assert!(vio.readdir(&ctx, &mut handle).unwrap().is_none());
    assert_eq!(vio.closedir(&ctx, Some(&mut handle)), 0);
}
