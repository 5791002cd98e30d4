// tests/integration_test.rs

//! Integration tests for pkgdeps
//!
//! These tests verify end-to-end behavior across the databases, the
//! resolver and the file conflict checker.

use flate2::Compression;
use flate2::write::GzEncoder;
use pkgdeps::Error;
use pkgdeps::config::Config;
use pkgdeps::db::{LocalDb, MemoryDb, PackageDatabase, SyncDb};
use pkgdeps::filesystem::{ConflictKind, find_conflicts};
use pkgdeps::packages::{DepMod, Dependency, InstallReason, Package};
use pkgdeps::resolver::{
    DepKind, MissingDependency, Operation, Transaction, check_conflicts, check_deps,
    prepare_add, prepare_remove, prepare_sync, sort_by_deps,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn names(list: &[&Package]) -> Vec<String> {
    list.iter().map(|p| p.name.clone()).collect()
}

fn assert_no_duplicates(list: &[MissingDependency]) {
    let unique: HashSet<&MissingDependency> = list.iter().collect();
    assert_eq!(unique.len(), list.len(), "duplicate entries in {:?}", list);
}

fn write_record(db_dir: &Path, entry: &str, record: &str, content: &str) {
    let dir = db_dir.join(entry);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(record), content).unwrap();
}

fn touch(root: &Path, entry: &str) {
    let full = root.join(entry);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, b"contents").unwrap();
}

#[test]
fn test_check_deps_never_duplicates() {
    let local = MemoryDb::new("local").with_package(Package::new("glibc", "2.30-1"));
    let config = Config::default();
    let tx = Transaction::new(&local, &config);

    let a = Package::new("a", "1").with_depends(&["glibc>=2.34", "glibc>=2.34", "zlib", "zlib"]);
    let b = Package::new("b", "1").with_depends(&["zlib", "a=2"]);

    let missing = check_deps(&tx, Operation::Add, &[&a, &b]);
    assert_no_duplicates(&missing);
    assert_eq!(missing.len(), 4);
}

#[test]
fn test_check_conflicts_never_duplicates() {
    let local = MemoryDb::new("local")
        .with_package(Package::new("vim", "9.1-1").with_conflicts(&["gvim"]));

    let gvim = Package::new("gvim", "9.1-1")
        .with_provides(&["vim-runtime"])
        .with_conflicts(&["vim", "vim", "vi"]);
    let conflicts = check_conflicts(&[&gvim], &local);

    assert_no_duplicates(&conflicts);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].target, "gvim");
    assert_eq!(conflicts[0].dependency.name, "vim");
}

#[test]
fn test_topological_order_and_reversal() {
    let x = Package::new("x", "1").with_depends(&["libx", "liby"]);
    let liby = Package::new("liby", "1").with_depends(&["libz"]);
    let libx = Package::new("libx", "1").with_depends(&["libz>=1.0"]);
    let libz = Package::new("libz", "1.2-1");
    let w = Package::new("w", "1");
    let targets = [&x, &liby, &w, &libx, &libz];

    let added = sort_by_deps(&targets, Operation::Add);
    let position = |name: &str| added.iter().position(|p| p.name == name).unwrap();
    for pkg in &targets {
        for dep in Dependency::parse_all(&pkg.depends) {
            assert!(position(&dep.name) < position(&pkg.name), "{} before {}", dep.name, pkg.name);
        }
    }

    let mut removed = sort_by_deps(&targets, Operation::Remove);
    removed.reverse();
    assert_eq!(names(&removed), names(&added));
}

#[test]
fn test_sort_chain_scenario() {
    let a = Package::new("A", "1");
    let b = Package::new("B", "1").with_depends(&["A"]);
    let c = Package::new("C", "1").with_depends(&["B"]);

    assert_eq!(names(&sort_by_deps(&[&a, &b, &c], Operation::Add)), vec!["A", "B", "C"]);
    assert_eq!(names(&sort_by_deps(&[&a, &b, &c], Operation::Remove)), vec!["C", "B", "A"]);
    assert_eq!(names(&sort_by_deps(&[&c, &b, &a], Operation::Add)), vec!["A", "B", "C"]);
}

#[test]
fn test_version_requirement_against_installed() {
    let local = MemoryDb::new("local").with_package(Package::new("name", "1.5"));
    let config = Config::default();
    let tx = Transaction::new(&local, &config);
    let target = Package::new("target", "1.0-1").with_depends(&["name>=2.0"]);

    let missing = check_deps(&tx, Operation::Add, &[&target]);
    assert!(missing.contains(&MissingDependency::new(
        "target",
        DepKind::Depend,
        Dependency {
            name: "name".to_string(),
            modifier: DepMod::Ge,
            version: "2.0".to_string(),
        },
    )));
}

#[test]
fn test_conflict_through_provides_scenario() {
    let local = MemoryDb::new("local");
    let c = Package::new("C", "1").with_conflicts(&["B"]);
    let a = Package::new("A", "1").with_provides(&["B"]);

    let conflicts = check_conflicts(&[&c, &a], &local);
    assert_eq!(
        conflicts,
        vec![MissingDependency::new("C", DepKind::Conflict, Dependency::any("A"))]
    );
}

#[test]
fn test_no_package_conflicts_with_itself() {
    let local = MemoryDb::new("local")
        .with_package(Package::new("foo", "1").with_provides(&["bar"]).with_conflicts(&["bar"]));
    let foo = Package::new("foo", "2").with_provides(&["bar"]).with_conflicts(&["foo", "bar"]);
    let dup = Package::new("foo", "2").with_provides(&["bar"]);

    let conflicts = check_conflicts(&[&foo, &dup], &local);
    assert!(conflicts.iter().all(|c| c.target != c.dependency.name));

    let root = TempDir::new().unwrap();
    let x = Package::new("x", "1").with_files(&["etc/x.conf"]);
    let (files, _) = find_conflicts(&[&x, &x], root.path(), &local).unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_file_conflict_symmetry() {
    let root = TempDir::new().unwrap();
    let local = MemoryDb::new("local");
    let x = Package::new("x", "1").with_files(&["etc/", "etc/foo.conf"]);
    let y = Package::new("y", "1").with_files(&["etc/", "etc/foo.conf"]);

    for order in [[&x, &y], [&y, &x]] {
        let (conflicts, skip) = find_conflicts(&order, root.path(), &local).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind(), ConflictKind::Target);
        assert_eq!(conflicts[0].file(), "etc/foo.conf");
        let pair: HashSet<&str> = [conflicts[0].target(), conflicts[0].conflicting_target()].into();
        assert_eq!(pair, HashSet::from(["x", "y"]));
        assert!(skip.is_empty());
    }
}

#[test]
fn test_moved_file_goes_to_skip_list() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "usr/lib/libold.so");
    touch(root.path(), "usr/bin/stray");

    let local = MemoryDb::new("local")
        .with_package(Package::new("OLD", "1.0-1").with_files(&["usr/lib/", "usr/lib/libold.so"]));
    let old = Package::new("OLD", "2.0-1").with_files(&["usr/lib/", "usr/lib/libnew.so"]);
    let newpkg =
        Package::new("NEWPKG", "1.0-1").with_files(&["usr/bin/stray", "usr/lib/", "usr/lib/libold.so"]);

    let (conflicts, skip) = find_conflicts(&[&old, &newpkg], root.path(), &local).unwrap();
    assert!(conflicts.iter().all(|c| c.file() != "usr/lib/libold.so"));
    assert!(skip.contains("usr/lib/libold.so"));
    for path in &skip {
        assert!(conflicts.iter().all(|c| c.file() != path));
    }

    // The stray file is owned by nobody
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind(), ConflictKind::File);
    assert_eq!(conflicts[0].file(), "usr/bin/stray");
}

#[test]
fn test_on_disk_databases_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let local_dir = temp_dir.path().join("local");
    write_record(&local_dir, "glibc-2.39-1", "desc", "%NAME%\nglibc\n%VERSION%\n2.39-1\n");
    write_record(&local_dir, "glibc-2.39-1", "depends", "%REQUIREDBY%\nbash\n");
    write_record(&local_dir, "glibc-2.39-1", "files", "%FILES%\nusr/\nusr/lib/\nusr/lib/libc.so.6\n");
    write_record(&local_dir, "bash-5.2-1", "desc", "%NAME%\nbash\n%VERSION%\n5.2-1\n");
    write_record(&local_dir, "bash-5.2-1", "depends", "%DEPENDS%\nglibc>=2.30\n");

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in [
        ("app-1.0-1/desc", "%NAME%\napp\n%VERSION%\n1.0-1\n"),
        ("app-1.0-1/depends", "%DEPENDS%\nlibfoo>=1.1\nglibc\n"),
        ("libfoo-1.2-1/desc", "%NAME%\nlibfoo\n%VERSION%\n1.2-1\n"),
        ("libfoo-1.2-1/depends", "%DEPENDS%\nglibc>=2.34\n%PROVIDES%\nfoo\n"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, content.as_bytes()).unwrap();
    }
    let sync_file = temp_dir.path().join("core.db.tar.gz");
    fs::write(&sync_file, builder.into_inner().unwrap().finish().unwrap()).unwrap();

    let local = LocalDb::open(&local_dir).unwrap();
    let core = SyncDb::open(&sync_file).unwrap();
    assert_eq!(core.treename(), "core");

    let config = Config {
        root: temp_dir.path().join("root"),
        ..Config::default()
    };
    let app = core.find("app").unwrap();
    let tx = Transaction::new(&local, &config).with_sync_db(&core).with_target(app);

    let mut confirm = |_: &str, _: &Package| true;
    let plan = prepare_sync(&tx, &mut confirm).unwrap();
    assert_eq!(names(&plan.packages), vec!["libfoo", "app"]);
    assert_eq!(names(&plan.pulled), vec!["libfoo"]);

    // glibc is still needed by bash
    let glibc = local.find("glibc").unwrap();
    let tx = Transaction::new(&local, &config).with_target(glibc);
    let mut refuse = |_: &str, _: &Package| false;
    match prepare_remove(&tx, false, &mut refuse) {
        Err(Error::UnsatisfiedDependencies(missing)) => {
            assert_eq!(
                missing,
                vec![MissingDependency::new("glibc", DepKind::Required, Dependency::any("bash"))]
            );
        }
        other => panic!("expected unsatisfied dependencies, got {:?}", other.is_ok()),
    }
}

#[test]
fn test_prepare_add_reports_file_conflicts() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "etc/shared.conf");

    let local = MemoryDb::new("local");
    let config = Config {
        root: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    let pkg = Package::new("newpkg", "1").with_files(&["etc/", "etc/shared.conf"]);
    let tx = Transaction::new(&local, &config).with_target(&pkg);

    match prepare_add(&tx, Operation::Add) {
        Err(Error::FileConflicts(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].kind(), ConflictKind::File);
        }
        other => panic!("expected file conflicts, got {:?}", other.is_ok()),
    }
}

#[test]
fn test_remove_cascade_skips_explicit_packages() {
    let local = MemoryDb::new("local")
        .with_package(Package::new("editor", "1").with_depends(&["libui", "fonts"]))
        .with_package(
            Package::new("libui", "1")
                .with_reason(InstallReason::Depend)
                .with_requiredby(&["editor"]),
        )
        .with_package(Package::new("fonts", "1").with_requiredby(&["editor"]));
    let config = Config::default();
    let editor = local.find("editor").unwrap();
    let tx = Transaction::new(&local, &config).with_target(editor);

    let mut refuse = |_: &str, _: &Package| false;
    let plan = prepare_remove(&tx, true, &mut refuse).unwrap();
    assert_eq!(names(&plan.packages), vec!["editor", "libui"]);
}

#[test]
fn test_removing_a_name_and_its_only_provider_is_blocked() {
    let local = MemoryDb::new("local")
        .with_package(Package::new("app", "1").with_depends(&["libjpeg"]))
        .with_package(Package::new("libjpeg", "9f-1").with_requiredby(&["app"]))
        .with_package(Package::new("libjpeg-turbo", "3.0-1").with_provides(&["libjpeg"]));
    let config = Config::default();
    let tx = Transaction::new(&local, &config)
        .with_target(local.find("libjpeg").unwrap())
        .with_target(local.find("libjpeg-turbo").unwrap());

    let mut refuse = |_: &str, _: &Package| false;
    match prepare_remove(&tx, false, &mut refuse) {
        Err(Error::UnsatisfiedDependencies(missing)) => {
            assert_eq!(
                missing,
                vec![MissingDependency::new("libjpeg", DepKind::Required, Dependency::any("app"))]
            );
        }
        other => panic!("expected unsatisfied dependencies, got {:?}", other.is_ok()),
    }
}
