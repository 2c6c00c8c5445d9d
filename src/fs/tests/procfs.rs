//! Testes do ProcFS

use super::{close, err, read_all};
use crate::fs::vfs::link::{mkdir, unlink};
use crate::fs::vfs::lookup::lookup;
use crate::fs::vfs::mount::mount_by_name;
use crate::fs::vfs::open::open;
use crate::fs::vfs::{io, FileMode, OpenFlags};
use crate::klib::test_framework::Fixture;
use crate::syscall::error::SysError;

fn read_proc(fx: &Fixture, path: &str) -> String {
    let task = fx.root_task();
    let file = open(&fx.vfs, &task, path, OpenFlags::RDONLY, FileMode::empty()).unwrap();
    let text = String::from_utf8(read_all(&fx.vfs, &file)).unwrap();
    close(&fx.vfs, file);
    text
}

#[test]
fn test_version() {
    let fx = Fixture::new();
    let text = read_proc(&fx, "/proc/version");
    assert!(text.starts_with("forge-vfs "));
    assert!(text.ends_with('\n'));

    let st = io::stat(&fx.root_task(), "/proc/version").unwrap();
    assert_eq!(st.len, text.len() as u64);
}

#[test]
fn test_mounts_follow_mount_table() {
    let fx = Fixture::new();
    let task = fx.root_task();
    assert_eq!(read_proc(&fx, "/proc/mounts"), "devfs /dev\nprocfs /proc\n");

    mkdir(&task, "/mnt", FileMode::octal(0o755)).unwrap();
    mount_by_name(&fx.vfs, &task, "/mnt", "tmpfs").unwrap();
    assert_eq!(
        read_proc(&fx, "/proc/mounts"),
        "devfs /dev\nprocfs /proc\ntmpfs /mnt\n"
    );
}

#[test]
fn test_read_only() {
    let fx = Fixture::new();
    let task = fx.root_task();

    let file = open(&fx.vfs, &task, "/proc/version", OpenFlags::WRONLY, FileMode::empty()).unwrap();
    assert_eq!(io::write(&fx.vfs, &file, b"x"), Err(SysError::PermissionDenied));
    close(&fx.vfs, file);

    assert_eq!(unlink(&task, "/proc/version"), Err(SysError::PermissionDenied));
    assert_eq!(
        err(open(
            &fx.vfs,
            &task,
            "/proc/new",
            OpenFlags::CREATE | OpenFlags::RDWR,
            FileMode::octal(0o644),
        )),
        SysError::AccessDenied
    );
    assert_eq!(lookup(&task, "/proc/missing").err(), Some(SysError::NotFound));
}

#[test]
fn test_readdir_lists_entries() {
    let fx = Fixture::new();
    let task = fx.root_task();

    let dir = open(&fx.vfs, &task, "/proc", OpenFlags::DIRECTORY, FileMode::empty()).unwrap();
    let names: Vec<String> = io::readdir(&dir).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["version", "mounts"]);
    close(&fx.vfs, dir);
}
