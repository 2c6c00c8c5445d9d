//! Testes do DevFS e dos hooks de dispositivo

use super::{close, err};
use crate::fs::devfs::DevFs;
use crate::fs::vfs::link::{mkdir, mknod};
use crate::fs::vfs::open::{duplicate, open};
use crate::fs::vfs::{io, FileMode, FileType, OpenFlags, DEV_NULL};
use crate::klib::test_framework::{Fixture, RecordingDevices};
use crate::syscall::error::SysError;

#[test]
fn test_first_open_and_last_close_notify_driver() {
    let fx = Fixture::new();
    let task = fx.root_task();

    let a = open(&fx.vfs, &task, "/dev/null", OpenFlags::RDWR, FileMode::empty()).unwrap();
    let b = duplicate(&fx.vfs, &a).unwrap();
    assert_eq!(*fx.devices.opens.lock().unwrap(), vec![DEV_NULL]);

    close(&fx.vfs, a);
    assert!(fx.devices.closes.lock().unwrap().is_empty());
    close(&fx.vfs, b);
    assert_eq!(*fx.devices.closes.lock().unwrap(), vec![DEV_NULL]);
}

#[test]
fn test_refused_open_rolls_back() {
    let fx = Fixture::with_devices(RecordingDevices {
        refuse: Some(DEV_NULL),
        ..RecordingDevices::default()
    });
    let task = fx.root_task();

    assert_eq!(
        err(open(&fx.vfs, &task, "/dev/null", OpenFlags::RDONLY, FileMode::empty())),
        SysError::IoError
    );
    let null = fx.vfs.devfs_root().child("null").unwrap();
    assert_eq!(null.f_count.get(), 0);
    assert_eq!(null.count.get(), 0);
}

#[test]
fn test_device_io_goes_through_hooks() {
    let fx = Fixture::new();
    let task = fx.root_task();
    mknod(&task, "/dev/tty", FileType::CharDevice, FileMode::octal(0o666), 4).unwrap();

    let tty = open(&fx.vfs, &task, "/dev/tty", OpenFlags::RDWR, FileMode::empty()).unwrap();
    assert_eq!(tty.inode().dev, 4);

    let mut buf = [0u8; 8];
    assert_eq!(io::read(&fx.vfs, &tty, &mut buf), Ok(3));
    assert_eq!(&buf[..3], b"dev");
    assert_eq!(tty.pos(), 3);
    assert_eq!(io::write(&fx.vfs, &tty, b"hello"), Ok(5));
    close(&fx.vfs, tty);

    let null = open(&fx.vfs, &task, "/dev/null", OpenFlags::RDONLY, FileMode::empty()).unwrap();
    assert_eq!(io::read(&fx.vfs, &null, &mut buf), Ok(0));
    close(&fx.vfs, null);
}

#[test]
fn test_regular_files_refused() {
    let fx = Fixture::new();
    let task = fx.root_task();

    assert_eq!(
        err(open(
            &fx.vfs,
            &task,
            "/dev/file",
            OpenFlags::CREATE | OpenFlags::RDWR,
            FileMode::octal(0o644),
        )),
        SysError::AccessDenied
    );
    assert_eq!(mkdir(&task, "/dev/input", FileMode::octal(0o755)), Ok(()));
}

#[test]
fn test_register_duplicate_name() {
    let fx = Fixture::new();
    let root = fx.vfs.devfs_root();

    let node = DevFs::register(root, "zero", FileType::CharDevice, 0x0105, FileMode::octal(0o666))
        .unwrap();
    assert_eq!(node.dev, 0x0105);
    assert_eq!(
        DevFs::register(root, "zero", FileType::CharDevice, 0x0105, FileMode::octal(0o666)).err(),
        Some(SysError::AlreadyExists)
    );
}
