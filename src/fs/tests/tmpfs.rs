//! Testes do TmpFS

use std::thread;

use super::{close, create_with, open_rw, read_all};
use crate::fs::tmpfs::MAX_FILE_SIZE;
use crate::fs::vfs::link::{link, mkdir, unlink};
use crate::fs::vfs::open::open;
use crate::fs::vfs::{io, FileMode, FileType, OpenFlags, SeekWhence};
use crate::klib::test_framework::{Fixture, TestScheduler};
use crate::syscall::error::SysError;

#[test]
fn test_write_past_end_leaves_hole() {
    let fx = Fixture::new();
    let task = fx.root_task();

    let file = create_with(&fx.vfs, &task, "/sparse", b"ab");
    io::seek(&file, 6, SeekWhence::Set).unwrap();
    io::write(&fx.vfs, &file, b"cd").unwrap();

    assert_eq!(file.inode().len(), 8);
    assert_eq!(read_all(&fx.vfs, &file), b"ab\0\0\0\0cd");
    close(&fx.vfs, file);
}

#[test]
fn test_unsynced_truncate_hides_old_bytes() {
    let fx = Fixture::new();
    let task = fx.root_task();

    let file = create_with(&fx.vfs, &task, "/t", b"abcdef");
    file.inode().set_len(2);
    assert_eq!(read_all(&fx.vfs, &file), b"ab");

    // Escrever além do `len` novo não ressuscita o conteúdo antigo
    io::seek(&file, 4, SeekWhence::Set).unwrap();
    io::write(&fx.vfs, &file, b"Z").unwrap();
    assert_eq!(read_all(&fx.vfs, &file), b"ab\0\0Z");

    assert_eq!(io::fsync(&file), Ok(()));
    assert_eq!(read_all(&fx.vfs, &file), b"ab\0\0Z");
    close(&fx.vfs, file);
}

#[test]
fn test_write_beyond_max_size_is_refused() {
    let fx = Fixture::new();
    let task = fx.root_task();

    let file = create_with(&fx.vfs, &task, "/huge", b"ab");
    io::seek(&file, i64::MAX - 1, SeekWhence::Set).unwrap();
    assert_eq!(io::write(&fx.vfs, &file, b"z"), Err(SysError::OutOfMemory));

    io::seek(&file, MAX_FILE_SIZE as i64, SeekWhence::Set).unwrap();
    assert_eq!(io::write(&fx.vfs, &file, b"z"), Err(SysError::OutOfMemory));

    assert_eq!(file.inode().len(), 2);
    assert_eq!(read_all(&fx.vfs, &file), b"ab");
    close(&fx.vfs, file);
}

#[test]
fn test_concurrent_writers_keep_both_ranges() {
    let fx = Fixture::new();
    let task = fx.root_task();

    for i in 0..200 {
        let path = format!("/w{}", i);
        let low = create_with(&fx.vfs, &task, &path, b"");
        let high = open_rw(&fx.vfs, &task, &path);
        io::seek(&high, 4096, SeekWhence::Set).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                TestScheduler::enter(2);
                assert_eq!(io::write(&fx.vfs, &low, &[b'a'; 4096]), Ok(4096));
            });
            s.spawn(|| {
                TestScheduler::enter(3);
                assert_eq!(io::write(&fx.vfs, &high, &[b'b'; 4096]), Ok(4096));
            });
        });

        let content = read_all(&fx.vfs, &low);
        assert_eq!(content.len(), 8192);
        assert!(content[..4096].iter().all(|&c| c == b'a'), "bytes de {} perdidos", path);
        assert!(content[4096..].iter().all(|&c| c == b'b'));

        close(&fx.vfs, low);
        close(&fx.vfs, high);
        unlink(&task, &path).unwrap();
    }
}

#[test]
fn test_statfs_counts_regular_files() {
    let fx = Fixture::new();
    let task = fx.root_task();

    close(&fx.vfs, create_with(&fx.vfs, &task, "/a", b"1"));
    close(&fx.vfs, create_with(&fx.vfs, &task, "/b", b"2"));
    let st = io::statfs(&task, "/").unwrap();
    assert_eq!(st.fs_name, "tmpfs");
    assert_eq!(st.files, 2);

    unlink(&task, "/a").unwrap();
    assert_eq!(io::statfs(&task, "/").unwrap().files, 1);
}

#[test]
fn test_content_survives_until_last_link() {
    let fx = Fixture::new();
    let task = fx.root_task();

    close(&fx.vfs, create_with(&fx.vfs, &task, "/a", b"keep"));
    link(&task, "/a", "/b").unwrap();
    unlink(&task, "/a").unwrap();
    assert_eq!(io::statfs(&task, "/").unwrap().files, 1);

    unlink(&task, "/b").unwrap();
    assert_eq!(io::statfs(&task, "/").unwrap().files, 0);
}

#[test]
fn test_stat_reports_metadata() {
    let fx = Fixture::new();
    let task = fx.root_task();
    close(&fx.vfs, create_with(&fx.vfs, &task, "/f", b"12345"));

    let st = io::stat(&task, "/f").unwrap();
    assert_eq!(st.file_type, FileType::Regular);
    assert_eq!(st.len, 5);
    assert_eq!(st.nlink, 1);
    assert_eq!(st.sb_idx, fx.vfs.root().sb_idx);
    assert_eq!(st.mode, FileMode::octal(0o644));
}

#[test]
fn test_nested_directories_listed_in_order() {
    let fx = Fixture::new();
    let task = fx.root_task();

    mkdir(&task, "/usr", FileMode::octal(0o755)).unwrap();
    mkdir(&task, "/usr/lib", FileMode::octal(0o755)).unwrap();
    close(&fx.vfs, create_with(&fx.vfs, &task, "/usr/zz", b""));
    close(&fx.vfs, create_with(&fx.vfs, &task, "/usr/aa", b""));

    let dir = open(&fx.vfs, &task, "/usr", OpenFlags::DIRECTORY, FileMode::empty()).unwrap();
    let entries = io::readdir(&dir).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["aa", "lib", "zz"]);
    assert_eq!(entries[1].file_type, FileType::Directory);
    close(&fx.vfs, dir);

    // Arquivo aberto por outro caminho
    let f = open_rw(&fx.vfs, &task, "/usr/lib/../aa");
    assert_eq!(f.inode().name, "aa");
    close(&fx.vfs, f);
}
