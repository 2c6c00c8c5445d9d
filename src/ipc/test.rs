//! Testes de Pipes
//!
//! Leitura por linha, EOF, BrokenPipe e o protocolo de bloqueio com
//! tarefas reais (threads do host).

use std::sync::Arc;
use std::thread;

use super::pipe::{Pipe, PipeError};
use crate::klib::test_framework::TestScheduler;

fn anon() -> (Arc<TestScheduler>, Arc<Pipe>) {
    (TestScheduler::new(), Pipe::anonymous())
}

#[test]
fn test_line_buffered_read() {
    let (sched, pipe) = anon();
    assert_eq!(pipe.write(&*sched, b"hello\nworld"), Ok(11));

    let mut buf = [0u8; 64];
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(6));
    assert_eq!(&buf[..6], b"hello\n");
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(5));
    assert_eq!(&buf[..5], b"world");
    assert_eq!(pipe.counts().pending, 0);
}

#[test]
fn test_short_buffer_read() {
    let (sched, pipe) = anon();
    pipe.write(&*sched, b"abcdef").unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(4));
    assert_eq!(&buf, b"abcd");
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(2));
    assert_eq!(&buf[..2], b"ef");
}

#[test]
fn test_eof_without_writers_does_not_block() {
    let (sched, pipe) = anon();
    pipe.write(&*sched, b"tail").unwrap();
    assert!(!pipe.close_endpoint(&*sched, false, true));

    let mut buf = [0u8; 16];
    // Dados pendentes ainda são entregues antes do EOF
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(4));
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(0));
    assert!(pipe.read_ready());
}

#[test]
fn test_write_without_readers_is_broken_pipe() {
    let (sched, pipe) = anon();
    assert!(!pipe.close_endpoint(&*sched, true, false));
    assert_eq!(pipe.write(&*sched, b"x"), Err(PipeError::BrokenPipe));
    assert!(pipe.write_ready());
}

#[test]
fn test_last_endpoint_frees_only_anonymous_pipes() {
    let (sched, pipe) = anon();
    assert!(!pipe.close_endpoint(&*sched, true, false));
    assert!(pipe.close_endpoint(&*sched, false, true));

    let named = Pipe::new(true);
    named.open_endpoint(true, false);
    assert!(!named.close_endpoint(&*sched, true, false));
    assert_eq!(named.endpoints(), 0);
}

#[test]
#[should_panic(expected = "underflow")]
fn test_endpoint_underflow_is_fatal() {
    let sched = TestScheduler::new();
    let pipe = Pipe::new(true);
    pipe.close_endpoint(&*sched, true, false);
}

#[test]
fn test_endpoint_counts() {
    let pipe = Pipe::new(true);
    pipe.open_endpoint(true, false);
    pipe.open_endpoint(false, true);
    pipe.open_endpoint(true, true);

    let c = pipe.counts();
    assert_eq!((c.count, c.rdcount, c.wrcount), (3, 2, 2));
}

#[test]
fn test_blocked_reader_gets_data() {
    let (sched, pipe) = anon();

    let reader = {
        let (sched, pipe) = (sched.clone(), pipe.clone());
        thread::spawn(move || {
            TestScheduler::enter(2);
            let mut buf = [0u8; 16];
            let n = pipe.read(&*sched, &mut buf).unwrap();
            buf[..n].to_vec()
        })
    };

    sched.wait_blocked(2);
    assert_eq!(pipe.counts().blocked_readers, 1);
    pipe.write(&*sched, b"ping\n").unwrap();
    assert_eq!(reader.join().unwrap(), b"ping\n");
}

#[test]
fn test_blocked_reader_sees_eof_when_last_writer_closes() {
    let (sched, pipe) = anon();

    let reader = {
        let (sched, pipe) = (sched.clone(), pipe.clone());
        thread::spawn(move || {
            TestScheduler::enter(2);
            let mut buf = [0u8; 16];
            pipe.read(&*sched, &mut buf)
        })
    };

    sched.wait_blocked(2);
    pipe.close_endpoint(&*sched, false, true);
    assert_eq!(reader.join().unwrap(), Ok(0));
}

#[test]
fn test_blocked_writer_resumes_after_read() {
    let sched = TestScheduler::new();
    let pipe = Arc::new(Pipe::with_capacity(false, 8));
    pipe.open_endpoint(true, false);
    pipe.open_endpoint(false, true);
    pipe.write(&*sched, b"12345678").unwrap();

    let writer = {
        let (sched, pipe) = (sched.clone(), pipe.clone());
        thread::spawn(move || {
            TestScheduler::enter(3);
            pipe.write(&*sched, b"9abc")
        })
    };

    sched.wait_blocked(3);
    assert_eq!(pipe.counts().blocked_writers, 1);

    let mut buf = [0u8; 8];
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(8));
    assert_eq!(writer.join().unwrap(), Ok(4));
    assert_eq!(pipe.read(&*sched, &mut buf), Ok(4));
    assert_eq!(&buf[..4], b"9abc");
}

#[test]
fn test_blocked_writer_sees_broken_pipe() {
    let sched = TestScheduler::new();
    let pipe = Arc::new(Pipe::with_capacity(false, 4));
    pipe.open_endpoint(true, false);
    pipe.open_endpoint(false, true);
    pipe.write(&*sched, b"full").unwrap();

    let writer = {
        let (sched, pipe) = (sched.clone(), pipe.clone());
        thread::spawn(move || {
            TestScheduler::enter(3);
            pipe.write(&*sched, b"more")
        })
    };

    sched.wait_blocked(3);
    pipe.close_endpoint(&*sched, true, false);
    assert_eq!(writer.join().unwrap(), Err(PipeError::BrokenPipe));
}

#[test]
fn test_oversized_write_is_chunked() {
    let sched = TestScheduler::new();
    let pipe = Arc::new(Pipe::with_capacity(false, 4));
    pipe.open_endpoint(true, false);
    pipe.open_endpoint(false, true);

    let writer = {
        let (sched, pipe) = (sched.clone(), pipe.clone());
        thread::spawn(move || {
            TestScheduler::enter(4);
            pipe.write(&*sched, b"0123456789")
        })
    };

    let mut got = Vec::new();
    let mut buf = [0u8; 4];
    while got.len() < 10 {
        let n = pipe.read(&*sched, &mut buf).unwrap();
        got.extend_from_slice(&buf[..n]);
    }
    assert_eq!(writer.join().unwrap(), Ok(10));
    assert_eq!(got, b"0123456789");
}

#[test]
fn test_signal_interrupts_blocked_reader() {
    let (sched, pipe) = anon();

    let reader = {
        let (sched, pipe) = (sched.clone(), pipe.clone());
        thread::spawn(move || {
            TestScheduler::enter(6);
            let mut buf = [0u8; 4];
            pipe.read(&*sched, &mut buf)
        })
    };

    sched.wait_blocked(6);
    sched.raise_signal(6);
    assert_eq!(reader.join().unwrap(), Err(PipeError::Interrupted));
    // O waiter saiu da fila: fechar tudo não é fatal
    assert_eq!(pipe.counts().blocked_readers, 0);
    pipe.close_endpoint(&*sched, true, false);
    assert!(pipe.close_endpoint(&*sched, false, true));
}

#[test]
fn test_no_lost_wakeup_under_contention() {
    let (sched, pipe) = anon();
    const ROUNDS: usize = 200;

    let reader = {
        let (sched, pipe) = (sched.clone(), pipe.clone());
        thread::spawn(move || {
            TestScheduler::enter(8);
            let mut total = 0;
            let mut buf = [0u8; 2];
            while total < ROUNDS * 2 {
                total += pipe.read(&*sched, &mut buf).unwrap();
            }
            total
        })
    };

    TestScheduler::enter(9);
    for _ in 0..ROUNDS {
        pipe.write(&*sched, b"x\n").unwrap();
    }
    assert_eq!(reader.join().unwrap(), ROUNDS * 2);
}
