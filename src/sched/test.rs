//! # Scheduler / Wait Queue Tests
//!
//! Protocolo de bloqueio contra o escalonador de threads do host.

use std::sync::{Arc, Mutex};
use std::thread;

use super::{sleep, Scheduler, WaitOutcome, WaitQueue};
use crate::klib::test_framework::TestScheduler;

#[test]
fn test_wake_all_drains_queue() {
    let sched = TestScheduler::new();
    let mut queue = WaitQueue::new();
    let a = queue.prepare(10);
    let b = queue.prepare(11);
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.wake_all(&*sched), 2);
    assert!(queue.is_empty());
    assert!(a.is_woken() && b.is_woken());
}

#[test]
fn test_cancel_removes_only_that_waiter() {
    let mut queue = WaitQueue::new();
    let a = queue.prepare(1);
    let _b = queue.prepare(2);
    queue.cancel(&a);
    assert_eq!(queue.len(), 1);
    // Cancelar de novo não faz nada
    queue.cancel(&a);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_wake_before_block_is_not_lost() {
    let sched = TestScheduler::new();
    TestScheduler::enter(5);
    let mut queue = WaitQueue::new();
    let waiter = queue.prepare(5);

    // Acordado entre registrar e dormir
    queue.wake_all(&*sched);
    assert_eq!(sleep(&*sched, &waiter), WaitOutcome::Woken);
}

#[test]
fn test_signal_interrupts_sleep() {
    let sched = TestScheduler::new();
    let queue = Arc::new(Mutex::new(WaitQueue::new()));

    let sleeper = {
        let sched = sched.clone();
        let queue = queue.clone();
        thread::spawn(move || {
            TestScheduler::enter(7);
            let waiter = queue.lock().unwrap().prepare(7);
            let outcome = sleep(&*sched, &waiter);
            queue.lock().unwrap().cancel(&waiter);
            outcome
        })
    };

    sched.wait_blocked(7);
    sched.raise_signal(7);
    assert_eq!(sleeper.join().unwrap(), WaitOutcome::Interrupted);
    assert!(queue.lock().unwrap().is_empty());
}

#[test]
fn test_blocked_task_woken_by_other_thread() {
    let sched = TestScheduler::new();
    let queue = Arc::new(Mutex::new(WaitQueue::new()));

    let sleeper = {
        let sched = sched.clone();
        let queue = queue.clone();
        thread::spawn(move || {
            TestScheduler::enter(3);
            let waiter = queue.lock().unwrap().prepare(3);
            sleep(&*sched, &waiter)
        })
    };

    sched.wait_blocked(3);
    assert_eq!(queue.lock().unwrap().wake_all(&*sched), 1);
    assert_eq!(sleeper.join().unwrap(), WaitOutcome::Woken);
    assert!(!sched.signal_pending(3));
}
