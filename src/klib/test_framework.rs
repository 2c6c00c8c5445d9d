//! Framework de testes do núcleo (host)
//!
//! Dublês dos colaboradores externos:
//! - [`TestScheduler`]: cada thread do teste é uma tarefa; `block` estaciona
//!   a thread até um `wake` ou sinal.
//! - [`HeapFrames`]: frames de 4 KiB no heap do host, endereços físicos
//!   falsos.
//! - [`RecordingTlb`]: registra invalidações locais e shootdowns.
//! - [`RecordingDevices`]: registra primeiro open / último close.
//!
//! Frames e TLB escrevem no mesmo [`EventLog`], para testes de ordem.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::ptr::NonNull;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::fs::vfs::{DeviceHooks, FsError, FsResult, Vfs, VfsConfig, DEV_NULL};
use crate::mm::addr::{PhysAddr, VirtAddr};
use crate::mm::aspace::AddressSpace;
use crate::mm::config::{PAGE_SIZE, PT_ENTRIES, USER_HEAP_BASE};
use crate::mm::pmm::FrameAllocator;
use crate::mm::vmm::{TlbBackend, Vmm};
use crate::sched::{Credentials, Scheduler, Task, TaskId};

// =============================================================================
// SCHEDULER
// =============================================================================

thread_local! {
    static CURRENT: Cell<TaskId> = const { Cell::new(1) };
}

#[derive(Default)]
struct Parker {
    /// Wake entregue e ainda não consumido
    token: bool,
    signal: bool,
}

#[derive(Default)]
pub struct TestScheduler {
    parkers: Mutex<HashMap<TaskId, Arc<(Mutex<Parker>, Condvar)>>>,
    blocked: Mutex<HashSet<TaskId>>,
    killed: Mutex<Vec<TaskId>>,
}

impl TestScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A thread atual passa a ser a tarefa `task`.
    pub fn enter(task: TaskId) {
        CURRENT.with(|c| c.set(task));
    }

    fn parker(&self, task: TaskId) -> Arc<(Mutex<Parker>, Condvar)> {
        self.parkers
            .lock()
            .unwrap()
            .entry(task)
            .or_default()
            .clone()
    }

    /// Sinal pendente para `task` (acorda se estiver bloqueada).
    pub fn raise_signal(&self, task: TaskId) {
        let parker = self.parker(task);
        parker.0.lock().unwrap().signal = true;
        parker.1.notify_all();
    }

    pub fn clear_signal(&self, task: TaskId) {
        self.parker(task).0.lock().unwrap().signal = false;
    }

    pub fn is_blocked(&self, task: TaskId) -> bool {
        self.blocked.lock().unwrap().contains(&task)
    }

    /// Espera (até 5 s) a tarefa `task` entrar em `block`.
    pub fn wait_blocked(&self, task: TaskId) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.is_blocked(task) {
            assert!(Instant::now() < deadline, "tarefa {} nunca bloqueou", task);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn killed(&self) -> Vec<TaskId> {
        self.killed.lock().unwrap().clone()
    }
}

impl Scheduler for TestScheduler {
    fn current_task(&self) -> TaskId {
        CURRENT.with(|c| c.get())
    }

    fn block(&self) {
        let task = self.current_task();
        let parker = self.parker(task);
        self.blocked.lock().unwrap().insert(task);

        let mut st = parker.0.lock().unwrap();
        while !st.token && !st.signal {
            st = parker.1.wait(st).unwrap();
        }
        st.token = false;
        drop(st);

        self.blocked.lock().unwrap().remove(&task);
    }

    fn wake(&self, task: TaskId) {
        let parker = self.parker(task);
        parker.0.lock().unwrap().token = true;
        parker.1.notify_all();
    }

    fn signal_pending(&self, task: TaskId) -> bool {
        self.parker(task).0.lock().unwrap().signal
    }

    fn kill(&self, task: TaskId) {
        self.killed.lock().unwrap().push(task);
    }
}

// =============================================================================
// EVENTOS DE MEMÓRIA / TLB
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Alloc(u64),
    Free(u64),
    InvalidateLocal(u64),
    Shootdown(u64),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

// =============================================================================
// FRAMES
// =============================================================================

type Table = Box<[u64; PT_ENTRIES]>;

pub struct HeapFrames {
    frames: Mutex<HashMap<u64, Table>>,
    next: Mutex<u64>,
    limit: Option<usize>,
    log: EventLog,
}

impl HeapFrames {
    pub fn new(log: EventLog) -> Self {
        Self {
            frames: Mutex::new(HashMap::new()),
            next: Mutex::new(0x10_0000),
            limit: None,
            log,
        }
    }

    /// No máximo `limit` frames vivos ao mesmo tempo.
    pub fn with_limit(log: EventLog, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new(log)
        }
    }

    pub fn live(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn is_live(&self, frame: PhysAddr) -> bool {
        self.frames.lock().unwrap().contains_key(&frame.as_u64())
    }
}

impl FrameAllocator for HeapFrames {
    fn allocate_frame(&self) -> Option<PhysAddr> {
        let mut frames = self.frames.lock().unwrap();
        if self.limit.is_some_and(|limit| frames.len() >= limit) {
            return None;
        }
        let addr = {
            let mut next = self.next.lock().unwrap();
            let addr = *next;
            *next += PAGE_SIZE as u64;
            addr
        };
        frames.insert(addr, Box::new([0xDEAD_BEEF; PT_ENTRIES]));
        self.log.lock().unwrap().push(Event::Alloc(addr));
        Some(PhysAddr::new(addr))
    }

    fn free_frame(&self, frame: PhysAddr) {
        let removed = self.frames.lock().unwrap().remove(&frame.as_u64());
        assert!(removed.is_some(), "double free de {:#x}", frame.as_u64());
        self.log.lock().unwrap().push(Event::Free(frame.as_u64()));
    }

    fn table_ptr(&self, frame: PhysAddr) -> NonNull<u64> {
        let mut frames = self.frames.lock().unwrap();
        let table = frames
            .get_mut(&frame.as_u64())
            .unwrap_or_else(|| panic!("frame {:#x} não alocado", frame.as_u64()));
        NonNull::from(&mut **table).cast::<u64>()
    }
}

// =============================================================================
// TLB
// =============================================================================

pub struct RecordingTlb {
    cpus: usize,
    log: EventLog,
}

impl RecordingTlb {
    pub fn new(cpus: usize, log: EventLog) -> Self {
        Self { cpus, log }
    }
}

impl TlbBackend for RecordingTlb {
    fn invalidate_local(&self, vaddr: VirtAddr) {
        self.log.lock().unwrap().push(Event::InvalidateLocal(vaddr.as_u64()));
    }

    fn cpu_count(&self) -> usize {
        self.cpus
    }

    fn send_shootdown(&self, vaddr: VirtAddr) {
        self.log.lock().unwrap().push(Event::Shootdown(vaddr.as_u64()));
    }
}

/// VMM sobre frames do heap e TLB gravado, com `cpus` CPUs.
pub fn test_vmm(cpus: usize) -> (Vmm, Arc<HeapFrames>, EventLog) {
    let log = event_log();
    let frames = Arc::new(HeapFrames::new(log.clone()));
    let vmm = Vmm::new(frames.clone(), Arc::new(RecordingTlb::new(cpus, log.clone())));
    (vmm, frames, log)
}

// =============================================================================
// DISPOSITIVOS
// =============================================================================

#[derive(Default)]
pub struct RecordingDevices {
    pub opens: Mutex<Vec<u32>>,
    pub closes: Mutex<Vec<u32>>,
    /// Dispositivo cujo primeiro open falha
    pub refuse: Option<u32>,
}

impl DeviceHooks for RecordingDevices {
    fn on_open(&self, dev: u32) -> FsResult<()> {
        if self.refuse == Some(dev) {
            return Err(FsError::IoError);
        }
        self.opens.lock().unwrap().push(dev);
        Ok(())
    }

    fn on_close(&self, dev: u32) {
        self.closes.lock().unwrap().push(dev);
    }

    fn read(&self, dev: u32, _offset: u64, buf: &mut [u8]) -> FsResult<usize> {
        if dev == DEV_NULL {
            return Ok(0);
        }
        let n = buf.len().min(3);
        buf[..n].copy_from_slice(&b"dev"[..n]);
        Ok(n)
    }

    fn write(&self, _dev: u32, _offset: u64, buf: &[u8]) -> FsResult<usize> {
        Ok(buf.len())
    }
}

// =============================================================================
// FIXTURE
// =============================================================================

/// VFS + scheduler + VMM prontos para um teste.
pub struct Fixture {
    pub sched: Arc<TestScheduler>,
    pub devices: Arc<RecordingDevices>,
    pub vfs: Vfs,
    pub vmm: Vmm,
    pub frames: Arc<HeapFrames>,
    pub log: EventLog,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_devices(RecordingDevices::default())
    }

    pub fn with_devices(devices: RecordingDevices) -> Self {
        let sched = TestScheduler::new();
        let devices = Arc::new(devices);
        let config = VfsConfig::new(sched.clone()).with_devices(devices.clone());
        let vfs = Vfs::new(config).expect("Vfs::new");
        let (vmm, frames, log) = test_vmm(1);
        Self {
            sched,
            devices,
            vfs,
            vmm,
            frames,
            log,
        }
    }

    /// Tarefa com raiz e cwd em "/".
    pub fn task(&self, id: TaskId, creds: Credentials) -> Task {
        let aspace = Arc::new(AddressSpace::new(&self.vmm).expect("address space"));
        Task::new(
            id,
            creds,
            self.vfs.root(),
            aspace,
            VirtAddr::new(USER_HEAP_BASE),
        )
    }

    pub fn root_task(&self) -> Task {
        self.task(1, Credentials::ROOT)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
