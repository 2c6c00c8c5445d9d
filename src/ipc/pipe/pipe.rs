//! Pipes bloqueantes
//!
//! Buffer de bytes com capacidade fixa, compartilhado pelos endpoints de um
//! inode FIFO (anônimo via `pipe()` ou nomeado via `mknod`).
//!
//! Os dados vivem sempre em `buf[..write_pos]`: cada leitura compacta o
//! restante para o offset 0, então `pending == write_pos`.
//!
//! Leitura é bufferizada por linha: entrega até `max_len` bytes, parando
//! logo após o primeiro `'\n'`.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use spin::Mutex;

use crate::sched::{sleep, Scheduler, WaitOutcome, WaitQueue, Waiter};

/// Capacidade padrão do buffer
pub const PIPE_SIZE: usize = 4096;

/// Erros de I/O em pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeError {
    /// Nenhum leitor restante
    BrokenPipe,
    /// Sinal chegou enquanto bloqueado
    Interrupted,
}

/// Estado protegido pelo lock do pipe
struct PipeState {
    buf: Vec<u8>,
    write_pos: usize,
    /// Endpoints abertos (leitura + escrita)
    count: usize,
    /// Endpoints de escrita
    wrcount: usize,
    /// Endpoints de leitura
    rdcount: usize,
    readers: WaitQueue,
    writers: WaitQueue,
}

impl PipeState {
    fn wake_both(&mut self, sched: &dyn Scheduler) {
        self.readers.wake_all(sched);
        self.writers.wake_all(sched);
    }
}

pub struct Pipe {
    named: bool,
    capacity: usize,
    state: Mutex<PipeState>,
}

/// Snapshot das contagens (diagnóstico e testes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeCounts {
    pub count: usize,
    pub wrcount: usize,
    pub rdcount: usize,
    pub pending: usize,
    pub blocked_readers: usize,
    pub blocked_writers: usize,
}

impl Pipe {
    /// Pipe sem endpoints abertos.
    pub fn new(named: bool) -> Self {
        Self::with_capacity(named, PIPE_SIZE)
    }

    pub fn with_capacity(named: bool, capacity: usize) -> Self {
        Self {
            named,
            capacity,
            state: Mutex::new(PipeState {
                buf: vec![0; capacity],
                write_pos: 0,
                count: 0,
                wrcount: 0,
                rdcount: 0,
                readers: WaitQueue::new(),
                writers: WaitQueue::new(),
            }),
        }
    }

    /// Pipe anônimo já com um endpoint de leitura e um de escrita.
    pub fn anonymous() -> Arc<Self> {
        let pipe = Arc::new(Self::new(false));
        pipe.open_endpoint(true, false);
        pipe.open_endpoint(false, true);
        pipe
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn counts(&self) -> PipeCounts {
        let st = self.state.lock();
        PipeCounts {
            count: st.count,
            wrcount: st.wrcount,
            rdcount: st.rdcount,
            pending: st.write_pos,
            blocked_readers: st.readers.len(),
            blocked_writers: st.writers.len(),
        }
    }

    /// Endpoints abertos
    pub fn endpoints(&self) -> usize {
        self.state.lock().count
    }

    // =========================================================================
    // ENDPOINTS
    // =========================================================================

    /// Novo endpoint (open/dup).
    pub fn open_endpoint(&self, readable: bool, writable: bool) {
        let mut st = self.state.lock();
        st.count += 1;
        if writable {
            st.wrcount += 1;
        }
        if readable {
            st.rdcount += 1;
        }
    }

    /// Fecha um endpoint.
    ///
    /// Retorna `true` quando o buffer deve ser liberado (último endpoint de
    /// um pipe anônimo). Caso contrário acorda as duas filas: leitores veem
    /// EOF quando o último escritor sai, escritores veem `BrokenPipe` quando
    /// o último leitor sai.
    pub fn close_endpoint(&self, sched: &dyn Scheduler, readable: bool, writable: bool) -> bool {
        let mut st = self.state.lock();

        if st.count == 0
            || (writable && st.wrcount == 0)
            || (readable && st.rdcount == 0)
        {
            crate::core::panic::fatal("(Pipe) underflow de contagem de endpoints");
        }

        st.count -= 1;
        if writable {
            st.wrcount -= 1;
        }
        if readable {
            st.rdcount -= 1;
        }

        if st.count == 0 {
            if !st.readers.is_empty() || !st.writers.is_empty() {
                crate::core::panic::fatal("(Pipe) liberando pipe com tarefas bloqueadas");
            }
            if !self.named {
                crate::kdebug!("(Pipe) Último endpoint fechado, liberando buffer");
                return true;
            }
            return false;
        }

        st.wake_both(sched);
        false
    }

    // =========================================================================
    // I/O
    // =========================================================================

    /// Lê até `out.len()` bytes, parando após o primeiro `'\n'`.
    ///
    /// Vazio e sem escritores → `Ok(0)` (EOF) sem bloquear.
    pub fn read(&self, sched: &dyn Scheduler, out: &mut [u8]) -> Result<usize, PipeError> {
        if out.is_empty() {
            return Ok(0);
        }
        let task = sched.current_task();

        loop {
            let waiter = {
                let mut st = self.state.lock();

                if st.write_pos > 0 {
                    let avail = out.len().min(st.write_pos);
                    let n = match st.buf[..avail].iter().position(|&b| b == b'\n') {
                        Some(nl) => nl + 1,
                        None => avail,
                    };
                    out[..n].copy_from_slice(&st.buf[..n]);
                    let pending = st.write_pos;
                    st.buf.copy_within(n..pending, 0);
                    st.write_pos -= n;
                    st.wake_both(sched);
                    return Ok(n);
                }

                if st.wrcount == 0 {
                    return Ok(0);
                }

                st.readers.prepare(task)
            };

            self.wait(sched, &waiter, true)?;
        }
    }

    /// Escreve todos os bytes de `data`.
    ///
    /// Sem leitores → `BrokenPipe` imediato. Bloqueia enquanto
    /// `pending + len > capacity`. Escritas maiores que a capacidade são
    /// divididas em pedaços de `capacity` bytes.
    pub fn write(&self, sched: &dyn Scheduler, data: &[u8]) -> Result<usize, PipeError> {
        let task = sched.current_task();

        for chunk in data.chunks(self.capacity) {
            loop {
                let waiter = {
                    let mut st = self.state.lock();

                    if st.rdcount == 0 {
                        crate::ktrace!("(Pipe) Escrita sem leitores, task=", task);
                        return Err(PipeError::BrokenPipe);
                    }

                    if st.write_pos + chunk.len() <= self.capacity {
                        let start = st.write_pos;
                        st.buf[start..start + chunk.len()].copy_from_slice(chunk);
                        st.write_pos += chunk.len();
                        st.wake_both(sched);
                        break;
                    }

                    st.writers.prepare(task)
                };

                self.wait(sched, &waiter, false)?;
            }
        }

        Ok(data.len())
    }

    /// Dorme fora do lock. Em sinal, remove o waiter da fila.
    fn wait(&self, sched: &dyn Scheduler, waiter: &Arc<Waiter>, reader: bool) -> Result<(), PipeError> {
        match sleep(sched, waiter) {
            WaitOutcome::Woken => Ok(()),
            WaitOutcome::Interrupted => {
                let mut st = self.state.lock();
                if reader {
                    st.readers.cancel(waiter);
                } else {
                    st.writers.cancel(waiter);
                }
                Err(PipeError::Interrupted)
            }
        }
    }

    // =========================================================================
    // SELECT
    // =========================================================================

    /// Leitura retornaria imediatamente (dados ou EOF)?
    pub fn read_ready(&self) -> bool {
        let st = self.state.lock();
        st.write_pos > 0 || st.wrcount == 0
    }

    /// Escrita retornaria imediatamente (espaço ou `BrokenPipe`)?
    pub fn write_ready(&self) -> bool {
        let st = self.state.lock();
        st.write_pos < self.capacity || st.rdcount == 0
    }
}
