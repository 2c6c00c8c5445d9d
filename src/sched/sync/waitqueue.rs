//! Wait queues para bloqueio e sincronização
//!
//! Permite que tarefas durmam aguardando eventos e sejam acordadas posteriormente.
//!
//! A fila NÃO tem lock próprio: ela vive dentro do estado protegido do objeto
//! dono (ex.: `PipeState`), então registrar-se e acordar acontecem sob o mesmo
//! lock que protege a condição esperada.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use super::super::scheduler::{Scheduler, TaskId};

/// Registro de uma tarefa bloqueada.
#[derive(Debug)]
pub struct Waiter {
    task: TaskId,
    woken: AtomicBool,
}

impl Waiter {
    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn is_woken(&self) -> bool {
        self.woken.load(Ordering::Acquire)
    }
}

/// Resultado de uma espera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Acordado por `wake_all`. A condição ainda precisa ser rechecada.
    Woken,
    /// Sinal pendente. O waiter pode ainda estar na fila (use `cancel`).
    Interrupted,
}

/// Wait queue - fila de tarefas bloqueadas aguardando um evento.
#[derive(Debug, Default)]
pub struct WaitQueue {
    waiters: VecDeque<Arc<Waiter>>,
}

impl WaitQueue {
    /// Cria nova waitqueue vazia
    pub const fn new() -> Self {
        Self {
            waiters: VecDeque::new(),
        }
    }

    /// Registra `task` na fila. Deve ser chamado sob o lock do objeto,
    /// depois de checar a condição e antes de soltá-lo.
    pub fn prepare(&mut self, task: TaskId) -> Arc<Waiter> {
        let waiter = Arc::new(Waiter {
            task,
            woken: AtomicBool::new(false),
        });
        self.waiters.push_back(waiter.clone());
        waiter
    }

    /// Remove um waiter que desistiu (sinal). No-op se já foi acordado.
    pub fn cancel(&mut self, waiter: &Arc<Waiter>) {
        self.waiters.retain(|w| !Arc::ptr_eq(w, waiter));
    }

    /// Acorda todas as tarefas desta fila.
    ///
    /// Retorna número de tarefas acordadas.
    pub fn wake_all(&mut self, sched: &dyn Scheduler) -> usize {
        let mut count = 0;
        while let Some(waiter) = self.waiters.pop_front() {
            waiter.woken.store(true, Ordering::Release);
            sched.wake(waiter.task);
            count += 1;
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }
}

/// Dorme até `waiter` ser acordado ou chegar um sinal.
///
/// Deve ser chamado SEM nenhum lock. O sinal é checado antes de cada bloqueio
/// e logo após cada wake.
pub fn sleep(sched: &dyn Scheduler, waiter: &Waiter) -> WaitOutcome {
    loop {
        if sched.signal_pending(waiter.task) {
            return WaitOutcome::Interrupted;
        }
        if waiter.is_woken() {
            return WaitOutcome::Woken;
        }
        sched.block();
    }
}
