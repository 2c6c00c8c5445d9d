//! # Process Lifecycle
//!
//! fork, thread_create, exit - a parte de descritores e raiz/cwd.
//! Cópia de memória e troca de contexto ficam com o escalonador.

use alloc::sync::Arc;

use crate::fs::vfs::close::close_file;
use crate::fs::vfs::{iput, Vfs};
use crate::mm::aspace::AddressSpace;
use crate::sched::{Task, TaskId};

/// Filho de `parent` com o address space `aspace` (já copiado).
///
/// A tabela de descritores é copiada compartilhando os mesmos `File`s
/// (posição compartilhada). Raiz, cwd e brk são herdados.
pub fn sys_fork(parent: &Task, child: TaskId, aspace: Arc<AddressSpace>) -> Task {
    let files = parent.files.lock().clone_shared();
    crate::kdebug!("(FD) fork, descritores herdados=", files.open_count());
    Task::with_files(
        child,
        parent.creds,
        files,
        &parent.root(),
        &parent.cwd(),
        aspace,
        parent.heap(),
    )
}

/// Nova thread no processo de `parent`: mesmo address space (o que liga o
/// shootdown da região thread-shared) e descritores compartilhados.
pub fn sys_thread_create(parent: &Task, thread: TaskId) -> Task {
    parent.aspace.add_thread();
    sys_fork(parent, thread, parent.aspace.clone())
}

/// Fecha todos os descritores e solta raiz/cwd. Chamado uma vez por tarefa.
pub fn sys_exit(vfs: &Vfs, task: &Task) {
    let files = task.files.lock().drain();
    let open = files.len();
    for file in files {
        close_file(vfs, file);
    }

    iput(&task.cwd());
    iput(&task.root());
    let remaining = task.aspace.remove_thread();

    crate::kdebug!("(FD) exit, descritores fechados=", open);
    crate::ktrace!("(VMM) threads restantes no address space=", remaining);
}
