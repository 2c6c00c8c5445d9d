//! # Heap Syscall (sbrk)
//!
//! Cresce ou encolhe o heap de usuário da tarefa em páginas inteiras.
//! Encolher desmapeia (e libera) as páginas acima do novo break.

use crate::mm::addr::VirtAddr;
use crate::mm::config::PAGE_SIZE;
use crate::mm::error::MmError;
use crate::mm::vmm::{PageFlags, Vmm};
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};

/// Flags das páginas de heap
const HEAP_FLAGS: PageFlags = PageFlags::WRITABLE
    .union(PageFlags::USER)
    .union(PageFlags::NO_EXECUTE);

/// `sbrk(increment)`: devolve o break anterior.
pub fn sys_sbrk(vmm: &Vmm, task: &Task, increment: isize) -> SysResult<VirtAddr> {
    let mut heap = task.heap_lock();
    let old = heap.brk;
    if increment == 0 {
        return Ok(old);
    }

    let new = if increment > 0 {
        old.as_u64().checked_add(increment as u64)
    } else {
        old.as_u64().checked_sub(increment.unsigned_abs() as u64)
    }
    .map(VirtAddr::new)
    .ok_or(SysError::InvalidArgument)?;

    if new.as_u64() < heap.start.as_u64() || new.is_kernel() {
        return Err(SysError::InvalidArgument);
    }

    let old_top = old.page_ceil().as_u64();
    let new_top = new.page_ceil().as_u64();

    if new_top > old_top {
        grow(vmm, task, old_top, new_top)?;
    } else {
        for page in (new_top..old_top).step_by(PAGE_SIZE) {
            vmm.unmap(&task.aspace, VirtAddr::new(page))?;
        }
    }

    heap.brk = new;
    crate::ktrace!("(VMM) brk=", new.as_u64());
    Ok(old)
}

/// Mapeia `[from, to)`. Em falta de memória desfaz o que já mapeou.
fn grow(vmm: &Vmm, task: &Task, from: u64, to: u64) -> SysResult<()> {
    let mut page = from;
    while page < to {
        let mapped = match vmm.frames().allocate_frame() {
            Some(frame) => {
                let result = vmm.map(&task.aspace, VirtAddr::new(page), frame, HEAP_FLAGS);
                if result.is_err() {
                    vmm.frames().free_frame(frame);
                }
                result
            }
            None => Err(MmError::OutOfMemory),
        };

        if let Err(e) = mapped {
            crate::kwarn!("(VMM) sbrk falhou, desfazendo a partir de ", page);
            for undo in (from..page).step_by(PAGE_SIZE) {
                let _ = vmm.unmap(&task.aspace, VirtAddr::new(undo));
            }
            return Err(e.into());
        }
        page += PAGE_SIZE as u64;
    }
    Ok(())
}
