//! Contrato do escalonador.

/// Identificador de tarefa
pub type TaskId = u32;

/// Operações que o núcleo consome do escalonador.
///
/// `block` pode retornar espuriamente: todo chamador roda em loop com
/// recheck. Um `wake(t)` entregue antes de `t` chamar `block` não pode se
/// perder (o próximo `block` de `t` retorna imediatamente).
pub trait Scheduler: Send + Sync {
    /// Tarefa em execução na CPU atual.
    fn current_task(&self) -> TaskId;

    /// Bloqueia a tarefa atual até um `wake` ou entrega de sinal.
    fn block(&self);

    /// Torna `task` executável.
    fn wake(&self, task: TaskId);

    /// Há sinal pendente para `task`?
    fn signal_pending(&self, task: TaskId) -> bool;

    /// Termina `task` (falta grave de recursos, ex.: tabela de descritores cheia).
    fn kill(&self, task: TaskId);
}
