use tokio::sync::Mutex as AsyncMutex;

/// Serializes tests that read or write `MEISH_*` environment variables.
/// Sync tests take it with `.blocking_lock()`.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());
