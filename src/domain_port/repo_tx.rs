use super::UserRepo;

#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>>;
}

/// An open transaction. Queries issued through the [`UserRepo`] half see the
/// transaction's own writes. Dropping it without `commit` rolls back.
#[async_trait::async_trait]
pub trait StorageTx<'t>: UserRepo {
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
