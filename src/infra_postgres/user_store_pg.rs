use crate::domain_model::*;
use crate::domain_port::*;
use anyhow::anyhow;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction};

pub struct PgTxManager {
    pool: PgPool,
}

impl PgTxManager {
    pub fn new(pool: PgPool) -> Self {
        PgTxManager { pool }
    }
}

#[async_trait::async_trait]
impl TxManager for PgTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        let tx = self.pool.begin().await.map_err(|e| anyhow!(e))?;
        Ok(Box::new(PgTx::new(tx)))
    }
}

/// Wraps a sqlx transaction. sqlx rolls the transaction back when it is
/// dropped unfinished, which covers cancelled requests.
pub struct PgTx<'t> {
    inner: Transaction<'t, Postgres>,
}

impl<'t> PgTx<'t> {
    pub fn new(inner: Transaction<'t, Postgres>) -> Self {
        PgTx { inner }
    }

    fn conn(&mut self) -> &mut PgConnection {
        &mut *self.inner
    }

    fn row_to_record(row: PgRow) -> Result<UserRecord, StoreError> {
        let user_id: i64 = row.try_get("id").map_err(|e| anyhow!(e))?;
        let username: String = row.try_get("user_name").map_err(|e| anyhow!(e))?;
        let password_hash: String = row.try_get("hashed_passwd").map_err(|e| anyhow!(e))?;
        let signup_method: String = row.try_get("signup_type").map_err(|e| anyhow!(e))?;

        Ok(UserRecord {
            user_id: UserId(user_id),
            username,
            password_hash,
            signup_method: signup_method.parse()?,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait::async_trait]
impl UserRepo for PgTx<'_> {
    async fn find_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row_opt: Option<PgRow> = sqlx::query(
            r#"
SELECT id, user_name, hashed_passwd, signup_type::text AS signup_type
FROM users
WHERE user_name = $1
"#,
        )
        .bind(username)
        .fetch_optional(self.conn())
        .await
        .map_err(|e| anyhow!("query user: {e}"))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn insert_user(
        &mut self,
        username: &str,
        password_hash: &str,
        signup_method: SignupMethod,
    ) -> Result<UserId, StoreError> {
        let res = sqlx::query_scalar::<_, i64>(
            r#"
INSERT INTO users (user_name, hashed_passwd, signup_type)
VALUES ($1, $2, $3::signup_type)
RETURNING id
"#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(signup_method.as_str())
        .fetch_one(self.conn())
        .await;

        match res {
            Ok(id) => Ok(UserId(id)),
            Err(e) if is_unique_violation(&e) => Err(StoreError::UniqueViolation),
            Err(e) => Err(anyhow!("insert user: {e}").into()),
        }
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for PgTx<'t> {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.inner.commit().await.map_err(|e| anyhow!(e))?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        self.inner.rollback().await.map_err(|e| anyhow!(e))?;
        Ok(())
    }
}
