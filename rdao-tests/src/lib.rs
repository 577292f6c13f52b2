//! An entity DAO built on rdao, used by the test suites.
//!
//! `EntityDao` stores `SomeEntity` rows in a single table and exercises the
//! whole stack: connection scopes, generated keys from batch inserts, and a
//! read-merge-write update inside a transaction.

use async_stream::try_stream;
use futures::StreamExt;
use rdao::{
    batch, executor, params, stream, Connection, ConnectionPool, Dao, Error, FromRow,
    IsolationLevel, ParameterSet, Result, Row, RowExt, RowStream, Statement, ToParams,
};
use tracing::debug;

pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS some_entity (\
     id BIGINT AUTO_INCREMENT PRIMARY KEY, \
     svalue VARCHAR(255))";
pub const INSERT: &str = "INSERT INTO some_entity (svalue) VALUES (?)";
pub const SELECT_ALL: &str = "SELECT id, svalue FROM some_entity ORDER BY id";
pub const SELECT_BY_ID: &str = "SELECT id, svalue FROM some_entity WHERE id = ?";
pub const UPDATE: &str = "UPDATE some_entity SET svalue = ? WHERE id = ?";
pub const DELETE_BY_ID: &str = "DELETE FROM some_entity WHERE id = ?";

#[derive(Debug, Clone, PartialEq, Default, FromRow, ToParams)]
pub struct SomeEntity {
    #[rdao(skip_insert)]
    pub id: Option<i64>,
    pub svalue: Option<String>,
}

impl SomeEntity {
    pub fn new(svalue: impl Into<String>) -> Self {
        Self {
            id: None,
            svalue: Some(svalue.into()),
        }
    }

    /// Overlay this payload on `existing`: fields left unset keep the stored
    /// value.
    pub fn merge(self, existing: &SomeEntity) -> SomeEntity {
        SomeEntity {
            id: existing.id,
            svalue: self.svalue.or_else(|| existing.svalue.clone()),
        }
    }
}

fn bind_entity(params: &mut ParameterSet, entity: &SomeEntity) -> Result<()> {
    entity.bind_insert(params);
    Ok(())
}

fn with_generated_id(row: &dyn Row, mut entity: SomeEntity) -> Result<SomeEntity> {
    entity.id = Some(row.get("id")?);
    Ok(entity)
}

fn insert_statement<C: Connection>(conn: &C) -> Statement {
    conn.create_statement(INSERT).return_generated_values(["id"])
}

/// Persistence for [`SomeEntity`].
#[derive(Clone)]
pub struct EntityDao<P> {
    dao: Dao<P>,
}

impl<P: ConnectionPool> EntityDao<P> {
    pub fn new(pool: P) -> Self {
        Self { dao: Dao::new(pool) }
    }

    pub fn dao(&self) -> &Dao<P> {
        &self.dao
    }

    /// Create the backing table if it does not exist.
    pub async fn create_table(&self) -> Result<()> {
        let mut counts = self.dao.execute(CREATE_TABLE, params![]);
        while let Some(count) = counts.next().await {
            count?;
        }
        Ok(())
    }

    /// Insert one entity and return it with its generated id.
    pub async fn save(&self, entity: SomeEntity) -> Result<SomeEntity> {
        stream::single(self.save_all(vec![entity])).await
    }

    /// Insert all entities in one batch. Results are in input order.
    pub fn save_all(&self, entities: Vec<SomeEntity>) -> RowStream<'static, SomeEntity> {
        debug!(count = entities.len(), "saving entities");
        self.dao.batch_insert(
            |conn| insert_statement(conn),
            entities,
            bind_entity,
            with_generated_id,
        )
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<SomeEntity>> {
        stream::first(self.dao.select_as(SELECT_BY_ID, params![id])).await
    }

    pub fn find_all(&self) -> RowStream<'static, SomeEntity> {
        self.dao.select_as(SELECT_ALL, params![])
    }

    /// Merge `payload` into the stored entity with the same id and write it
    /// back, all in one read-committed transaction.
    ///
    /// Fails with [`Error::NotFound`] when no entity has that id; nothing is
    /// written in that case.
    pub async fn update(&self, payload: SomeEntity) -> Result<SomeEntity> {
        let id = payload
            .id
            .ok_or_else(|| Error::binding("id", "update requires an id"))?;

        self.dao
            .transaction(IsolationLevel::ReadCommitted, move |conn| {
                stream::boxed(try_stream! {
                    let existing = stream::first(find_by_id_on(&mut *conn, id))
                        .await?
                        .ok_or_else(|| Error::NotFound("Entity not found".to_string()))?;
                    let merged = payload.merge(&existing);

                    let mut statement = conn.create_statement(UPDATE);
                    statement.bind(0, merged.svalue.as_deref()).bind(1, id);
                    let mut counts = executor::execute(&mut *conn, statement);
                    while let Some(count) = counts.next().await {
                        count?;
                    }
                    drop(counts);

                    yield merged;
                })
            })
            .await
            .into_result()
    }

    /// Delete by id and return the number of rows removed.
    pub async fn delete_by_id(&self, id: i64) -> Result<u64> {
        let mut counts = self.dao.execute(DELETE_BY_ID, params![id]);
        let mut deleted = 0;
        while let Some(count) = counts.next().await {
            deleted += count?;
        }
        Ok(deleted)
    }
}

/// Look up an entity on an already checked-out connection.
pub fn find_by_id_on<C: Connection>(conn: &mut C, id: i64) -> RowStream<'_, SomeEntity> {
    let mut statement = conn.create_statement(SELECT_BY_ID);
    statement.bind(0, id);
    executor::select(conn, statement, |row| SomeEntity::from_row(row))
}

/// Insert entities on an already checked-out connection, e.g. inside a
/// transaction.
pub fn save_all_on<C: Connection>(
    conn: &mut C,
    entities: Vec<SomeEntity>,
) -> RowStream<'_, SomeEntity> {
    let statement = insert_statement(&*conn);
    batch::insert(conn, statement, entities, bind_entity, with_generated_id)
}
