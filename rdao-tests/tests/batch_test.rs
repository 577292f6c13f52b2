//! Batch binding and result correlation.

mod support;

use futures::TryStreamExt;
use rdao::{BatchInsert, Bound, Connection, Dao, Error, ParameterSet, RowExt, Segment, Value};
use rdao_tests::{EntityDao, SomeEntity};
use support::{MockPool, MockRow};

fn entities(count: usize) -> Vec<SomeEntity> {
    (0..count).map(|i| SomeEntity::new(format!("e{}", i))).collect()
}

#[tokio::test]
async fn test_results_are_paired_with_inputs_in_order() {
    let pool = MockPool::new();
    let entity_dao = EntityDao::new(pool.clone());

    let saved: Vec<SomeEntity> = entity_dao.save_all(entities(4)).try_collect().await.unwrap();

    let pairs: Vec<(Option<i64>, Option<String>)> =
        saved.into_iter().map(|e| (e.id, e.svalue)).collect();
    assert_eq!(
        pairs,
        vec![
            (Some(1), Some("e0".to_string())),
            (Some(2), Some("e1".to_string())),
            (Some(3), Some("e2".to_string())),
            (Some(4), Some("e3".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_one_statement_with_one_slot_per_item() {
    let pool = MockPool::new();
    let entity_dao = EntityDao::new(pool.clone());

    let _: Vec<SomeEntity> = entity_dao.save_all(entities(3)).try_collect().await.unwrap();

    let executed = pool.executed();
    assert_eq!(executed.len(), 1);
    let statement = &executed[0];
    assert_eq!(statement.generated_columns().to_vec(), vec!["id".to_string()]);
    assert_eq!(statement.slots().len(), 3);
    for (i, slot) in statement.slots().iter().enumerate() {
        assert_eq!(slot.len(), 1);
        assert_eq!(
            slot.get(0),
            Some(&Bound::Value(Value::String(format!("e{}", i))))
        );
    }
    assert_eq!(pool.acquired(), 1);
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_empty_batch_touches_nothing() {
    let pool = MockPool::new();
    let entity_dao = EntityDao::new(pool.clone());

    let saved: Vec<SomeEntity> = entity_dao.save_all(Vec::new()).try_collect().await.unwrap();
    let counts: Vec<u64> = entity_dao
        .dao()
        .batch_execute("DELETE FROM some_entity WHERE id = ?", Vec::<i64>::new(), |p, id| {
            p.bind(0, *id);
            Ok(())
        })
        .try_collect()
        .await
        .unwrap();

    assert!(saved.is_empty());
    assert!(counts.is_empty());
    assert_eq!(pool.acquired(), 0);
    assert!(pool.executed().is_empty());
}

#[tokio::test]
async fn test_missing_result_rows_fail_the_batch() {
    let pool = MockPool::new();
    pool.respond_with(|_| {
        (1..=2)
            .map(|id| Ok(Segment::Row(MockRow::new(&[("id", Value::I64(id))]))))
            .collect()
    });
    let entity_dao = EntityDao::new(pool.clone());

    let result: rdao::Result<Vec<SomeEntity>> = entity_dao.save_all(entities(3)).try_collect().await;

    assert!(matches!(
        result,
        Err(Error::BatchCorrelation {
            inputs: 3,
            results: 2
        })
    ));
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_extra_result_rows_fail_the_batch() {
    let pool = MockPool::new();
    pool.respond_with(|_| {
        (1..=3)
            .map(|id| Ok(Segment::Row(MockRow::new(&[("id", Value::I64(id))]))))
            .collect()
    });
    let entity_dao = EntityDao::new(pool.clone());

    let result: rdao::Result<Vec<SomeEntity>> = entity_dao.save_all(entities(2)).try_collect().await;

    assert!(matches!(
        result,
        Err(Error::BatchCorrelation {
            inputs: 2,
            results: 3
        })
    ));
}

#[tokio::test]
async fn test_binder_failure_skips_execution() {
    let pool = MockPool::new();
    let dao = Dao::new(pool.clone());

    let result: rdao::Result<Vec<u64>> = dao
        .batch_execute(
            "UPDATE some_entity SET svalue = ?",
            vec!["ok", "bad"],
            |params: &mut ParameterSet, value: &&str| {
                if *value == "bad" {
                    return Err(Error::binding("svalue", "rejected"));
                }
                params.bind(0, *value);
                Ok(())
            },
        )
        .try_collect()
        .await;

    assert!(matches!(result, Err(Error::Binding { .. })));
    assert!(pool.executed().is_empty());
    assert_eq!(pool.released(), 1);
}

#[tokio::test]
async fn test_batch_execute_reports_one_count_per_item() {
    let pool = MockPool::new();
    let dao = Dao::new(pool.clone());

    let counts: Vec<u64> = dao
        .batch_execute(
            "DELETE FROM some_entity WHERE id = ?",
            vec![1i64, 2, 3],
            |params, id| {
                params.bind(0, *id);
                Ok(())
            },
        )
        .try_collect()
        .await
        .unwrap();

    assert_eq!(counts, vec![1, 1, 1]);
    assert_eq!(pool.executed()[0].slots().len(), 3);
}

#[tokio::test]
async fn test_batch_insert_from_entity_columns() {
    let pool = MockPool::new();
    let dao = Dao::new(pool.clone());

    let insert = BatchInsert::new("some_entity").returning("id");
    assert_eq!(
        insert.sql::<SomeEntity>(),
        "INSERT INTO `some_entity` (`svalue`) VALUES (?)"
    );

    let ids: Vec<i64> = insert
        .execute_returning(&dao, entities(2), |row, _entity| row.get::<i64>("id"))
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 2]);
    let executed = pool.executed();
    assert_eq!(executed[0].slots().len(), 2);
}

#[tokio::test]
async fn test_parameterless_batch_insert_returns_one_id_per_item() {
    let pool = MockPool::new();
    let dao = Dao::new(pool.clone());

    let ids: Vec<i64> = dao
        .batch_insert(
            |conn| {
                conn.create_statement("INSERT INTO t () VALUES ()")
                    .return_generated_values(["id"])
            },
            vec![(), ()],
            |_, _| Ok(()),
            |row, _| row.get::<i64>("id"),
        )
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 2]);
    let executed = pool.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].slots().len(), 2);
    assert!(executed[0].slots().iter().all(|slot| slot.is_empty()));
    assert_eq!(pool.released(), 1);
}
