//! Integration tests for plan and task CRUD against a real SQLite database.
//!
//! Each test creates an isolated temporary database file and lets the
//! temporary directory clean it up.

use chrono::Utc;
use uuid::Uuid;

use taskplan_db::queries::{plans, tasks};
use taskplan_test_utils::create_test_db;

#[tokio::test]
async fn insert_and_fetch_plan() {
    let (pool, _dir) = create_test_db().await;

    let created_at = Utc::now();
    let plan = plans::insert_plan(&pool, "Learn to juggle", created_at)
        .await
        .expect("insert_plan should succeed");

    assert_eq!(plan.goal, "Learn to juggle");

    let fetched = plans::get_plan(&pool, plan.id)
        .await
        .expect("get_plan should succeed")
        .expect("plan should exist");
    assert_eq!(fetched.id, plan.id);
    assert_eq!(fetched.goal, plan.goal);
    // Stored as text; compare at millisecond precision.
    assert_eq!(
        fetched.created_at.timestamp_millis(),
        created_at.timestamp_millis()
    );

    pool.close().await;
}

#[tokio::test]
async fn get_missing_plan_returns_none() {
    let (pool, _dir) = create_test_db().await;

    let found = plans::get_plan(&pool, Uuid::new_v4())
        .await
        .expect("get_plan should succeed");
    assert!(found.is_none());

    pool.close().await;
}

#[tokio::test]
async fn list_plans_newest_first() {
    let (pool, _dir) = create_test_db().await;

    let older = Utc::now() - chrono::Duration::minutes(5);
    let newer = Utc::now();
    plans::insert_plan(&pool, "first", older).await.unwrap();
    plans::insert_plan(&pool, "second", newer).await.unwrap();

    let all = plans::list_plans(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].goal, "second");
    assert_eq!(all[1].goal, "first");

    pool.close().await;
}

#[tokio::test]
async fn tasks_keep_insertion_order() {
    let (pool, _dir) = create_test_db().await;

    let plan = plans::insert_plan(&pool, "Bake a cake", Utc::now())
        .await
        .unwrap();

    tasks::insert_task(&pool, plan.id, 0, "Preheat oven", "10m", "")
        .await
        .unwrap();
    tasks::insert_task(&pool, plan.id, 1, "Mix batter", "15m", "Preheat oven")
        .await
        .unwrap();

    let listed = tasks::list_tasks_for_plan(&pool, plan.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].description, "Preheat oven");
    assert_eq!(listed[1].description, "Mix batter");
    assert_eq!(listed[1].dependencies, "Preheat oven");
    assert!(listed.iter().all(|t| t.plan_id == plan.id));

    pool.close().await;
}

#[tokio::test]
async fn rolled_back_inserts_leave_no_rows() {
    let (pool, _dir) = create_test_db().await;

    let mut tx = pool.begin().await.unwrap();
    let plan = plans::insert_plan(&mut *tx, "Abandoned goal", Utc::now())
        .await
        .unwrap();
    tasks::insert_task(&mut *tx, plan.id, 0, "Never happens", "1h", "")
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    assert!(plans::get_plan(&pool, plan.id).await.unwrap().is_none());
    assert_eq!(tasks::count_tasks_for_plan(&pool, plan.id).await.unwrap(), 0);

    pool.close().await;
}

#[tokio::test]
async fn deleting_plan_cascades_to_tasks() {
    let (pool, _dir) = create_test_db().await;

    let plan = plans::insert_plan(&pool, "Move house", Utc::now())
        .await
        .unwrap();
    tasks::insert_task(&pool, plan.id, 0, "Pack boxes", "2d", "")
        .await
        .unwrap();
    assert_eq!(tasks::count_tasks_for_plan(&pool, plan.id).await.unwrap(), 1);

    let deleted = plans::delete_plan(&pool, plan.id).await.unwrap();
    assert!(deleted);

    assert!(plans::get_plan(&pool, plan.id).await.unwrap().is_none());
    assert_eq!(tasks::count_tasks_for_plan(&pool, plan.id).await.unwrap(), 0);

    pool.close().await;
}

#[tokio::test]
async fn delete_missing_plan_returns_false() {
    let (pool, _dir) = create_test_db().await;

    let deleted = plans::delete_plan(&pool, Uuid::new_v4()).await.unwrap();
    assert!(!deleted);

    pool.close().await;
}
