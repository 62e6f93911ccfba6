//! Integration tests for the `lesson_plans` queries, including owner
//! isolation.

use uuid::Uuid;

use lessonplan_db::models::{GradeLevel, LessonPlan};
use lessonplan_db::queries::lesson_plans::{
    self, LessonPlanFilter, NewLessonPlan,
};
use lessonplan_test_utils::{create_test_db, drop_test_db};

fn new_plan(owner_id: Uuid, topic: &str, grade_level: GradeLevel) -> NewLessonPlan<'_> {
    NewLessonPlan {
        owner_id,
        topic,
        subject: Some("Matemática"),
        grade_level,
        duration_minutes: 50,
        standards_code: Some("EF05MA01"),
        notes: None,
        introduction: "Olá turma!",
        objective: "Entender frações",
        steps: "1. Dividir a pizza",
        rubric: "Bom: ...",
        model: "gemini-test",
        total_tokens: 321,
        generation_ms: 1500,
    }
}

async fn insert(pool: &sqlx::PgPool, new: &NewLessonPlan<'_>) -> LessonPlan {
    lesson_plans::insert_lesson_plan(pool, new)
        .await
        .expect("insert_lesson_plan should succeed")
}

#[tokio::test]
async fn insert_and_get_lesson_plan() {
    let (pool, db_name) = create_test_db().await;
    let owner = Uuid::new_v4();

    let plan = insert(&pool, &new_plan(owner, "Frações", GradeLevel::ElementaryEarly)).await;
    assert_eq!(plan.owner_id, owner);
    assert_eq!(plan.topic, "Frações");
    assert_eq!(plan.grade_level, GradeLevel::ElementaryEarly);
    assert_eq!(plan.standards_code.as_deref(), Some("EF05MA01"));
    assert_eq!(plan.total_tokens, 321);

    let fetched = lesson_plans::get_lesson_plan(&pool, owner, plan.id)
        .await
        .expect("get should succeed")
        .expect("plan should exist");
    assert_eq!(fetched.id, plan.id);
    assert_eq!(fetched.introduction, "Olá turma!");
    assert_eq!(fetched.rubric, "Bom: ...");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn other_owner_cannot_read_or_delete() {
    let (pool, db_name) = create_test_db().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let plan = insert(&pool, &new_plan(owner, "Frações", GradeLevel::ElementaryEarly)).await;

    let seen = lesson_plans::get_lesson_plan(&pool, intruder, plan.id)
        .await
        .expect("get should succeed");
    assert!(seen.is_none(), "plan must be invisible to another owner");

    let page = lesson_plans::list_lesson_plans(&pool, intruder, LessonPlanFilter::default())
        .await
        .expect("list should succeed");
    assert_eq!(page.total, 0);
    assert!(page.plans.is_empty());

    let deleted = lesson_plans::delete_lesson_plan(&pool, intruder, plan.id)
        .await
        .expect("delete should succeed");
    assert!(!deleted, "another owner must not delete the plan");

    let still_there = lesson_plans::get_lesson_plan(&pool, owner, plan.id)
        .await
        .expect("get should succeed");
    assert!(still_there.is_some());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_is_newest_first_with_filter_and_limit() {
    let (pool, db_name) = create_test_db().await;
    let owner = Uuid::new_v4();

    let first = insert(&pool, &new_plan(owner, "Plantas", GradeLevel::EarlyChildhood)).await;
    let second = insert(&pool, &new_plan(owner, "Frações", GradeLevel::ElementaryEarly)).await;
    let third = insert(&pool, &new_plan(owner, "Decimais", GradeLevel::ElementaryEarly)).await;

    let all = lesson_plans::list_lesson_plans(&pool, owner, LessonPlanFilter::default())
        .await
        .expect("list should succeed");
    assert_eq!(all.total, 3);
    let ids: Vec<Uuid> = all.plans.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    let filtered = lesson_plans::list_lesson_plans(
        &pool,
        owner,
        LessonPlanFilter {
            grade_level: Some(GradeLevel::ElementaryEarly),
            limit: Some(1),
        },
    )
    .await
    .expect("filtered list should succeed");
    assert_eq!(filtered.total, 2, "total counts all matches, not the page");
    assert_eq!(filtered.plans.len(), 1);
    assert_eq!(filtered.plans[0].id, third.id);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_removes_only_the_target_plan() {
    let (pool, db_name) = create_test_db().await;
    let owner = Uuid::new_v4();

    let keep = insert(&pool, &new_plan(owner, "Plantas", GradeLevel::EarlyChildhood)).await;
    let removed = insert(&pool, &new_plan(owner, "Frações", GradeLevel::HighSchool)).await;

    let deleted = lesson_plans::delete_lesson_plan(&pool, owner, removed.id)
        .await
        .expect("delete should succeed");
    assert!(deleted);

    let again = lesson_plans::delete_lesson_plan(&pool, owner, removed.id)
        .await
        .expect("second delete should succeed");
    assert!(!again, "deleting twice reports nothing removed");

    let page = lesson_plans::list_lesson_plans(&pool, owner, LessonPlanFilter::default())
        .await
        .expect("list should succeed");
    assert_eq!(page.total, 1);
    assert_eq!(page.plans[0].id, keep.id);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn non_positive_duration_is_rejected_by_schema() {
    let (pool, db_name) = create_test_db().await;
    let owner = Uuid::new_v4();

    let mut bad = new_plan(owner, "Frações", GradeLevel::HighSchool);
    bad.duration_minutes = 0;
    let result = lesson_plans::insert_lesson_plan(&pool, &bad).await;
    assert!(result.is_err());

    pool.close().await;
    drop_test_db(&db_name).await;
}
