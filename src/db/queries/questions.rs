use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: Option<i64>,
    pub difficulty: Option<i64>,
}

/// Fields of a question before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewQuestion<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub category: Option<i64>,
    pub difficulty: Option<i64>,
}

pub async fn get_all_questions<'e, E>(executor: E) -> sqlx::Result<Vec<Question>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_latest_question(pool: &SqlitePool) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id DESC LIMIT 1
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match against the question text.
///
/// SQLite only folds ASCII in `lower()` and `LIKE`, so the match runs here.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let term = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&term))
        .collect())
}

/// Questions in `category` (when given) whose ids are not in `exclude`.
pub async fn get_quiz_candidates(
    pool: &SqlitePool,
    category: Option<i64>,
    exclude: &[i64],
) -> sqlx::Result<Vec<Question>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, question, answer, category, difficulty FROM questions WHERE 1 = 1",
    );
    if let Some(category) = category {
        builder.push(" AND category = ").push_bind(category);
    }
    if !exclude.is_empty() {
        builder.push(" AND id NOT IN (");
        let mut ids = builder.separated(", ");
        for id in exclude {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
    }
    builder.push(" ORDER BY id");

    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub async fn create_question(pool: &SqlitePool, question: NewQuestion<'_>) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question.question)
    .bind(question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn create_question_with_id<'e, E>(executor: E, question: &Question) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(question.id)
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update_question<'e, E>(executor: E, question: &Question) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE questions SET question = ?1, answer = ?2, category = ?3, difficulty = ?4
        WHERE questions.id = ?5
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .bind(question.id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete_question<'e, E>(executor: E, id: i64) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Makes the questions table match `questions` exactly, keeping ids.
///
/// Runs in one transaction; on error the table is left untouched.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    let existing_ids: HashSet<i64> = get_all_questions(&mut *tx)
        .await?
        .iter()
        .map(|q| q.id)
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_question(&mut *tx, *id).await?;
    }
    for question in questions {
        if existing_ids.contains(&question.id) {
            update_question(&mut *tx, &question).await?;
        } else {
            create_question_with_id(&mut *tx, &question).await?;
        }
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    async fn add(pool: &SqlitePool, text: &str, category: i64) -> i64 {
        create_question(
            pool,
            NewQuestion {
                question: text,
                answer: "answer",
                category: Some(category),
                difficulty: Some(1),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let pool = memory_pool().await;
        let hanks = add(&pool, "Which movie earned Tom Hanks an Oscar?", 5).await;
        add(&pool, "What is the largest lake in Africa?", 3).await;

        let found = search_questions(&pool, "tom HANKS").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, hanks);
        assert!(search_questions(&pool, "penicillin")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = memory_pool().await;
        let ecole = add(&pool, "Which ÉCOLE is oldest?", 4).await;

        let found = search_questions(&pool, "école").await.unwrap();
        assert_eq!(found.iter().map(|q| q.id).collect::<Vec<_>>(), vec![ecole]);
    }

    #[tokio::test]
    async fn failed_import_leaves_table_unchanged() {
        let pool = memory_pool().await;
        add(&pool, "first", 1).await;
        add(&pool, "second", 1).await;
        let before = get_all_questions(&pool).await.unwrap();

        let duplicate = |text: &str| Question {
            id: 9,
            question: text.into(),
            answer: "answer".into(),
            category: Some(1),
            difficulty: None,
        };
        let result = import_questions(&pool, vec![duplicate("one"), duplicate("two")]).await;

        assert!(result.is_err());
        assert_eq!(get_all_questions(&pool).await.unwrap(), before);
    }

    #[tokio::test]
    async fn quiz_candidates_apply_filters_independently() {
        let pool = memory_pool().await;
        let a = add(&pool, "a", 1).await;
        let b = add(&pool, "b", 1).await;
        let c = add(&pool, "c", 2).await;

        let ids = |qs: Vec<Question>| qs.into_iter().map(|q| q.id).collect::<Vec<_>>();

        assert_eq!(
            ids(get_quiz_candidates(&pool, None, &[]).await.unwrap()),
            vec![a, b, c]
        );
        assert_eq!(
            ids(get_quiz_candidates(&pool, Some(1), &[]).await.unwrap()),
            vec![a, b]
        );
        assert_eq!(
            ids(get_quiz_candidates(&pool, None, &[a, c]).await.unwrap()),
            vec![b]
        );
        assert_eq!(
            ids(get_quiz_candidates(&pool, Some(1), &[b]).await.unwrap()),
            vec![a]
        );
    }

    #[tokio::test]
    async fn update_changes_row_in_place() {
        let pool = memory_pool().await;
        let id = add(&pool, "Who discovered penicillin?", 1).await;

        let mut question = get_question_by_id(&pool, id).await.unwrap().unwrap();
        question.answer = "Alexander Fleming".into();
        question.difficulty = Some(3);
        update_question(&pool, &question).await.unwrap();

        assert_eq!(get_question_by_id(&pool, id).await.unwrap(), Some(question));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let pool = memory_pool().await;
        add(&pool, "first", 1).await;
        let second = add(&pool, "second", 1).await;
        delete_question(&pool, second).await.unwrap();

        let third = add(&pool, "third", 1).await;
        assert!(third > second);
        assert_eq!(get_latest_question(&pool).await.unwrap().id, third);
    }
}
