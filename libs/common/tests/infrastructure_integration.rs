//! Integration tests for the infrastructure components
//!
//! These tests verify that PostgreSQL is reachable and that the workspace
//! migrations produce the tables the catalog relies on. They need a running
//! database (`DATABASE_URL`) and are ignored by default.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use sqlx::Row;

#[tokio::test]
#[ignore]
async fn test_database_is_reachable_and_migrated() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;
    // Applying twice is a no-op.
    run_migrations(&pool).await?;

    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS tables
        FROM information_schema.tables
        WHERE table_schema = 'public' AND table_name IN ('users', 'movies')
        "#,
    )
    .fetch_one(&pool)
    .await?;

    let tables: i64 = row.get("tables");
    assert_eq!(tables, 2, "users and movies tables should exist");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_title_index_ignores_case_and_deleted_rows() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;

    let owner_id = uuid::Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, 'Index', 'x')")
        .bind(owner_id)
        .bind(format!("{owner_id}@example.com"))
        .execute(&pool)
        .await?;

    let insert = "INSERT INTO movies (id, owner_id, title) VALUES ($1, $2, $3)";
    let first = uuid::Uuid::new_v4();
    sqlx::query(insert)
        .bind(first)
        .bind(owner_id)
        .bind("Matrix")
        .execute(&pool)
        .await?;

    let duplicate = sqlx::query(insert)
        .bind(uuid::Uuid::new_v4())
        .bind(owner_id)
        .bind("matrix")
        .execute(&pool)
        .await;
    let err = common::error::DatabaseError::Query(duplicate.unwrap_err());
    assert!(err.is_unique_violation());

    sqlx::query("UPDATE movies SET deleted_at = NOW() WHERE id = $1")
        .bind(first)
        .execute(&pool)
        .await?;

    sqlx::query(insert)
        .bind(uuid::Uuid::new_v4())
        .bind(owner_id)
        .bind("matrix")
        .execute(&pool)
        .await?;

    Ok(())
}
