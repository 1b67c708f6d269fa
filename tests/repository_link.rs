use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use slug_redirector::domain::entities::{HistoryAction, LinkUpsert, NewAccessLog};
use slug_redirector::domain::repositories::{AccessLogRepository, LinkRepository};
use slug_redirector::infrastructure::persistence::{PgAccessLogRepository, PgLinkRepository};

fn upsert(slug: &str, destination: &str) -> LinkUpsert {
    LinkUpsert {
        slug: slug.to_string(),
        destination: destination.to_string(),
        notes: None,
        actor: Some("tester".to_string()),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_creates_then_updates(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let created = repo.upsert(upsert("docs", "https://one.example.com")).await.unwrap();
    assert_eq!(created.action, HistoryAction::Created);
    assert_eq!(created.version, 1);

    let updated = repo.upsert(upsert("docs", "https://two.example.com")).await.unwrap();
    assert_eq!(updated.action, HistoryAction::Updated);
    assert_eq!(updated.version, 2);
    assert_eq!(updated.record.id, created.record.id);

    let found = repo.find_by_slug("docs").await.unwrap().unwrap();
    assert_eq!(found.destination, "https://two.example.com");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_keeps_notes_when_omitted(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let mut first = upsert("docs", "https://one.example.com");
    first.notes = Some("Team docs".to_string());
    repo.upsert(first).await.unwrap();

    let updated = repo.upsert(upsert("docs", "https://two.example.com")).await.unwrap();
    assert_eq!(updated.record.notes.as_deref(), Some("Team docs"));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_slug_is_exact(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.upsert(upsert("Docs", "https://example.com")).await.unwrap();

    assert!(repo.find_by_slug("docs").await.unwrap().is_none());
    assert!(repo.find_by_slug("Docs").await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_upserts_get_distinct_versions(pool: PgPool) {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.upsert(upsert("race", &format!("https://{i}.example.com")))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut versions = Vec::new();
    let mut created = 0;
    for handle in handles {
        let mutation = handle.await.unwrap();
        if mutation.action == HistoryAction::Created {
            created += 1;
        }
        versions.push(mutation.version);
    }
    versions.sort();

    assert_eq!(created, 1);
    assert_eq!(versions, (1..=8).collect::<Vec<_>>());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_appends_history_and_versions_continue(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.upsert(upsert("docs", "https://one.example.com")).await.unwrap();

    let deleted = repo.delete("docs", None).await.unwrap().unwrap();
    assert_eq!(deleted.action, HistoryAction::Deleted);
    assert_eq!(deleted.version, 2);
    assert!(repo.find_by_slug("docs").await.unwrap().is_none());

    assert!(repo.delete("docs", None).await.unwrap().is_none());

    let recreated = repo.upsert(upsert("docs", "https://two.example.com")).await.unwrap();
    assert_eq!(recreated.action, HistoryAction::Created);
    assert_eq!(recreated.version, 3);

    let history = repo.history("docs", 10).await.unwrap();
    let actions: Vec<_> = history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            HistoryAction::Created,
            HistoryAction::Deleted,
            HistoryAction::Created
        ]
    );
    assert_eq!(history[0].version, 3);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_access_log_increments_clicks(pool: PgPool) {
    let pool = Arc::new(pool);
    let links = PgLinkRepository::new(pool.clone());
    let access = PgAccessLogRepository::new(pool.clone());

    let link = links
        .upsert(upsert("docs", "https://example.com"))
        .await
        .unwrap()
        .record;

    for _ in 0..2 {
        access
            .record(NewAccessLog {
                timestamp: Utc::now(),
                link_id: link.id,
                slug: "docs".to_string(),
                client_ip: Some("127.0.0.1".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
                bot: false,
                url: Some("https://hack.af/docs".to_string()),
            })
            .await
            .unwrap();
    }

    let found = links.find_by_slug("docs").await.unwrap().unwrap();
    assert_eq!(found.clicks, 2);

    let logged: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_logs WHERE link_id = $1")
        .bind(link.id)
        .fetch_one(pool.as_ref())
        .await
        .unwrap();
    assert_eq!(logged, 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ping(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    assert!(repo.ping().await.is_ok());
}
