use std::io::Write;

use profile_db::{ConnectOpts, DbHandle};
use profiles::contract::model::{ReferenceEntity, ReferenceKind};
use profiles::domain::reconcile::{reconcile, ReferenceStore};
use profiles::infra::storage::sea_orm_repo::SeaOrmReferenceStore;
use profiles::{ProfilesConfig, ProfilesModule};
use sea_orm::DatabaseConnection;

async fn setup() -> (ProfilesModule, DatabaseConnection) {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect");
    let conn = db.sea();
    let module = ProfilesModule::init(conn.clone(), ProfilesConfig::default());
    module.migrate().await.expect("migrate");
    (module, conn)
}

fn e(id: i32, name: &str) -> ReferenceEntity {
    ReferenceEntity::new(id, name)
}

#[tokio::test]
async fn reconcile_inserts_updates_and_skips() {
    let (_module, conn) = setup().await;
    let store = SeaOrmReferenceStore::new(conn, ReferenceKind::Role);

    let first = reconcile(&store, &[e(1, "Admin"), e(2, "Mentor")])
        .await
        .unwrap();
    assert_eq!((first.inserted, first.updated, first.unchanged), (2, 0, 0));

    let second = reconcile(&store, &[e(1, "Admin"), e(2, "Coach"), e(3, "Guest")])
        .await
        .unwrap();
    assert_eq!((second.inserted, second.updated, second.unchanged), (1, 1, 1));

    let stored = store.find_by_id(2).await.unwrap().unwrap();
    assert_eq!(stored.name, "Coach");
    assert!(stored.created_at.is_some());
}

#[tokio::test]
async fn rows_missing_from_the_desired_set_are_kept() {
    let (_module, conn) = setup().await;
    let store = SeaOrmReferenceStore::new(conn, ReferenceKind::SkillCategory);

    reconcile(&store, &[e(1, "Backend"), e(2, "Frontend")])
        .await
        .unwrap();
    let report = reconcile(&store, &[e(1, "Backend")]).await.unwrap();
    assert_eq!(report.writes(), 0);

    assert_eq!(store.find_by_id(2).await.unwrap().unwrap().name, "Frontend");
}

#[tokio::test]
async fn repeated_seeding_does_not_touch_timestamps() {
    let (_module, conn) = setup().await;
    let store = SeaOrmReferenceStore::new(conn, ReferenceKind::UserCategory);
    let desired = [e(1, "Student"), e(2, "Teacher")];

    reconcile(&store, &desired).await.unwrap();
    let before = store.find_by_id(1).await.unwrap().unwrap();

    let report = reconcile(&store, &desired).await.unwrap();
    assert_eq!(report.unchanged, 2);

    let after = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(before.updated_at, after.updated_at);
}

#[tokio::test]
async fn seeding_from_a_file_fills_all_tables() {
    let (module, _conn) = setup().await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "Categories": [{{"id": 1, "name": "Mentor"}}],
            "roles": [{{"id": 1, "name": "Admin"}}, {{"id": 2, "name": "User"}}],
            "skill_categories": [{{"id": 5, "name": "Data"}}]
        }}"#
    )
    .unwrap();

    let outcome = module.seed_from_file(file.path()).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.report(ReferenceKind::Role).unwrap().inserted, 2);
    assert_eq!(outcome.report(ReferenceKind::SkillCategory).unwrap().inserted, 1);

    let users = &module.services().users;
    assert_eq!(users.list_user_categories().await.unwrap()[0].name, "Mentor");
    assert_eq!(
        module.services().skills.get_category(5).await.unwrap().name,
        "Data"
    );

    let again = module.seed_from_file(file.path()).await.unwrap();
    assert_eq!(again.report(ReferenceKind::Role).unwrap().unchanged, 2);
}

#[tokio::test]
async fn startup_seeding_tolerates_a_missing_file() {
    let (module, _conn) = setup().await;
    let home = tempfile::tempdir().unwrap();

    assert!(module.seed_on_startup(home.path()).await.is_none());
    assert_eq!(
        module.seed_path(home.path()),
        home.path().join("seed_data.json")
    );
}

#[tokio::test]
async fn categories_created_after_seeding_get_fresh_ids() {
    let (module, conn) = setup().await;
    let store = SeaOrmReferenceStore::new(conn, ReferenceKind::SkillCategory);
    reconcile(&store, &[e(1, "Backend"), e(2, "Frontend"), e(3, "Data")])
        .await
        .unwrap();

    // sqlite keeps its own counter, so the sync is a no-op there
    store.sync_id_sequence().await.unwrap();

    let created = module
        .services()
        .skills
        .create_categories(vec!["Cloud".into()])
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert!(created[0].id > 3);
}
