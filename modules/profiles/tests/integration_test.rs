use chrono::{NaiveDate, TimeZone, Utc};
use profile_db::{ConnectOpts, DbHandle};
use profiles::contract::model::*;
use profiles::domain::error::DomainError;
use profiles::domain::paging::ListParams;
use profiles::infra::seed::{SeedData, SeedEntry};
use profiles::{ProfilesConfig, ProfilesModule};

async fn module() -> ProfilesModule {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect");
    let module = ProfilesModule::init(db.sea(), ProfilesConfig::default());
    module.migrate().await.expect("migrate");

    let outcome = module
        .seed(&SeedData {
            categories: vec![SeedEntry { id: 1, name: "Mentor".into() }],
            roles: vec![
                SeedEntry { id: 1, name: "Admin".into() },
                SeedEntry { id: 2, name: "Reviewer".into() },
            ],
            skill_categories: vec![SeedEntry { id: 1, name: "Backend".into() }],
        })
        .await;
    assert!(outcome.is_success());
    module
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_user(first: &str, email: &str) -> NewUser {
    NewUser {
        first_name: first.into(),
        last_name: "Doe".into(),
        email: email.into(),
        user_category_id: Some(1),
        ..Default::default()
    }
}

#[tokio::test]
async fn user_lifecycle() {
    let m = module().await;
    let users = &m.services().users;

    let alice = users.create_user(new_user("Alice", "alice@example.com")).await.unwrap();
    users.create_user(new_user("Bob", "bob@example.com")).await.unwrap();

    let page = users
        .list_users(ListParams {
            keyword: Some("ALI".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, alice.id);

    let updated = users
        .update_user(
            alice.id,
            UserPatch {
                bio: Some("Rustacean".into()),
                first_name: Some("   ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Alice");
    assert_eq!(updated.bio.as_deref(), Some("Rustacean"));

    let details = users.get_user_details(alice.id).await.unwrap();
    assert_eq!(details.category.unwrap().name, "Mentor");
    assert_eq!(details.user.bio.as_deref(), Some("Rustacean"));

    users.delete_user(alice.id).await.unwrap();
    assert!(matches!(
        users.get_user_details(alice.id).await,
        Err(DomainError::NotFound { entity: "User", .. })
    ));
    assert!(matches!(
        users.delete_user(alice.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn create_user_rejects_unknown_category_and_bad_email() {
    let m = module().await;
    let users = &m.services().users;

    let mut bad_category = new_user("Carl", "carl@example.com");
    bad_category.user_category_id = Some(99);
    assert!(matches!(
        users.create_user(bad_category).await,
        Err(DomainError::NotFound { entity: "UserCategory", id: 99 })
    ));

    assert!(matches!(
        users.create_user(new_user("Dan", "not-an-email")).await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn emails_are_trimmed_and_checked_on_create_and_update() {
    let m = module().await;
    let users = &m.services().users;

    assert!(matches!(
        users.create_user(new_user("Eve", "a b@x.y")).await,
        Err(DomainError::Validation { .. })
    ));

    let eve = users
        .create_user(new_user("Eve", "  eve@example.com "))
        .await
        .unwrap();
    assert_eq!(eve.email, "eve@example.com");

    let patch = UserPatch {
        email: Some("  not an email@x.y  ".into()),
        ..Default::default()
    };
    assert!(matches!(
        users.update_user(eve.id, patch).await,
        Err(DomainError::Validation { .. })
    ));

    let patch = UserPatch {
        email: Some(" eve@example.org  ".into()),
        ..Default::default()
    };
    let updated = users.update_user(eve.id, patch).await.unwrap();
    assert_eq!(updated.email, "eve@example.org");
    assert_eq!(
        users.get_user_details(eve.id).await.unwrap().user.email,
        "eve@example.org"
    );
}

#[tokio::test]
async fn keyword_wildcards_match_literally() {
    let m = module().await;
    let users = &m.services().users;
    users.create_user(new_user("Ada", "ada@example.com")).await.unwrap();
    users.create_user(new_user("Jo_Ann", "jo@example.com")).await.unwrap();

    let search = |keyword: &str| ListParams {
        keyword: Some(keyword.into()),
        ..Default::default()
    };

    let page = users.list_users(search("_")).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].first_name, "Jo_Ann");

    assert_eq!(users.list_users(search("%")).await.unwrap().total, 0);
    assert_eq!(users.list_users(search("a_a")).await.unwrap().total, 0);
}

#[tokio::test]
async fn listing_validates_order_and_limit() {
    let m = module().await;
    let users = &m.services().users;
    for i in 0..3 {
        users
            .create_user(new_user(&format!("U{i}"), &format!("u{i}@example.com")))
            .await
            .unwrap();
    }

    let page = users
        .list_users(ListParams {
            limit: Some(2),
            offset: Some(1),
            order_by: Some("first_name asc".into()),
            keyword: None,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].first_name, "U1");

    assert!(users
        .list_users(ListParams {
            order_by: Some("password".into()),
            ..Default::default()
        })
        .await
        .is_err());
    assert!(users
        .list_users(ListParams {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .is_err());
}

#[tokio::test]
async fn roles_are_replaced_as_a_set() {
    let m = module().await;
    let users = &m.services().users;
    let u = users.create_user(new_user("Eve", "eve@example.com")).await.unwrap();

    let roles = users.assign_roles(u.id, &[2, 1, 2]).await.unwrap();
    assert_eq!(roles.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

    let roles = users.assign_roles(u.id, &[2]).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "Reviewer");

    assert!(matches!(
        users.assign_roles(u.id, &[1, 42]).await,
        Err(DomainError::NotFound { entity: "Role", id: 42 })
    ));
    // A rejected assignment leaves the previous set in place.
    assert_eq!(users.get_user_details(u.id).await.unwrap().roles.len(), 1);

    assert_eq!(users.list_roles().await.unwrap().len(), 2);
    assert_eq!(users.list_user_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn education_crud_and_date_rules() {
    let m = module().await;
    let users = &m.services().users;
    let u = users.create_user(new_user("Fay", "fay@example.com")).await.unwrap();

    let edu = users
        .add_education(NewEducation {
            user_id: u.id,
            institution_name: "MIT".into(),
            degree: Some("BSc".into()),
            field_of_study: None,
            achievements: None,
            start_date: date(2010, 9, 1),
            end_date: date(2014, 6, 1),
        })
        .await
        .unwrap();

    assert!(matches!(
        users
            .add_education(NewEducation {
                user_id: u.id,
                institution_name: "Later".into(),
                degree: None,
                field_of_study: None,
                achievements: None,
                start_date: date(2020, 1, 1),
                end_date: date(2019, 1, 1),
            })
            .await,
        Err(DomainError::InvalidDateRange { .. })
    ));

    assert!(matches!(
        users
            .update_education(
                u.id,
                edu.id,
                EducationPatch {
                    end_date: Some(date(2009, 1, 1)),
                    ..Default::default()
                }
            )
            .await,
        Err(DomainError::InvalidDateRange { .. })
    ));

    let updated = users
        .update_education(
            u.id,
            edu.id,
            EducationPatch {
                degree: Some("MSc".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.degree.as_deref(), Some("MSc"));

    // Educations are scoped to their owner.
    let other = users.create_user(new_user("Gus", "gus@example.com")).await.unwrap();
    assert!(users.get_education(other.id, edu.id).await.is_err());

    let page = users.list_educations(u.id, ListParams::default()).await.unwrap();
    assert_eq!(page.total, 1);

    assert_eq!(users.delete_educations(u.id).await.unwrap(), 1);
    assert!(users.delete_education(u.id, edu.id).await.is_err());
}

#[tokio::test]
async fn skills_and_categories() {
    let m = module().await;
    let skills = &m.services().skills;
    let users = &m.services().users;
    let u = users.create_user(new_user("Hal", "hal@example.com")).await.unwrap();

    let created = skills
        .create_categories(vec!["Frontend".into(), " DevOps ".into()])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[1].name, "DevOps");

    assert!(matches!(
        skills.create_categories(vec!["ok".into(), " ".into()]).await,
        Err(DomainError::Validation { ref field, .. }) if field == "name[1]"
    ));

    let renamed = skills
        .rename_category(created[0].id, "Web".into())
        .await
        .unwrap();
    assert_eq!(renamed.name, "Web");

    let rust = skills
        .create_skill(NewSkill {
            name: "Rust".into(),
            icon: None,
            skill_category_id: 1,
            user_id: Some(u.id),
            skill_level: Some("expert".into()),
        })
        .await
        .unwrap();
    assert_eq!(rust.category.as_ref().unwrap().name, "Backend");

    assert!(matches!(
        skills
            .create_skill(NewSkill {
                name: "Go".into(),
                skill_category_id: 1,
                skill_level: Some("novice".into()),
                ..Default::default()
            })
            .await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        skills
            .create_skill(NewSkill {
                name: "Go".into(),
                skill_category_id: 77,
                ..Default::default()
            })
            .await,
        Err(DomainError::NotFound { entity: "SkillCategory", .. })
    ));

    let details = users.get_user_details(u.id).await.unwrap();
    assert_eq!(details.skills.len(), 1);
    assert_eq!(details.skills[0].skill_level.as_deref(), Some("expert"));

    let moved = skills
        .update_skill(
            rust.skill.id,
            SkillPatch {
                skill_category_id: Some(created[1].id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.category.unwrap().name, "DevOps");

    let page = skills
        .list_skills(ListParams {
            keyword: Some("rus".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    skills.delete_skill(rust.skill.id).await.unwrap();
    assert!(skills.get_skill(rust.skill.id).await.is_err());
    assert!(users.get_user_details(u.id).await.unwrap().skills.is_empty());

    skills.delete_category(created[0].id).await.unwrap();
    assert!(skills.get_category(created[0].id).await.is_err());
}

#[tokio::test]
async fn experience_lifecycle() {
    let m = module().await;
    let s = m.services();
    let u = s.users.create_user(new_user("Ivy", "ivy@example.com")).await.unwrap();
    let skill = s
        .skills
        .create_skill(NewSkill {
            name: "SQL".into(),
            skill_category_id: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    let exp = s
        .experience
        .add_experience(
            u.id,
            Some(skill.skill.id),
            NewExperience {
                position: "Engineer".into(),
                company: "Acme".into(),
                description: None,
                start_date: date(2018, 1, 1),
                end_date: Some(date(2030, 1, 1)),
                is_currently_working: true,
                responsibilities: Some("- Build\n- Ship\n".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(exp.experience.end_date, None);
    assert_eq!(exp.skills.len(), 1);
    assert_eq!(exp.experience.responsibility_list(), vec!["Build", "Ship"]);

    let fetched = s.experience.get_experience(u.id, exp.experience.id).await.unwrap();
    assert_eq!(fetched.skills[0].name, "SQL");

    assert!(matches!(
        s.experience
            .update_experience(
                exp.experience.id,
                ExperiencePatch {
                    is_currently_working: Some(false),
                    ..Default::default()
                },
            )
            .await,
        Err(DomainError::Validation { ref field, .. }) if field == "end_date"
    ));

    let updated = s
        .experience
        .update_experience(
            exp.experience.id,
            ExperiencePatch {
                is_currently_working: Some(false),
                end_date: Some(date(2020, 1, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.end_date, Some(date(2020, 1, 1)));

    let page = s.experience.list_experiences(u.id, ListParams::default()).await.unwrap();
    assert_eq!(page.total, 1);

    s.experience.delete_experience(exp.experience.id).await.unwrap();
    assert!(s.experience.get_experience(u.id, exp.experience.id).await.is_err());
    assert!(matches!(
        s.experience.delete_experiences(u.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn projects_lifecycle() {
    let m = module().await;
    let s = m.services();
    let u = s.users.create_user(new_user("Jon", "jon@example.com")).await.unwrap();

    let p = s
        .projects
        .add_project(
            u.id,
            NewProject {
                name: "Crate".into(),
                description: None,
                link: Some("https://example.com".into()),
                technologies: "Rust".into(),
            },
        )
        .await
        .unwrap();
    s.projects
        .add_project(
            u.id,
            NewProject {
                name: "Site".into(),
                description: None,
                link: None,
                technologies: "HTML".into(),
            },
        )
        .await
        .unwrap();

    let updated = s
        .projects
        .update_project(
            p.id,
            ProjectPatch {
                technologies: Some("Rust, SQL".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.technologies, "Rust, SQL");
    assert_eq!(s.projects.get_project(u.id, p.id).await.unwrap().technologies, "Rust, SQL");

    s.projects.delete_project(p.id).await.unwrap();
    assert_eq!(s.projects.list_projects(u.id, ListParams::default()).await.unwrap().total, 1);

    assert_eq!(s.projects.delete_projects(u.id).await.unwrap(), 1);
    assert!(matches!(
        s.projects.delete_projects(u.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn bookings_and_questions() {
    let m = module().await;
    let s = m.services();
    let u = s.users.create_user(new_user("Kim", "kim@example.com")).await.unwrap();

    let q = s
        .questions
        .create_question(NewQuestion {
            question: "Preferred stack?".into(),
            question_type: "single_choice".into(),
            options: vec![" Rust ".into(), "Go".into()],
        })
        .await
        .unwrap();
    assert_eq!(q.options.len(), 2);
    assert_eq!(q.options[0].name, "Rust");

    assert!(matches!(
        s.questions
            .create_question(NewQuestion {
                question: "Why?".into(),
                question_type: "text".into(),
                options: vec!["".into()],
            })
            .await,
        Err(DomainError::Validation { .. })
    ));

    let when = Utc.with_ymd_and_hms(2030, 5, 1, 10, 0, 0).unwrap();
    let booking = s
        .bookings
        .create_booking(NewBooking {
            user_id: u.id,
            booking_date_time: when,
            meeting_link: None,
            question_ids: vec![q.question.id, q.question.id],
            skill_ids: vec![],
        })
        .await
        .unwrap();
    assert_eq!(booking.question_ids, vec![q.question.id]);

    assert!(matches!(
        s.bookings
            .create_booking(NewBooking {
                user_id: u.id,
                booking_date_time: when,
                meeting_link: None,
                question_ids: vec![],
                skill_ids: vec![404],
            })
            .await,
        Err(DomainError::NotFound { entity: "Skill", id: 404 })
    ));

    let fetched = s.bookings.get_booking(booking.booking.id).await.unwrap();
    assert_eq!(fetched.booking.booking_date_time, when);
    assert_eq!(
        s.bookings.list_bookings(u.id, ListParams::default()).await.unwrap().total,
        1
    );

    s.bookings.delete_booking(booking.booking.id).await.unwrap();
    assert!(s.bookings.get_booking(booking.booking.id).await.is_err());

    assert_eq!(s.questions.list_questions(ListParams::default()).await.unwrap().total, 1);
    s.questions.delete_question(q.question.id).await.unwrap();
    assert!(s.questions.get_question(q.question.id).await.is_err());
}
