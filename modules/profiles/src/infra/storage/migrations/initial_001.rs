use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reference tables
        for table in [
            ReferenceTable::UserCategories,
            ReferenceTable::Roles,
            ReferenceTable::SkillCategories,
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(pk_auto(Reference::Id))
                        .col(string(Reference::Name))
                        .col(timestamp_with_time_zone(Reference::CreatedAt))
                        .col(timestamp_with_time_zone(Reference::UpdatedAt))
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(string(Users::Email))
                    .col(string_null(Users::MobileNumber))
                    .col(text_null(Users::Bio))
                    .col(string_null(Users::Location))
                    .col(string_null(Users::VideoUrl))
                    .col(text_null(Users::Certifications))
                    .col(integer_null(Users::UserCategoryId))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Users::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Educations::Table)
                    .if_not_exists()
                    .col(pk_auto(Educations::Id))
                    .col(integer(Educations::UserId))
                    .col(string(Educations::InstitutionName))
                    .col(string_null(Educations::Degree))
                    .col(string_null(Educations::FieldOfStudy))
                    .col(text_null(Educations::Achievements))
                    .col(date(Educations::StartDate))
                    .col(date(Educations::EndDate))
                    .col(timestamp_with_time_zone(Educations::CreatedAt))
                    .col(timestamp_with_time_zone(Educations::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_educations_user")
                            .from(Educations::Table, Educations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Skills::Table)
                    .if_not_exists()
                    .col(pk_auto(Skills::Id))
                    .col(string(Skills::Name))
                    .col(string_null(Skills::Icon))
                    .col(integer(Skills::SkillCategoryId))
                    .col(timestamp_with_time_zone(Skills::CreatedAt))
                    .col(timestamp_with_time_zone(Skills::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Skills::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Experiences::Table)
                    .if_not_exists()
                    .col(pk_auto(Experiences::Id))
                    .col(string(Experiences::Position))
                    .col(string(Experiences::Company))
                    .col(text_null(Experiences::Description))
                    .col(date(Experiences::StartDate))
                    .col(date_null(Experiences::EndDate))
                    .col(boolean(Experiences::IsCurrentlyWorking).default(false))
                    .col(text_null(Experiences::Responsibilities))
                    .col(timestamp_with_time_zone(Experiences::CreatedAt))
                    .col(timestamp_with_time_zone(Experiences::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Experiences::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(pk_auto(Projects::Id))
                    .col(string(Projects::Name))
                    .col(text_null(Projects::Description))
                    .col(string_null(Projects::Link))
                    .col(text(Projects::Technologies))
                    .col(timestamp_with_time_zone(Projects::CreatedAt))
                    .col(timestamp_with_time_zone(Projects::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Projects::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(pk_auto(Questions::Id))
                    .col(text(Questions::Question))
                    .col(string(Questions::QuestionType))
                    .col(timestamp_with_time_zone(Questions::CreatedAt))
                    .col(timestamp_with_time_zone(Questions::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Questions::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuestionOptions::Table)
                    .if_not_exists()
                    .col(pk_auto(QuestionOptions::Id))
                    .col(integer(QuestionOptions::QuestionId))
                    .col(string(QuestionOptions::Name))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_options_question")
                            .from(QuestionOptions::Table, QuestionOptions::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(pk_auto(Bookings::Id))
                    .col(integer(Bookings::UserId))
                    .col(timestamp_with_time_zone(Bookings::BookingDateTime))
                    .col(string_null(Bookings::MeetingLink))
                    .col(timestamp_with_time_zone(Bookings::CreatedAt))
                    .col(timestamp_with_time_zone(Bookings::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Bookings::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Many-to-many links
        create_link(manager, Link::UserRoles, "users", "roles").await?;
        create_link(manager, Link::UserExperiences, "users", "experiences").await?;
        create_link(manager, Link::ExperienceSkills, "experiences", "skills").await?;
        create_link(manager, Link::UserProjects, "users", "projects").await?;
        create_link(manager, Link::BookingQuestions, "bookings", "questions").await?;
        create_link(manager, Link::BookingSkills, "bookings", "skills").await?;

        manager
            .create_table(
                Table::create()
                    .table(Link::UserSkills)
                    .if_not_exists()
                    .col(integer(LinkCol::UserId))
                    .col(integer(LinkCol::SkillId))
                    .col(string_null(LinkCol::SkillLevel))
                    .primary_key(Index::create().col(LinkCol::UserId).col(LinkCol::SkillId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_skills_user")
                            .from(Link::UserSkills, LinkCol::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_skills_skill")
                            .from(Link::UserSkills, LinkCol::SkillId)
                            .to(Skills::Table, Skills::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_educations_user_id")
                    .table(Educations::Table)
                    .col(Educations::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_id")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for link in [
            Link::UserSkills,
            Link::BookingSkills,
            Link::BookingQuestions,
            Link::UserProjects,
            Link::ExperienceSkills,
            Link::UserExperiences,
            Link::UserRoles,
        ] {
            manager
                .drop_table(Table::drop().table(link).if_exists().to_owned())
                .await?;
        }

        for table in [
            "bookings",
            "question_options",
            "questions",
            "projects",
            "experiences",
            "skills",
            "educations",
            "users",
            "skill_categories",
            "roles",
            "user_categories",
        ] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

/// Link table `(<parent>_id, <child>_id)` with a composite key and cascading FKs.
async fn create_link(
    manager: &SchemaManager<'_>,
    link: Link,
    left_table: &str,
    right_table: &str,
) -> Result<(), DbErr> {
    let (left_col, right_col) = link.columns();
    let name = link.to_string();
    let (left_name, right_name) = (left_col.to_string(), right_col.to_string());

    manager
        .create_table(
            Table::create()
                .table(link)
                .if_not_exists()
                .col(integer(left_col))
                .col(integer(right_col))
                .primary_key(Index::create().col(left_col).col(right_col))
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{name}_{left_name}"))
                        .from(link, left_col)
                        .to(Alias::new(left_table), Alias::new("id"))
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{name}_{right_name}"))
                        .from(link, right_col)
                        .to(Alias::new(right_table), Alias::new("id"))
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden, Clone, Copy)]
enum ReferenceTable {
    UserCategories,
    Roles,
    SkillCategories,
}

#[derive(DeriveIden)]
enum Reference {
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Link {
    UserRoles,
    UserSkills,
    UserExperiences,
    ExperienceSkills,
    UserProjects,
    BookingQuestions,
    BookingSkills,
}

impl Link {
    fn columns(self) -> (LinkCol, LinkCol) {
        match self {
            Link::UserRoles => (LinkCol::UserId, LinkCol::RoleId),
            Link::UserSkills => (LinkCol::UserId, LinkCol::SkillId),
            Link::UserExperiences => (LinkCol::UserId, LinkCol::ExperienceId),
            Link::ExperienceSkills => (LinkCol::ExperienceId, LinkCol::SkillId),
            Link::UserProjects => (LinkCol::UserId, LinkCol::ProjectId),
            Link::BookingQuestions => (LinkCol::BookingId, LinkCol::QuestionId),
            Link::BookingSkills => (LinkCol::BookingId, LinkCol::SkillId),
        }
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum LinkCol {
    UserId,
    RoleId,
    SkillId,
    SkillLevel,
    ExperienceId,
    ProjectId,
    BookingId,
    QuestionId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    MobileNumber,
    Bio,
    Location,
    VideoUrl,
    Certifications,
    UserCategoryId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Educations {
    Table,
    Id,
    UserId,
    InstitutionName,
    Degree,
    FieldOfStudy,
    Achievements,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Skills {
    Table,
    Id,
    Name,
    Icon,
    SkillCategoryId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Experiences {
    Table,
    Id,
    Position,
    Company,
    Description,
    StartDate,
    EndDate,
    IsCurrentlyWorking,
    Responsibilities,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
    Link,
    Technologies,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Questions {
    Table,
    Id,
    Question,
    QuestionType,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum QuestionOptions {
    Table,
    Id,
    QuestionId,
    Name,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    UserId,
    BookingDateTime,
    MeetingLink,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
