use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use crate::api::rest::routes;
use crate::config::ProfilesConfig;
use crate::domain::service::{
    BookingsService, ExperienceService, ProjectsService, QuestionsService, SkillsService,
    UsersService,
};
use crate::infra::seed::{seed_reference_data, ReferenceStores, SeedData, SeedOutcome};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::{
    SeaOrmBookingsRepository, SeaOrmEducationRepository, SeaOrmExperienceRepository,
    SeaOrmProjectsRepository, SeaOrmQuestionsRepository, SeaOrmSkillsRepository,
    SeaOrmUsersRepository,
};

/// Services shared with the REST handlers.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UsersService>,
    pub skills: Arc<SkillsService>,
    pub experience: Arc<ExperienceService>,
    pub projects: Arc<ProjectsService>,
    pub bookings: Arc<BookingsService>,
    pub questions: Arc<QuestionsService>,
}

/// The profiles module: owns the repositories, services and reference seeding
/// over one database connection.
pub struct ProfilesModule {
    conn: DatabaseConnection,
    config: ProfilesConfig,
    services: Services,
}

impl ProfilesModule {
    pub fn init(conn: DatabaseConnection, config: ProfilesConfig) -> Self {
        let service_config = config.service_config();

        let users_repo = Arc::new(SeaOrmUsersRepository::new(conn.clone()));
        let education_repo = Arc::new(SeaOrmEducationRepository::new(conn.clone()));
        let skills_repo = Arc::new(SeaOrmSkillsRepository::new(conn.clone()));
        let experience_repo = Arc::new(SeaOrmExperienceRepository::new(conn.clone()));
        let projects_repo = Arc::new(SeaOrmProjectsRepository::new(conn.clone()));
        let bookings_repo = Arc::new(SeaOrmBookingsRepository::new(conn.clone()));
        let questions_repo = Arc::new(SeaOrmQuestionsRepository::new(conn.clone()));

        let services = Services {
            users: Arc::new(UsersService::new(
                users_repo.clone(),
                education_repo,
                service_config.clone(),
            )),
            skills: Arc::new(SkillsService::new(
                skills_repo.clone(),
                users_repo.clone(),
                service_config.clone(),
            )),
            experience: Arc::new(ExperienceService::new(
                experience_repo,
                users_repo.clone(),
                skills_repo.clone(),
                service_config.clone(),
            )),
            projects: Arc::new(ProjectsService::new(
                projects_repo,
                users_repo.clone(),
                service_config.clone(),
            )),
            bookings: Arc::new(BookingsService::new(
                bookings_repo,
                users_repo,
                questions_repo.clone(),
                skills_repo,
                service_config.clone(),
            )),
            questions: Arc::new(QuestionsService::new(questions_repo, service_config)),
        };

        info!("Profiles module initialized");
        Self {
            conn,
            config,
            services,
        }
    }

    pub fn config(&self) -> &ProfilesConfig {
        &self.config
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        Migrator::up(&self.conn, None)
            .await
            .context("profiles migrations failed")?;
        info!("Profiles schema is up to date");
        Ok(())
    }

    /// Seed file location; relative paths hang off `home_dir`.
    pub fn seed_path(&self, home_dir: &Path) -> PathBuf {
        let file = Path::new(&self.config.seed.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            home_dir.join(file)
        }
    }

    /// Load the seed file and reconcile all reference tables.
    pub async fn seed_from_file(&self, path: &Path) -> anyhow::Result<SeedOutcome> {
        let data = SeedData::load(path)?;
        Ok(self.seed(&data).await)
    }

    pub async fn seed(&self, data: &SeedData) -> SeedOutcome {
        let stores = ReferenceStores::sea_orm(&self.conn);
        seed_reference_data(&stores, data).await
    }

    /// Startup seeding. Never fails: problems are logged and startup goes on.
    pub async fn seed_on_startup(&self, home_dir: &Path) -> Option<SeedOutcome> {
        if !self.config.seed.enabled {
            info!("Reference data seeding disabled");
            return None;
        }
        let path = self.seed_path(home_dir);
        match self.seed_from_file(&path).await {
            Ok(outcome) => {
                if !outcome.is_success() {
                    warn!(
                        failed = outcome.failures.len(),
                        "Reference data partially seeded, continuing startup"
                    );
                }
                Some(outcome)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "Skipping reference data seeding");
                None
            }
        }
    }

    pub fn router(&self) -> Router {
        routes::router(self.services.clone())
    }
}
