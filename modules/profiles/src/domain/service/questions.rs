use std::sync::Arc;

use tracing::{info, instrument};

use crate::contract::model::*;
use crate::domain::error::{db_err, DomainError};
use crate::domain::paging::{ListParams, Page};
use crate::domain::repo::QuestionsRepository;
use crate::domain::service::ServiceConfig;

pub const QUESTION_ORDER_FIELDS: &[&str] = &["id", "question", "question_type", "created_at", "updated_at"];

#[derive(Clone)]
pub struct QuestionsService {
    questions: Arc<dyn QuestionsRepository>,
    config: ServiceConfig,
}

impl QuestionsService {
    pub fn new(questions: Arc<dyn QuestionsRepository>, config: ServiceConfig) -> Self {
        Self { questions, config }
    }

    #[instrument(name = "profiles.service.create_question", skip(self, new), fields(options = new.options.len()))]
    pub async fn create_question(&self, mut new: NewQuestion) -> Result<QuestionDetails, DomainError> {
        DomainError::require("question", &new.question)?;
        DomainError::require("question_type", &new.question_type)?;
        new.options = new.options.into_iter().map(|o| o.trim().to_string()).collect();
        if let Some(pos) = new.options.iter().position(|o| o.is_empty()) {
            return Err(DomainError::validation(
                format!("options[{pos}].name"),
                "must not be empty",
            ));
        }

        let created = self.questions.insert(new).await.map_err(db_err)?;
        info!(question_id = created.question.id, "Question created");
        Ok(created)
    }

    #[instrument(name = "profiles.service.get_question", skip(self))]
    pub async fn get_question(&self, id: i32) -> Result<QuestionDetails, DomainError> {
        self.questions
            .find(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Question", id))
    }

    #[instrument(name = "profiles.service.list_questions", skip(self))]
    pub async fn list_questions(&self, params: ListParams) -> Result<Page<Question>, DomainError> {
        let req = self.config.page(&params, QUESTION_ORDER_FIELDS)?;
        let (items, total) = self.questions.list(&req).await.map_err(db_err)?;
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.delete_question", skip(self))]
    pub async fn delete_question(&self, id: i32) -> Result<(), DomainError> {
        if !self.questions.soft_delete(id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Question", id));
        }
        Ok(())
    }
}
