//! Manager reviews of developers on completed projects, and the tier
//! write-back every review change triggers.

use agency_core::effects::{Effect, EntityKind, NotificationDraft, NotificationKind};
use agency_core::error::CoreError;
use agency_core::policy::{self, Action, ReviewAction, Subject};
use agency_core::project::ProjectStatus;
use agency_core::roles::{Actor, Role};
use agency_core::tier;
use agency_core::types::DbId;
use agency_db::models::project::Project;
use agency_db::models::review::{NewReview, ProjectReview, ReviewFilter, UpdateReview};
use agency_db::models::task::TaskFilter;
use agency_db::models::user::User;
use agency_db::{StoreError, StoreTx};
use serde::Deserialize;

use crate::access;
use crate::error::WorkflowResult;
use crate::load;
use crate::Workflow;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub developer_id: DbId,
    pub rating: i16,
    pub communication: i16,
    pub quality: i16,
    pub timeliness: i16,
    pub professionalism: i16,
    pub comment: Option<String>,
}

fn validate_scores(scores: &[(&str, i16)]) -> Result<(), CoreError> {
    scores
        .iter()
        .try_for_each(|(field, value)| tier::validate_rating(field, *value))
}

fn ensure_reviewable(project: &Project) -> Result<(), CoreError> {
    if project.status != ProjectStatus::Completed {
        return Err(CoreError::invalid_state(
            "Developers can only be reviewed on completed projects",
        ));
    }
    Ok(())
}

/// Recompute and store a developer's tier from their full review set.
pub(crate) async fn recalculate(tx: &mut dyn StoreTx, developer_id: DbId) -> WorkflowResult<User> {
    let ratings: Vec<i16> = tx
        .list_reviews(&ReviewFilter {
            developer_id: Some(developer_id),
            ..ReviewFilter::default()
        })
        .await?
        .iter()
        .map(|r| r.rating)
        .collect();
    let stats = tier::recalculate(&ratings);
    let user = tx.update_user_tier(developer_id, &stats).await?;

    tracing::debug!(
        developer_id,
        tier = %stats.tier,
        average_rating = stats.average_rating,
        total_reviews = stats.total_reviews,
        "Tier recalculated"
    );
    Ok(user)
}

impl Workflow {
    pub async fn create_review(
        &self,
        actor: &Actor,
        project_id: DbId,
        input: CreateReview,
    ) -> WorkflowResult<ProjectReview> {
        let mut tx = self.begin().await?;
        let project = load::locked_project(tx.as_mut(), project_id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Review(ReviewAction::Create),
        )?;
        ensure_reviewable(&project)?;

        let review = NewReview {
            project_id,
            developer_id: input.developer_id,
            reviewer_id: actor.user_id,
            rating: input.rating,
            communication: input.communication,
            quality: input.quality,
            timeliness: input.timeliness,
            professionalism: input.professionalism,
            comment: input.comment,
        };
        validate_scores(&review.scores())?;

        let developer = load::user(tx.as_mut(), input.developer_id).await?;
        if developer.role != Role::Developer {
            return Err(CoreError::validation(format!("User {} is not a developer", developer.id)).into());
        }
        let worked_on = tx
            .list_tasks(&TaskFilter {
                project_id: Some(project_id),
                assigned_to_id: Some(developer.id),
                ..TaskFilter::default()
            })
            .await?;
        if worked_on.is_empty() {
            return Err(CoreError::validation(format!(
                "Developer {} has no tasks on this project",
                developer.id
            ))
            .into());
        }

        let review = match tx.insert_review(&review).await {
            Ok(review) => review,
            Err(StoreError::Unique(_)) => {
                return Err(CoreError::Conflict(
                    "This developer has already been reviewed for this project".into(),
                )
                .into())
            }
            Err(e) => return Err(e.into()),
        };
        recalculate(tx.as_mut(), review.developer_id).await?;

        let effects = vec![Effect::notify_user(
            review.developer_id,
            NotificationDraft::new(
                NotificationKind::ReviewReceived,
                "New review",
                format!("You received a {}/5 review for \"{}\"", review.rating, project.internal_name),
            )
            .about(EntityKind::ProjectReview, review.id),
        )];
        self.commit(tx, effects).await?;

        tracing::info!(review_id = review.id, project_id, developer_id = review.developer_id, "Review created");
        Ok(review)
    }

    pub async fn update_review(
        &self,
        actor: &Actor,
        id: DbId,
        input: UpdateReview,
    ) -> WorkflowResult<ProjectReview> {
        let mut tx = self.begin().await?;
        let (project, mut review) = load::review_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Review(ReviewAction::Update),
        )?;

        input.apply(&mut review);
        validate_scores(&review.scores())?;
        let review = tx.update_review(&review).await?;
        recalculate(tx.as_mut(), review.developer_id).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(review_id = id, "Review updated");
        Ok(review)
    }

    pub async fn delete_review(&self, actor: &Actor, id: DbId) -> WorkflowResult<()> {
        let mut tx = self.begin().await?;
        let (project, review) = load::review_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Review(ReviewAction::Delete),
        )?;
        tx.delete_review(id).await?;
        recalculate(tx.as_mut(), review.developer_id).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(review_id = id, developer_id = review.developer_id, "Review deleted");
        Ok(())
    }

    /// Reviews of one project, or of one developer. Developers only ever
    /// see their own.
    pub async fn list_reviews(
        &self,
        actor: &Actor,
        filter: &ReviewFilter,
    ) -> WorkflowResult<Vec<ProjectReview>> {
        let mut tx = self.begin().await?;
        let mut filter = *filter;
        if actor.role == Role::Developer {
            filter.developer_id = Some(actor.user_id);
        } else if let Some(project_id) = filter.project_id {
            let project = load::project(tx.as_mut(), project_id).await?;
            access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        } else if !matches!(actor.role, Role::Admin | Role::Manager) {
            return Err(CoreError::Forbidden("Reviews must be listed per project".into()).into());
        }
        Ok(tx.list_reviews(&filter).await?)
    }

    /// Rebuild one developer's tier from scratch. Idempotent.
    pub async fn recalculate_tier(&self, actor: &Actor, developer_id: DbId) -> WorkflowResult<User> {
        policy::require_admin(actor, "recalculate tiers")?;
        let mut tx = self.begin().await?;
        let developer = load::user(tx.as_mut(), developer_id).await?;
        if developer.role != Role::Developer {
            return Err(CoreError::validation(format!("User {developer_id} is not a developer")).into());
        }
        let user = recalculate(tx.as_mut(), developer_id).await?;
        self.commit(tx, Vec::new()).await?;
        Ok(user)
    }
}
