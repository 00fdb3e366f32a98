//! Maintenance ticket service
//!
//! Every change to a ticket appends to its timeline: creation, technician
//! assignment, status changes and comments.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    export,
    models::{
        fetch_all, AddCommentRequest, AssetQuery, BulkResult, Comment, CreateMaintenance, MaintenanceQuery,
        MaintenanceRecord, MaintenanceStatus, PaginatedResponse, StatusUpdateRequest,
        TimelineEvent, TimelineEventKind, UpdateMaintenance,
    },
    repository::Repository,
};

/// Name recorded on timeline entries written by the dashboard
pub const ACTOR: &str = "Admin User";

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
}

impl MaintenanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &MaintenanceQuery) -> AppResult<PaginatedResponse<MaintenanceRecord>> {
        self.repository.maintenance_list(query).await
    }

    pub async fn all(&self, query: &MaintenanceQuery) -> AppResult<Vec<MaintenanceRecord>> {
        fetch_all(|page| {
            let query = query.at_page(page);
            async move { self.repository.maintenance_list(&query).await }
        })
        .await
    }

    pub async fn get(&self, id: &str) -> AppResult<MaintenanceRecord> {
        self.repository.maintenance_get(id).await
    }

    /// Open a ticket; asset details missing from the request are copied from the
    /// inventory when the tag is known.
    pub async fn create(&self, mut data: CreateMaintenance) -> AppResult<MaintenanceRecord> {
        data.validate()?;
        data.asset_tag = data.asset_tag.trim().to_string();

        if data.asset_category.is_empty() || data.asset_make.is_none() || data.asset_model.is_none() {
            let query = AssetQuery::search(data.asset_tag.clone());
            let assets = fetch_all(|page| {
                let query = query.at_page(page);
                async move { self.repository.assets_list(&query).await }
            })
            .await?;
            if let Some(asset) = assets
                .into_iter()
                .find(|a| a.service_tag.eq_ignore_ascii_case(&data.asset_tag))
            {
                if data.asset_category.is_empty() {
                    data.asset_category = asset.category;
                }
                data.asset_make.get_or_insert(asset.make);
                data.asset_model.get_or_insert(asset.model);
            }
        }

        if data.timeline.is_empty() {
            data.timeline.push(TimelineEvent::new(
                TimelineEventKind::Creation,
                "Ticket Created",
                Some(format!("Ticket created by {}", data.reported_by)),
                data.reported_by.clone(),
                Utc::now(),
            ));
        }

        let record = self.repository.maintenance_create(data).await?;
        tracing::info!(id = %record.id, tag = %record.asset_tag, "maintenance ticket opened");
        Ok(record)
    }

    /// Partial update. A new technician and a status change are both recorded on
    /// the timeline; the status change follows the transition rules.
    pub async fn update(&self, id: &str, mut data: UpdateMaintenance) -> AppResult<MaintenanceRecord> {
        let current = self.get(id).await?;
        let now = Utc::now();
        let mut timeline = data.timeline.take().unwrap_or_else(|| current.timeline.clone());

        if let Some(technician) = data.technician.as_deref().map(str::trim) {
            if !technician.is_empty() && current.technician.as_deref() != Some(technician) {
                timeline.push(TimelineEvent::new(
                    TimelineEventKind::Assignment,
                    "Technician Assigned",
                    Some(format!("Assigned to {}", technician)),
                    ACTOR,
                    now,
                ));
            }
        }

        if let Some(next) = data.status {
            if next != current.status {
                check_transition(current.status, next)?;
                timeline.push(status_event(current.status, next, None, now));
                if next == MaintenanceStatus::Completed && data.completed_date.is_none() {
                    data.completed_date = Some(now.date_naive());
                }
            }
        }

        data.timeline = Some(timeline);
        self.repository.maintenance_update(id, data).await
    }

    /// Move a ticket to `request.status`; completing it stamps `completedDate`.
    pub async fn update_status(&self, id: &str, request: StatusUpdateRequest) -> AppResult<MaintenanceRecord> {
        let current = self.get(id).await?;
        if current.status == request.status {
            return Ok(current);
        }
        check_transition(current.status, request.status)?;

        let now = Utc::now();
        let mut timeline = current.timeline;
        timeline.push(status_event(current.status, request.status, request.note.as_deref(), now));

        let data = UpdateMaintenance {
            status: Some(request.status),
            completed_date: (request.status == MaintenanceStatus::Completed).then(|| now.date_naive()),
            timeline: Some(timeline),
            ..Default::default()
        };
        let record = self.repository.maintenance_update(id, data).await?;
        tracing::info!(id, status = %record.status, "maintenance status changed");
        Ok(record)
    }

    pub async fn add_comment(&self, id: &str, request: AddCommentRequest) -> AppResult<MaintenanceRecord> {
        request.validate()?;
        let current = self.get(id).await?;
        let now = Utc::now();

        let mut comments = current.comments;
        comments.push(Comment {
            id: Uuid::new_v4().to_string(),
            author: ACTOR.to_string(),
            content: request.content.trim().to_string(),
            timestamp: now,
            is_internal: request.is_internal,
        });

        let mut timeline = current.timeline;
        timeline.push(TimelineEvent::new(
            TimelineEventKind::Comment,
            "Comment Added",
            Some(
                if request.is_internal {
                    "Internal note added"
                } else {
                    "Public comment added"
                }
                .to_string(),
            ),
            ACTOR,
            now,
        ));

        let data = UpdateMaintenance {
            comments: Some(comments),
            timeline: Some(timeline),
            ..Default::default()
        };
        self.repository.maintenance_update(id, data).await
    }

    pub async fn bulk_update_status(
        &self,
        ids: &[String],
        status: MaintenanceStatus,
        note: Option<String>,
    ) -> AppResult<BulkResult> {
        let mut result = BulkResult::default();
        for id in ids {
            let request = StatusUpdateRequest {
                status,
                note: note.clone(),
            };
            let outcome = self.update_status(id, request).await;
            result.record(id, outcome.map(|_| ()).map_err(|e| e.user_message()));
        }
        Ok(result)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.maintenance_delete(id).await
    }

    /// Every ticket filed against an asset, newest first
    pub async fn history(&self, asset_tag: &str) -> AppResult<Vec<MaintenanceRecord>> {
        let tag = asset_tag.trim();
        let query = MaintenanceQuery {
            search: Some(tag.to_string()),
            ..Default::default()
        };
        let mut records: Vec<MaintenanceRecord> = self
            .all(&query)
            .await?
            .into_iter()
            .filter(|r| r.asset_tag.eq_ignore_ascii_case(tag))
            .collect();
        records.sort_by(|a, b| b.reported_date.cmp(&a.reported_date));
        Ok(records)
    }

    pub async fn export_csv(&self, query: &MaintenanceQuery) -> AppResult<String> {
        export::maintenance_to_csv(&self.all(query).await?)
    }
}

fn check_transition(from: MaintenanceStatus, to: MaintenanceStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::BusinessRule(format!(
            "Cannot change status from {} to {}",
            from, to
        )))
    }
}

fn status_event(
    from: MaintenanceStatus,
    to: MaintenanceStatus,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> TimelineEvent {
    let mut description = format!("Status changed from {} to {}", from, to);
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        description.push_str(". ");
        description.push_str(note);
    }
    TimelineEvent::new(
        TimelineEventKind::StatusChange,
        "Status Updated",
        Some(description),
        ACTOR,
        now,
    )
}
