//! Content reports filed against a post, a comment or a user.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bullpen_types::{CreateReportRequest, Paginated, Report, ReportStatus};

use crate::db::repositories::{CommentRepository, PostRepository, ReportRepository, UserRepository};
use crate::db::Database;
use crate::error::{CoreError, CoreResult, InvalidReason};
use crate::pagination::PageRequest;

const MAX_REPORT_TYPE_CHARS: usize = 50;
const MAX_REASON_CHARS: usize = 2000;

enum ReportTarget {
    Post(Uuid),
    Comment(Uuid),
    User(Uuid),
}

impl ReportTarget {
    fn from_request(request: &CreateReportRequest) -> CoreResult<Self> {
        match (
            request.reported_post_id,
            request.reported_comment_id,
            request.reported_user_id,
        ) {
            (Some(id), None, None) => Ok(ReportTarget::Post(id)),
            (None, Some(id), None) => Ok(ReportTarget::Comment(id)),
            (None, None, Some(id)) => Ok(ReportTarget::User(id)),
            _ => Err(CoreError::InvalidState(InvalidReason::InvalidReportTarget)),
        }
    }
}

pub struct ReportService {
    reports: ReportRepository,
    posts: PostRepository,
    comments: CommentRepository,
    users: UserRepository,
}

impl ReportService {
    pub fn new(db: &Database) -> Self {
        Self {
            reports: ReportRepository::new(db.pool.clone()),
            posts: PostRepository::new(db.pool.clone()),
            comments: CommentRepository::new(db.pool.clone()),
            users: UserRepository::new(db.pool.clone()),
        }
    }

    pub fn create(&self, reporter_id: &Uuid, request: CreateReportRequest) -> CoreResult<Report> {
        self.create_at(reporter_id, request, Utc::now())
    }

    /// File a report. The target must name exactly one live post, comment or user.
    pub fn create_at(
        &self,
        reporter_id: &Uuid,
        request: CreateReportRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<Report> {
        let target = ReportTarget::from_request(&request)?;

        let report_type = request.report_type.trim().to_string();
        if report_type.is_empty() || report_type.chars().count() > MAX_REPORT_TYPE_CHARS {
            return Err(CoreError::InvalidState(InvalidReason::InvalidReportType));
        }
        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string);
        if reason.as_ref().is_some_and(|r| r.chars().count() > MAX_REASON_CHARS) {
            return Err(CoreError::InvalidState(InvalidReason::ReasonTooLong));
        }

        match target {
            ReportTarget::Post(id) => {
                self.posts.get_visible(&id)?.ok_or(CoreError::NotFound("post"))?;
            }
            ReportTarget::Comment(id) => {
                self.comments.get_visible(&id)?.ok_or(CoreError::NotFound("comment"))?;
            }
            ReportTarget::User(id) => {
                if !self.users.exists(&id)? {
                    return Err(CoreError::NotFound("user"));
                }
            }
        }

        let report = Report {
            id: Uuid::new_v4(),
            reporter_id: *reporter_id,
            reported_post_id: request.reported_post_id,
            reported_comment_id: request.reported_comment_id,
            reported_user_id: request.reported_user_id,
            report_type,
            reason,
            status: ReportStatus::Pending,
            created_at: now,
        };
        self.reports.insert(&report)?;
        tracing::info!(
            report_id = %report.id,
            reporter_id = %reporter_id,
            report_type = %report.report_type,
            "report filed"
        );
        Ok(report)
    }

    pub fn list_mine(&self, reporter_id: &Uuid, page: PageRequest) -> CoreResult<Paginated<Report>> {
        let window = self.reports.list_by_reporter(reporter_id, page)?;
        Ok(page.paginate(window.items, window.total))
    }
}
