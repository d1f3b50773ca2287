use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::data::Pagination;
use crate::presentation::app_error::{AppError, AppResult};

pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod users;

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PaginationQuery {
    /// Items per page (1..=100, default 10)
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    /// Offset from the beginning
    pub(crate) offset: Option<u32>,
}

impl PaginationQuery {
    pub(crate) fn pagination(&self) -> AppResult<Pagination> {
        self.validate()?;
        Ok(Pagination::new(self.limit, self.offset))
    }
}

/// Parses a path identifier, answering 400 before any store access.
pub(crate) fn parse_id(raw: &str, entity: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("invalid {entity} ID format")))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{PaginationQuery, parse_id};
    use crate::presentation::app_error::AppError;

    #[test]
    fn parse_id_reports_entity_name() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "post").expect("must parse"), id);

        match parse_id("42", "comment") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "invalid comment ID format"),
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn pagination_query_rejects_out_of_range_limit() {
        let query = PaginationQuery {
            limit: Some(500),
            offset: None,
        };
        assert!(matches!(query.pagination(), Err(AppError::Validation(_))));

        let query = PaginationQuery {
            limit: None,
            offset: Some(20),
        };
        let pagination = query.pagination().expect("defaults must apply");
        assert_eq!(pagination.limit, 10);
        assert_eq!(pagination.offset, 20);
    }
}
