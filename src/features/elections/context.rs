//! Explicit election context for dashboard routes.
//!
//! Every route under `/api/elections/{election_slug}` receives the signed-in
//! admin and the resolved election through [`ElectionContext`]. The
//! extractor rejects voters, unknown slugs, and admins who are not
//! commissioners of the election.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts, Path};
use axum::http::request::Parts;

use crate::core::error::AppError;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::elections::models::Election;
use crate::features::elections::services::ElectionService;

/// Route parameter carrying the election slug
pub const ELECTION_SLUG_PARAM: &str = "election_slug";

pub struct ElectionContext {
    pub user: AuthenticatedUser,
    pub election: Election,
}

impl<S> FromRequestParts<S> for ElectionContext
where
    Arc<ElectionService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAdmin(user) = RequireAdmin::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let slug = params.get(ELECTION_SLUG_PARAM).ok_or_else(|| {
            AppError::BadRequest("Missing election slug in route".to_string())
        })?;

        let service = Arc::<ElectionService>::from_ref(state);
        let election = service
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Election '{}' not found", slug)))?;

        if !service
            .is_commissioner(election.id, &user.account_id)
            .await?
        {
            tracing::warn!(
                "Account {} attempted to manage election {} without commissioner access",
                user.account_id,
                election.id
            );
            return Err(AppError::Forbidden(
                "You are not a commissioner of this election".to_string(),
            ));
        }

        Ok(Self { user, election })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::elections::events::ElectionEvents;
    use crate::modules::storage::InMemoryStorage;
    use crate::shared::test_helpers::with_voter_auth;
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;

    async fn probe(ctx: ElectionContext) -> String {
        ctx.election.slug
    }

    fn router() -> Router {
        // Never connects: the requests below are rejected before any query
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let service = Arc::new(ElectionService::new(
            pool,
            Arc::new(InMemoryStorage::new()),
            Arc::new(ElectionEvents::new(4)),
        ));
        Router::new()
            .route("/api/elections/{election_slug}/probe", get(probe))
            .with_state(service)
    }

    #[tokio::test]
    async fn test_rejects_unauthenticated() {
        let server = TestServer::new(router()).unwrap();
        let response = server.get("/api/elections/ssc-2023/probe").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_voter_session() {
        let server = TestServer::new(with_voter_auth(router())).unwrap();
        let response = server.get("/api/elections/ssc-2023/probe").await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}
