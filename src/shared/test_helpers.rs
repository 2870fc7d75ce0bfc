#[cfg(test)]
use crate::features::auth::model::{AccountType, AuthenticatedUser};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
#[allow(dead_code)]
pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "test-admin-account".to_string(),
        sub: "test-admin-sub".to_string(),
        account_type: AccountType::Admin,
        roles: vec![],
        election_id: None,
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub fn create_voter_user() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "test-voter-account".to_string(),
        sub: "test-voter-sub".to_string(),
        account_type: AccountType::Voter,
        roles: vec![],
        election_id: Some(uuid::Uuid::nil()),
    }
}

#[cfg(test)]
async fn inject_voter_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_voter_user());
    next.run(request).await
}

#[cfg(test)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

#[cfg(test)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

#[cfg(test)]
pub fn with_voter_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_voter_middleware))
}
