#[cfg(test)]
use crate::features::auth::model::{AuthenticatedUser, Role};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1,
        name: "Administrateur".to_string(),
        email: "admin@tribunal.test".to_string(),
        role: Role::Admin,
    }
}

#[cfg(test)]
pub fn create_user_with_role(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id: 42,
        name: "Testeur".to_string(),
        email: "testeur@tribunal.test".to_string(),
        role,
    }
}

#[cfg(test)]
#[allow(dead_code)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

#[cfg(test)]
#[allow(dead_code)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}
