//! Tenant context middleware
//!
//! Resolves the tenant from the `x-tenant-id` header and injects it into the
//! request extensions. Requests without tenant context are processed under
//! the `DEFAULT` tenant; a tenant containing `:` is rejected with a 400.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tms_core::TenantId;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Axum middleware that resolves and injects [`TenantId`].
pub async fn tenant_middleware(mut request: Request, next: Next) -> Response {
    let resolved = TenantId::resolve(
        request
            .headers()
            .get(TENANT_HEADER)
            .and_then(|h| h.to_str().ok()),
    );
    let tenant_id = match resolved {
        Ok(tenant_id) => tenant_id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected tenant header");
            return ApiError::from(e).into_response();
        }
    };

    tracing::Span::current().record("tenant_id", tracing::field::display(&tenant_id));
    request.extensions_mut().insert(tenant_id);

    next.run(request).await
}

/// Typed extractor for the tenant injected by [`tenant_middleware`].
#[derive(Debug, Clone)]
pub struct Tenant(pub TenantId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantId>()
            .cloned()
            .map(Tenant)
            .ok_or_else(|| {
                ApiError::internal_error(
                    "TenantId not found in request extensions. \
                     Ensure tenant_middleware is applied to this route.",
                )
            })
    }
}

impl std::ops::Deref for Tenant {
    type Target = TenantId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
