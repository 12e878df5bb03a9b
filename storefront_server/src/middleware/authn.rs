//! Authentication middleware.
//!
//! Inspects the `Authorization: Bearer <token>` header, validates the token against the shared signing secret and,
//! if the subject resolves to a known account, attaches an [`AuthenticatedUser`] to the request extensions.
//!
//! This layer never rejects a request. A missing header, a garbage token, a stale token or an unknown subject all
//! leave the request identity-less and pass it downstream; whether an anonymous request is acceptable is the ACL
//! middleware's decision, not ours. This keeps public routes usable by clients that send expired tokens out of
//! habit.

use std::{
    future::{ready, Ready},
    marker::PhantomData,
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{debug, error, warn};
use storefront_engine::{traits::UserStore, UserApi};

use crate::auth::{AuthenticatedUser, TokenIssuer};

pub struct AuthenticationMiddlewareFactory<B>(PhantomData<B>);

impl<B> AuthenticationMiddlewareFactory<B> {
    pub fn new() -> Self {
        AuthenticationMiddlewareFactory(PhantomData)
    }
}

impl<B> Default for AuthenticationMiddlewareFactory<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B, Body> Transform<S, ServiceRequest> for AuthenticationMiddlewareFactory<B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: UserStore + 'static,
    Body: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<Body>;
    type Transform = AuthenticationMiddlewareService<S, B>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddlewareService { service: Rc::new(service), _backend: PhantomData }))
    }
}

pub struct AuthenticationMiddlewareService<S, B> {
    service: Rc<S>,
    _backend: PhantomData<B>,
}

impl<S, B, Body> Service<ServiceRequest> for AuthenticationMiddlewareService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: UserStore + 'static,
    Body: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<Body>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            if let Some(token) = bearer_token(&req) {
                attach_identity::<B>(&req, &token).await;
            }
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

async fn attach_identity<B: UserStore + 'static>(req: &ServiceRequest, token: &str) {
    let Some(issuer) = req.app_data::<web::Data<TokenIssuer>>() else {
        error!("🔑️ No token issuer registered on the app. Requests cannot be authenticated.");
        return;
    };
    let claims = match issuer.validate(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("🔑️ Ignoring bearer token: {e}");
            return;
        },
    };
    // An upstream layer may already have resolved the identity. Keep it.
    if req.extensions().get::<AuthenticatedUser>().is_some() {
        return;
    }
    let Some(api) = req.app_data::<web::Data<UserApi<B>>>() else {
        error!("🔑️ No user store registered on the app. Requests cannot be authenticated.");
        return;
    };
    match api.user_by_username(&claims.sub).await {
        Ok(Some(user)) => {
            debug!("🔑️ Authenticated request by {} ({})", user.username, user.role);
            req.extensions_mut().insert(AuthenticatedUser::from(&user));
        },
        Ok(None) => warn!("🔑️ Valid token for unknown account '{}'. Treating request as anonymous.", claims.sub),
        Err(e) => warn!("🔑️ Could not resolve token subject '{}': {e}. Treating request as anonymous.", claims.sub),
    }
}
