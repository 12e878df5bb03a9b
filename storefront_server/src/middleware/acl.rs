//! Access-control middleware.
//!
//! Looks up the first matching rule in the [`AccessPolicy`] table for the request's method and path, then checks
//! the identity the authentication layer attached (if any) against the rule's requirement. Anonymous requests to
//! guarded routes get 401; authenticated requests lacking the required role get 403.

use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::debug;

use crate::{
    auth::AuthenticatedUser,
    errors::ServerError,
    policy::{AccessPolicy, Requirement},
};

pub struct AclMiddlewareFactory {
    policy: Rc<AccessPolicy>,
}

impl AclMiddlewareFactory {
    pub fn new(policy: AccessPolicy) -> Self {
        AclMiddlewareFactory { policy: Rc::new(policy) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { policy: Rc::clone(&self.policy), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    policy: Rc<AccessPolicy>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let requirement = self.policy.required_for(req.method(), req.path());
        Box::pin(async move {
            let identity = req.extensions().get::<AuthenticatedUser>().cloned();
            match (requirement, identity) {
                (Requirement::Public, _) => service.call(req).await,
                (Requirement::Authenticated, Some(_)) => service.call(req).await,
                (Requirement::Role(required), Some(user)) => {
                    if user.role == required {
                        service.call(req).await
                    } else {
                        debug!(
                            "🛂️ {} lacks the {required} role needed for {} {}",
                            user.username,
                            req.method(),
                            req.path()
                        );
                        Err(ServerError::InsufficientPermissions(format!("{required} role required")).into())
                    }
                },
                (_, None) => {
                    debug!("🛂️ Anonymous request denied for {} {}", req.method(), req.path());
                    Err(ServerError::AuthenticationRequired.into())
                },
            }
        })
    }
}
