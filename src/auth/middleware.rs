use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::error;

use super::authenticator::Authenticator;
use super::extractors::AuthenticatedUserId;
use crate::error::AppError;

/// Authenticates every request in the scope it wraps.
///
/// On success the resolved user id is stored in the request extensions for
/// `AuthenticatedUserId`; on failure a 401 is returned and the handler never runs.
/// Needs a `web::Data<Authenticator>` in the app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let authenticator = match req.app_data::<web::Data<Authenticator>>() {
                Some(authenticator) => authenticator.clone(),
                None => {
                    error!("AuthMiddleware is mounted but no Authenticator is registered");
                    let err = AppError::InternalServerError("Authenticator missing".into());
                    return Ok(req.error_response(err).map_into_right_body());
                }
            };

            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match authenticator.authenticate(authorization.as_deref()).await {
                Ok(user_id) => {
                    req.extensions_mut().insert(AuthenticatedUserId(user_id));
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(auth_err) => {
                    let app_err = AppError::from(auth_err);
                    Ok(req.error_response(app_err).map_into_right_body())
                }
            }
        })
    }
}
