use std::future::{Ready, ready};
use std::rc::Rc;
use std::time::Instant;

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;

use crate::metrics::{HTTP_REQUESTS_DURATION, HTTP_REQUESTS_TOTAL};

/// Records a counter and a latency observation for every request, labelled
/// by the matched route pattern rather than the raw path.
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = MetricsMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let endpoint = req
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let res = service.call(req).await;

            let status = match &res {
                Ok(resp) => resp.status().as_u16().to_string(),
                Err(e) => e.as_response_error().status_code().as_u16().to_string(),
            };

            HTTP_REQUESTS_TOTAL
                .with_label_values(&[&method, &endpoint, &status])
                .inc();
            HTTP_REQUESTS_DURATION
                .with_label_values(&[&method, &endpoint])
                .observe(start.elapsed().as_secs_f64());

            res
        })
    }
}
