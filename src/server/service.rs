use std::{future::Future, pin::Pin};

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{combinators::BoxBody, BodyExt, Empty};
use hyper::service::Service;
use log::info;

use crate::dto::{self, ConnectionInfo};
use crate::trace::trace_request;

pub type BodyType = BoxBody<Bytes, hyper::Error>;

const TRACE_TARGET: &str = "request_trace::requests";

#[derive(Clone)]
pub struct TraceService {
    conn: ConnectionInfo,
}

impl TraceService {
    pub fn new(conn: ConnectionInfo) -> Self {
        TraceService { conn }
    }
}

impl<B> Service<Request<B>> for TraceService {
    type Response = Response<BodyType>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        info!(
            "Got request. Host: {:?}, {:?} {:?}",
            req.headers()
                .get(http::header::HOST)
                .map_or("", |host| host.to_str().unwrap_or("")),
            req.method(),
            req.uri()
        );

        let snapshot = dto::Request::from_http(&req, &self.conn);
        trace_request(TRACE_TARGET, &snapshot);

        Box::pin(async { Ok(Response::new(empty_body())) })
    }
}

fn empty_body() -> BodyType {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}
