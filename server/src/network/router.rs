use common::error::FancyError;
use http_body_util::Full;
use hyper::{
    body::Bytes,
    header::{HeaderValue, CONTENT_TYPE},
    http::request::Parts,
    Method, Request, Response, StatusCode,
};

use crate::{
    error::VersionError,
    metrics,
    storage::VersionStorage,
    version::{Element, Version},
};

use super::Shared;

const HEALTH_MESSAGE: &str = "hello from vbump!";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub type HttpResponse = Response<Full<Bytes>>;

#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Health,
    Metrics,
    Bump { element: Element, project: &'a str },
    SetVersion { project: &'a str, version: &'a str },
    GetVersion { project: &'a str },
    TransientBump { element: Element, version: &'a str },
}

impl<'a> Route<'a> {
    pub fn resolve(path: &'a str) -> Option<Self> {
        let segments = path
            .strip_prefix('/')
            .unwrap_or(path)
            .split('/')
            .collect::<Vec<_>>();

        match segments[..] {
            [""] => Some(Route::Health),
            ["metrics"] => Some(Route::Metrics),
            ["version", project] => Some(Route::GetVersion { project }),
            ["version", project, version] => Some(Route::SetVersion { project, version }),
            ["transient", element, version] => Some(Route::TransientBump {
                element: element.parse().ok()?,
                version,
            }),
            [element, project] => Some(Route::Bump {
                element: element.parse().ok()?,
                project,
            }),
            _ => None,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Route::Health | Route::Metrics | Route::GetVersion { .. } => Method::GET,
            Route::Bump { .. } | Route::SetVersion { .. } | Route::TransientBump { .. } => {
                Method::POST
            }
        }
    }
}

/// Answers a single request. The request body is never read.
pub async fn handle<S: VersionStorage, B>(shared: &Shared<S>, request: Request<B>) -> HttpResponse {
    let (parts, _) = request.into_parts();
    let Some(route) = Route::resolve(parts.uri.path()) else {
        return empty(StatusCode::NOT_FOUND);
    };
    if parts.method != route.method() {
        return empty(StatusCode::METHOD_NOT_ALLOWED);
    }

    let manager = &shared.manager;
    match route {
        Route::Health => text(StatusCode::OK, HEALTH_MESSAGE),
        Route::Metrics => {
            let mut response = text(StatusCode::OK, shared.metrics.render());
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(metrics::CONTENT_TYPE));
            response
        }
        Route::Bump { element, project } => {
            respond(&parts, manager.bump(project, element).await)
        }
        Route::SetVersion { project, version } => {
            respond(&parts, manager.set_version(project, version).await)
        }
        Route::GetVersion { project } => respond(&parts, manager.get_version(project).await),
        Route::TransientBump { element, version } => {
            respond(&parts, manager.bump_transient(version, element))
        }
    }
}

fn respond(parts: &Parts, result: Result<Version, VersionError>) -> HttpResponse {
    match result {
        Ok(version) => text(StatusCode::OK, version.to_string()),
        Err(error) => failure(parts, &error),
    }
}

fn failure(parts: &Parts, error: &VersionError) -> HttpResponse {
    let server_side = error.is_server_error();
    FancyError::print_request(parts.method.as_str(), parts.uri.path(), error, server_side);
    if server_side {
        empty(error.status())
    } else {
        text(error.status(), error.to_string())
    }
}

fn text(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    response
}

fn empty(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
