//! API request helpers
//!
//! Thin wrappers around the Axum extractors so every rejection comes back in
//! the API's own error shape instead of Axum's defaults.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::Error;
use super::response::Detail;

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => Err(Error::bad_request(
                "Data error",
                vec![Detail::new(err.body_text(), None)],
            )),
            JsonRejection::JsonSyntaxError(err) => Err(Error::bad_request(
                "JSON syntax error",
                vec![Detail::new(err.body_text(), None)],
            )),
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
                Vec::new(),
            )),
            err => Err(Error::bad_request(
                "Unknown JSON error",
                vec![Detail::new(err.body_text(), None)],
            )),
        },
    }
}

/// Wrapper for the JSON extractor
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        parse_json(Json::<F>::from_request(req, state).await).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => Err(Error::bad_request(
                "Invalid path parameter",
                vec![Detail::new(err.body_text(), None)],
            )),
            PathRejection::MissingPathParams(err) => Err(Error::bad_request(
                "Missing path parameter",
                vec![Detail::new(err.to_string(), None)],
            )),
            err => Err(Error::bad_request(
                "Unknown path error",
                vec![Detail::new(err.body_text(), None)],
            )),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parse_path(Path::<P>::from_request_parts(parts, state).await).map(PathParameters)
    }
}

fn parse_query<Q>(query: Result<Query<Q>, QueryRejection>) -> Result<Q, Error> {
    match query {
        Ok(Query(query)) => Ok(query),
        Err(err) => Err(Error::bad_request(
            "Invalid query string",
            vec![Detail::new(err.body_text(), None)],
        )),
    }
}

/// Wrapper for the query string extractor
pub struct QueryParameters<Q>(pub Q);

impl<S, Q> FromRequestParts<S> for QueryParameters<Q>
where
    S: Send + Sync,
    Q: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parse_query(Query::<Q>::from_request_parts(parts, state).await).map(QueryParameters)
    }
}
