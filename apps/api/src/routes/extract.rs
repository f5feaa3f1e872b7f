//! Request extractors whose rejections render as [`AppError`], so malformed
//! bodies, ids and query strings get the usual error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct UrlPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct UrlQuery<T>(pub T);
