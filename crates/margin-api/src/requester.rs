//! Bearer-token requester extractor.
//!
//! Authentication never rejects a request: a missing or unknown token yields
//! an anonymous requester, who then fails authorization like anybody else
//! lacking the needed principals.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use margin_core::{
  acl::{Action, Principal, Rule, permits},
  store::AnnotationStore,
};
use sha2::{Digest as _, Sha256};

use crate::{AppState, error::ApiError};

/// Hex SHA-256 of a bearer token, the form tokens are stored in.
pub fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// The identity behind a request and its effective principals.
#[derive(Debug, Clone)]
pub struct Requester {
  pub userid: Option<String>,
  principals: Vec<Principal>,
}

impl Requester {
  pub fn anonymous() -> Self { Self { userid: None, principals: vec![Principal::everyone()] } }

  /// An authenticated user who belongs to the groups in `memberships`.
  pub fn user(userid: &str, memberships: &[String]) -> Self {
    let mut principals = vec![
      Principal::everyone(),
      Principal::authenticated(),
      Principal::user(userid),
    ];
    principals.extend(memberships.iter().map(|pubid| Principal::group(pubid)));
    Self { userid: Some(userid.to_owned()), principals }
  }

  pub fn principals(&self) -> &[Principal] { &self.principals }

  /// Fail with [`ApiError::NotFound`] unless `rules` allow `action`.
  pub fn require(&self, rules: &[Rule], action: Action) -> Result<(), ApiError> {
    if permits(rules, &self.principals, action) {
      Ok(())
    } else {
      tracing::debug!(userid = ?self.userid, %action, "permission denied");
      Err(ApiError::NotFound)
    }
  }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<AppState<S>> for Requester
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(token) = bearer_token(&parts.headers) else {
      return Ok(Requester::anonymous());
    };

    let userid = state.store.user_for_token(&hash_token(token)).await.map_err(ApiError::store)?;
    let Some(userid) = userid else {
      return Ok(Requester::anonymous());
    };

    let memberships = state.store.memberships(&userid).await.map_err(ApiError::store)?;
    Ok(Requester::user(&userid, &memberships))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn anonymous_holds_only_everyone() {
    assert_eq!(Requester::anonymous().principals(), &[Principal::everyone()]);
  }

  #[test]
  fn user_principals_include_groups() {
    let r = Requester::user("acct:alice@example.com", &["abc".to_owned()]);
    assert_eq!(r.principals(), &[
      Principal::everyone(),
      Principal::authenticated(),
      Principal::user("acct:alice@example.com"),
      Principal::group("abc"),
    ]);
  }

  #[test]
  fn bearer_token_parsing() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer 6879-abc"));
    assert_eq!(bearer_token(&headers), Some("6879-abc"));
  }

  #[test]
  fn token_hash_is_hex_sha256() {
    assert_eq!(
      hash_token("abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }
}
