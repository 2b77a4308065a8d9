//! The single endpoint round trip: encode, POST, hand back the body.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::adapter::{Client, ReqwestTransport, RestRequest, RestResponse, RestResult, RestTransport};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::request::{
    ACTION_GET_PERSON, ACTION_GET_PROFILE, ApiRequest, FORM_CONTENT_TYPE, ProfileQuery,
};
use crate::session::Session;

pub const API_URL: &str = "https://api.wikitree.com/api.php";

const LOGIN_SUCCESS: &str = "Success";
const AUTHCODE_MARKER: &str = "authcode=";

#[derive(Debug, Deserialize)]
struct ClientLoginReply {
    #[serde(rename = "clientLogin")]
    client_login: ClientLoginResult,
}

#[derive(Debug, Deserialize)]
struct ClientLoginResult {
    result: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    userid: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct WikiTreeClient {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl WikiTreeClient {
    /// reqwest-backed client against the public endpoint. Redirects are left
    /// to the caller so the login step can read its authcode.
    pub fn new() -> RestResult<Self> {
        Ok(Self::with_transport(ReqwestTransport::without_redirects()?))
    }

    pub fn with_transport<T>(transport: T) -> Self
    where
        T: RestTransport + 'static,
    {
        Self {
            client: Client::with_transport(transport),
            endpoint: API_URL.to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> RestResult<Self> {
        let client = Self::new()?.with_endpoint(&config.endpoint);
        Ok(match config.timeout {
            Some(timeout) => client.with_timeout(timeout),
            None => client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build(&self, request: &ApiRequest, session: Option<&Session>) -> RestRequest {
        let mut rest = RestRequest::post(&self.endpoint)
            .with_header("content-type", FORM_CONTENT_TYPE)
            .with_body(request.to_body());
        if let Some(cookie) = session.and_then(Session::cookie_header) {
            rest = rest.with_header("cookie", cookie);
        }
        if let Some(timeout) = self.timeout {
            rest = rest.with_timeout(timeout);
        }
        rest
    }

    /// POSTs the request and returns the reply whatever its status.
    pub async fn post(
        &self,
        request: &ApiRequest,
        session: Option<&Session>,
    ) -> ApiResult<RestResponse> {
        debug!(
            action = request.action(),
            endpoint = %self.endpoint,
            authenticated = session.is_some(),
            "posting to API"
        );
        let response = self.client.execute(self.build(request, session)).await?;
        debug!(
            action = request.action(),
            status = response.status(),
            bytes = response.body().len(),
            elapsed_ms = response.elapsed.as_millis() as u64,
            "API replied"
        );
        Ok(response)
    }

    /// POSTs the request and returns the raw JSON text of a 2xx reply.
    pub async fn call(&self, request: &ApiRequest, session: Option<&Session>) -> ApiResult<String> {
        let response = self.post(request, session).await?.error_for_status()?;
        Ok(response.text().into_owned())
    }

    pub async fn get_profile(
        &self,
        query: &ProfileQuery,
        session: Option<&Session>,
    ) -> ApiResult<String> {
        self.profile_call(ACTION_GET_PROFILE, query, session).await
    }

    pub async fn get_person(
        &self,
        query: &ProfileQuery,
        session: Option<&Session>,
    ) -> ApiResult<String> {
        self.profile_call(ACTION_GET_PERSON, query, session).await
    }

    /// `getProfile`/`getPerson`, or any other action taking the same parameters.
    pub async fn profile_call(
        &self,
        action: &str,
        query: &ProfileQuery,
        session: Option<&Session>,
    ) -> ApiResult<String> {
        if query.key.is_empty() {
            warn!(action, "no key given; sending the request anyway");
        }
        self.call(&query.to_request(action), session).await
    }

    pub async fn get_bio(
        &self,
        key: &str,
        bio_format: Option<&str>,
        session: Option<&Session>,
    ) -> ApiResult<String> {
        self.call(&ApiRequest::get_bio(key, bio_format), session).await
    }

    pub async fn get_ancestors(
        &self,
        key: &str,
        depth: u32,
        session: Option<&Session>,
    ) -> ApiResult<String> {
        self.call(&ApiRequest::get_ancestors(key, depth), session)
            .await
    }

    pub async fn get_descendants(
        &self,
        key: &str,
        depth: u32,
        session: Option<&Session>,
    ) -> ApiResult<String> {
        self.call(&ApiRequest::get_descendants(key, depth), session)
            .await
    }

    /// Exchanges an authcode for a logged-in session.
    pub async fn client_login(&self, authcode: &str) -> ApiResult<Session> {
        self.confirm_authcode(authcode, Session::default()).await
    }

    /// Two-step member login: credentials → 302 with authcode → confirmation.
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<Session> {
        let response = self
            .post(&ApiRequest::client_login(email, password), None)
            .await?;
        if response.status() != 302 {
            return Err(ApiError::Login(format!(
                "expected a 302 redirect from clientLogin, got status {}",
                response.status()
            )));
        }
        let location = response
            .header("location")
            .ok_or_else(|| ApiError::Login("redirect carried no Location header".to_string()))?;
        let authcode = extract_authcode(location)
            .ok_or_else(|| ApiError::Login("redirect carried no authcode".to_string()))?;

        let mut pending = Session::default();
        for cookie in response.header_values("set-cookie") {
            pending.absorb_set_cookie(cookie);
        }
        self.confirm_authcode(authcode, pending).await
    }

    async fn confirm_authcode(&self, authcode: &str, mut session: Session) -> ApiResult<Session> {
        let response = self
            .post(&ApiRequest::confirm_authcode(authcode), Some(&session))
            .await?
            .error_for_status()?;
        for cookie in response.header_values("set-cookie") {
            session.absorb_set_cookie(cookie);
        }

        let reply: ClientLoginReply = response.json().map_err(|err| {
            ApiError::Login(format!("unexpected authcode confirmation reply: {}", err.message))
        })?;
        let result = reply.client_login;
        if result.result != LOGIN_SUCCESS {
            warn!(result = %result.result, "authcode confirmation failed");
            return Err(ApiError::Login(format!(
                "authcode confirmation returned {:?}",
                result.result
            )));
        }
        session.user_name = result.username.unwrap_or_default();
        session.user_id = result.userid.unwrap_or_default();
        info!(user = %session.user_name, id = session.user_id, "logged in to API");
        Ok(session)
    }
}

fn extract_authcode(location: &str) -> Option<&str> {
    let start = location.find(AUTHCODE_MARKER)? + AUTHCODE_MARKER.len();
    let code = &location[start..];
    let code = code.split('&').next().unwrap_or(code);
    (!code.is_empty()).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authcode_is_taken_from_location_query() {
        assert_eq!(
            extract_authcode("https://apps.example.com/back?x=1&authcode=abc123"),
            Some("abc123")
        );
        assert_eq!(
            extract_authcode("https://apps.example.com/?authcode=abc&next=2"),
            Some("abc")
        );
        assert_eq!(extract_authcode("https://apps.example.com/?authcode="), None);
        assert_eq!(extract_authcode("https://apps.example.com/"), None);
    }
}
