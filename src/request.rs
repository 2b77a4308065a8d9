//! Flat `action` + parameter bodies for the API endpoint.
//!
//! Nothing here validates values; whatever the caller supplies is forwarded
//! and the service decides what is acceptable.

use std::fmt;

use bytes::Bytes;

pub const ACTION_GET_PROFILE: &str = "getProfile";
pub const ACTION_GET_PERSON: &str = "getPerson";
pub const ACTION_GET_BIO: &str = "getBio";
pub const ACTION_GET_ANCESTORS: &str = "getAncestors";
pub const ACTION_GET_DESCENDANTS: &str = "getDescendants";
pub const ACTION_CLIENT_LOGIN: &str = "clientLogin";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Number(i64),
    Flag(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
            Self::Flag(true) => f.write_str("1"),
            Self::Flag(false) => f.write_str("0"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// One API operation: the action name plus its parameters in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    action: String,
    params: Vec<(String, ParamValue)>,
}

impl ApiRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Vec::new(),
        }
    }

    /// Sets `name`, replacing any earlier value under the same name.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn param_opt<V: Into<ParamValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Sets `name` only when `value` is not empty.
    pub fn param_non_empty(self, name: impl Into<String>, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.param(name, value)
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// `action` first, then parameters, all rendered as strings.
    pub fn fields(&self) -> Vec<(&str, String)> {
        let mut fields = Vec::with_capacity(self.params.len() + 1);
        fields.push(("action", self.action.clone()));
        fields.extend(
            self.params
                .iter()
                .map(|(key, value)| (key.as_str(), value.to_string())),
        );
        fields
    }

    pub fn encode(&self) -> String {
        self.fields()
            .into_iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn to_body(&self) -> Bytes {
        Bytes::from(self.encode())
    }

    pub fn get_bio(key: impl Into<ParamValue>, bio_format: Option<&str>) -> Self {
        Self::new(ACTION_GET_BIO)
            .param("key", key)
            .param("resolveRedirect", true)
            .param_opt("bioFormat", bio_format)
    }

    pub fn get_ancestors(key: impl Into<ParamValue>, depth: u32) -> Self {
        Self::new(ACTION_GET_ANCESTORS)
            .param("key", key)
            .param("depth", depth)
            .param("resolveRedirect", true)
    }

    pub fn get_descendants(key: impl Into<ParamValue>, depth: u32) -> Self {
        Self::new(ACTION_GET_DESCENDANTS)
            .param("key", key)
            .param("depth", depth)
            .param("resolveRedirect", true)
    }

    /// First login step: member credentials, answered with a redirect
    /// carrying the authcode.
    pub fn client_login(email: &str, password: &str) -> Self {
        Self::new(ACTION_CLIENT_LOGIN)
            .param("doLogin", true)
            .param("wpEmail", email)
            .param("wpPassword", password)
    }

    pub fn confirm_authcode(authcode: &str) -> Self {
        Self::new(ACTION_CLIENT_LOGIN).param("authcode", authcode)
    }
}

/// Parameters shared by `getProfile` and `getPerson`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileQuery {
    pub key: String,
    pub fields: String,
    pub bio_format: String,
    pub resolve_redirect: bool,
}

impl ProfileQuery {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = fields.into();
        self
    }

    pub fn bio_format(mut self, bio_format: impl Into<String>) -> Self {
        self.bio_format = bio_format.into();
        self
    }

    pub fn resolve_redirect(mut self, resolve: bool) -> Self {
        self.resolve_redirect = resolve;
        self
    }

    /// The key is always sent, even when empty.
    pub fn to_request(&self, action: &str) -> ApiRequest {
        ApiRequest::new(action)
            .param("key", &self.key)
            .param_non_empty("fields", &self.fields)
            .param_non_empty("bioFormat", &self.bio_format)
            .param("resolveRedirect", self.resolve_redirect)
    }
}
