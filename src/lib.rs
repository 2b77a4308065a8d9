//! Client for the WikiTree profile API: build a request, POST it, render the reply.
//!
//! The HTTP layer is a thin reqwest wrapper with an in-memory mock transport
//! for fully deterministic tests.

pub mod adapter;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod mock;
pub mod render;
pub mod request;
pub mod session;
pub mod wait;

pub use reqwest::Method;

pub use adapter::{
    Client, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture, RestRequest, RestResponse,
    RestResult, RestTransport, RestTransportState,
};
pub use api::{API_URL, WikiTreeClient};
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use mock::{
    MockBehavior, MockBehaviorPlan, MockResponse, MockRestAdapter, MockRestStateSnapshot,
};
pub use request::{ApiRequest, ParamValue, ProfileQuery};
pub use session::{Session, SessionStore};
pub use wait::{DEFAULT_POLL_INTERVAL, WaitTimeout, wait_for};
