//! Shared HTTP plumbing for the Gmail and summary clients
//!
//! Both clients use a synchronous `ureq` agent so the flow stays
//! executor-agnostic. Status codes are inspected by the callers, so the agent
//! never turns them into errors itself.

use std::time::Duration;

use ureq::Agent;
use ureq::http::Response;

use crate::error::{FlowError, FlowResult};

/// Build an agent whose connect, send and receive phases are each bounded by `timeout`
pub(crate) fn agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_connect(Some(timeout))
        .timeout_send_request(Some(timeout))
        .timeout_send_body(Some(timeout))
        .timeout_recv_response(Some(timeout))
        .timeout_recv_body(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Map a transport-level `ureq` failure to a [`FlowError::Network`]
pub(crate) fn transport_error(action: &str, e: ureq::Error) -> FlowError {
    match e {
        ureq::Error::Timeout(_) => FlowError::Network(format!("{} timed out", action)),
        other => FlowError::Network(format!("{} failed: {}", action, other)),
    }
}

/// Resolve a call into its status code and body text
pub(crate) fn read_response(
    result: Result<Response<ureq::Body>, ureq::Error>,
    action: &str,
) -> FlowResult<(u16, String)> {
    let mut response = result.map_err(|e| transport_error(action, e))?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| transport_error(action, e))?;
    Ok((status, body))
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
