//! Request lifecycle state
//!
//! A mutation request moves through a single phase enum:
//!
//! ```text
//! Uninitialized ──► Pending ──┬──► Succeeded(result)
//!                             └──► Failed(error)
//! ```
//!
//! Boolean views are derived from the phase, so they can never contradict
//! each other.

use serde::Serialize;

/// Current phase of one request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPhase<T, E> {
    Uninitialized,
    Pending,
    Succeeded(T),
    Failed(E),
}

/// Lifecycle state of one request, with derived flags
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T, E> {
    phase: RequestPhase<T, E>,
}

impl<T, E> Default for RequestState<T, E> {
    fn default() -> Self {
        Self {
            phase: RequestPhase::Uninitialized,
        }
    }
}

impl<T, E> RequestState<T, E> {
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn pending() -> Self {
        Self {
            phase: RequestPhase::Pending,
        }
    }

    pub fn succeeded(result: T) -> Self {
        Self {
            phase: RequestPhase::Succeeded(result),
        }
    }

    pub fn failed(error: E) -> Self {
        Self {
            phase: RequestPhase::Failed(error),
        }
    }

    pub fn phase(&self) -> &RequestPhase<T, E> {
        &self.phase
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self.phase, RequestPhase::Uninitialized)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, RequestPhase::Pending)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.phase, RequestPhase::Failed(_))
    }

    /// Not uninitialized, not pending and not failed
    pub fn is_success(&self) -> bool {
        !self.is_uninitialized() && !self.is_pending() && !self.is_error()
    }

    pub fn result(&self) -> Option<&T> {
        match &self.phase {
            RequestPhase::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match &self.phase {
            RequestPhase::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl<T, E> From<RequestPhase<T, E>> for RequestState<T, E> {
    fn from(phase: RequestPhase<T, E>) -> Self {
        Self { phase }
    }
}

/// Aggregate status of several independent requests.
///
/// Unlike [`RequestState`] several flags may be set at once, e.g. a mix of
/// succeeded and failed requests reports both `is_success` and `is_error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedRequestState<T, E> {
    pub is_uninitialized: bool,
    pub is_pending: bool,
    pub is_success: bool,
    pub is_error: bool,
    pub result: Option<T>,
    pub error: Option<E>,
}

/// Combine request states with the permissive policy used by optimistic callers:
///
/// - `is_uninitialized`: all inputs uninitialized
/// - `is_pending`: any input pending
/// - `is_error`: any input failed
/// - `is_success`: any input succeeded
/// - `result` / `error`: first found, in input order
pub fn combine<T: Clone, E: Clone>(states: &[RequestState<T, E>]) -> CombinedRequestState<T, E> {
    CombinedRequestState {
        is_uninitialized: states.iter().all(RequestState::is_uninitialized),
        is_pending: states.iter().any(RequestState::is_pending),
        is_success: states.iter().any(RequestState::is_success),
        is_error: states.iter().any(RequestState::is_error),
        result: states.iter().find_map(RequestState::result).cloned(),
        error: states.iter().find_map(RequestState::error).cloned(),
    }
}

/// Combine request states, reporting success only when every input succeeded.
///
/// An empty input is not a success.
pub fn combine_strict<T: Clone, E: Clone>(
    states: &[RequestState<T, E>],
) -> CombinedRequestState<T, E> {
    let permissive = combine(states);
    CombinedRequestState {
        is_success: !states.is_empty() && states.iter().all(RequestState::is_success),
        ..permissive
    }
}
