// SPDX-License-Identifier: MIT

//! oj-wire: the request/response/event DTOs `ojd`'s Unix-socket listener
//! speaks (spec.md §6 Observer Interface, serialized for a front-end other
//! than the in-process orchestrator). Wire format: a 4-byte big-endian
//! length prefix followed by a JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod event;
mod request;
mod response;
mod wire;

pub use event::WireEvent;
pub use request::Request;
pub use response::{JobSummary, PlanStatus, Response};
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError};
