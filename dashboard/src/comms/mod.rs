//! Everything that crosses a process boundary: the gRPC gateway towards the
//! agent, the display-facing data model, and the local bridge that serves
//! display surfaces.

pub mod bridge;
pub mod events;
pub mod grpc;
pub mod transport;
