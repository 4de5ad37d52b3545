// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Wire contract shared between the SentinelGuard agent and the dashboard
// host.  The protobuf messages are maintained directly in prost derive form
// so the crate builds without a protoc toolchain; the field tags ARE the
// wire format and must stay in sync with the agent's `sentinelguard.proto`.

pub mod sentinelguard;
