/// Card record and the id/amount types shared by the rest of the crate.
pub mod card;

/// Per-session facts: inserted card, pin validation, selected account.
pub mod session;

/// Card reader and bank capabilities the session depends on, plus in-memory
/// implementations of both.
pub mod service;

/// Session state machine. Checks every operation against [`session`] before
/// delegating to [`service`] collaborators.
pub mod controller;

/// Bootstraps a controller from CSV input. Lives here so the integration
/// test can drive it too.
pub mod bin_utils;
