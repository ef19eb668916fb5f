//! Scenario construction and resource accounting for large agent-based
//! simulations.
//!
//! A [`ScenarioBuilder`] (or the order-independent
//! [`UnstructuredScenarioBuilder`]) validates the initial state fact by fact
//! and freezes it into an immutable [`Scenario`]. At run start the scenario
//! seeds a [`ResourceLedger`], which mediates every later change to resource
//! levels and publishes [`LedgerEvent`]s to subscribed observers.

mod builder;
mod component;
mod data;
mod error;
mod events;
pub mod hashing;
mod ledger;
mod ledger_config;
mod random;
mod registry;
mod scenario;
mod unstructured;

pub use builder::ScenarioBuilder;
pub use component::{Component, ComponentSupplier};
pub use error::{LedgerError, ScenarioError};
pub use events::{CallbackPublisher, EventPublisher, LedgerEvent};
pub use ledger::ResourceLedger;
pub use ledger_config::{
    load_ledger_config_from_env, LedgerConfig, LedgerConfigError, BUILTIN_LEDGER_CONFIG,
    LEDGER_CONFIG_ENV,
};
pub use random::RandomStreams;
pub use registry::{ComponentRegistry, IdentifierRegistry};
pub use scenario::Scenario;
pub use unstructured::{ActionKind, RecordedAction, UnstructuredScenarioBuilder, REPLAY_ORDER};

pub use scenario_schema as schema;
