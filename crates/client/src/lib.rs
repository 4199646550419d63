//! Client code for vidshell.
//!
//! This crate provides the network layer, request classification and the
//! offline cache worker that ties them to the cache stores of `vidshell-core`.

pub mod fetch;
pub mod router;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network, Request, Response};
pub use reqwest::Method;
pub use router::{RequestClass, RequestRouter};
pub use worker::{
    ActivateReport, CacheManager, ClickOutcome, ClientInfo, EventOutcome, FetchOutcome, InstallReport,
    LifecycleEvent, Notification, NotificationClick, Platform, PushOutcome, ResponseSource, SyncReport, WaitUntil,
    WorkerState,
};
