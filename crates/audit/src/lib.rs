//! `craftlens-audit` — append-only activity log.
//!
//! Audit writes are fire-and-forget: a failed write is logged and swallowed
//! so it can never fail the request that triggered it.

pub mod log;

pub use log::{
    ActivityAction, ActivityActionType, ActivityLog, ActivityLogStore, ActivityStatus,
    ActorSnapshot, MIN_PURGE_AGE_DAYS, NewActivity, RequestContext, TargetModel, TargetRef,
    log_activity,
};
