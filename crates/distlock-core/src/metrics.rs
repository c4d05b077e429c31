//! Metric names for lock operations
//!
//! Published through the `metrics` facade; installing an exporter is left to the application

use metrics::{describe_counter, describe_gauge};

pub const ACQUIRE_TOTAL: &str = "distlock_acquire_total";
pub const CONTENTION_TOTAL: &str = "distlock_contention_total";
pub const ACQUIRE_ERRORS_TOTAL: &str = "distlock_acquire_errors_total";
pub const RENEWALS_TOTAL: &str = "distlock_renewals_total";
pub const RENEWAL_ERRORS_TOTAL: &str = "distlock_renewal_errors_total";
pub const RELEASE_TOTAL: &str = "distlock_release_total";
pub const LEASES_HELD: &str = "distlock_leases_held";

/// Register metric descriptions
/// Should be called once at application startup, after the recorder is installed
pub fn describe_metrics() {
    describe_counter!(ACQUIRE_TOTAL, "Total number of successful lock acquisitions");
    describe_counter!(
        CONTENTION_TOTAL,
        "Total number of acquisition attempts rejected because the lock was held"
    );
    describe_counter!(
        ACQUIRE_ERRORS_TOTAL,
        "Total number of acquisition attempts failed by a storage error"
    );
    describe_counter!(RENEWALS_TOTAL, "Total number of successful keepalive writes");
    describe_counter!(
        RENEWAL_ERRORS_TOTAL,
        "Total number of failed keepalive writes"
    );
    describe_counter!(RELEASE_TOTAL, "Total number of lease releases");
    describe_gauge!(LEASES_HELD, "Number of leases currently held by this process");
}
