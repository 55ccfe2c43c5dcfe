//! Process metadata shared by the host adapters.

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Name of the local machine, resolved once per process.
///
/// Returns `None` when the platform lookup fails or yields an empty name.
pub fn hostname() -> Option<&'static str> {
    static HOSTNAME: OnceLock<Option<String>> = OnceLock::new();
    HOSTNAME
        .get_or_init(|| {
            hostname::get()
                .ok()
                .map(|name| name.to_string_lossy().trim().to_owned())
                .filter(|name| !name.is_empty())
        })
        .as_deref()
}

pub fn pid() -> u32 {
    std::process::id()
}

/// Milliseconds since the Unix epoch, or zero if the clock is before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Whether `target` names a module of this crate.
pub fn is_internal_target(target: &str) -> bool {
    const CRATE: &str = env!("CARGO_CRATE_NAME");
    target
        .strip_prefix(CRATE)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Whether a record must not be fed back into the transport.
///
/// Covers this crate's own targets and everything logged on the transport's
/// worker threads, which includes the HTTP stack (`ureq`, `native_tls`)
/// whose lines carry the request URL and its API key.
pub fn is_transport_record(target: &str) -> bool {
    is_internal_target(target) || crate::transport::on_transport_thread()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("appsignal_transport", true)]
    #[case("appsignal_transport::transport::delivery", true)]
    #[case("appsignal_transport_ext", false)]
    #[case("my_app::db", false)]
    #[case("", false)]
    fn detects_internal_targets(#[case] target: &str, #[case] expected: bool) {
        assert_eq!(is_internal_target(target), expected);
    }

    #[test]
    fn now_millis_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn hostname_comes_from_the_platform() {
        let expected = hostname::get()
            .ok()
            .map(|name| name.to_string_lossy().trim().to_owned())
            .filter(|name| !name.is_empty());
        assert_eq!(hostname().map(str::to_owned), expected);
    }

    #[test]
    fn records_on_worker_threads_are_transport_records() {
        assert!(!is_transport_record("ureq::unit"));
        let on_worker = std::thread::spawn(|| {
            crate::transport::mark_transport_thread();
            is_transport_record("ureq::unit")
        })
        .join()
        .expect("thread completes");
        assert!(on_worker);
    }
}
