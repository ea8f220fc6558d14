pub mod test_session;

pub use recorder::{describe, Counter, Journal, Recorder, ADD_PROCEDURE};
pub use test_session::{TestParticipant, TestSession};

/// Routes `log` output through the test harness; safe to call from every test
pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}
