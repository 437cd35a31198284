use mc_pi::{available_parallelism, default_thread_count, sample_default, set_thread_count};

// Kept in a single test: the default thread count is process-wide state.
#[test]
fn default_thread_count_round_trip() {
    assert!(available_parallelism() >= 1);
    assert_eq!(default_thread_count(), available_parallelism());

    set_thread_count(3).unwrap();
    assert_eq!(default_thread_count(), 3);
    assert_eq!(sample_default(1001).unwrap().len(), 1001);

    assert!(set_thread_count(0).unwrap_err().is_invalid_argument());
    assert_eq!(default_thread_count(), 3);
}
