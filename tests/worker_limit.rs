use mc_pi::capacity::worker_limit;
use mc_pi::{BatchSampler, PooledSampler, Sampler, WorkerRng, MAX_THREADS_ENV};

// The limit is read once per process, so this binary holds a single test
// that sets it before the first sampling call.
#[test]
fn env_limit_caps_workers_per_call() {
    std::env::set_var(MAX_THREADS_ENV, "2");
    assert_eq!(worker_limit(), Some(2));

    let seed = 17;
    let batch_size = 10_001;
    let capped = Sampler::new().with_seed(seed).sample(batch_size, 8).unwrap();
    let explicit = Sampler::new().with_seed(seed).sample(batch_size, 2).unwrap();
    assert_eq!(capped.len(), batch_size);
    assert_eq!(capped, explicit);

    // Two shares: worker 0 fills the first 5001 points, worker 1 the rest.
    let mut stream0 = WorkerRng::new(seed, 0);
    let mut stream1 = WorkerRng::new(seed, 1);
    for p in &capped.points()[..5001] {
        assert_eq!(*p, stream0.next_point());
    }
    for p in &capped.points()[5001..] {
        assert_eq!(*p, stream1.next_point());
    }

    let pooled = PooledSampler::new(4).unwrap().with_seed(seed);
    assert_eq!(pooled.sample(batch_size, 8).unwrap(), explicit);
}
