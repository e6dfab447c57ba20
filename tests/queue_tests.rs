use vpufreq::{DvfsError, Handle, dvfs::queue::JobQueue};

fn queue() -> JobQueue {
    JobQueue::new(Handle(7), 8)
}

#[test]
fn submit_dispatch_complete_drains_queue() {
    let mut queue = queue();
    queue.submit(1_000, 0, 546).expect("submit");
    assert_eq!(queue.len(), 1);
    assert!(queue.promote(1_100));

    let completed = queue.complete(5_000, 2_100).expect("complete");
    assert!(queue.is_empty());
    assert_eq!(completed.handle, Handle(7));
    assert_eq!(completed.submit_us, 1_000);
    assert_eq!(completed.start_us, 1_100);
    assert_eq!(completed.end_us, 2_100);
    assert_eq!(completed.cycles, 5_000);
    assert_eq!(completed.sw_time_us, 100);
    assert_eq!(completed.estimate_mhz, 546);
}

#[test]
fn promote_on_empty_queue_reports_not_found() {
    let mut queue = queue();
    assert!(!queue.promote(0));
}

#[test]
fn promote_skips_already_dispatched_job() {
    let mut queue = queue();
    queue.submit(10, 0, 546).expect("submit");
    assert!(queue.promote(20));
    // The only job is already at the head; nothing left to promote.
    assert!(!queue.promote(30));
}

#[test]
fn promote_moves_waiting_job_ahead_of_completed_order() {
    let mut queue = queue();
    queue.submit(10, 0, 546).expect("first");
    queue.submit(20, 10, 546).expect("second");
    assert!(queue.promote(30));

    let first = queue.complete(100, 40).expect("head completion");
    assert_eq!(first.submit_us, 10);
    let second = queue.complete(200, 50).expect("second completion");
    assert_eq!(second.submit_us, 20);
    // Never dispatched, so start falls back to the submit time.
    assert_eq!(second.start_us, 20);
    assert_eq!(second.submit_interval_us, 10);
}

#[test]
fn completion_without_submission_is_an_error() {
    let mut queue = queue();
    let err = queue.complete(100, 10).expect_err("stray completion");
    assert_eq!(err, DvfsError::StrayCompletion(Handle(7)));
}

#[test]
fn submissions_beyond_capacity_are_rejected() {
    let mut queue = JobQueue::new(Handle(1), 2);
    queue.submit(1, 0, 546).expect("first");
    queue.submit(2, 1, 546).expect("second");
    let err = queue.submit(3, 1, 546).expect_err("over capacity");
    assert_eq!(err, DvfsError::QueueFull(Handle(1)));
    assert_eq!(queue.len(), 2);
}
