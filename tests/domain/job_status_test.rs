use harstad::domain::JobStatus;

#[test]
fn given_status_when_rendering_then_parsing_roundtrips() {
    for status in [
        JobStatus::Queued,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Degraded,
        JobStatus::Failed,
    ] {
        assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
    }
}

#[test]
fn given_unknown_text_when_parsing_then_rejected() {
    assert!("DONE".parse::<JobStatus>().is_err());
}

#[test]
fn given_each_status_when_checking_terminal_then_only_end_states_are_terminal() {
    assert!(!JobStatus::Queued.is_terminal());
    assert!(!JobStatus::Processing.is_terminal());
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Degraded.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
}
