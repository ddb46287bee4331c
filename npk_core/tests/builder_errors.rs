use npk_core::BuildError;
use npk_core::PumpController;
use npk_core::mocks::{RecordingPublisher, SpyOutput};

#[test]
fn build_requires_publisher() {
    let err = PumpController::builder()
        .with_channel("NPK_1", "a", SpyOutput::new())
        .with_channel("NPK_2", "b", SpyOutput::new())
        .build()
        .expect_err("publisher missing");
    assert_eq!(
        err.downcast_ref::<BuildError>(),
        Some(&BuildError::MissingPublisher)
    );
}

#[test]
fn build_requires_two_channels() {
    let err = PumpController::builder()
        .with_channel("NPK_1", "a", SpyOutput::new())
        .with_publisher(RecordingPublisher::new())
        .build()
        .expect_err("one channel");
    assert_eq!(
        err.downcast_ref::<BuildError>(),
        Some(&BuildError::ChannelCount {
            expected: 2,
            got: 1
        })
    );
}

#[test]
fn build_rejects_duplicate_ids() {
    let err = PumpController::builder()
        .with_channel("NPK_1", "a", SpyOutput::new())
        .with_channel("NPK_1", "b", SpyOutput::new())
        .with_publisher(RecordingPublisher::new())
        .build()
        .expect_err("duplicate");
    assert_eq!(
        err.downcast_ref::<BuildError>(),
        Some(&BuildError::DuplicateChannel("NPK_1".into()))
    );
}

#[test]
fn relay_write_failure_fails_build() {
    let relay = SpyOutput::new();
    relay.set_failing(true);
    let res = PumpController::builder()
        .with_channel("NPK_1", "a", SpyOutput::new())
        .with_channel("NPK_2", "b", SpyOutput::new())
        .with_relay(relay)
        .with_publisher(RecordingPublisher::new())
        .build();
    assert!(res.is_err());
}
