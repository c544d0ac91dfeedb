mod common;

use mtp_core::debug;
use mtp_core::mtp_entities::MtpEntity;
use mtp_entities::mtp2::Mtp2State;
use mtp_saps::l2::{Mtp2Prim, OutOfServiceCause};
use mtp_saps::l3::L3Ind;
use common::{ComponentTest, LinkPair, default_test_config};

#[test]
fn test_alignment_over_loopback() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    assert_eq!(pair.a.status_indications(), vec![L3Ind::InService]);
    assert_eq!(pair.b.status_indications(), vec![L3Ind::InService]);
    assert!(pair.a.config.state_read().link_in_service);
    assert!(pair.b.config.state_read().link_in_service);

    // Emergency proving takes 0.5 s at 64 kbit/s
    assert!(pair.a.now().bits >= 32000);

    // The link stays up on a clean line
    pair.run_rounds(500);
    assert_eq!(pair.a.status_indications(), vec![L3Ind::InService]);
    assert_eq!(pair.b.status_indications(), vec![L3Ind::InService]);
}

#[test]
fn test_alignment_timeout_on_idle_line() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new(default_test_config("idle"));
    test.populate_entities(vec![MtpEntity::Phy, MtpEntity::Mtp2, MtpEntity::Mtp3], vec![MtpEntity::User]);

    test.send_control(Mtp2Prim::Start);
    test.run_stack(Some(1));
    assert_eq!(test.mtp2().link().state(), Mtp2State::NotAligned);

    // T2 is 11.5 s, 64 bits per tick
    let t2 = test.mtp2().link().timer_profile().t2 as usize;
    test.run_stack(Some(t2 / 64 + 2));
    assert_eq!(test.status_indications(), vec![L3Ind::OutOfService(OutOfServiceCause::AlignmentTimeout)]);
    assert_eq!(test.mtp2().link().state(), Mtp2State::OutOfService);

    // No further report without a new start
    test.run_stack(Some(100));
    assert_eq!(test.status_indications().len(), 1);
}

#[test]
fn test_remote_stop() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    pair.b.send_control(Mtp2Prim::Stop);
    let down = pair.run_until(100, |p| p.a.status_indications().len() == 2);
    assert!(down);

    assert_eq!(
        pair.a.status_indications(),
        vec![L3Ind::InService, L3Ind::OutOfService(OutOfServiceCause::LinkFailureRemote)]
    );
    // A local stop is not reported back
    assert_eq!(pair.b.status_indications(), vec![L3Ind::InService]);
    assert!(!pair.a.config.state_read().link_in_service);
}

#[test]
fn test_jammed_line_fails_once() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    pair.line_b.set_jam(true);
    pair.run_rounds(300);

    assert_eq!(
        pair.b.status_indications(),
        vec![L3Ind::InService, L3Ind::OutOfService(OutOfServiceCause::LinkFailureLocal)]
    );
    assert_eq!(
        pair.a.status_indications(),
        vec![L3Ind::InService, L3Ind::OutOfService(OutOfServiceCause::LinkFailureRemote)]
    );
    assert!(pair.b.mtp2().link().retransmit_buffer().is_empty());
}

#[test]
fn test_realign_after_failure() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    pair.line_b.set_jam(true);
    pair.run_rounds(100);
    pair.line_b.set_jam(false);
    assert_eq!(pair.b.mtp2().link().state(), Mtp2State::OutOfService);

    // Both ends must be started again
    pair.start();
    let up = pair.run_until(2000, |p| {
        p.a.status_indications().len() == 3 && p.b.status_indications().len() == 3
    });
    assert!(up);
    assert_eq!(pair.a.status_indications()[2], L3Ind::InService);
    assert_eq!(pair.b.status_indications()[2], L3Ind::InService);
}

#[test]
fn test_processor_outage() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    pair.a.send_control(Mtp2Prim::LocalProcessorOutage);
    let reported = pair.run_until(50, |p| p.b.status_indications().len() == 2);
    assert!(reported);
    assert_eq!(pair.b.status_indications()[1], L3Ind::RemoteProcessorOutage);
    assert!(pair.b.config.state_read().remote_processor_outage);
    assert_eq!(pair.a.mtp2().link().state(), Mtp2State::ProcessorOutage);
    assert_eq!(pair.b.mtp2().link().state(), Mtp2State::ProcessorOutage);

    pair.a.send_control(Mtp2Prim::LocalProcessorRecovered);
    let recovered = pair.run_until(50, |p| p.b.status_indications().len() == 3);
    assert!(recovered);
    assert_eq!(pair.b.status_indications()[2], L3Ind::RemoteProcessorRecovered);
    assert!(!pair.b.config.state_read().remote_processor_outage);
    assert_eq!(pair.a.mtp2().link().state(), Mtp2State::InService);
    assert_eq!(pair.b.mtp2().link().state(), Mtp2State::InService);

    // The end that had the local outage reports nothing
    assert_eq!(pair.a.status_indications(), vec![L3Ind::InService]);
}
