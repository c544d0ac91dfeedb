mod common;

use mtp_core::debug;
use mtp_saps::l3::L3Ind;
use common::LinkPair;

fn payload(i: usize) -> Vec<u8> {
    vec![i as u8, 0x55, 0xaa, (i >> 8) as u8, 0x0f]
}

fn expected(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(payload).collect()
}

#[test]
fn test_message_transfer() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    for i in 0..5 {
        pair.a.send_transfer(3, payload(i));
    }
    let done = pair.run_until(200, |p| p.b.received_data().len() == 5);
    assert!(done);
    assert_eq!(pair.b.received_data(), expected(5));

    let slcs: Vec<u8> = pair
        .b
        .user_indications()
        .iter()
        .filter_map(|ind| match ind {
            L3Ind::Transfer { slc, sio, .. } => {
                assert_eq!(*sio, 0xcd);
                Some(*slc)
            }
            _ => None,
        })
        .collect();
    assert_eq!(slcs, vec![3; 5]);

    // Acknowledgements drain the retransmission buffer
    pair.run_rounds(20);
    assert!(pair.a.mtp2().link().retransmit_buffer().is_empty());
    assert!(pair.a.received_data().is_empty());
}

#[test]
fn test_transfer_both_directions() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    for i in 0..20 {
        pair.a.send_transfer(1, payload(i));
        pair.b.send_transfer(2, payload(100 + i));
    }
    let done = pair.run_until(500, |p| p.a.received_data().len() == 20 && p.b.received_data().len() == 20);
    assert!(done);
    assert_eq!(pair.b.received_data(), expected(20));
    assert_eq!(pair.a.received_data(), (100..120).map(payload).collect::<Vec<_>>());
}

#[test]
fn test_nack_recovery() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    for i in 0..10 {
        pair.a.send_transfer(0, payload(i));
    }
    // Destroy one of the first messages on its way to b
    pair.line_b.corrupt_nth_block(4);

    let done = pair.run_until(500, |p| p.b.received_data().len() >= 10);
    assert!(done);
    pair.run_rounds(20);

    // Every message exactly once, in order
    assert_eq!(pair.b.received_data(), expected(10));
    assert!(pair.a.mtp2().link().retransmit_buffer().is_empty());
    assert_eq!(pair.b.status_indications(), vec![L3Ind::InService]);
}

#[test]
fn test_noisy_line() {
    debug::setup_logging_verbose();
    let mut pair = LinkPair::new();
    pair.bring_up();

    pair.line_a.set_ber_ppm(200);
    pair.line_b.set_ber_ppm(200);
    for i in 0..40 {
        pair.a.send_transfer(0, payload(i));
    }
    pair.run_rounds(300);

    // A message sent on a clean line exposes any gap left at the tail
    pair.line_a.set_ber_ppm(0);
    pair.line_b.set_ber_ppm(0);
    pair.a.send_transfer(0, payload(40));

    let done = pair.run_until(1000, |p| p.b.received_data().len() >= 41);
    assert!(done, "received {} of 41", pair.b.received_data().len());
    pair.run_rounds(20);

    assert_eq!(pair.b.received_data(), expected(41));
    assert_eq!(pair.a.status_indications(), vec![L3Ind::InService]);
    assert_eq!(pair.b.status_indications(), vec![L3Ind::InService]);
}
