use npk_hardware::SimulatedOutput;
use npk_traits::DigitalOutput;
use rstest::rstest;

#[rstest]
#[case(true)]
#[case(false)]
fn set_level_matches_request(#[case] high: bool) {
    let mut out = SimulatedOutput::new("npk");
    let probe = out.clone();
    out.set_level(!high).expect("write");
    out.set_level(high).expect("write");
    assert_eq!(probe.is_high(), high);
}

#[cfg(not(feature = "hardware"))]
#[test]
fn open_output_falls_back_to_simulation() {
    let mut out = npk_hardware::open_output(17, "NPK_1").expect("open simulated output");
    out.set_high().expect("write high");
    out.set_low().expect("write low");
}
