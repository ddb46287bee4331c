#![no_main]
use libfuzzer_sys::fuzz_target;
use npk_core::Command;

fuzz_target!(|data: &str| {
    let cmd = Command::parse(data);
    let has_digit = data.bytes().any(|b| b.is_ascii_digit());
    assert_eq!(cmd == Command::Invalid, !has_digit);
    if let Command::Dose { seconds } = cmd {
        assert!(seconds > 0);
        assert!(npk_core::command::numeric_prefix(data) > 0);
    }
});
