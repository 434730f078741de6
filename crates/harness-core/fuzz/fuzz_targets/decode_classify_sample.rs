#![no_main]

use harness_core::{
    classify_address, Bus, InputPin, OutputSample, OutputSelector, PinBus, SpiWord, ADDRESS_MASK,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }

    let raw = u16::from_be_bytes([data[0], data[1]]);
    let addr = u16::from_be_bytes([data[2], data[3]]);
    let in_bus = data[4];

    // Raw-word decode is total and must round-trip exactly.
    let word = SpiWord::from_raw(raw);
    assert_eq!(word.to_raw(), raw);
    assert_eq!(word.address() & !ADDRESS_MASK, 0);
    assert_eq!(word.region(), classify_address(word.address()));

    // Classification is total over the masked address space.
    let region = classify_address(addr);
    assert!(region.contains(addr & ADDRESS_MASK));

    // Selector decode depends only on the low three input-bus bits.
    let selector = OutputSelector::from_in_bus(in_bus);
    assert_eq!(selector.as_u3(), in_bus & 0x7);

    let mut pins = PinBus::new();
    if in_bus & InputPin::Run.mask() != 0 {
        pins.set(InputPin::Run);
    }
    pins.write_selector(selector);
    pins.drive_out(data[0]);
    pins.drive_io(data[1]);

    let sample = OutputSample::capture(&pins);
    assert_eq!(sample.selector, selector);
    assert_eq!(sample.wide, pins.read(Bus::Output));
    assert_eq!(sample.sources(), selector.sources());
});
