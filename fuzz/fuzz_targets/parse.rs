#![no_main]

use libfuzzer_sys::fuzz_target;
use yaml_reader::Parser;

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(data: &[u8]) {
    let mut parser = Parser::new(data);
    while let Ok(true) = parser.read() {
        let _ = parser.try_get_scalar_as_f64();
        let _ = parser.is_null_scalar();
    }
}
