#![no_main]

use libfuzzer_sys::fuzz_target;
use yaml_reader::{TokenType, Tokenizer};

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(data: &[u8]) {
    for token in Tokenizer::new(data) {
        match token {
            Ok(token) if token.token_type == TokenType::StreamEnd => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }
}
