//! Render a conversation with a resolved chat template.
//!
//! ```bash
//! RUST_LOG=chatfmt=debug cargo run --example render_prompt -- meta-llama/Llama-2-7b-chat-hf
//! ```

#![allow(clippy::print_stdout)]

use chatfmt::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "meta-llama/Llama-2-7b-chat-hf".to_owned());
    let model_id = std::env::args().nth(2);

    let messages = [
        Message::default_system(),
        Message::user("Hello!"),
        Message::assistant("Hi!"),
        Message::user("What can you do?"),
        Message::assistant("I can chat with you."),
    ];

    let template = chatfmt::resolve_template(&model_path, model_id.as_deref());
    let prompt = template.assemble(&messages)?;

    println!("template: {}", template.name());
    println!("stop:     {:?}", template.stop_str());
    println!("---\n{prompt}");

    Ok(())
}
