//! # Shred Demo
//!
//! Seals a file to a recipient's public key, ships the chunks as bincode
//! envelopes in scrambled order, and reassembles them with the recipient's
//! passphrase-locked private key.
//!
//! ## Run
//!
//! ```bash
//! RUST_LOG=shredder_core=debug cargo run --example shred_demo
//! ```

use rand::seq::SliceRandom;
use shredder_core::crypto::KeyPair;
use shredder_core::{reassemble, split_file, ChunkEnvelope, Chunks, Options};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shredder_core=info".into()),
        )
        .init();

    println!("=== Shredder Core: Sealed File Demo ===\n");

    // Step 1: Recipient creates a keypair and locks the private half
    println!("Step 1: Creating the recipient keypair...");
    let recipient = KeyPair::generate();
    let locked = recipient
        .lock(b"correct horse battery staple")
        .expect("Failed to lock private key");
    println!("  Public key fingerprint: {}", recipient.public_key().fingerprint());
    println!("  Locked private key: {} bytes", locked.to_bytes().len());
    println!();

    // Step 2: Sender shreds the file to the public key
    println!("Step 2: Shredding report.txt into 64-byte chunks...");
    let contents = "Quarterly numbers are up. Do not forward. ".repeat(8);
    let seal = Options::default()
        .with_chunk_size(64)
        .with_public_key(recipient.public_key().to_bytes().to_vec());
    let chunks = split_file("report.txt", contents.as_bytes(), &seal).expect("Failed to shred");
    println!("  Identifier: {}", chunks[0].context().identifier());
    println!("  Chunks: {}", chunks.len());
    println!();

    // Step 3: Chunks travel as envelopes, arriving out of order
    println!("Step 3: Transporting chunks out of order...");
    let mut wire: Vec<Vec<u8>> = chunks
        .to_envelopes()
        .iter()
        .map(|e| e.to_bincode().expect("Failed to encode envelope"))
        .collect();
    wire.shuffle(&mut rand::thread_rng());

    let received = wire
        .iter()
        .map(|bytes| ChunkEnvelope::from_bincode(bytes))
        .collect::<Result<Vec<_>, _>>()
        .expect("Failed to decode envelope");
    let order: Vec<u32> = received.iter().map(|e| e.offset).collect();
    println!("  Arrival order: {:?}", order);
    let received = Chunks::from_envelopes(received).expect("Failed to rebuild chunks");
    println!();

    // Step 4: Recipient reassembles with the locked key and passphrase
    println!("Step 4: Reassembling...");
    let open = Options::default()
        .with_chunk_size(64)
        .with_private_key(locked.to_bytes(), "correct horse battery staple");
    let context = reassemble(&received, &open).expect("Failed to reassemble");
    let (filename, bytes) = context.file().expect("Not a file context");
    println!("  Filename: {}", filename);
    println!("  Bytes: {}", bytes.len());
    println!("  Matches original: {}", bytes == contents.as_bytes());
    println!();

    // Step 5: A wrong passphrase is refused
    println!("Step 5: Trying a wrong passphrase...");
    let wrong = Options::default()
        .with_chunk_size(64)
        .with_private_key(locked.to_bytes(), "tr0ub4dor&3");
    match reassemble(&received, &wrong) {
        Ok(_) => println!("  Unexpectedly succeeded"),
        Err(e) => println!("  Refused (code {}): {}", e.code(), e),
    }

    println!("\n=== Demo Complete ===");
}
