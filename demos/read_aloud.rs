use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tts_reader::{speech::SimulatedPlatform, ContentBlock, Reader, ReaderConfig};

/// Usage: `read_aloud [blocks.json] [config.json]`
///
/// `blocks.json` holds an array of `{"text": ..., "tag": ..., "depth": ...}`.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let blocks = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(PathBuf::from(path))?;
            serde_json::from_str::<Vec<ContentBlock>>(&json)?
                .into_iter()
                .map(|b| ContentBlock::new(&b.text, &b.tag, b.depth))
                .collect()
        }
        None => sample_blocks(),
    };
    let config = match args.next() {
        Some(path) => ReaderConfig::from_json_file(&PathBuf::from(path))?,
        None => ReaderConfig::default(),
    };

    let platform = Arc::new(SimulatedPlatform::new().words_per_minute(400.0));
    let reader = Arc::new(Reader::with_config(platform, config));
    reader.speech().refresh_voices();
    println!("Available voices: {:?}", reader.voices());
    println!("Using voice: {:?}", reader.voice_uri());

    reader.set_contents(blocks);
    {
        let len = reader.len();
        reader.on_change(move |index| match index {
            Some(i) => println!("Position {} / {len}", i + 1),
            None => println!("Position 0 / 0"),
        });
    }

    let start = Instant::now();
    reader.read_on().await?;
    println!("Read {} blocks in {:.2?}", reader.len(), start.elapsed());

    Ok(())
}

fn sample_blocks() -> Vec<ContentBlock> {
    vec![
        ContentBlock::new("A Short Guide to Reading Aloud", "h1", 0),
        ContentBlock::new("Why listen?", "h2", 1),
        ContentBlock::new(
            "Listening to a document frees your eyes\n   while keeping your place.",
            "p",
            2,
        ),
        ContentBlock::new("Getting around", "h3", 1),
        ContentBlock::new(
            "Use next and previous to skip between blocks, and stop to pause.",
            "p",
            2,
        ),
    ]
}
