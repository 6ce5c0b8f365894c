//! Terminal FartBot. Type to chat; `/help` lists commands.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use fartbot_core::chat::{Chat, Message, Sender};
use fartbot_core::config::BotConfig;
use fartbot_core::dsp::output::AudioOutput;
use fartbot_core::dsp::renderer::encode_wav_from_mono;
use fartbot_core::error::FartBotError;

#[derive(Parser, Debug)]
#[command(name = "fartbot", version, about = "The winds of wisdom, in your terminal")]
struct Args {
    /// JSON config file (missing fields take defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start muted
    #[arg(long)]
    mute: bool,

    /// Seed replies and toot jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Capture audio to this WAV file instead of playing it
    #[arg(long)]
    wav: Option<PathBuf>,
}

const HELP: &str = "Commands: /presets, /<preset> (e.g. /puff), /mute, /unmute, /clear, /quit";

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("fartbot: {e}");
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<BotConfig, FartBotError> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            BotConfig::from_json(&json)?
        }
        None => BotConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.mute {
        config.sound_enabled = false;
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), FartBotError> {
    let config = load_config(&args)?;
    let epoch = Instant::now();
    let now = || epoch.elapsed().as_millis() as u64;

    let mut chat = match &args.wav {
        Some(_) => {
            let output = AudioOutput::offline(config.sample_rate).with_master_gain(config.master_gain);
            Chat::new(config, output, now())
        }
        None => Chat::with_default_device(config, now()),
    };
    let mut capture = Capture::default();
    let mut printed = 0;
    print_new(&chat, &mut printed);
    println!("{HELP}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if args.wav.is_some() {
            capture.catch_up(&chat, epoch);
        }

        match line {
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/mute" => chat.set_sound_enabled(false),
            "/unmute" => chat.set_sound_enabled(true),
            "/clear" => {
                chat.clear(now());
                printed = 0;
            }
            "/presets" => {
                let labels: Vec<&str> = chat.presets().iter().map(|p| p.label.as_str()).collect();
                println!("Toot keys: {}", labels.join(", "));
            }
            cmd if cmd.starts_with('/') => {
                if let Err(e) = chat.press_preset(&cmd[1..], now()) {
                    println!("{e}. {HELP}");
                }
            }
            text => chat.submit(text, now()),
        }

        // Let the bot think, then show whatever landed.
        while let Some(due) = chat.next_due_ms() {
            let wait = due.saturating_sub(now());
            thread::sleep(Duration::from_millis(wait));
            chat.poll(now());
        }
        print_new(&chat, &mut printed);
        if args.wav.is_some() {
            capture.catch_up(&chat, epoch);
        }
        let _ = io::stdout().flush();
    }

    if let Some(path) = &args.wav {
        // Let the last toots ring out before writing the file.
        if let Some(ctx) = chat.output().existing() {
            let tail = ctx.frames_remaining() as usize;
            capture.samples.extend(ctx.render(tail));
            let bytes = encode_wav_from_mono(&capture.samples, ctx.sample_rate());
            std::fs::write(path, bytes)?;
            println!(
                "Wrote {} ({:.1}s)",
                path.display(),
                capture.samples.len() as f64 / ctx.sample_rate() as f64
            );
        } else {
            println!("No toots were played; {} not written", path.display());
        }
    }
    Ok(())
}

/// Offline capture: keeps the context clock in step with wall time so
/// toots land in the file where they were heard.
#[derive(Default)]
struct Capture {
    samples: Vec<f32>,
    /// Wall-clock seconds at which the context was first seen open.
    opened_at: Option<f64>,
}

impl Capture {
    fn catch_up(&mut self, chat: &Chat, epoch: Instant) {
        let Some(ctx) = chat.output().existing() else {
            return;
        };
        let wall = epoch.elapsed().as_secs_f64();
        let opened_at = *self.opened_at.get_or_insert(wall);
        let behind = (wall - opened_at - ctx.current_time()) * ctx.sample_rate() as f64;
        if behind >= 1.0 {
            self.samples.extend(ctx.render(behind as usize));
        }
    }
}

fn print_new(chat: &Chat, printed: &mut usize) {
    let start = (*printed).min(chat.messages().len());
    for message in &chat.messages()[start..] {
        print_message(message);
    }
    *printed = chat.messages().len();
}

fn print_message(message: &Message) {
    match message.sender {
        Sender::User => println!("  you > {}", message.text),
        Sender::Bot => println!("  bot > {}", message.text),
    }
}
