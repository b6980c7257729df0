use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ogg_opus_stream::{OggStream, StreamConfig};

// 每次从输入读取的字节数，模拟网络分片
const CHUNK_BYTES: usize = 4096;

#[derive(Parser)]
#[command(
    name = env!("APP_NAME"),
    version = env!("APP_VERSION"),
    about = "Pipe audio between Ogg Opus and raw s16le PCM"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Codec sample rate (8000, 12000, 16000, 24000 or 48000)
    #[arg(long, global = true)]
    sample_rate: Option<u32>,

    /// Channel count (1 or 2)
    #[arg(long, global = true)]
    channels: Option<u32>,

    /// Encode bitrate in bits/s
    #[arg(long, global = true)]
    bitrate: Option<i32>,

    /// Target encode frame duration in ms
    #[arg(long, global = true)]
    frame_duration: Option<f32>,

    /// Decode output block size in bytes
    #[arg(long, global = true)]
    decode_buffer: Option<usize>,

    /// Write only the bytes each packet decoded to, without padding
    #[arg(long, global = true)]
    no_pad: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Ogg Opus file → raw PCM
    Decode { input: PathBuf, output: PathBuf },
    /// Raw PCM → Ogg Opus file
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Flush the open page after every chunk for lower latency
        #[arg(long)]
        flush_each_chunk: bool,
    },
}

impl Cli {
    fn stream_config(&self) -> StreamConfig {
        // 编译时配置为默认值，命令行参数覆盖
        let mut config = StreamConfig::new().unwrap_or_default();
        if let Some(v) = self.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = self.channels {
            config.channels = v;
        }
        if let Some(v) = self.bitrate {
            config.bitrate = v;
        }
        if let Some(v) = self.frame_duration {
            config.frame_duration = v;
        }
        if let Some(v) = self.decode_buffer {
            config.decode_buffer_bytes = v;
        }
        if self.no_pad {
            config.pad_decoded_output = false;
        }
        config
    }
}

fn main() -> Result<()> {
    // 初始化日志
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.stream_config();
    let mut stream = OggStream::new(config).context("Failed to create stream session")?;

    match &cli.command {
        Command::Decode { input, output } => decode_file(&mut stream, input, output),
        Command::Encode {
            input,
            output,
            flush_each_chunk,
        } => encode_file(&mut stream, input, output, *flush_each_chunk),
    }
}

fn decode_file(stream: &mut OggStream, input: &Path, output: &Path) -> Result<()> {
    let mut reader = open_input(input)?;
    let mut writer = create_output(output)?;

    let mut buf = vec![0u8; CHUNK_BYTES];
    let mut total = 0usize;
    loop {
        let n = reader.read(&mut buf).context("Failed to read input")?;
        if n == 0 {
            break;
        }
        let pcm = stream.decode(&buf[..n])?;
        total += pcm.len();
        writer.write_all(&pcm).context("Failed to write output")?;
    }
    writer.flush()?;

    log::info!("Decoded {} -> {} ({} PCM bytes)", input.display(), output.display(), total);
    Ok(())
}

fn encode_file(
    stream: &mut OggStream,
    input: &Path,
    output: &Path,
    flush_each_chunk: bool,
) -> Result<()> {
    let mut reader = open_input(input)?;
    let mut writer = create_output(output)?;

    let mut buf = vec![0u8; CHUNK_BYTES];
    // A short read can split a sample; carry the odd byte into the next chunk
    let mut carry = 0usize;
    loop {
        let n = reader.read(&mut buf[carry..]).context("Failed to read input")?;
        if n == 0 {
            break;
        }
        let filled = carry + n;
        let even = filled - filled % 2;

        writer.write_all(&stream.encode(&buf[..even])?)?;
        if flush_each_chunk {
            writer.write_all(&stream.flush())?;
        }

        carry = filled - even;
        if carry == 1 {
            buf[0] = buf[even];
        }
    }
    if carry == 1 {
        log::warn!("Input ends with half a sample; dropping the last byte");
    }

    writer.write_all(&stream.finish()?)?;
    writer.flush()?;

    log::info!("Encoded {} -> {}", input.display(), output.display());
    Ok(())
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
