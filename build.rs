use std::fs;
use std::path::Path;
use serde::Deserialize;

#[derive(Deserialize)]
struct Config {
    application: Application,
    stream: Stream,
    decode: Decode,
}

#[derive(Deserialize)]
struct Application {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct Stream {
    sample_rate: u32,
    channels: u32,
    bitrate: i32,
    frame_duration: f32,
    complexity: u32,
    serial: u32,
}

#[derive(Deserialize)]
struct Decode {
    buffer_bytes: usize,
    pad_output: bool,
}

// 在编译时读取 config.toml 并设置环境变量
fn main() {
    println!("cargo:rerun-if-changed=config.toml");

    let config_path = Path::new("config.toml");
    if !config_path.exists() {
        panic!("config.toml not found!");
    }

    let config_str = fs::read_to_string(config_path).expect("Failed to read config.toml");
    let config: Config = toml::from_str(&config_str).expect("Failed to parse config.toml");

    println!("cargo:rustc-env=APP_NAME={}", config.application.name);
    println!("cargo:rustc-env=APP_VERSION={}", config.application.version);

    // 流参数
    println!("cargo:rustc-env=STREAM_SAMPLE_RATE={}", config.stream.sample_rate);
    println!("cargo:rustc-env=STREAM_CHANNELS={}", config.stream.channels);
    println!("cargo:rustc-env=STREAM_BITRATE={}", config.stream.bitrate);
    println!("cargo:rustc-env=STREAM_FRAME_DURATION={}", config.stream.frame_duration);
    println!("cargo:rustc-env=STREAM_COMPLEXITY={}", config.stream.complexity);
    println!("cargo:rustc-env=STREAM_SERIAL={}", config.stream.serial);

    // 解码输出
    println!("cargo:rustc-env=DECODE_BUFFER_BYTES={}", config.decode.buffer_bytes);
    println!("cargo:rustc-env=DECODE_PAD_OUTPUT={}", config.decode.pad_output);
}
