//! Command-line argument definitions.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

/// Parse size string like "512M" or "1G" into bytes.
pub fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = match s.char_indices().last() {
        Some((i, 'G' | 'g')) => (&s[..i], 1024 * 1024 * 1024),
        Some((i, 'M' | 'm')) => (&s[..i], 1024 * 1024),
        Some((i, 'K' | 'k')) => (&s[..i], 1024),
        _ => (s, 1),
    };

    num_str
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("Invalid size '{s}': {e}"))?
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size '{s}' is too large"))
}

/// Serve bidirectional conversations reconstructed from PCAP captures.
#[derive(Parser, Debug)]
#[command(name = "pcapstreams")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Captures to ingest before the server starts accepting requests
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Address to listen on
    #[arg(long = "listen", default_value = "0.0.0.0:8080", value_name = "ADDR")]
    pub listen: SocketAddr,

    /// Directory uploaded captures are stored in (created on demand)
    #[arg(long = "upload-dir", default_value = "./uploads", value_name = "DIR")]
    pub upload_dir: PathBuf,

    /// Largest accepted upload request.
    ///
    /// Accepts suffixes: K, M, G (e.g., "512K", "50M").
    #[arg(long = "max-upload-size", default_value = "50M", value_name = "SIZE", value_parser = parse_size)]
    pub max_upload_size: usize,

    /// The single origin allowed to make cross-origin requests
    #[arg(long = "allowed-origin", default_value = "http://localhost:3000", value_name = "ORIGIN")]
    pub allowed_origin: String,

    /// Number of request worker threads (defaults to the CPU count)
    #[arg(long = "workers", value_name = "N")]
    pub workers: Option<NonZeroUsize>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Worker thread count, falling back to the available parallelism.
    pub fn worker_threads(&self) -> usize {
        self.workers
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    /// Default log filter for the `-v` count.
    ///
    /// The HTTP access log stays on at the quietest setting.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn,tower_http=info",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("50M").unwrap(), 50 * 1024 * 1024);
        assert_eq!(parse_size("64k").unwrap(), 64 * 1024);
        assert_eq!(parse_size("1024").unwrap(), 1024);
    }

    #[test]
    fn test_parse_size_invalid() {
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("-1G").is_err());
        assert!(parse_size("M").is_err());
    }

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["pcapstreams"]).unwrap();

        assert!(args.files.is_empty());
        assert_eq!(args.listen, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(args.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(args.max_upload_size, 50 * 1024 * 1024);
        assert_eq!(args.allowed_origin, "http://localhost:3000");
        assert!(args.workers.is_none());
        assert!(args.worker_threads() >= 1);
        assert_eq!(args.log_filter(), "warn,tower_http=info");
    }

    #[test]
    fn test_server_args() {
        let args = Args::try_parse_from([
            "pcapstreams",
            "a.pcap",
            "b.pcapng",
            "--listen",
            "127.0.0.1:9000",
            "--max-upload-size",
            "512K",
            "--workers",
            "4",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.files, vec![PathBuf::from("a.pcap"), PathBuf::from("b.pcapng")]);
        assert_eq!(args.listen.port(), 9000);
        assert_eq!(args.max_upload_size, 512 * 1024);
        assert_eq!(args.worker_threads(), 4);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Args::try_parse_from(["pcapstreams", "--workers", "0"]).is_err());
    }
}
