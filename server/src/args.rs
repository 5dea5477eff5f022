use std::{net::SocketAddr, path::PathBuf};

use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(version, about = "Keeps a semantic version per project and bumps it over HTTP")]
pub struct Args {
    #[clap(long, help = "Enable debug mode", action = ArgAction::SetTrue)]
    pub debug: bool,

    #[clap(short, long, help = "Address to listen on, e.g. 0.0.0.0:8080")]
    pub listen: Option<SocketAddr>,

    #[clap(
        short = 'd',
        long = "datadir",
        help = "Directory path for storing version files (must exist)"
    )]
    pub data_directory: Option<PathBuf>,

    #[clap(short, long, help = "Path of the configuration file")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::Args;

    #[test]
    fn parses_short_flags() {
        let args = Args::parse_from(["vbump", "-l", "127.0.0.1:9000", "-d", "versions", "--debug"]);

        assert!(args.debug);
        assert_eq!(args.listen, Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(args.data_directory, Some(PathBuf::from("versions")));
        assert_eq!(args.config, None);
    }

    #[test]
    fn everything_is_optional() {
        let args = Args::parse_from(["vbump"]);

        assert!(!args.debug);
        assert_eq!(args.listen, None);
    }

    #[test]
    fn rejects_invalid_address() {
        assert!(Args::try_parse_from(["vbump", "--listen", ":8080"]).is_err());
    }
}
