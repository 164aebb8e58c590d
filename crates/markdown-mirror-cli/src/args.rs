use anyhow::{Result, bail};
use std::path::PathBuf;

/// What to do with the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Side-by-side source and preview panes.
    Interactive,
    /// Print the token stream and exit.
    Tokens,
    /// Print the preview HTML and exit.
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub mode: Mode,
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

pub fn usage(program: &str) -> String {
    format!("Usage: {program} [--config <path>] [--log-file <path>] [--tokens | --html] <file>")
}

impl Args {
    /// Parses the arguments after the program name.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut mode = Mode::Interactive;
        let mut file = None;
        let mut config = None;
        let mut log_file = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(value_of(&arg, args.next())?),
                "--log-file" => log_file = Some(value_of(&arg, args.next())?),
                "--tokens" | "--html" if mode != Mode::Interactive => {
                    bail!("--tokens and --html are mutually exclusive")
                }
                "--tokens" => mode = Mode::Tokens,
                "--html" => mode = Mode::Html,
                flag if flag.starts_with("--") => bail!("Unknown option {flag}"),
                _ if file.is_some() => bail!("Only one file can be opened"),
                _ => file = Some(PathBuf::from(arg)),
            }
        }

        let Some(file) = file else {
            bail!("No file provided");
        };
        Ok(Self {
            mode,
            file,
            config,
            log_file,
        })
    }
}

fn value_of(flag: &str, value: Option<String>) -> Result<PathBuf> {
    match value {
        Some(value) if !value.starts_with("--") => Ok(PathBuf::from(value)),
        _ => bail!("{flag} needs a path"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn file_alone_opens_the_ui() {
        let args = parse(&["notes.md"]).unwrap();
        assert_eq!(
            args,
            Args {
                mode: Mode::Interactive,
                file: PathBuf::from("notes.md"),
                config: None,
                log_file: None,
            }
        );
    }

    #[rstest]
    #[case(&["--tokens", "a.md"], Mode::Tokens)]
    #[case(&["a.md", "--html"], Mode::Html)]
    #[case(&["--config", "c.toml", "a.md"], Mode::Interactive)]
    fn modes_are_selected_by_flag(#[case] args: &[&str], #[case] mode: Mode) {
        assert_eq!(parse(args).unwrap().mode, mode);
    }

    #[test]
    fn paths_are_taken_from_the_following_argument() {
        let args = parse(&["--config", "c.toml", "--log-file", "mirror.log", "a.md"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert_eq!(args.log_file, Some(PathBuf::from("mirror.log")));
    }

    #[rstest]
    #[case(&[])]
    #[case(&["--config"])]
    #[case(&["--config", "--tokens", "a.md"])]
    #[case(&["--tokens", "--html", "a.md"])]
    #[case(&["a.md", "b.md"])]
    #[case(&["--verbose", "a.md"])]
    fn bad_arguments_are_rejected(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }
}
