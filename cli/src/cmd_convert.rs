// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::builder::RangedU64ValueParser;
use clap::{ArgMatches, Command, ValueHint, arg, value_parser};
use vcs2ics_ical::{ConvertOptions, TracingSink};

use crate::config::Config;

/// File name used for `--merge` output.
const MERGED_FILE_NAME: &str = "calendar.ics";

/// Narrowest fold width, one octet of content after the leading space.
const MIN_FOLD_WIDTH: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct CmdConvert {
    pub email: Option<String>,
    pub merge: bool,
    pub output_dir: Option<PathBuf>,
    pub use_end_date: bool,
    pub fold: Option<usize>,
    pub files: Vec<PathBuf>,
}

impl CmdConvert {
    pub fn command(name: &'static str) -> Command {
        Command::new(name)
            .arg(arg!(--email <EMAIL> "Organizer email address for the calendar events"))
            .arg(arg!(--merge "Create a single ICS file for all inputs, requires -o"))
            .arg(
                arg!(-o --output <DIR> "Output directory for the .ics files")
                    .long_help(
                        "\
Output directory for the .ics files. Each input NAME.vcs is written to DIR/NAME.ics, standard \
input to DIR/stdin.ics. Converted documents go to standard output if not set.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::DirPath),
            )
            .arg(arg!(--until "Keep recurrence end dates as UNTIL"))
            .arg(
                arg!(--fold [WIDTH] "Fold output lines longer than WIDTH octets")
                    .value_parser(
                        RangedU64ValueParser::<usize>::new().range(MIN_FOLD_WIDTH as u64..),
                    )
                    .require_equals(true)
                    .default_missing_value("75"),
            )
            .arg(
                arg!(files: [FILE] ... "The .vcs files to convert, standard input if omitted")
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            email: matches.get_one::<String>("email").cloned(),
            merge: matches.get_flag("merge"),
            output_dir: matches.get_one::<PathBuf>("output").cloned(),
            use_end_date: matches.get_flag("until"),
            fold: matches.get_one::<usize>("fold").copied(),
            files: matches
                .get_many::<PathBuf>("files")
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Convert every input, flags taking precedence over `config`.
    pub fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "converting...");

        let email = self
            .email
            .or_else(|| config.email.clone())
            .filter(|email| !email.is_empty())
            .ok_or("missing email address")?;

        let fold = self.fold.or(config.fold_lines);
        if fold.is_some_and(|width| width < MIN_FOLD_WIDTH) {
            return Err(format!("fold width must be at least {MIN_FOLD_WIDTH}").into());
        }

        let options = ConvertOptions::default()
            .organizer(email)
            .use_end_date(self.use_end_date || config.use_end_date)
            .folding(fold);

        let inputs = open_inputs(&self.files)?;
        match self.output_dir.or_else(|| config.output_dir.clone()) {
            None => {
                let mut stdout = io::stdout().lock();
                convert_all(&options, inputs, &mut stdout)?;
            }
            Some(dir) => {
                fs::create_dir_all(&dir)
                    .map_err(|e| format!("Failed to create directory {}: {e}", dir.display()))?;

                if self.merge {
                    let mut file = create_output(&dir.join(MERGED_FILE_NAME))?;
                    convert_all(&options, inputs, &mut file)?;
                } else {
                    for input in inputs {
                        let path = dir.join(input.output_name());
                        let mut file = create_output(&path)?;
                        convert_one(&options, input, &mut file)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// A document to convert.
struct Input {
    /// Where the document comes from, used in messages.
    name: String,
    /// Base name of the converted file.
    stem: String,
    reader: Box<dyn Read>,
}

impl Input {
    fn stdin() -> Self {
        Self {
            name: "<stdin>".to_string(),
            stem: "stdin".to_string(),
            reader: Box::new(io::stdin()),
        }
    }

    fn output_name(&self) -> String {
        format!("{}.ics", self.stem)
    }
}

/// Open every input up front, so a missing file fails before anything is
/// converted.
fn open_inputs(files: &[PathBuf]) -> Result<Vec<Input>, Box<dyn Error>> {
    if files.is_empty() {
        if io::stdin().is_terminal() {
            return Err("no .vcs files were specified".into());
        }
        return Ok(vec![Input::stdin()]);
    }

    files.iter().map(|path| open_file(path)).collect()
}

fn open_file(path: &Path) -> Result<Input, Box<dyn Error>> {
    if !has_vcs_extension(path) {
        tracing::warn!(
            "{} may not be a vcs file: is missing .vcs file extension",
            path.display()
        );
    }

    let file = File::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let stem = path
        .file_stem()
        .map_or_else(|| "calendar".to_string(), |a| a.to_string_lossy().into_owned());
    Ok(Input {
        name: path.display().to_string(),
        stem,
        reader: Box::new(file),
    })
}

fn has_vcs_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "vcs")
}

fn create_output(path: &Path) -> Result<BufWriter<File>, Box<dyn Error>> {
    let file =
        File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Write documents back to back, separated by a line break since a document
/// does not end with one.
fn convert_all(
    options: &ConvertOptions,
    inputs: Vec<Input>,
    output: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    for (i, input) in inputs.into_iter().enumerate() {
        if i > 0 {
            output.write_all(b"\r\n")?;
        }
        convert_one(options, input, output)?;
    }
    Ok(())
}

fn convert_one(
    options: &ConvertOptions,
    input: Input,
    output: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    tracing::debug!(input = %input.name, "converting document");
    options
        .convert(input.reader, output, &mut TracingSink)
        .map_err(|e| format!("{}: {e}", input.name))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EVENT: &str = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Test\r\n\
DTSTART:20250601T090000Z\r\n\
DTEND:20250601T100000Z\r\n\
LAST-MODIFIED:20250101T000000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn parse(args: &[&str]) -> CmdConvert {
        let matches = CmdConvert::command("test")
            .try_get_matches_from(args)
            .unwrap();
        CmdConvert::from(&matches)
    }

    #[test]
    fn test_parse_convert() {
        let cmd = parse(&[
            "test", "--email", "a@b.com", "--merge", "-o", "out", "--until", "--fold", "a.vcs",
            "b.vcs",
        ]);
        assert_eq!(cmd.email.as_deref(), Some("a@b.com"));
        assert!(cmd.merge);
        assert_eq!(cmd.output_dir, Some(PathBuf::from("out")));
        assert!(cmd.use_end_date);
        assert_eq!(cmd.fold, Some(75));
        assert_eq!(cmd.files, vec![PathBuf::from("a.vcs"), PathBuf::from("b.vcs")]);
    }

    #[test]
    fn test_parse_fold_width() {
        let cmd = parse(&["test", "--fold=40"]);
        assert_eq!(cmd.fold, Some(40));

        let cmd = parse(&["test"]);
        assert_eq!(cmd.fold, None);
        assert!(!cmd.merge);
        assert!(cmd.files.is_empty());
    }

    #[test]
    fn test_rejects_narrow_fold_width() {
        for arg in ["--fold=0", "--fold=1"] {
            let res = CmdConvert::command("test").try_get_matches_from(["test", arg]);
            assert!(res.is_err(), "{arg} should be rejected");
        }
        assert_eq!(parse(&["test", "--fold=2"]).fold, Some(2));
    }

    #[test]
    fn test_rejects_narrow_fold_width_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.vcs");
        fs::write(&input, EVENT).unwrap();
        let out_dir = temp_dir.path().join("out");

        let cmd = CmdConvert {
            email: Some("a@b.com".to_string()),
            output_dir: Some(out_dir.clone()),
            files: vec![input],
            ..Default::default()
        };
        let config = Config {
            fold_lines: Some(0),
            ..Default::default()
        };
        let err = cmd.run(&config).unwrap_err();
        assert_eq!(err.to_string(), "fold width must be at least 2");
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_missing_email() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.vcs");
        fs::write(&input, EVENT).unwrap();

        let cmd = CmdConvert {
            files: vec![input],
            ..Default::default()
        };
        let err = cmd.run(&Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "missing email address");
    }

    #[test]
    fn test_missing_file_fails_before_converting() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("present.vcs");
        fs::write(&present, EVENT).unwrap();
        let out_dir = temp_dir.path().join("out");

        let cmd = CmdConvert {
            email: Some("a@b.com".to_string()),
            output_dir: Some(out_dir.clone()),
            files: vec![present, temp_dir.path().join("missing.vcs")],
            ..Default::default()
        };
        let err = cmd.run(&Config::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to open"));
        assert!(!out_dir.join("present.ics").exists());
    }

    #[test]
    fn test_writes_one_file_per_input() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.vcs");
        let second = temp_dir.path().join("second.v1.vcs");
        fs::write(&first, EVENT).unwrap();
        fs::write(&second, EVENT).unwrap();
        let out_dir = temp_dir.path().join("nested").join("out");

        let cmd = CmdConvert {
            email: Some("a@b.com".to_string()),
            output_dir: Some(out_dir.clone()),
            files: vec![first, second],
            ..Default::default()
        };
        cmd.run(&Config::default()).unwrap();

        for name in ["first.ics", "second.v1.ics"] {
            let ics = fs::read_to_string(out_dir.join(name)).unwrap();
            assert!(ics.starts_with("BEGIN:VCALENDAR\r\nPRODID:a@b.com\r\n"));
            assert!(ics.contains("ORGANIZER:a@b.com\r\n"));
            assert!(ics.ends_with("END:VCALENDAR"));
        }
    }

    #[test]
    fn test_merges_into_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.vcs");
        let second = temp_dir.path().join("second.vcs");
        fs::write(&first, EVENT).unwrap();
        fs::write(&second, EVENT).unwrap();
        let out_dir = temp_dir.path().join("out");

        let cmd = CmdConvert {
            merge: true,
            output_dir: Some(out_dir.clone()),
            files: vec![first, second],
            ..Default::default()
        };
        let config = Config {
            email: Some("cfg@example.com".to_string()),
            ..Default::default()
        };
        cmd.run(&config).unwrap();

        let ics = fs::read_to_string(out_dir.join(MERGED_FILE_NAME)).unwrap();
        assert_eq!(ics.matches("BEGIN:VCALENDAR").count(), 2);
        assert!(ics.contains("END:VCALENDAR\r\nBEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("ORGANIZER:cfg@example.com\r\n"));
        assert!(!out_dir.join("first.ics").exists());
    }

    #[test]
    fn test_flags_override_config() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.vcs");
        fs::write(&input, EVENT).unwrap();
        let flag_dir = temp_dir.path().join("flag");
        let config_dir = temp_dir.path().join("config");

        let cmd = CmdConvert {
            email: Some("flag@example.com".to_string()),
            output_dir: Some(flag_dir.clone()),
            files: vec![input],
            ..Default::default()
        };
        let config = Config {
            email: Some("cfg@example.com".to_string()),
            output_dir: Some(config_dir.clone()),
            ..Default::default()
        };
        cmd.run(&config).unwrap();

        let ics = fs::read_to_string(flag_dir.join("a.ics")).unwrap();
        assert!(ics.contains("PRODID:flag@example.com\r\n"));
        assert!(!config_dir.exists());
    }

    #[test]
    fn test_accepts_files_without_vcs_extension() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("calendar.txt");
        fs::write(&input, EVENT).unwrap();
        assert!(!has_vcs_extension(&input));

        let cmd = CmdConvert {
            email: Some("a@b.com".to_string()),
            output_dir: Some(temp_dir.path().to_path_buf()),
            files: vec![input],
            ..Default::default()
        };
        cmd.run(&Config::default()).unwrap();
        assert!(temp_dir.path().join("calendar.ics").exists());
    }

    #[test]
    fn test_conversion_error_names_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.vcs");
        fs::write(&input, "BEGIN:VEVENT\r\nSUMMARY:No start\r\nEND:VEVENT\r\n").unwrap();

        let cmd = CmdConvert {
            email: Some("a@b.com".to_string()),
            output_dir: Some(temp_dir.path().join("out")),
            files: vec![input.clone()],
            ..Default::default()
        };
        let err = cmd.run(&Config::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("{}: no start date specified", input.display())
        );
    }
}
