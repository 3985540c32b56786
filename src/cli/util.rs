//! CLI utility helpers

use discount_rules::{AppConfig, ConfigFlags, Error, Result};
use std::fs;
use std::path::PathBuf;

/// Value following `--name` (or its short form), if present
pub fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Whether a bare flag is present
pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Split the global options (`--rules`, `--db`, `--verbose`) from the
/// command and its own arguments.
pub fn split_global_flags(args: &[String]) -> (ConfigFlags, Vec<String>) {
    let mut flags = ConfigFlags::default();
    let mut rest = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--rules" | "-r" => flags.rules = iter.next().map(PathBuf::from),
            "--db" => flags.database = iter.next().map(PathBuf::from),
            "--verbose" | "-V" => flags.verbose = true,
            _ => rest.push(arg.clone()),
        }
    }

    (flags, rest)
}

/// Config file from the working directory, with flags applied
pub fn load_config(flags: &ConfigFlags) -> Result<AppConfig> {
    let current_dir = std::env::current_dir().map_err(Error::Io)?;
    let config = AppConfig::load_from_dir(&current_dir)?.unwrap_or_default();
    Ok(config.merge_flags(flags))
}

/// Write content to file or stdout
pub fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_global_flags() {
        let (flags, rest) = split_global_flags(&args(&[
            "--db", "r.db", "evaluate", "--monto", "alto", "--verbose", "--rules", "kb.yaml",
        ]));
        assert_eq!(flags.database, Some(PathBuf::from("r.db")));
        assert_eq!(flags.rules, Some(PathBuf::from("kb.yaml")));
        assert!(flags.verbose);
        assert_eq!(rest, args(&["evaluate", "--monto", "alto"]));
    }

    #[test]
    fn test_flag_value() {
        let a = args(&["--monto", "alto", "-f", "alta"]);
        assert_eq!(flag_value(&a, &["--monto", "-m"]), Some("alto".into()));
        assert_eq!(flag_value(&a, &["--frecuencia", "-f"]), Some("alta".into()));
        assert_eq!(flag_value(&a, &["--miembro"]), None);
        assert!(has_flag(&a, "-f"));
    }
}
