//! Knowledge base commands: rules, validate, init, schema

use super::util::{flag_value, has_flag, write_output};
use discount_rules::*;
use std::path::{Path, PathBuf};

/// Default file written by `init`
const DEFAULT_KB_FILE: &str = "knowledge_base.yaml";

pub fn cmd_rules(args: &[String], config: &AppConfig) -> Result<()> {
    let json_output = has_flag(args, "--json");
    let evaluator = Evaluator::from_config(config)?;
    let rules = evaluator.all_rules()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    if rules.is_empty() {
        println!("No rules loaded");
        return Ok(());
    }

    for (i, rule) in rules.iter().enumerate() {
        println!("{:>3}. {}", i + 1, rule);
    }
    Ok(())
}

pub fn cmd_validate(args: &[String]) -> Result<()> {
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        return Err("Usage: discount-rules validate <knowledge_base.yaml> [--strict] [--json]".into());
    };

    let strict = has_flag(args, "--strict");
    let json_output = has_flag(args, "--json");

    let kb = KnowledgeBase::load(Path::new(path))?;
    let findings = kb.validate();
    let has_errors = KnowledgeBase::has_errors(&findings);
    let failed = has_errors || (strict && !findings.is_empty());

    for finding in findings.iter().filter(|f| f.severity == Severity::Warning) {
        tracing::warn!(rule = ?finding.rule, "{}", finding.message);
    }

    if json_output {
        let output = serde_json::json!({
            "valid": !failed,
            "rules": kb.rules.len(),
            "hash": kb.hash(),
            "findings": findings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for finding in &findings {
            let prefix = match finding.severity {
                Severity::Error => "✗",
                Severity::Warning => "⚠",
            };
            println!("{} {}", prefix, finding);
        }

        if findings.is_empty() {
            println!("✓ {} rule(s) valid ({})", kb.rules.len(), kb.hash());
        } else {
            println!();
            println!("{} finding(s) in {} rule(s)", findings.len(), kb.rules.len());
        }
    }

    if failed {
        return Err("Knowledge base validation failed".into());
    }
    Ok(())
}

pub fn cmd_init(args: &[String]) -> Result<()> {
    let force = has_flag(args, "--force");
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KB_FILE));

    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    let yaml = KnowledgeBase::builtin().to_yaml()?;
    std::fs::write(&path, yaml).map_err(Error::Io)?;
    println!("✓ Created {}", path.display());
    Ok(())
}

pub fn cmd_schema(args: &[String]) -> Result<()> {
    let name = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or("knowledge_base");
    let output = flag_value(args, &["--output", "-o"]).map(PathBuf::from);

    let schema = match name {
        "knowledge_base" | "kb" | "rules" => schemars::schema_for!(KnowledgeBase),
        "config" => schemars::schema_for!(AppConfig),
        other => {
            return Err(format!(
                "Unknown schema: {} (expected knowledge_base or config)",
                other
            )
            .into())
        }
    };

    write_output(&output, &serde_json::to_string_pretty(&schema)?)
}
