//! Query commands: evaluate, interactive

use super::util::{flag_value, has_flag};
use discount_rules::*;
use std::io::{self, BufRead, Write};

pub fn cmd_evaluate(args: &[String], config: &AppConfig) -> Result<()> {
    let json_output = has_flag(args, "--json");
    let evaluator = Evaluator::from_config(config)?;

    // Untyped query: exercises the mapping check at the boundary
    if let Some(raw) = flag_value(args, &["--query", "-q"]) {
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let outcome = evaluator.evaluate_value(&value);

        if json_output {
            let output = match &outcome {
                Ok(resultado) => serde_json::json!({ "query": value, "resultado": resultado }),
                Err(e) => serde_json::json!({ "query": value, "error": e.to_string() }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return outcome.map(|_| ()).map_err(|_| "Evaluation failed".into());
        }

        // Errors are reported once, by the caller, in the same format
        let resultado = outcome?;
        println!("{}", render(&Ok(resultado)));
        return Ok(());
    }

    let input = FormInput::new(
        flag_value(args, &["--monto", "-m"]).unwrap_or_default(),
        flag_value(args, &["--frecuencia", "-f"]).unwrap_or_default(),
        flag_value(args, &["--miembro", "-s"]).unwrap_or_default(),
    );
    let query = input.to_query();
    let outcome = evaluator.evaluate_detailed(&query);

    if json_output {
        let found = outcome?;
        let output = serde_json::json!({
            "query": query,
            "resultado": found.as_ref().map(Match::resultado),
            "rule": found.as_ref().map(|m| m.position + 1),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let resultado = outcome?.map(|m| m.rule.resultado);
    println!("{}", render(&Ok(resultado)));
    Ok(())
}

/// Prompt for the three form fields until a blank amount or EOF
pub fn cmd_interactive(_args: &[String], config: &AppConfig) -> Result<()> {
    let evaluator = Evaluator::from_config(config)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Sistema Experto de Descuentos (línea vacía para salir)");

    loop {
        let Some(monto) = prompt(&mut lines, "Monto de compra (alto/bajo): ")? else {
            break;
        };
        if monto.trim().is_empty() {
            break;
        }
        let frecuencia = prompt(&mut lines, "Frecuencia de compra (alta/baja): ")?.unwrap_or_default();
        let miembro = prompt(&mut lines, "¿Es miembro? (True/False): ")?.unwrap_or_default();

        let query = FormInput::new(monto, frecuencia, miembro).to_query();
        println!("{}", render(&evaluator.evaluate(&query)));
        println!();
    }

    Ok(())
}

fn prompt<B: BufRead>(lines: &mut io::Lines<B>, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush().map_err(Error::Io)?;
    lines.next().transpose().map_err(Error::Io)
}
