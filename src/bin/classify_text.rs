use anyhow::{bail, Context, Result};
use sensiscan::models::{BatchRequest, StandardRequest, TextRequest};
use sensiscan::services::classification::{Classifier, LabelCatalog};
use sensiscan::services::config_store::ConfigStore;
use sensiscan::services::oracle::HttpOracle;

use std::io::Read;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("read file failed: {}", p)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin failed")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    sensiscan::init_logging();

    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        eprintln!(
            "Usage:\n  classify_text [<path>] [--labels <k1,k2,...>] [--standard <key>] [--threshold <t>] [--no-filter] [--batch] [--out <json_path>]\n\nReads <path> or stdin, classifies against the zero-shot oracle\n(SENSISCAN_ORACLE_URL), and prints the result as JSON.\nWith --batch the input must be a JSON batch request:\n  {{\"texts\": [\"...\"], \"labels\": [\"Financial-Info\"]}}"
        );
        return Ok(());
    }

    let path = args.get(1).filter(|a| !a.starts_with("--")).cloned();
    let labels = parse_arg_value(&args, "--labels");
    let standard = parse_arg_value(&args, "--standard");
    let threshold = parse_arg_value(&args, "--threshold");
    let out_path = parse_arg_value(&args, "--out");

    let text = read_input(path.as_deref())?;

    let store = ConfigStore::default_config_dir().map(ConfigStore::new);
    let mut config = match &store {
        Some(s) => s.load().ok().unwrap_or_default(),
        None => Default::default(),
    };

    if let Some(t) = threshold {
        config.classification.threshold = t
            .parse()
            .with_context(|| format!("invalid --threshold value: {}", t))?;
    }
    if has_flag(&args, "--no-filter") {
        config.classification.enable_technical_filter = false;
    }

    let oracle = match config.oracle.endpoint.as_deref() {
        Some(url) => HttpOracle::with_endpoint(url, config.oracle.timeout_secs),
        None => HttpOracle::with_timeout(config.oracle.timeout_secs),
    };

    let classifier = Classifier::new(
        LabelCatalog::builtin(),
        config.classification,
        Box::new(oracle),
    );

    let json = if has_flag(&args, "--batch") {
        let request: BatchRequest =
            serde_json::from_str(&text).context("invalid batch request JSON")?;
        let results = classifier.handle_batch(&request).await?;
        eprintln!("Classified {} document(s)", results.len());
        serde_json::to_string_pretty(&results)?
    } else {
        let result = if standard.is_some() {
            let request = StandardRequest { text, standard };
            classifier.handle_standard(&request).await?
        } else {
            let keys = match labels {
                Some(labels) => {
                    let keys: Vec<String> = labels
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                    if keys.is_empty() {
                        bail!("--labels must name at least one catalog key");
                    }
                    Some(keys)
                }
                None => None,
            };
            let request = TextRequest { text, labels: keys };
            classifier.handle_text(&request).await?
        };

        if let Some(top) = result.top_label() {
            eprintln!("Top label: {} ({} chunk(s))", top, result.chunks);
        }
        serde_json::to_string_pretty(&result)?
    };
    match out_path {
        Some(p) => {
            std::fs::write(&p, &json).with_context(|| format!("write output failed: {}", p))?;
            eprintln!("Result written to {}", p);
        }
        None => println!("{}", json),
    }

    Ok(())
}
