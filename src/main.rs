//! # certgen
//!
//! Usage:
//!   certgen request.json -o certificate.pdf
//!   echo '{ ... }' | certgen --preview preview.html
//!   certgen request.json --config layout.json
//!   certgen --example > request.json
//!   certgen --print-config > layout.json
//!
//! Without `-o` the PDF is written under its suggested filename. Logging
//! defaults to `info`; set `RUST_LOG` to change it.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use barangay_certificate::config::CertificateLayoutConfig;
use barangay_certificate::preview::PreviewRenderer;
use barangay_certificate::render::{default_image_provider, VectorRenderer};
use barangay_certificate::{parse_request, CertError};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_request_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn run(args: &[String]) -> Result<(), CertError> {
    let config = match flag_value(args, "--config") {
        Some(path) => CertificateLayoutConfig::from_path(path)?,
        None => CertificateLayoutConfig::builtin().clone(),
    };

    if args.iter().any(|a| a == "--print-config") {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    // First argument that is neither a flag nor a flag's value.
    let input_path = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, a)| {
            !a.starts_with('-')
                && !matches!(args[i - 1].as_str(), "-o" | "--preview" | "--config")
        })
        .map(|(_, a)| a.as_str());

    let input = match input_path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let request = parse_request(&input)?;

    if let Some(path) = flag_value(args, "--preview") {
        let markup = PreviewRenderer::with_config(config.clone())
            .render(&request.certificate, &request.official);
        fs::write(path, markup.as_bytes())?;
        eprintln!("✓ Written preview to {}", path);
        if flag_value(args, "-o").is_none() {
            return Ok(());
        }
    }

    let renderer = VectorRenderer::with_config(config, default_image_provider());
    let document = renderer.render(&request.certificate, &request.official)?;
    let output_path = flag_value(args, "-o").unwrap_or(&document.filename);
    fs::write(output_path, &document.pdf)?;
    eprintln!("✓ Written {} bytes to {}", document.pdf.len(), output_path);
    Ok(())
}

fn example_request_json() -> &'static str {
    r##"{
  "certificate": {
    "id": "BRGY-2024-0042",
    "type": "Certificate of Indigency",
    "requestedBy": "Juan Dela Cruz",
    "purpose": "medical assistance at the provincial hospital",
    "generatedOn": "2024-01-15",
    "age": "34",
    "address": "123 Purok 1, San Isidro",
    "income": "4500",
    "incomeYear": "2023"
  },
  "official": {
    "name": "Jesus De Una",
    "position": "Punong Barangay"
  }
}
"##
}
