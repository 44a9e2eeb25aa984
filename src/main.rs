use std::path::Path;
use std::process::ExitCode;

use lemma::config::{default_config_path, ensure_config_file, load_config, EditorConfig};
use lemma::document::MonospaceMetrics;
use lemma::{Command, Document};

mod logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Markdown,
    Plaintext,
    Links,
}

fn usage() -> ExitCode {
    eprintln!("usage: lemma <note.html> [--plaintext | --links]");
    ExitCode::from(2)
}

fn load_editor_config() -> EditorConfig {
    let Some(path) = default_config_path() else {
        return EditorConfig::default();
    };
    if let Err(e) = ensure_config_file(&path) {
        tracing::warn!(error = %e, "failed to write default config");
        return EditorConfig::default();
    }
    load_config(&path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        EditorConfig::default()
    })
}

fn main() -> ExitCode {
    let _logging = logging::init();

    let mut path = None;
    let mut output = Output::Markdown;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--plaintext" => output = Output::Plaintext,
            "--links" => output = Output::Links,
            "-h" | "--help" => return usage(),
            _ if path.is_none() => path = Some(arg),
            _ => return usage(),
        }
    }
    let Some(path) = path else {
        return usage();
    };

    let html = match std::fs::read_to_string(Path::new(&path)) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(error = %e, path = %path, "failed to read note");
            eprintln!("lemma: {path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = load_editor_config();
    let mut document = Document::with_config(config, Box::new(MonospaceMetrics::default()));
    if let Err(e) = document.run(Command::PopulateFromHtml(html)) {
        tracing::error!(error = %e, path = %path, "import failed");
        eprintln!("lemma: {path}: {e}");
        return ExitCode::FAILURE;
    }

    match output {
        Output::Markdown => println!("{}", document.markdown()),
        Output::Plaintext => println!("{}", document.plaintext()),
        Output::Links => {
            for link in document.links() {
                println!("{}", link.target());
            }
        }
    }
    ExitCode::SUCCESS
}
