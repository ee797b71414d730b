use std::env;

use vce_reader::{ExamKind, SectionKind, VceReader};

fn parse_keys(value: &str) -> Result<(Vec<u8>, Vec<u8>), String> {
    let (encrypt, decrypt) = value
        .split_once(',')
        .ok_or("Invalid key format. Expected <ENCRYPT_HEX>,<DECRYPT_HEX>")?;
    let encrypt =
        hex::decode(encrypt.trim()).map_err(|e| format!("Invalid encrypt key hex: {}", e))?;
    let decrypt =
        hex::decode(decrypt.trim()).map_err(|e| format!("Invalid decrypt key hex: {}", e))?;
    Ok((encrypt, decrypt))
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-vce-file> [--keys <ENCRYPT_HEX>,<DECRYPT_HEX>]", args[0]);
        std::process::exit(1);
    }

    let vce_path = &args[1];
    let mut keys = (Vec::new(), Vec::new());
    // Parse --keys argument
    if let Some(keys_idx) = args.iter().position(|arg| arg == "--keys") {
        match args.get(keys_idx + 1).map(|value| parse_keys(value)) {
            Some(Ok(parsed)) => keys = parsed,
            Some(Err(message)) => {
                eprintln!("ERROR: {}", message);
                std::process::exit(1);
            }
            None => {
                eprintln!("ERROR: --keys flag requires an argument.");
                std::process::exit(1);
            }
        }
    }

    println!("Reading VCE file: {}", vce_path);
    println!("{}", "=".repeat(60));

    let reader = VceReader::new(keys.0, keys.1);
    match reader.read_file(vce_path) {
        Ok(container) => {
            println!("\nExam Information:");
            println!("  Title: {}", container.title);
            println!("  Number: {}", container.number);
            println!("  Format version: {}", container.version);
            println!("  File version: {}", container.file_version);
            println!("  Passing score: {}", container.passing_score);
            println!("  Time limit: {}", container.time_limit);

            println!("\nSections ({}):", container.sections.len());
            for section in &container.sections {
                println!("  [{}] {}", section.id, section.name);
            }

            println!("\nExams ({}):", container.exams.len());
            for exam in &container.exams {
                println!("  {}. {} ({} questions)", exam.id, exam.name, exam.question_count());
                if let ExamKind::Sections(sections) = &exam.kind {
                    for section in sections {
                        let label = match &section.kind {
                            SectionKind::QuestionSet(_) => "Question set".to_string(),
                            SectionKind::Testlet { title, .. } => format!("Testlet '{}'", title),
                        };
                        println!(
                            "     - {} {}: {} questions",
                            label,
                            section.id,
                            section.questions().len()
                        );
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to read VCE file");
            eprintln!("  {} ({:?})", e, e.kind());
            std::process::exit(1);
        }
    }
}
