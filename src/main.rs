// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST RECOMMENDER CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Gera o índice de recomendações no build do site.
//
// Uso:
//   post-recommender-cli corpus.json
//   post-recommender-cli --preview /2024/01/02/hello/   (seleção a partir da saída local)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use post_recommender::prelude::*;
use std::path::PathBuf;

/// Tenta carregar o arquivo .env do diretório atual ou do pai
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from("../.env")];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!("✓ Carregado .env de: {:?}", path);
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Post Recommender CLI v{}", post_recommender::VERSION);
    eprintln!();
    eprintln!("Uso: {} <corpus.json>", program);
    eprintln!("     {} --preview <caminho-da-página>", program);
    eprintln!();
    eprintln!("Variáveis de ambiente:");
    eprintln!("  OPENAI_API_KEY              Liga o modo com embeddings");
    eprintln!("  OPENAI_EMBEDDING_MODEL      Modelo (obrigatório com a chave)");
    eprintln!("  OPENAI_BASE_URL             URL base da API (padrão: {})", post_recommender::config::DEFAULT_BASE_URL);
    eprintln!("  RECOMMENDER_CACHE_PATH      Arquivo do cache de embeddings");
    eprintln!("  RECOMMENDER_OUTPUT_DIR      Diretório dos artefatos");
    eprintln!("  RECOMMENDER_TOP_K           Vizinhos por documento");
    eprintln!("  RECOMMENDER_CALL_DELAY_MS   Intervalo entre chamadas à API");
}

async fn generate(corpus_path: &str) -> anyhow::Result<()> {
    let output = generate_from_env(corpus_path.as_ref()).await?;

    let report = &output.report;
    println!();
    println!("═══════════════════════════════════════════════════════════");
    println!("RESULTADO ({})", report.run_id);
    println!("═══════════════════════════════════════════════════════════");
    println!("Documentos:          {}", report.documents);
    println!("Com recomendações:   {}", report.ranked);
    println!(
        "Embeddings:          {} do cache, {} gerados, {} falhas",
        report.embeddings.cached, report.embeddings.generated, report.embeddings.failed
    );
    println!("Arquivos de dados:   {}", report.data_files);
    for stage in &report.stages {
        println!("  {:<18} {}ms", stage.stage, stage.elapsed_ms);
    }
    println!("Tempo total:         {}ms", report.elapsed_ms());
    if report.random_only {
        println!("Modo:                somente-aleatório");
    }
    Ok(())
}

async fn preview(current_path: &str) -> anyhow::Result<()> {
    let pipeline_config = load_pipeline_config()?;
    let source = FileRecommendationSource::new(&pipeline_config.output_dir);
    let mut selector = ClientSelector::default();

    match recommend(&source, &mut selector, current_path).await {
        Selection::Populated(items) => {
            for (i, item) in items.iter().enumerate() {
                match item.similarity {
                    Some(score) => println!("{}. {} ({}) [{:.3}]", i + 1, item.title, item.path, score),
                    None => println!("{}. {} ({}) [aleatório]", i + 1, item.title, item.path),
                }
            }
        }
        Selection::Empty => println!("Nenhuma recomendação disponível"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar .env PRIMEIRO, antes de qualquer coisa
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("post-recommender-cli");

    match args.get(1).map(String::as_str) {
        Some("--preview") => match args.get(2) {
            Some(path) => preview(path).await,
            None => {
                print_usage(program);
                std::process::exit(1);
            }
        },
        Some("--help") | Some("-h") | None => {
            print_usage(program);
            std::process::exit(1);
        }
        Some(corpus_path) => generate(corpus_path).await,
    }
}
