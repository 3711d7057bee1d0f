use colored::Colorize;

mod documents;
mod evaluation;
mod voice_io;

use crate::chat::ChatEngine;
use crate::config::Settings;
use crate::evaluation::{EvalError, EvaluationResult};
use crate::language::Language;
use crate::providers::{CohereProvider, CompletionProvider, OllamaProvider};
use crate::translate;

/// Owns the whole interactive session: the model backends, the current chat
/// engine (present once documents are processed), the source text, cached
/// evaluation results, and the answer language. Rebuilt state replaces old
/// state wholesale on every `process`.
pub struct CommandHandler {
    settings: Settings,
    provider: Box<dyn CompletionProvider + Send + Sync>,
    generator: Option<Box<dyn CompletionProvider + Send + Sync>>,
    session: Option<ChatEngine>,
    uploaded_text: Option<String>,
    evaluation_results: Option<Vec<EvaluationResult>>,
    language: Language,
}

impl CommandHandler {
    pub fn new(settings: Settings) -> Result<Self, String> {
        let provider = OllamaProvider::new(
            &settings.ollama_url,
            &settings.chat_model,
            &settings.embed_model,
            settings.request_timeout,
        )
        .map_err(|e| format!("Failed to initialize model server client: {}", e))?;

        let generator = match &settings.cohere_api_key {
            Some(key) => Some(Box::new(
                CohereProvider::new(
                    key,
                    &settings.cohere_url,
                    &settings.cohere_model,
                    settings.request_timeout,
                )
                .map_err(|e| format!("Failed to initialize question generator: {}", e))?,
            ) as Box<dyn CompletionProvider + Send + Sync>),
            None => {
                log::info!("COHERE_API_KEY not set, evaluation and practice are disabled");
                None
            }
        };

        Ok(Self {
            settings,
            provider: Box::new(provider),
            generator,
            session: None,
            uploaded_text: None,
            evaluation_results: None,
            language: Language::default(),
        })
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        match input.to_lowercase().as_str() {
            "help" => return self.print_help(),
            "exit" | "quit" => {
                println!("👋 Goodbye!");
                std::process::exit(0);
            }
            "status" => return self.print_status().await,
            "langs" | "languages" => return self.list_languages(),
            "speak" => return self.speak_last().await,
            _ => {}
        }

        if let Some(rest) = input.strip_prefix("lang ") {
            return self.switch_language(rest.trim());
        }

        if let Some(rest) = input.strip_prefix("process ") {
            return self.process_documents(rest).await;
        }

        if let Some(rest) = input.strip_prefix("summarize ") {
            return documents::summarize(&self.settings, &self.provider, rest.trim()).await;
        }

        if input == "evaluate" || input.starts_with("evaluate ") {
            return self.run_evaluation(parse_count(input, self.settings.eval_questions)).await;
        }

        if input == "practice" || input.starts_with("practice ") {
            return self.run_practice(parse_count(input, self.settings.eval_questions)).await;
        }

        if let Some(rest) = input.strip_prefix("voice ") {
            return self.ask_spoken(rest.trim()).await;
        }

        // Anything else is a question for the documents
        self.handle_question(input).await
    }

    fn print_help(&self) -> Result<(), String> {
        println!("📚 PDF Chatbot Commands:");
        println!("  process <file.pdf> [more.pdf ...]  - Read and index documents");
        println!("  <question>                         - Ask about the indexed documents");
        println!("  voice <recording.wav>              - Ask a spoken question");
        println!("  speak                              - Read the last answer out loud");
        println!("  summarize <file.pdf>               - Summarize a document and save it");
        println!("  evaluate [n]                       - Score the chatbot on n generated questions");
        println!("  practice [n]                       - Quiz yourself on n generated questions");
        println!("  lang <language>                    - Set the answer language (see: langs)");
        println!("  status                             - Show session info");
        println!("  help | exit");
        Ok(())
    }

    async fn print_status(&self) -> Result<(), String> {
        println!("\n🤖 Session status:");
        match self.provider.get_model_info().await {
            Ok(info) => println!("  Model server: {} {}", info, "✅".green()),
            Err(e) => println!("  Model server: {} ({})", "❌ unreachable".red(), e),
        }
        match &self.generator {
            Some(_) => println!("  Question generator: {}", "✅ Ready".green()),
            None => println!("  Question generator: {}", "❌ No API key".red()),
        }
        match &self.session {
            Some(engine) => println!(
                "  Index: {} chunks, {} conversation turns",
                engine.chunk_count().to_string().cyan(),
                engine.history().len().to_string().cyan()
            ),
            None => println!("  Index: {}", "no documents processed".yellow()),
        }
        if let Some(results) = &self.evaluation_results {
            println!(
                "  Last evaluation: {} questions scored",
                results.len().to_string().cyan()
            );
        }
        println!("  Answer language: {}", self.language.to_string().cyan());
        Ok(())
    }

    fn list_languages(&self) -> Result<(), String> {
        println!("🌍 Supported answer languages:");
        for lang in Language::all() {
            let marker = if *lang == self.language { "→" } else { " " };
            println!("  {} {} ({})", marker, lang.name(), lang.code());
        }
        println!("\nTo switch: lang <language>");
        Ok(())
    }

    fn switch_language(&mut self, name: &str) -> Result<(), String> {
        let language: Language = name.parse()?;
        self.language = language;
        println!("🌍 Answers will be translated to {}", language.to_string().cyan());
        Ok(())
    }

    async fn process_documents(&mut self, rest: &str) -> Result<(), String> {
        let paths: Vec<&str> = rest.split_whitespace().collect();
        if paths.is_empty() {
            return Err("Usage: process <file.pdf> [more.pdf ...]".to_string());
        }

        let (engine, text, report) =
            documents::process(&self.settings, &self.provider, &paths).await?;

        println!(
            "✅ Chatbot is ready! {} file(s) indexed into {} chunks.",
            report.processed.len().to_string().green(),
            engine.chunk_count().to_string().green()
        );

        // The old index, conversation, and cached evaluation go together
        self.session = Some(engine);
        self.uploaded_text = Some(text);
        self.evaluation_results = None;
        Ok(())
    }

    async fn handle_question(&mut self, question: &str) -> Result<(), String> {
        let engine = self
            .session
            .as_mut()
            .ok_or("No documents indexed yet. Use: process <file.pdf>")?;

        let answer = engine
            .ask(question)
            .await
            .map_err(|e| format!("Failed to get answer: {}", e))?;

        let displayed = if self.language == Language::English {
            answer
        } else {
            match translate::translate_text(&answer, self.language, self.settings.request_timeout)
                .await
            {
                Ok(translated) => translated,
                Err(e) => {
                    log::warn!("Translation failed, showing original answer: {}", e);
                    println!("{}", format!("⚠️ Translation failed: {}", e).yellow());
                    answer
                }
            }
        };

        println!("\n💬 {}", displayed.truecolor(255, 236, 179));
        println!("{}", "(speak to hear this answer)".dimmed());
        Ok(())
    }

    async fn ask_spoken(&mut self, path: &str) -> Result<(), String> {
        let spoken = voice_io::transcribe(path, self.language, &self.settings).await?;
        println!("🗣️ You said: {}", spoken.bright_yellow());
        self.handle_question(&spoken).await
    }

    async fn speak_last(&self) -> Result<(), String> {
        let answer = self
            .session
            .as_ref()
            .and_then(|engine| engine.last_answer())
            .ok_or("Nothing to read yet. Ask a question first.")?;

        voice_io::speak(answer, self.language, &self.settings).await
    }

    async fn run_evaluation(&mut self, count: usize) -> Result<(), String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| EvalError::GeneratorUnavailable.to_string())?;
        let engine = self
            .session
            .as_ref()
            .ok_or("No documents indexed yet. Use: process <file.pdf>")?;
        let text = self
            .uploaded_text
            .as_ref()
            .ok_or("No source text available. Use: process <file.pdf>")?;

        let results = evaluation::run_evaluation(
            &self.settings,
            &self.provider,
            generator,
            engine,
            text,
            count,
        )
        .await?;

        self.evaluation_results = Some(results);
        println!("✅ Evaluation complete!");
        Ok(())
    }

    async fn run_practice(&mut self, count: usize) -> Result<(), String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| EvalError::GeneratorUnavailable.to_string())?;
        let text = self
            .uploaded_text
            .as_ref()
            .ok_or("No documents indexed yet. Use: process <file.pdf>")?;

        evaluation::run_practice(&self.settings, &self.provider, generator, text, count).await
    }
}

fn parse_count(input: &str, default: usize) -> usize {
    input
        .split_whitespace()
        .nth(1)
        .and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_argument_parses_with_a_default() {
        assert_eq!(parse_count("evaluate 7", 5), 7);
        assert_eq!(parse_count("evaluate", 5), 5);
        assert_eq!(parse_count("evaluate zero", 5), 5);
        assert_eq!(parse_count("evaluate 0", 5), 5);
    }
}
