//! The `medboard quiz` command.
//!
//! Reads one line per action from stdin: an answer (free text or an option
//! key), or a `:`-prefixed command.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use medboard_client::{create_tutor_api, open_session};
use medboard_core::model::{QuestionParams, DIFFICULTY_PRESETS, SPECIALTY_PRESETS};
use medboard_core::quiz::{QuizCycle, QuizPhase};
use medboard_core::SessionGate;

use super::{follow, load_config, split_command};

const HELP: &str = "\
Commands:
  <answer>          submit an answer (option key for multiple choice)
  :next             fetch the next question
  :topic <name>     switch topic and fetch
  :difficulty <x>   switch difficulty and fetch
  :help             show this help
  :quit             leave";

enum Action<'a> {
    Answer(&'a str),
    Next,
    Topic(&'a str),
    Difficulty(&'a str),
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_action(line: &str) -> Action<'_> {
    let Some((name, arg)) = split_command(line) else {
        return Action::Answer(line.trim());
    };
    match name {
        "n" | "next" => Action::Next,
        "t" | "topic" => Action::Topic(arg),
        "d" | "difficulty" => Action::Difficulty(arg),
        "h" | "help" => Action::Help,
        "q" | "quit" | "exit" => Action::Quit,
        _ => Action::Unknown(name),
    }
}

pub fn print_presets() {
    println!("Topics:");
    for topic in SPECIALTY_PRESETS {
        println!("  {topic}");
    }
    println!("Difficulties:");
    for difficulty in DIFFICULTY_PRESETS {
        println!("  {difficulty}");
    }
}

pub async fn execute(
    config_path: Option<PathBuf>,
    specialty: Option<String>,
    difficulty: Option<String>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let session = open_session(&config)?;

    let token = match SessionGate::require(&session) {
        Ok(token) => token,
        Err(nav) => {
            println!("Please log in to use the practice questions.");
            return Err(follow(nav).await);
        }
    };
    let api = create_tutor_api(&config, Some(&token))?;

    let mut params = QuestionParams::new(
        specialty.as_deref().unwrap_or(&config.default_specialty),
        difficulty.as_deref().unwrap_or(&config.default_difficulty),
    );
    let mut quiz = QuizCycle::new(session);

    println!("MedBoard AI Tutor ({} / {})", params.specialty, params.difficulty);
    println!("Type :help for commands.\n");

    if let Some(nav) = quiz.fetch(api.as_ref(), &params).await {
        render(&quiz);
        return Err(follow(nav).await);
    }
    render(&quiz);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let nav = match parse_action(&line) {
            Action::Quit => break,
            Action::Help => {
                println!("{HELP}");
                continue;
            }
            Action::Unknown(name) => {
                println!("Unknown command ':{name}'. Type :help for commands.");
                continue;
            }
            Action::Next => quiz.fetch(api.as_ref(), &params).await,
            Action::Topic("") => {
                println!("Usage: :topic <name> (current: {})", params.specialty);
                continue;
            }
            Action::Difficulty("") => {
                println!("Usage: :difficulty <level> (current: {})", params.difficulty);
                continue;
            }
            Action::Topic(topic) => {
                params = QuestionParams::new(topic, &params.difficulty);
                println!("Topic: {}", params.specialty);
                quiz.fetch(api.as_ref(), &params).await
            }
            Action::Difficulty(level) => {
                params = QuestionParams::new(&params.specialty, level);
                println!("Difficulty: {}", params.difficulty);
                quiz.fetch(api.as_ref(), &params).await
            }
            Action::Answer(answer) => {
                let is_choice = quiz.question().is_some_and(|q| q.is_multiple_choice());
                if is_choice && !answer.is_empty() {
                    if let Err(e) = quiz.choose(answer) {
                        println!("{e}");
                        continue;
                    }
                } else {
                    quiz.set_answer(answer);
                }
                match quiz.submit(api.as_ref()).await {
                    Ok(nav) => nav,
                    Err(rejected) => {
                        println!("{rejected}");
                        continue;
                    }
                }
            }
        };

        render(&quiz);
        if let Some(nav) = nav {
            return Err(follow(nav).await);
        }
    }

    Ok(())
}

fn render(quiz: &QuizCycle) {
    match quiz.phase() {
        QuizPhase::Question => {
            if let Some(question) = quiz.question() {
                println!("Question:");
                println!("{}", question.content);
                if let Some(options) = &question.options {
                    for (key, text) in options.iter() {
                        println!("  {key}) {text}");
                    }
                    println!("\nAnswer with an option key.");
                } else {
                    println!("\nType your answer.");
                }
            }
        }
        QuizPhase::Feedback => {
            if let Some(feedback) = quiz.feedback() {
                println!("Feedback: {}", feedback.verdict());
                if let Some(correct) = &feedback.correct_answer {
                    println!("Correct answer: {correct}");
                }
                if let Some(explanation) = &feedback.explanation {
                    println!("Explanation: {explanation}");
                }
                if let Some(personal) = &feedback.personalized_feedback {
                    println!("Tutor: {personal}");
                }
                println!("\nType :next for another question.");
            }
        }
        QuizPhase::Error => {
            if let Some(error) = quiz.error() {
                println!("Error: {error}");
            }
        }
        QuizPhase::Idle | QuizPhase::Loading | QuizPhase::Submitting => {
            println!("Loading question...");
        }
    }
}
