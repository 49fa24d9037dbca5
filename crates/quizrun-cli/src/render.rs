//! Terminal rendering of engine views.

use quizrun_core::question::Verdict;
use quizrun_engine::application::views::{QuestionView, ResultView, RoundView, SessionView};
use quizrun_engine::domain::countdown::Urgency;
use quizrun_engine::domain::round::RoundOutcome;
use quizrun_store::memory::QuizSummary;

pub fn quiz_list(quizzes: &[QuizSummary]) {
    if quizzes.is_empty() {
        println!("The bank holds no quizzes.");
        return;
    }
    for quiz in quizzes {
        println!("{:>4}  {} ({} questions)", quiz.id.0, quiz.title, quiz.question_count);
    }
}

pub fn solo_help() {
    println!("Type an option number to answer, Enter for the next question,");
    println!("'f' to finish now, 'r' to restart, 'retry' to resend a failed");
    println!("submission, 'q' to quit.");
}

fn options(question: &QuestionView, selected: Option<usize>) {
    for (index, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(index) { '>' } else { ' ' };
        println!(" {marker} {}. {option}", index + 1);
    }
}

pub fn session(view: &SessionView) {
    let Some(question) = &view.current_question else {
        return;
    };
    println!();
    let mut header = format!(
        "Question {} of {} ({}%)",
        view.cursor + 1,
        view.question_count,
        view.progress_percent
    );
    if let Some(timer) = &view.timer {
        let tone = match timer.urgency {
            Urgency::Critical => "  hurry!",
            Urgency::Warning => "  under a minute",
            Urgency::Calm => "",
        };
        header.push_str(&format!("  [{}]{tone}", timer.display));
    }
    println!("{header}");
    if let Some(topic) = &question.topic {
        println!("[{topic}]");
    }
    println!("{}", question.prompt);
    options(question, view.selected);
    if view.locked {
        println!("Answer locked. Press Enter to continue.");
    }
}

pub fn result(result: &ResultView) {
    println!();
    println!(
        "You scored {} out of {} ({}%).",
        result.score, result.total_questions, result.percentage
    );
    match result.verdict {
        Verdict::Excellent => println!("Excellent work!"),
        Verdict::KeepPracticing => println!("Keep practicing, you'll get there."),
    }
}

pub fn round_turn(view: &RoundView) {
    let (Some(name), Some(question)) = (&view.live_player, &view.live_question) else {
        return;
    };
    println!();
    println!("It's {name}'s turn!");
    if let (Some(number), Some(total)) = (view.live_question_number, view.live_question_total) {
        println!("Question {number} of {total} (for {name})");
    }
    println!("{}", question.prompt);
    options(question, view.live_selected);
    if view.live_selected.is_some() {
        println!("Answer locked. Press Enter or type 'ok' to submit it.");
    }
}

pub fn scoreboard(view: &RoundView) {
    let line: Vec<String> = view
        .players
        .iter()
        .map(|p| format!("{}: {}", p.name, p.score))
        .collect();
    println!("Scores  {}", line.join("  |  "));
}

pub fn round_outcome(outcome: &RoundOutcome) {
    println!();
    let names: Vec<&str> = outcome
        .leaders
        .iter()
        .filter_map(|index| outcome.standings.iter().find(|s| s.player_index == *index))
        .map(|s| s.name.as_str())
        .collect();
    if outcome.is_tie() {
        println!("It's a tie between {}!", names.join(" and "));
    } else if let Some(winner) = names.first() {
        println!("{winner} wins!");
    }
    for standing in &outcome.standings {
        println!("  {}: {} points", standing.name, standing.score);
    }
}
