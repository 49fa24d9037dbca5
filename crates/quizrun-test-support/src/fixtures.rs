//! Question fixtures.

use chrono::{DateTime, TimeZone, Utc};
use quizrun_core::question::{Question, QuestionId};

/// Fixed timestamp used across tests.
///
/// # Panics
///
/// Never; the literal date is valid.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Three software-engineering questions with answer keys.
#[must_use]
pub fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: QuestionId(1),
            prompt: "Which concept allows an object to take on many forms?".to_owned(),
            options: vec![
                "Inheritance".to_owned(),
                "Encapsulation".to_owned(),
                "Polymorphism".to_owned(),
                "Abstraction".to_owned(),
            ],
            correct_option: Some(2),
            topic: Some("OOP".to_owned()),
            explanation: None,
        },
        Question {
            id: QuestionId(2),
            prompt: "What is the primary function of a DNS server?".to_owned(),
            options: vec![
                "Assigning IP addresses".to_owned(),
                "Translating domain names to IP addresses".to_owned(),
                "Routing packets".to_owned(),
                "Encrypting data".to_owned(),
            ],
            correct_option: Some(1),
            topic: Some("Networking".to_owned()),
            explanation: None,
        },
        Question {
            id: QuestionId(3),
            prompt: "Which of these is NOT a principle of RESTful API design?".to_owned(),
            options: vec![
                "Statelessness".to_owned(),
                "Client-Server separation".to_owned(),
                "Code-On-Demand".to_owned(),
                "Layered System".to_owned(),
            ],
            correct_option: Some(2),
            topic: Some("Web Development".to_owned()),
            explanation: None,
        },
    ]
}

/// `count` generated questions with ids `1..=count`; option 0 is correct
/// for odd ids and option 1 for even ids.
#[must_use]
pub fn keyed_questions(count: u64) -> Vec<Question> {
    (1..=count)
        .map(|id| Question {
            id: QuestionId(id),
            prompt: format!("Question {id}"),
            options: vec![format!("{id}-a"), format!("{id}-b"), format!("{id}-c")],
            correct_option: Some(if id % 2 == 1 { 0 } else { 1 }),
            topic: None,
            explanation: None,
        })
        .collect()
}
