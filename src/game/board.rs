//! Chat-facing text for a round: the board and every reply the game sends

use super::question::{AnswerSlot, Question};
use super::session::Session;

const BLANK: &str = "_______";

/// Numbered slot lines, filled slots showing text, points and contributors
pub fn board(session: &Session) -> String {
    session
        .question()
        .answers
        .iter()
        .enumerate()
        .map(|(i, slot)| match session.found(&slot.text) {
            Some(record) => format!(
                "{}. {} ({}) - {}",
                i + 1,
                slot.text,
                record.points,
                record.contributors.join(", ")
            ),
            None => format!("{}. {BLANK}", i + 1),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn blanks(question: &Question) -> String {
    (1..=question.answers.len())
        .map(|n| format!("{n}. {BLANK}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn start_prompt(question: &Question, resign_token: &str) -> String {
    format!(
        "Family 100 dimulai!\n\nPertanyaan:\n{}\n\n{}\n\nKetik jawaban kalian langsung!\nKetik .{resign_token} untuk menyerah.",
        question.prompt,
        blanks(question)
    )
}

pub fn already_in_progress() -> String {
    "Game Family 100 sedang berlangsung!".to_string()
}

/// Final reveal on resignation. The preface depends on whether anything was found.
pub fn resign_reveal(session: &Session) -> String {
    let preface = if session.score() > 0 {
        "Jawaban yang sudah terjawab:"
    } else {
        "Tidak ada jawaban yang terjawab."
    };
    format!(
        "Anda menyerah, game telah diberhentikan!\n\nPertanyaan: {}\n{preface}\n{}",
        session.question().prompt,
        board(session)
    )
}

pub fn correct_answer(session: &Session, resign_token: &str) -> String {
    format!(
        "✅ Jawaban benar!\n\n{}\n\n{}\n\nKetik jawaban kalian lagi atau ketik .{resign_token} untuk menyerah.",
        session.question().prompt,
        board(session)
    )
}

pub fn round_complete(session: &Session) -> String {
    format!(
        "🎉 Selamat! Semua jawaban benar! Total Skor: {}\nJawaban lengkap:\n{}",
        session.score(),
        board(session)
    )
}

pub fn already_answered(slot: &AnswerSlot, points: u32) -> String {
    format!("❌ Jawaban sudah terjawab ({}, {points} poin)!", slot.text)
}

pub fn check_failed() -> String {
    "Ada masalah saat memeriksa jawaban. Coba lagi nanti.".to_string()
}
