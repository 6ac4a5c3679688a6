use teloxide::utils::html::escape;

use crate::quiz::session::Feedback;
use crate::quiz::summary::RoundSummary;
use crate::quiz::{Label, Level, Question, WrongAnswer};

pub const GREETING_TEXT: &str = "こんにちは！「問題と苦しみの理解度テスト」です。\nこのテストでは、選択肢は「問題」と「苦しみ」の2つです。";
pub const LEVEL_PROMPT: &str = "難易度を選んでください";
pub const NEXT_BUTTON: &str = "次の問題へ";
pub const RESTART_PROMPT: &str = "もう一度テストを始めるには難易度を選んでください";
pub const PRESS_A_BUTTON: &str = "下のボタンから選んでください";
pub const NO_DATA_TEXT: &str = "問題データが見つかりませんでした。管理者にお問い合わせください。";
pub const NO_DATA_FOR_LEVEL_TEXT: &str = "選択したレベル（シート）にデータがありません。もう一方のレベルを選んでください。";
pub const FIRST_SHEET_BUTTON: &str = "先頭のシートで両方のレベルを出題";
pub const EMPTY_SELECTION_TEXT: &str = "選択したシートにデータがありません。もう一度選んでください。";

const QUESTION_PROMPT: &str = "次の例文は「問題」と「苦しみ」のどちらに当たりますか？";
const SHEET_BUTTON_SUFFIX: &str = "枚目";

pub fn question_text(number: usize, total: usize, question: &Question) -> String {
    format!(
        "<b>問{} / {}</b>\n{}\n\n<b>【出来事】</b>\n{}\n\n<b>【どのように感じたか】</b>\n{}",
        number,
        total,
        QUESTION_PROMPT,
        escape(&question.event_text),
        escape(&question.example_text)
    )
}

/// Reply to an answer. The correct label and explanation are only revealed on the hard level.
pub fn feedback_text(feedback: &Feedback, hard: bool) -> String {
    if feedback.correct {
        return "正解です。".to_string();
    }

    let mut text = "不正解です。".to_string();
    if let (true, Some(missed)) = (hard, &feedback.missed) {
        text.push_str(&format!("\n\n<b>正解:</b> 「{}」", missed.correct_label));
        if !missed.explanation_text.is_empty() {
            text.push_str(&format!(
                "\n<b>解説:</b> {}",
                escape(&missed.explanation_text)
            ));
        }
    }
    text
}

pub fn summary_text(summary: &RoundSummary) -> String {
    let mut text = format!(
        "<b>テストが終了しました</b>\n結果: {} / {} 問正解　得点: {} 点",
        summary.score, summary.total, summary.percent
    );
    if !summary.review.is_empty() {
        text.push_str("\n\n<b>【間違えた問題の正解・解説】</b>");
    }
    text
}

pub fn review_text(number: usize, wrong: &WrongAnswer) -> String {
    let mut text = format!(
        "<b>問{}</b>\n<b>出来事:</b> {}\n<b>どのように感じたか:</b> {}\n<b>あなたの答え:</b> {}\n<b>正解:</b> {}",
        number,
        escape(&wrong.event_text),
        escape(&wrong.example_text),
        wrong.chosen_label,
        wrong.correct_label
    );
    if !wrong.explanation_text.is_empty() {
        text.push_str(&format!("\n<b>解説:</b> {}", escape(&wrong.explanation_text)));
    }
    text
}

pub fn sheet_choice_text(level: Level, sheet_names: &[String]) -> String {
    let sheets = sheet_names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}: {}", sheet_button(i), escape(name)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}の出題に使うシートを選んでください。\n（番号はシートの並び順です）\n\n{}",
        level, sheets
    )
}

/// One button per sheet, then the shortcut that skips the choice when `offer_first_sheet` is set.
pub fn sheet_choice_buttons(sheet_names: &[String], offer_first_sheet: bool) -> Vec<String> {
    let mut buttons = (0..sheet_names.len()).map(sheet_button).collect::<Vec<_>>();
    if offer_first_sheet {
        buttons.push(FIRST_SHEET_BUTTON.to_string());
    }
    buttons
}

pub fn sheet_button(index: usize) -> String {
    format!("{}{}", index + 1, SHEET_BUTTON_SUFFIX)
}

/// Zero-based sheet index from a button text like `"2枚目"` or a bare `"2"`.
pub fn parse_sheet_button(text: &str) -> Option<usize> {
    let text = text.trim();
    let number = text.strip_suffix(SHEET_BUTTON_SUFFIX).unwrap_or(text);
    number.trim().parse::<usize>().ok()?.checked_sub(1)
}

pub fn answer_buttons() -> [&'static str; 2] {
    Label::ALL.map(|label| label.as_str())
}
