//! Prompt composition: turns a history snapshot into a [`GenerationRequest`].
//!
//! # Determinism
//!
//! Composition is pure: identical inputs always produce identical requests.
//! No I/O, no clock, no randomness. It cannot fail; an unreadable history is
//! the caller's problem.
//!
//! Inputs are expected newest first and are never re-sorted here.

use careerlens_core::locale::Locale;
use careerlens_core::provider::{GenerationRequest, PromptMode, RequestKind};
use careerlens_core::reflection::Reflection;

/// How many recent reflections condition a new question.
pub const QUESTION_HISTORY_LIMIT: usize = 5;

// ── Templates ─────────────────────────────────────────────────────────────

struct Templates {
    question_label: &'static str,
    answer_label: &'static str,
    cold_start: &'static str,
    question_intro: &'static str,
    question_instructions: &'static str,
    advice_intro: &'static str,
    advice_instructions: &'static str,
}

const JA: Templates = Templates {
    question_label: "質問",
    answer_label: "回答",
    cold_start: "キャリアに関する深い自己分析のための質問を1つ生成してください。\n\
以下のようなテーマに関する質問を考えてください：\n\
- スキルと能力の成長\n\
- 価値観とやりがい\n\
- 将来のキャリアビジョン\n\
- 仕事での課題と克服\n\
質問は具体的で、内省を促すものにしてください。\n\
回答は質問文のみを返してください。",
    question_intro: "以下は、このユーザーの過去のキャリアに関する質問と回答の履歴です：",
    question_instructions: "この履歴を踏まえて、ユーザーのキャリア開発により深い洞察を与えられる、新しい質問を1つ生成してください。\n\
以下の点を考慮してください：\n\
1. 過去の回答から見えてきたユーザーの興味・関心\n\
2. まだ十分に掘り下げられていない観点\n\
3. 前回の回答を更に深めるような質問\n\
4. キャリア開発の次のステップを促す質問\n\n\
質問は具体的で、内省を促すものにしてください。\n\
回答は質問文のみを返してください。",
    advice_intro: "以下の過去の自己分析の記録を基に、総合的なキャリアアドバイスを提供してください：",
    advice_instructions: "以下の観点から分析してアドバイスをしてください：\n\
1. 強みと成長ポイント\n\
2. キャリアにおける価値観の傾向\n\
3. 今後の成長に向けた具体的なアクション",
};

const EN: Templates = Templates {
    question_label: "Question",
    answer_label: "Answer",
    cold_start: "Generate one question for a deep self-analysis of the user's career.\n\
Draw the question from one of these themes:\n\
- Growth of skills and abilities\n\
- Values and sources of fulfilment\n\
- Future career vision\n\
- Challenges at work and how to overcome them\n\
Make the question concrete and encourage introspection.\n\
Reply with the question text only.",
    question_intro: "Below is this user's history of past career questions and answers:",
    question_instructions: "Building on this history, generate exactly one new question that gives the user deeper insight into their career development.\n\
Consider:\n\
1. Interests and concerns that emerge from the past answers\n\
2. Angles that have not been explored enough yet\n\
3. A question that deepens the most recent answer\n\
4. A question that prompts the next step in their career development\n\n\
Make the question concrete and encourage introspection.\n\
Reply with the question text only.",
    advice_intro: "Based on the following record of past self-reflection, provide comprehensive career advice:",
    advice_instructions: "Analyse the record and give advice covering:\n\
1. Strengths and points for growth\n\
2. Tendencies in what the user values in their career\n\
3. Concrete actions for future growth",
};

fn templates(locale: Locale) -> &'static Templates {
    match locale {
        Locale::Ja => &JA,
        Locale::En => &EN,
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────

/// Render reflections as "question / answer" pairs, one pair per block.
pub fn render_history(history: &[Reflection], locale: Locale) -> String {
    let t = templates(locale);
    history
        .iter()
        .map(|r| {
            format!(
                "{}: {}\n{}: {}",
                t.question_label, r.question, t.answer_label, r.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Entry points ──────────────────────────────────────────────────────────

/// Compose the request for the next reflection question.
///
/// Empty history selects cold-start mode. Otherwise the first
/// [`QUESTION_HISTORY_LIMIT`] entries condition the prompt.
pub fn compose_question_request(history: &[Reflection], locale: Locale) -> GenerationRequest {
    let t = templates(locale);

    if history.is_empty() {
        return GenerationRequest {
            kind: RequestKind::Question,
            mode: PromptMode::ColdStart,
            history_excerpt: Vec::new(),
            instructions: t.cold_start.to_string(),
            query: t.cold_start.to_string(),
            locale,
        };
    }

    let excerpt = &history[..history.len().min(QUESTION_HISTORY_LIMIT)];
    let query = format!(
        "{}\n\n{}\n\n{}",
        t.question_intro,
        render_history(excerpt, locale),
        t.question_instructions
    );

    GenerationRequest {
        kind: RequestKind::Question,
        mode: PromptMode::HistoryConditioned,
        history_excerpt: excerpt.to_vec(),
        instructions: t.question_instructions.to_string(),
        query,
        locale,
    }
}

/// Compose the request for aggregate advice over the entire history.
///
/// Never truncated, and always history-conditioned, even when the history
/// is empty.
pub fn compose_advice_request(history: &[Reflection], locale: Locale) -> GenerationRequest {
    let t = templates(locale);
    let query = format!(
        "{}\n\n{}\n\n{}",
        t.advice_intro,
        render_history(history, locale),
        t.advice_instructions
    );

    GenerationRequest {
        kind: RequestKind::Advice,
        mode: PromptMode::HistoryConditioned,
        history_excerpt: history.to_vec(),
        instructions: t.advice_instructions.to_string(),
        query,
        locale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// `n` reflections, newest first, ids n..1.
    fn history(n: usize) -> Vec<Reflection> {
        let base = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();
        (1..=n as i64)
            .rev()
            .map(|id| Reflection {
                id,
                created_at: base + Duration::hours(id),
                question: format!("question {id}"),
                answer: format!("answer {id}"),
            })
            .collect()
    }

    #[test]
    fn empty_history_is_cold_start() {
        let req = compose_question_request(&[], Locale::Ja);
        assert_eq!(req.mode, PromptMode::ColdStart);
        assert_eq!(req.kind, RequestKind::Question);
        assert!(req.history_excerpt.is_empty());
        assert_eq!(req.query, req.instructions);
        for theme in ["スキルと能力の成長", "価値観とやりがい", "将来のキャリアビジョン", "仕事での課題と克服"] {
            assert!(req.instructions.contains(theme), "missing theme {theme}");
        }
    }

    #[test]
    fn cold_start_english_lists_themes() {
        let req = compose_question_request(&[], Locale::En);
        assert!(req.instructions.contains("skills"));
        assert!(req.instructions.contains("Values"));
        assert!(req.instructions.contains("career vision"));
        assert!(req.instructions.contains("Challenges"));
        assert!(!req.query.contains("Answer:"));
    }

    #[test]
    fn excerpt_is_min_of_five_and_length() {
        for len in 1..=8 {
            let h = history(len);
            let req = compose_question_request(&h, Locale::Ja);
            assert_eq!(req.mode, PromptMode::HistoryConditioned);
            assert_eq!(req.history_excerpt.len(), len.min(QUESTION_HISTORY_LIMIT));
            assert_eq!(req.history_excerpt[..], h[..len.min(QUESTION_HISTORY_LIMIT)]);
        }
    }

    #[test]
    fn seven_reflections_use_the_five_most_recent() {
        let h = history(7);
        let req = compose_question_request(&h, Locale::En);
        let ids: Vec<i64> = req.history_excerpt.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
        assert!(req.query.contains("question 7"));
        assert!(req.query.contains("question 3"));
        assert!(!req.query.contains("question 2"));
        assert!(!req.query.contains("question 1"));
    }

    #[test]
    fn input_order_is_preserved_not_sorted() {
        let mut h = history(3);
        h.swap(0, 2);
        let req = compose_question_request(&h, Locale::En);
        let ids: Vec<i64> = req.history_excerpt.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn history_rendered_as_pairs() {
        let h = history(2);
        let rendered = render_history(&h, Locale::Ja);
        assert_eq!(
            rendered,
            "質問: question 2\n回答: answer 2\n質問: question 1\n回答: answer 1"
        );
    }

    #[test]
    fn question_prompt_asks_for_one_deeper_question() {
        let req = compose_question_request(&history(2), Locale::En);
        assert!(req.query.starts_with(EN.question_intro));
        assert!(req.query.ends_with("Reply with the question text only."));
        assert!(req.instructions.contains("exactly one new question"));
        assert!(req.instructions.contains("not been explored"));
        assert!(req.instructions.contains("next step"));
    }

    #[test]
    fn advice_uses_entire_history() {
        let h = history(12);
        let req = compose_advice_request(&h, Locale::Ja);
        assert_eq!(req.kind, RequestKind::Advice);
        assert_eq!(req.mode, PromptMode::HistoryConditioned);
        assert_eq!(req.history_excerpt.len(), 12);
        assert!(req.query.contains("question 1\n"));
        assert!(req.query.contains("question 12"));
        assert!(req.instructions.contains("強みと成長ポイント"));
    }

    #[test]
    fn advice_on_empty_history_still_has_instructions() {
        let req = compose_advice_request(&[], Locale::En);
        assert!(req.history_excerpt.is_empty());
        assert!(!req.instructions.is_empty());
        assert!(req.instructions.contains("Concrete actions"));
    }

    #[test]
    fn composition_is_deterministic() {
        let h = history(4);
        let a = compose_question_request(&h, Locale::Ja);
        let b = compose_question_request(&h, Locale::Ja);
        assert_eq!(a.query, b.query);
        assert_eq!(a.history_excerpt, b.history_excerpt);
    }

    #[test]
    fn instructions_never_empty() {
        for locale in [Locale::Ja, Locale::En] {
            for len in [0, 1, 6] {
                let h = history(len);
                assert!(!compose_question_request(&h, locale).instructions.is_empty());
                assert!(!compose_advice_request(&h, locale).instructions.is_empty());
            }
        }
    }
}
